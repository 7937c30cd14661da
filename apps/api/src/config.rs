use std::time::Duration;

use anyhow::{Context, Result};

/// Result page sizes per listing kind.
#[derive(Debug, Clone, Copy)]
pub struct PageSizes {
    pub jobs: u32,
    pub walkins: u32,
    pub suggestions: usize,
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    /// Without Redis the vocabulary snapshot is cached in process.
    pub redis_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub vocabulary_cache_ttl: Duration,
    pub page_sizes: PageSizes,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 10)?,
            redis_url: std::env::var("REDIS_URL").ok().filter(|url| !url.trim().is_empty()),
            port: env_or("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            vocabulary_cache_ttl: Duration::from_secs(env_or("VOCABULARY_CACHE_TTL_SECS", 86_400)?),
            page_sizes: PageSizes {
                jobs: env_or("PAGE_SIZE_JOBS", 20)?,
                walkins: env_or("PAGE_SIZE_WALKINS", 20)?,
                suggestions: env_or("PAGE_SIZE_SUGGESTIONS", 10)?,
            },
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_or_falls_back_to_default() {
        let value: u32 = env_or("JOBSEARCH_TEST_UNSET_VARIABLE", 20).unwrap();
        assert_eq!(value, 20);
    }

    #[test]
    fn test_env_or_rejects_garbage() {
        std::env::set_var("JOBSEARCH_TEST_PAGE_SIZE", "twenty");
        let result: Result<u32> = env_or("JOBSEARCH_TEST_PAGE_SIZE", 20);
        assert!(result.is_err());
        std::env::remove_var("JOBSEARCH_TEST_PAGE_SIZE");
    }
}
