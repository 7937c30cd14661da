mod config;
mod db;
mod errors;
mod models;
mod routes;
mod search;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::routes::build_router;
use crate::search::cache::{MemoryCache, RedisCache, SnapshotCache};
use crate::search::snapshot::{PgVocabularySource, VocabularyService};
use crate::search::store::PgJobStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting jobsearch API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url, config.db_max_connections).await?;

    // Vocabulary cache: Redis when configured, otherwise in process
    let cache: Arc<dyn SnapshotCache> = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.clone())?;
            match RedisCache::connect(client).await {
                Ok(cache) => {
                    info!("Redis vocabulary cache initialized");
                    Arc::new(cache)
                }
                Err(e) => {
                    warn!("Redis unavailable ({e}), caching vocabulary in process");
                    Arc::new(MemoryCache::new())
                }
            }
        }
        None => {
            info!("REDIS_URL not set, caching vocabulary in process");
            Arc::new(MemoryCache::new())
        }
    };

    let vocabulary = Arc::new(VocabularyService::new(
        Arc::new(PgVocabularySource::new(db.clone())),
        cache,
        config.vocabulary_cache_ttl,
    ));
    info!(
        "Vocabulary snapshot TTL: {}s",
        config.vocabulary_cache_ttl.as_secs()
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        jobs: Arc::new(PgJobStore::new(db)),
        vocabulary,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the listing frontend

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
