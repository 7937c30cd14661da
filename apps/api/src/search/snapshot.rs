//! Point-in-time snapshot of the active reference vocabulary.
//!
//! The snapshot is loaded from a `VocabularySource`, cached through a
//! `SnapshotCache` with a TTL, and handed to the resolver and filter builder
//! explicitly. Stale reads are acceptable; entity status changes are rare and
//! `VocabularyService::invalidate` drops the cached copy.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{debug, info, warn};

use crate::models::entity::{
    is_searchable_status, CityRow, NamedEntityRow, StateRow, STATUS_ACTIVE, STATUS_ENABLED,
};
use crate::search::cache::SnapshotCache;
use crate::search::vocabulary::{find_by_name, CityEntry, EntityKind, VocabularyEntry};
use crate::search::SearchError;

const SNAPSHOT_CACHE_KEY: &str = "jobsearch:vocabulary:v1";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VocabularySnapshot {
    pub skills: Vec<VocabularyEntry>,
    pub cities: Vec<CityEntry>,
    pub states: Vec<VocabularyEntry>,
    pub qualifications: Vec<VocabularyEntry>,
    pub industries: Vec<VocabularyEntry>,
    pub functional_areas: Vec<VocabularyEntry>,
}

/// Raw active rows, as read from storage.
pub struct VocabularyRows {
    pub skills: Vec<NamedEntityRow>,
    pub cities: Vec<CityRow>,
    pub states: Vec<StateRow>,
    pub qualifications: Vec<NamedEntityRow>,
    pub industries: Vec<NamedEntityRow>,
    pub functional_areas: Vec<NamedEntityRow>,
}

impl VocabularySnapshot {
    /// Builds the snapshot from searchable rows only and computes the
    /// duplicate-city flag once.
    pub fn build(rows: VocabularyRows) -> Self {
        fn active(rows: Vec<NamedEntityRow>) -> Vec<VocabularyEntry> {
            rows.into_iter()
                .filter(|r| is_searchable_status(&r.status))
                .map(Into::into)
                .collect()
        }

        let states: Vec<VocabularyEntry> = rows
            .states
            .into_iter()
            .filter(|s| is_searchable_status(&s.status))
            .map(Into::into)
            .collect();
        let cities = rows
            .cities
            .into_iter()
            .filter(|c| is_searchable_status(&c.status))
            .map(|c| CityEntry::from_row(c, &states))
            .collect();
        Self {
            skills: active(rows.skills),
            cities,
            states,
            qualifications: active(rows.qualifications),
            industries: active(rows.industries),
            functional_areas: active(rows.functional_areas),
        }
    }

    /// Plain entries for every kind except cities.
    pub fn entries(&self, kind: EntityKind) -> &[VocabularyEntry] {
        match kind {
            EntityKind::Skill => &self.skills,
            EntityKind::State => &self.states,
            EntityKind::Qualification => &self.qualifications,
            EntityKind::Industry => &self.industries,
            EntityKind::FunctionalArea => &self.functional_areas,
            EntityKind::City => &[],
        }
    }

    pub fn city(&self, id: i64) -> Option<&CityEntry> {
        self.cities.iter().find(|c| c.id == id)
    }

    /// Names of the given ids, in id order; unknown ids are skipped.
    pub fn names_of(&self, kind: EntityKind, ids: &[i64]) -> Vec<String> {
        match kind {
            EntityKind::City => ids
                .iter()
                .filter_map(|id| self.city(*id))
                .map(|c| c.name.clone())
                .collect(),
            _ => {
                let entries = self.entries(kind);
                ids.iter()
                    .filter_map(|id| entries.iter().find(|e| e.id == *id))
                    .map(|e| e.name.clone())
                    .collect()
            }
        }
    }

    /// Maps canonical names (case-insensitive) to ids; unknown names are dropped.
    pub fn ids_of_names(&self, kind: EntityKind, names: &[String]) -> Vec<i64> {
        let found: Vec<i64> = match kind {
            EntityKind::City => names
                .iter()
                .filter_map(|n| find_by_name(n, &self.cities))
                .map(|c| c.id)
                .collect(),
            _ => names
                .iter()
                .filter_map(|n| find_by_name(n, self.entries(kind)))
                .map(|e| e.id)
                .collect(),
        };
        let mut ids = Vec::with_capacity(found.len());
        for id in found {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    /// A selected city also matches jobs posted in its parent city.
    pub fn with_parent_cities(&self, city_ids: &[i64]) -> Vec<i64> {
        let mut expanded: Vec<i64> = city_ids.to_vec();
        for id in city_ids {
            if let Some(parent) = self.city(*id).and_then(|c| c.parent_city_id) {
                if !expanded.contains(&parent) {
                    expanded.push(parent);
                }
            }
        }
        expanded
    }

    /// Cities covered by a state selection: every city of the state, plus any
    /// city that carries the state's name.
    pub fn cities_in_states(&self, state_ids: &[i64]) -> Vec<i64> {
        let state_names: Vec<&str> = state_ids
            .iter()
            .filter_map(|id| self.states.iter().find(|s| s.id == *id))
            .map(|s| s.name.as_str())
            .collect();

        self.cities
            .iter()
            .filter(|c| {
                state_ids.contains(&c.state_id)
                    || state_names.iter().any(|n| n.eq_ignore_ascii_case(&c.name))
            })
            .map(|c| c.id)
            .collect()
    }

    /// States whose name is already carried by one of their own cities.
    pub fn is_duplicated_state(&self, state_id: i64) -> bool {
        self.cities
            .iter()
            .any(|c| c.is_duplicate && c.state_id == state_id)
    }
}

/// Storage seam for the active vocabulary.
#[async_trait]
pub trait VocabularySource: Send + Sync {
    async fn load(&self) -> Result<VocabularySnapshot, SearchError>;
}

/// Reads the active vocabulary from Postgres in one pass per table.
pub struct PgVocabularySource {
    pool: PgPool,
}

impl PgVocabularySource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn named(&self, table: &str) -> Result<Vec<NamedEntityRow>, SearchError> {
        let sql = format!(
            "SELECT id, name, slug, status FROM {table} WHERE status = $1 ORDER BY id"
        );
        Ok(sqlx::query_as::<_, NamedEntityRow>(&sql)
            .bind(STATUS_ACTIVE)
            .fetch_all(&self.pool)
            .await?)
    }
}

#[async_trait]
impl VocabularySource for PgVocabularySource {
    async fn load(&self) -> Result<VocabularySnapshot, SearchError> {
        let skills = self.named("skills").await?;
        let qualifications = self.named("qualifications").await?;
        let industries = self.named("industries").await?;
        let functional_areas = self.named("functional_areas").await?;

        let states = sqlx::query_as::<_, StateRow>(
            "SELECT id, name, slug, status FROM states WHERE status = $1 ORDER BY id",
        )
        .bind(STATUS_ENABLED)
        .fetch_all(&self.pool)
        .await?;

        let cities = sqlx::query_as::<_, CityRow>(
            r#"
            SELECT id, name, slug, status, state_id, parent_city_id
            FROM cities
            WHERE status = $1
            ORDER BY id
            "#,
        )
        .bind(STATUS_ENABLED)
        .fetch_all(&self.pool)
        .await?;

        info!(
            "Loaded vocabulary: {} skills, {} cities, {} states, {} qualifications",
            skills.len(),
            cities.len(),
            states.len(),
            qualifications.len()
        );

        Ok(VocabularySnapshot::build(VocabularyRows {
            skills,
            cities,
            states,
            qualifications,
            industries,
            functional_areas,
        }))
    }
}

/// Read-through snapshot provider handed to handlers via `AppState`.
pub struct VocabularyService {
    source: Arc<dyn VocabularySource>,
    cache: Arc<dyn SnapshotCache>,
    ttl: Duration,
}

impl VocabularyService {
    pub fn new(source: Arc<dyn VocabularySource>, cache: Arc<dyn SnapshotCache>, ttl: Duration) -> Self {
        Self { source, cache, ttl }
    }

    /// Returns the cached snapshot, loading it on a miss.
    /// Cache failures fall through to the source and are only logged.
    pub async fn snapshot(&self) -> Result<Arc<VocabularySnapshot>, SearchError> {
        match self.cache.get(SNAPSHOT_CACHE_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<VocabularySnapshot>(&raw) {
                Ok(snapshot) => return Ok(Arc::new(snapshot)),
                Err(e) => warn!("Discarding unreadable vocabulary cache entry: {e}"),
            },
            Ok(None) => debug!("Vocabulary cache miss"),
            Err(e) => warn!("Vocabulary cache unavailable: {e}"),
        }

        let snapshot = self.source.load().await?;
        match serde_json::to_string(&snapshot) {
            Ok(raw) => {
                if let Err(e) = self.cache.set(SNAPSHOT_CACHE_KEY, raw, self.ttl).await {
                    warn!("Failed to cache vocabulary snapshot: {e}");
                }
            }
            Err(e) => warn!("Failed to serialize vocabulary snapshot: {e}"),
        }
        Ok(Arc::new(snapshot))
    }

    /// Drops the cached snapshot so the next request reloads it.
    pub async fn invalidate(&self) -> Result<(), SearchError> {
        self.cache.delete(SNAPSHOT_CACHE_KEY).await?;
        info!("Vocabulary snapshot invalidated");
        Ok(())
    }
}
