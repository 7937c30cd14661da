//! Shared test vocabulary and job posts.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};

use crate::config::{Config, PageSizes};
use crate::models::entity::{CityRow, NamedEntityRow, StateRow};
use crate::models::job::{JobPost, JobStatus, JobType};
use crate::search::cache::MemoryCache;
use crate::search::snapshot::{VocabularyRows, VocabularyService, VocabularySnapshot, VocabularySource};
use crate::search::filter::JobFilter;
use crate::search::store::{JobOrder, JobStore};
use crate::search::SearchError;
use crate::state::AppState;

fn named(id: i64, name: &str, slug: &str) -> NamedEntityRow {
    NamedEntityRow {
        id,
        name: name.to_string(),
        slug: slug.to_string(),
        status: "Active".to_string(),
    }
}

fn state(id: i64, name: &str, slug: &str) -> StateRow {
    StateRow {
        id,
        name: name.to_string(),
        slug: slug.to_string(),
        status: "Enabled".to_string(),
    }
}

fn city(id: i64, name: &str, slug: &str, state_id: i64, parent_city_id: Option<i64>) -> CityRow {
    CityRow {
        id,
        name: name.to_string(),
        slug: slug.to_string(),
        status: "Enabled".to_string(),
        state_id,
        parent_city_id,
    }
}

pub const JAVA: i64 = 1;
pub const PYTHON: i64 = 3;
pub const MBA: i64 = 1;
pub const BANGALORE: i64 = 1;
pub const WHITEFIELD: i64 = 2;
pub const MYSORE: i64 = 3;
pub const DELHI: i64 = 4;
pub const HYDERABAD: i64 = 5;

/// Karnataka holds Bangalore, Whitefield (inside Bangalore) and Mysore.
/// Delhi is both a state and its only city.
pub fn fixture_snapshot() -> VocabularySnapshot {
    VocabularySnapshot::build(VocabularyRows {
        skills: vec![
            named(1, "Java", "java"),
            named(2, "Java Script", "java-script"),
            named(3, "Python", "python"),
            named(4, "Python Django", "python-django"),
            named(5, "Full Stack Developer", "full-stack-developer"),
        ],
        cities: vec![
            city(BANGALORE, "Bangalore", "bangalore", 1, None),
            city(WHITEFIELD, "Whitefield", "whitefield", 1, Some(BANGALORE)),
            city(MYSORE, "Mysore", "mysore", 1, None),
            city(DELHI, "Delhi", "delhi", 2, None),
            city(HYDERABAD, "Hyderabad", "hyderabad", 3, None),
        ],
        states: vec![
            state(1, "Karnataka", "karnataka"),
            state(2, "Delhi", "delhi"),
            state(3, "Telangana", "telangana"),
        ],
        qualifications: vec![named(1, "MBA", "mba"), named(2, "B.Tech", "b-tech")],
        industries: vec![
            named(1, "Software", "software"),
            named(2, "Banking/Financial Services", "banking-financial-services"),
        ],
        functional_areas: vec![named(1, "Engineering", "engineering")],
    })
}

/// Wednesday.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
}

/// A live full-time post with no facets. Higher ids are published later.
pub fn job(id: i64) -> JobPost {
    JobPost {
        id,
        title: format!("Job {id}"),
        job_type: JobType::FullTime.as_str().to_string(),
        status: JobStatus::Live.as_str().to_string(),
        skills: vec![],
        locations: vec![],
        industries: vec![],
        qualifications: vec![],
        functional_areas: vec![],
        min_year: 0,
        min_month: 0,
        max_year: 0,
        max_month: 0,
        min_salary: 0,
        max_salary: 0,
        walkin_from_date: None,
        walkin_to_date: None,
        published_on: Some(Utc.with_ymd_and_hms(2026, 9, 1, 9, 0, 0).unwrap() + chrono::Duration::hours(id)),
    }
}

fn with(id: i64, skills: Vec<i64>, locations: Vec<i64>) -> JobPost {
    JobPost {
        skills,
        locations,
        ..job(id)
    }
}

/// 1, 2: Java in Bangalore. 3: Java in Hyderabad. 4: Java in Mysore.
/// 5: Java walk-in in Bangalore. 6: MBA in Delhi. 7: expired Python in
/// Bangalore. 8: Python in Whitefield.
pub fn fixture_jobs() -> Vec<JobPost> {
    let mut walkin = with(5, vec![JAVA], vec![BANGALORE]);
    walkin.job_type = JobType::WalkIn.as_str().to_string();
    walkin.walkin_from_date = NaiveDate::from_ymd_opt(2026, 10, 15);
    walkin.walkin_to_date = NaiveDate::from_ymd_opt(2026, 10, 16);

    let mut mba = job(6);
    mba.qualifications = vec![MBA];
    mba.locations = vec![DELHI];

    let mut expired = with(7, vec![PYTHON], vec![BANGALORE]);
    expired.status = JobStatus::Expired.as_str().to_string();

    vec![
        with(1, vec![JAVA], vec![BANGALORE]),
        with(2, vec![JAVA], vec![BANGALORE]),
        with(3, vec![JAVA], vec![HYDERABAD]),
        with(4, vec![JAVA], vec![MYSORE]),
        walkin,
        mba,
        expired,
        with(8, vec![PYTHON], vec![WHITEFIELD]),
    ]
}

/// Always serves the same snapshot.
pub struct StaticVocabularySource(pub VocabularySnapshot);

#[async_trait]
impl VocabularySource for StaticVocabularySource {
    async fn load(&self) -> Result<VocabularySnapshot, SearchError> {
        Ok(self.0.clone())
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/jobsearch_test".to_string(),
        db_max_connections: 1,
        redis_url: None,
        port: 0,
        rust_log: "debug".to_string(),
        vocabulary_cache_ttl: Duration::from_secs(60),
        page_sizes: PageSizes {
            jobs: 2,
            walkins: 20,
            suggestions: 10,
        },
    }
}

/// App state over the fixture vocabulary and jobs, with a page size of 2.
pub fn test_state() -> AppState {
    let snapshot = fixture_snapshot();
    let jobs = fixture_jobs();
    AppState {
        config: test_config(),
        jobs: Arc::new(InMemoryJobStore::new(jobs)),
        vocabulary: Arc::new(VocabularyService::new(
            Arc::new(StaticVocabularySource(snapshot)),
            Arc::new(MemoryCache::new()),
            Duration::from_secs(60),
        )),
    }
}

/// Evaluates filters in process over a fixed job list.
pub struct InMemoryJobStore {
    jobs: Vec<JobPost>,
}

impl InMemoryJobStore {
    pub fn new(jobs: Vec<JobPost>) -> Self {
        Self { jobs }
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn count(&self, filter: &JobFilter) -> Result<u64, SearchError> {
        Ok(self.jobs.iter().filter(|j| filter.matches(j)).count() as u64)
    }

    async fn fetch(
        &self,
        filter: &JobFilter,
        order: JobOrder,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<JobPost>, SearchError> {
        let mut matched: Vec<&JobPost> = self.jobs.iter().filter(|j| filter.matches(j)).collect();
        matched.sort_by(|a, b| order.compare(a, b));
        Ok(matched
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}
