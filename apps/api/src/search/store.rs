#[cfg(test)]
use std::cmp::Ordering;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::job::JobPost;
use crate::search::filter::JobFilter;
use crate::search::SearchError;

/// Total order applied before slicing a page. Ties break on id, newest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobOrder {
    #[default]
    PublishedDesc,
    WalkinToDesc,
}

impl JobOrder {
    fn sql(&self) -> &'static str {
        match self {
            JobOrder::PublishedDesc => " ORDER BY j.published_on DESC NULLS LAST, j.id DESC",
            JobOrder::WalkinToDesc => " ORDER BY j.walkin_to_date DESC NULLS LAST, j.id DESC",
        }
    }

    #[cfg(test)]
    pub fn compare(&self, a: &JobPost, b: &JobPost) -> Ordering {
        let primary = match self {
            JobOrder::PublishedDesc => desc_nulls_last(a.published_on, b.published_on),
            JobOrder::WalkinToDesc => desc_nulls_last(a.walkin_to_date, b.walkin_to_date),
        };
        primary.then_with(|| b.id.cmp(&a.id))
    }
}

#[cfg(test)]
fn desc_nulls_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Query-store seam. Implementations must treat the filter as read-only so it
/// can be replayed for `count` and `fetch`.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn count(&self, filter: &JobFilter) -> Result<u64, SearchError>;

    async fn fetch(
        &self,
        filter: &JobFilter,
        order: JobOrder,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<JobPost>, SearchError>;
}

const JOB_COLUMNS: &str = r#"
    SELECT j.id, j.title, j.job_type, j.status,
        ARRAY(SELECT s.skill_id FROM job_post_skills s WHERE s.job_post_id = j.id) AS skills,
        ARRAY(SELECT l.city_id FROM job_post_locations l WHERE l.job_post_id = j.id) AS locations,
        ARRAY(SELECT i.industry_id FROM job_post_industries i WHERE i.job_post_id = j.id) AS industries,
        ARRAY(SELECT q.qualification_id FROM job_post_qualifications q WHERE q.job_post_id = j.id) AS qualifications,
        ARRAY(SELECT f.functional_area_id FROM job_post_functional_areas f WHERE f.job_post_id = j.id) AS functional_areas,
        j.min_year, j.min_month, j.max_year, j.max_month,
        j.min_salary, j.max_salary,
        j.walkin_from_date, j.walkin_to_date, j.published_on
    FROM job_posts j
    WHERE "#;

/// Renders `filter` as a boolean SQL expression over the `job_posts j` alias.
pub fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &JobFilter) {
    match filter {
        JobFilter::All(children) | JobFilter::Any(children) if children.is_empty() => {
            qb.push(if matches!(filter, JobFilter::All(_)) { "TRUE" } else { "FALSE" });
        }
        JobFilter::All(children) | JobFilter::Any(children) => {
            let joiner = if matches!(filter, JobFilter::All(_)) { " AND " } else { " OR " };
            qb.push("(");
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    qb.push(joiner);
                }
                push_filter(qb, child);
            }
            qb.push(")");
        }
        JobFilter::Status(status) => {
            qb.push("j.status = ").push_bind(status.as_str());
        }
        JobFilter::JobType(t) => {
            qb.push("j.job_type = ").push_bind(t.as_str());
        }
        JobFilter::NotJobType(t) => {
            qb.push("j.job_type <> ").push_bind(t.as_str());
        }
        JobFilter::Facet { ids, .. } if ids.is_empty() => {
            qb.push("FALSE");
        }
        JobFilter::Facet { facet, ids } => {
            let (table, column) = facet.join_table();
            qb.push(format!(
                "EXISTS (SELECT 1 FROM {table} x WHERE x.job_post_id = j.id AND x.{column} = ANY("
            ))
            .push_bind(ids.clone())
            .push("))");
        }
        JobFilter::Experience { low, high } => {
            qb.push("(j.min_year <= ")
                .push_bind(*high)
                .push(" AND j.max_year >= ")
                .push_bind(*low)
                .push(")");
        }
        JobFilter::Salary { low, high } => {
            qb.push("(j.min_salary <= ")
                .push_bind(*high)
                .push(" AND j.max_salary >= ")
                .push_bind(*low)
                .push(")");
        }
        JobFilter::Fresher => {
            qb.push("j.min_year <= 0");
        }
        JobFilter::WalkinBetween { from, to } => {
            qb.push("(j.walkin_from_date BETWEEN ")
                .push_bind(*from)
                .push(" AND ")
                .push_bind(*to)
                .push(" OR j.walkin_to_date BETWEEN ")
                .push_bind(*from)
                .push(" AND ")
                .push_bind(*to)
                .push(")");
        }
    }
}

pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn count(&self, filter: &JobFilter) -> Result<u64, SearchError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM job_posts j WHERE ");
        push_filter(&mut qb, filter);
        let count = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(count.max(0) as u64)
    }

    async fn fetch(
        &self,
        filter: &JobFilter,
        order: JobOrder,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<JobPost>, SearchError> {
        let mut qb = QueryBuilder::<Postgres>::new(JOB_COLUMNS);
        push_filter(&mut qb, filter);
        qb.push(order.sql())
            .push(" LIMIT ")
            .push_bind(limit as i64)
            .push(" OFFSET ")
            .push_bind(offset as i64);
        Ok(qb.build_query_as::<JobPost>().fetch_all(&self.pool).await?)
    }
}
