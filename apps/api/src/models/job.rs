use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobType {
    #[serde(rename = "full-time")]
    FullTime,
    #[serde(rename = "walk-in")]
    WalkIn,
    #[serde(rename = "internship")]
    Internship,
    #[serde(rename = "government")]
    Government,
    /// Search-only type: zero years of required experience, any stored job type.
    #[serde(rename = "fresher")]
    Fresher,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "full-time",
            JobType::WalkIn => "walk-in",
            JobType::Internship => "internship",
            JobType::Government => "government",
            JobType::Fresher => "fresher",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "full-time" => Some(JobType::FullTime),
            "walk-in" => Some(JobType::WalkIn),
            "internship" => Some(JobType::Internship),
            "government" => Some(JobType::Government),
            "fresher" => Some(JobType::Fresher),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Live,
    Pending,
    Disabled,
    Expired,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Live => "Live",
            JobStatus::Pending => "Pending",
            JobStatus::Disabled => "Disabled",
            JobStatus::Expired => "Expired",
        }
    }
}

/// A job post with its many-to-many relations flattened into id lists.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobPost {
    pub id: i64,
    pub title: String,
    pub job_type: String,
    pub status: String,
    pub skills: Vec<i64>,
    pub locations: Vec<i64>,
    pub industries: Vec<i64>,
    pub qualifications: Vec<i64>,
    pub functional_areas: Vec<i64>,
    pub min_year: i32,
    pub min_month: i32,
    pub max_year: i32,
    pub max_month: i32,
    pub min_salary: i32,
    pub max_salary: i32,
    pub walkin_from_date: Option<NaiveDate>,
    pub walkin_to_date: Option<NaiveDate>,
    pub published_on: Option<DateTime<Utc>>,
}
