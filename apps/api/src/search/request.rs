use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::job::JobType;

/// Every field a refine-search submission may carry.
///
/// Facets accept ids or canonical names; when both are present the ids win.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    pub skills: Vec<i64>,
    pub skill_names: Vec<String>,
    pub locations: Vec<i64>,
    pub location_names: Vec<String>,
    pub states: Vec<i64>,
    pub state_names: Vec<String>,
    pub industries: Vec<i64>,
    pub industry_names: Vec<String>,
    pub qualifications: Vec<i64>,
    pub qualification_names: Vec<String>,
    pub functional_areas: Vec<i64>,
    pub functional_area_names: Vec<String>,
    pub experience_min: Option<i32>,
    pub experience_max: Option<i32>,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub job_type: Option<JobType>,
    pub walkin: Option<WalkinWindow>,
}

impl SearchRequest {
    /// Walk-in jobs are only listed when asked for, by type or by date window.
    pub fn wants_walkins(&self) -> bool {
        self.job_type == Some(JobType::WalkIn) || self.walkin.is_some()
    }
}

/// Walk-in interview window: an explicit date pair or a named preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WalkinWindow {
    ThisWeek,
    NextWeek,
    ThisMonth,
    Range { from: NaiveDate, to: NaiveDate },
}

impl WalkinWindow {
    /// Concrete inclusive date range. Weeks run Monday to Sunday.
    pub fn resolve(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let monday = today - Days::new(u64::from(today.weekday().num_days_from_monday()));
        match *self {
            WalkinWindow::ThisWeek => (monday, monday + Days::new(6)),
            WalkinWindow::NextWeek => (monday + Days::new(7), monday + Days::new(13)),
            WalkinWindow::ThisMonth => {
                let first = today - Days::new(u64::from(today.day0()));
                let last = first + Months::new(1) - Days::new(1);
                (first, last)
            }
            WalkinWindow::Range { from, to } if from <= to => (from, to),
            WalkinWindow::Range { from, to } => (to, from),
        }
    }
}
