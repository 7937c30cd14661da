use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Skills, qualifications, industries and functional areas share this shape.
/// Their status column is `Active` / `InActive`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NamedEntityRow {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub status: String,
}

/// Cities and states use `Enabled` / `Disabled`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CityRow {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub status: String,
    pub state_id: i64,
    pub parent_city_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StateRow {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub status: String,
}

pub const STATUS_ACTIVE: &str = "Active";
pub const STATUS_ENABLED: &str = "Enabled";

/// True for the statuses that let a reference record take part in search.
pub fn is_searchable_status(status: &str) -> bool {
    status == STATUS_ACTIVE || status == STATUS_ENABLED
}
