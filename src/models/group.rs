use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub song_count: i64,
    pub created_at: DateTime<Utc>,
}
