use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for category
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    /// Doubles as the optimistic-concurrency token for edits
    pub updated_at: DateTime<Utc>,
}
