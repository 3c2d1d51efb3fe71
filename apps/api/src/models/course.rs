use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A catalog course. `title` is non-empty; title matching is case-insensitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CourseRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub content: String,
    pub instructor_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl CourseRow {
    /// The `"title: description"` line handed to the oracle as grounding context.
    pub fn summary(&self) -> String {
        format!("{}: {}", self.title, self.description)
    }
}
