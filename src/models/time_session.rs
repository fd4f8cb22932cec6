use chrono::{DateTime, Utc};
use serde::Serialize;

/// One start/stop interval on a job. Open while `ended_at` is null.
#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
pub struct TimeSession {
    pub id: i32,
    pub job_id: i32,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_seconds: Option<i64>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TimeSession {
    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }
}
