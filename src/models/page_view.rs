use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
pub struct PageView {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub path: String,
    pub user_agent: Option<String>,
    pub ip: Option<String>,
}
