use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    InProgress,
    Done,
    Cancelled,
}

text_enum!(JobStatus, "job status", {
    Pending => "pending",
    InProgress => "in_progress",
    Done => "done",
    Cancelled => "cancelled",
});

impl JobStatus {
    pub fn label(&self) -> &'static str {
        match self {
            JobStatus::Pending => "Pending",
            JobStatus::InProgress => "In progress",
            JobStatus::Done => "Done",
            JobStatus::Cancelled => "Cancelled",
        }
    }

    /// Next status in dropdown order, wrapping around.
    pub fn next(&self) -> Self {
        match self {
            JobStatus::Pending => JobStatus::InProgress,
            JobStatus::InProgress => JobStatus::Done,
            JobStatus::Done => JobStatus::Cancelled,
            JobStatus::Cancelled => JobStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

text_enum!(PaymentStatus, "payment status", {
    Pending => "pending",
    Paid => "paid",
});

impl PaymentStatus {
    pub fn toggled(&self) -> Self {
        match self {
            PaymentStatus::Pending => PaymentStatus::Paid,
            PaymentStatus::Paid => PaymentStatus::Pending,
        }
    }
}

#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
pub struct Job {
    pub id: i32,
    pub client_id: Option<i32>,
    pub title: String,
    pub notes: Option<String>,
    pub value: f64,
    pub quantity: i32,
    /// Sum of closed time-tracking sessions, in seconds
    pub total_seconds: i64,
    #[sqlx(try_from = "String")]
    pub status: JobStatus,
    #[sqlx(try_from = "String")]
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            client_id: None,
            title: String::new(),
            notes: None,
            value: 0.0,
            quantity: 1,
            total_seconds: 0,
            status: JobStatus::InProgress,
            payment_status: PaymentStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Default for Job {
    fn default() -> Self {
        Self::new()
    }
}

/// A job row joined with its client's company name
#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
pub struct JobListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub job: Job,
    pub client_name: Option<String>,
}

impl JobListing {
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        self.job.title.to_lowercase().contains(&needle)
            || self
                .client_name
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(&needle))
    }
}
