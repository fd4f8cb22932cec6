//! Data access for every table the studio uses.
//!
//! Screens and handlers talk to a [`Store`]; [`Database`] is the PostgreSQL
//! implementation. Tests run against an in-process `MemoryStore`.

#[cfg(test)]
mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::error::StudioResult;
use crate::models::{
    AdminUser, Client, Contact, ContactForm, FinanceEntry, EntryStatus, ImageDraft, Job,
    JobListing, JobStatus, PageView, PaymentStatus, PortfolioCategory, PortfolioProject,
    ProjectWithImages, TimeSession,
};

#[cfg(test)]
pub use memory::MemoryStore;
pub use postgres::{init, Database};

/// Which projects a portfolio query returns
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectFilter {
    pub published_only: bool,
    pub category_id: Option<i32>,
}

impl ProjectFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn published() -> Self {
        Self {
            published_only: true,
            category_id: None,
        }
    }

    pub fn published_in(category_id: i32) -> Self {
        Self {
            published_only: true,
            category_id: Some(category_id),
        }
    }
}

/// Result of closing a session: the closed row and the job's reconciled total
#[derive(Debug, Clone)]
pub struct StoppedSession {
    pub session: TimeSession,
    pub job_total_seconds: i64,
}

#[async_trait]
pub trait Store: Send + Sync {
    // Client operations
    async fn load_clients(&self) -> StudioResult<Vec<Client>>;
    async fn get_client(&self, id: i32) -> StudioResult<Client>;
    async fn create_client(&self, client: &Client) -> StudioResult<i32>;
    async fn update_client(&self, client: &Client) -> StudioResult<()>;
    async fn delete_client(&self, id: i32) -> StudioResult<()>;
    async fn count_clients(&self) -> StudioResult<i64>;

    // Job operations
    /// Newest first, with the client's company name.
    async fn load_jobs(&self) -> StudioResult<Vec<JobListing>>;
    async fn get_job(&self, id: i32) -> StudioResult<Job>;
    /// Creates (id 0) or updates a job and upserts its linked income entry.
    /// The tracked total is never written here.
    async fn save_job(&self, job: &Job, today: NaiveDate) -> StudioResult<i32>;
    async fn update_job_status(&self, id: i32, status: JobStatus) -> StudioResult<()>;
    /// Sets the payment status and updates or creates the single linked entry.
    async fn set_job_payment_status(
        &self,
        id: i32,
        status: PaymentStatus,
        today: NaiveDate,
    ) -> StudioResult<FinanceEntry>;
    /// Removes the job and its time-tracking rows; a linked entry is detached.
    async fn delete_job(&self, id: i32) -> StudioResult<()>;

    // Time tracking operations
    async fn open_session(&self, job_id: i32) -> StudioResult<Option<TimeSession>>;
    /// Fails with `SessionAlreadyOpen` when the job already has an open session.
    async fn start_session(&self, job_id: i32, at: DateTime<Utc>) -> StudioResult<TimeSession>;
    /// Closes the open session and rewrites the job total. `None` when nothing is open.
    async fn stop_session(
        &self,
        job_id: i32,
        at: DateTime<Utc>,
    ) -> StudioResult<Option<StoppedSession>>;
    async fn load_sessions(&self, job_id: i32) -> StudioResult<Vec<TimeSession>>;

    // Finance operations
    /// Ordered by due date, latest first, undated last.
    async fn load_finance(&self) -> StudioResult<Vec<FinanceEntry>>;
    async fn get_finance_entry(&self, id: i32) -> StudioResult<FinanceEntry>;
    async fn create_finance_entry(&self, entry: &FinanceEntry) -> StudioResult<i32>;
    async fn update_finance_entry(&self, entry: &FinanceEntry) -> StudioResult<()>;
    async fn update_finance_status(&self, id: i32, status: EntryStatus) -> StudioResult<()>;
    async fn delete_finance_entry(&self, id: i32) -> StudioResult<()>;

    // Portfolio operations
    async fn load_categories(&self) -> StudioResult<Vec<PortfolioCategory>>;
    async fn category_by_slug(&self, slug: &str) -> StudioResult<Option<PortfolioCategory>>;
    async fn create_category(&self, category: &PortfolioCategory) -> StudioResult<i32>;
    async fn update_category(&self, category: &PortfolioCategory) -> StudioResult<()>;
    async fn delete_category(&self, id: i32) -> StudioResult<()>;
    async fn load_projects(&self, filter: ProjectFilter) -> StudioResult<Vec<ProjectWithImages>>;
    async fn get_project(
        &self,
        id: i32,
        published_only: bool,
    ) -> StudioResult<Option<ProjectWithImages>>;
    /// Creates or updates a project and replaces its images, renumbered from 0.
    async fn save_project(
        &self,
        project: &PortfolioProject,
        images: &[ImageDraft],
    ) -> StudioResult<i32>;
    async fn delete_project(&self, id: i32) -> StudioResult<()>;

    // Analytics operations
    async fn record_page_view(
        &self,
        path: &str,
        user_agent: Option<&str>,
        ip: Option<&str>,
    ) -> StudioResult<()>;
    async fn count_page_views(&self) -> StudioResult<i64>;
    async fn page_views_since(&self, since: DateTime<Utc>) -> StudioResult<Vec<PageView>>;
    async fn page_view_paths(&self) -> StudioResult<Vec<String>>;

    // Contact operations
    async fn create_contact(&self, form: &ContactForm) -> StudioResult<i32>;
    /// Newest first.
    async fn load_contacts(&self) -> StudioResult<Vec<Contact>>;
    async fn set_contact_read(&self, id: i32, read: bool) -> StudioResult<()>;
    async fn delete_contact(&self, id: i32) -> StudioResult<()>;

    // Admin account operations
    async fn find_admin(&self, email: &str) -> StudioResult<Option<AdminUser>>;
    /// Inserts the account, or resets the password hash when the e-mail exists.
    async fn upsert_admin(&self, email: &str, password_hash: &str) -> StudioResult<i32>;
    async fn update_admin_password(&self, id: i32, password_hash: &str) -> StudioResult<()>;
}
