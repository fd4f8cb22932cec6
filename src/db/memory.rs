use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use super::{ProjectFilter, StoppedSession, Store};
use crate::error::{StudioError, StudioResult};
use crate::models::{
    AdminUser, Client, Contact, ContactForm, EntryStatus, FinanceEntry, ImageDraft, Job,
    JobListing, JobStatus, PageView, PaymentStatus, PortfolioCategory, PortfolioImage,
    PortfolioProject, ProjectWithImages, TimeSession,
};
use crate::services::{jobs, time_tracker};

#[derive(Default)]
struct Tables {
    next_id: i32,
    clients: Vec<Client>,
    jobs: Vec<Job>,
    sessions: Vec<TimeSession>,
    finance: Vec<FinanceEntry>,
    categories: Vec<PortfolioCategory>,
    projects: Vec<PortfolioProject>,
    images: Vec<PortfolioImage>,
    page_views: Vec<PageView>,
    contacts: Vec<Contact>,
    admins: Vec<AdminUser>,
}

impl Tables {
    fn id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn job_mut(&mut self, id: i32) -> StudioResult<&mut Job> {
        self.jobs
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or_else(|| StudioError::not_found("job", id))
    }

    fn entry_for_job(&mut self, job_id: i32) -> Option<&mut FinanceEntry> {
        self.finance.iter_mut().find(|e| e.job_id == Some(job_id))
    }

    fn insert_entry(&mut self, entry: &FinanceEntry) -> StudioResult<FinanceEntry> {
        if let Some(job_id) = entry.job_id {
            if self.finance.iter().any(|e| e.job_id == Some(job_id)) {
                return Err(StudioError::validation("this job already has a financial entry"));
            }
        }
        let now = Utc::now();
        let mut created = entry.clone();
        created.id = self.id();
        created.created_at = now;
        created.updated_at = now;
        self.finance.push(created.clone());
        Ok(created)
    }

    fn slug_taken(&self, slug: &str, except: i32) -> bool {
        self.categories
            .iter()
            .any(|c| c.slug == slug && c.id != except)
    }

    fn with_images(&self, project: &PortfolioProject) -> ProjectWithImages {
        let mut images: Vec<PortfolioImage> = self
            .images
            .iter()
            .filter(|i| i.project_id == project.id)
            .cloned()
            .collect();
        images.sort_by_key(|i| (i.position, i.id));

        ProjectWithImages {
            project: project.clone(),
            category_name: project.category_id.and_then(|cid| {
                self.categories
                    .iter()
                    .find(|c| c.id == cid)
                    .map(|c| c.name.clone())
            }),
            images,
        }
    }
}

/// In-process store with the same rules as the PostgreSQL schema.
///
/// Every operation runs under one lock, so multi-row writes are atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn load_clients(&self) -> StudioResult<Vec<Client>> {
        let mut clients = self.tables().clients.clone();
        clients.sort_by(|a, b| a.company_name.cmp(&b.company_name));
        Ok(clients)
    }

    async fn get_client(&self, id: i32) -> StudioResult<Client> {
        self.tables()
            .clients
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| StudioError::not_found("client", id))
    }

    async fn create_client(&self, client: &Client) -> StudioResult<i32> {
        let mut tables = self.tables();
        let mut created = client.clone();
        created.id = tables.id();
        created.created_at = Utc::now();
        created.updated_at = created.created_at;
        tables.clients.push(created);
        Ok(tables.next_id)
    }

    async fn update_client(&self, client: &Client) -> StudioResult<()> {
        let mut tables = self.tables();
        let existing = tables
            .clients
            .iter_mut()
            .find(|c| c.id == client.id)
            .ok_or_else(|| StudioError::not_found("client", client.id))?;
        let created_at = existing.created_at;
        *existing = client.clone();
        existing.created_at = created_at;
        existing.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_client(&self, id: i32) -> StudioResult<()> {
        let mut tables = self.tables();
        tables.clients.retain(|c| c.id != id);
        for job in tables.jobs.iter_mut().filter(|j| j.client_id == Some(id)) {
            job.client_id = None;
        }
        Ok(())
    }

    async fn count_clients(&self) -> StudioResult<i64> {
        Ok(self.tables().clients.len() as i64)
    }

    async fn load_jobs(&self) -> StudioResult<Vec<JobListing>> {
        let tables = self.tables();
        let mut listings: Vec<JobListing> = tables
            .jobs
            .iter()
            .map(|job| JobListing {
                client_name: job.client_id.and_then(|cid| {
                    tables
                        .clients
                        .iter()
                        .find(|c| c.id == cid)
                        .map(|c| c.company_name.clone())
                }),
                job: job.clone(),
            })
            .collect();
        listings.sort_by(|a, b| {
            b.job
                .created_at
                .cmp(&a.job.created_at)
                .then(b.job.id.cmp(&a.job.id))
        });
        Ok(listings)
    }

    async fn get_job(&self, id: i32) -> StudioResult<Job> {
        self.tables()
            .jobs
            .iter()
            .find(|j| j.id == id)
            .cloned()
            .ok_or_else(|| StudioError::not_found("job", id))
    }

    async fn save_job(&self, job: &Job, today: NaiveDate) -> StudioResult<i32> {
        let mut tables = self.tables();
        let now = Utc::now();

        let saved = if job.id == 0 {
            let mut created = job.clone();
            created.id = tables.id();
            created.total_seconds = 0;
            created.created_at = now;
            created.updated_at = now;
            tables.jobs.push(created.clone());
            created
        } else {
            let existing = tables.job_mut(job.id)?;
            let total_seconds = existing.total_seconds;
            let created_at = existing.created_at;
            *existing = job.clone();
            existing.total_seconds = total_seconds;
            existing.created_at = created_at;
            existing.updated_at = now;
            existing.clone()
        };

        let template = jobs::linked_entry(&saved, today);
        match tables.entry_for_job(saved.id) {
            Some(entry) => {
                entry.amount = template.amount;
                entry.status = template.status;
                entry.description = template.description;
                entry.updated_at = now;
            }
            None => {
                tables.insert_entry(&template)?;
            }
        }

        Ok(saved.id)
    }

    async fn update_job_status(&self, id: i32, status: JobStatus) -> StudioResult<()> {
        let mut tables = self.tables();
        let job = tables.job_mut(id)?;
        job.status = status;
        job.updated_at = Utc::now();
        Ok(())
    }

    async fn set_job_payment_status(
        &self,
        id: i32,
        status: PaymentStatus,
        today: NaiveDate,
    ) -> StudioResult<FinanceEntry> {
        let mut tables = self.tables();
        let job = tables.job_mut(id)?;
        job.payment_status = status;
        job.updated_at = Utc::now();
        let job = job.clone();

        match tables.entry_for_job(id) {
            Some(entry) => {
                entry.status = jobs::finance_status_for(status);
                entry.updated_at = Utc::now();
                Ok(entry.clone())
            }
            None => tables.insert_entry(&jobs::linked_entry(&job, today)),
        }
    }

    async fn delete_job(&self, id: i32) -> StudioResult<()> {
        let mut tables = self.tables();
        tables.jobs.retain(|j| j.id != id);
        tables.sessions.retain(|s| s.job_id != id);
        if let Some(entry) = tables.entry_for_job(id) {
            entry.job_id = None;
        }
        Ok(())
    }

    async fn open_session(&self, job_id: i32) -> StudioResult<Option<TimeSession>> {
        Ok(self
            .tables()
            .sessions
            .iter()
            .find(|s| s.job_id == job_id && s.is_open())
            .cloned())
    }

    async fn start_session(&self, job_id: i32, at: DateTime<Utc>) -> StudioResult<TimeSession> {
        let mut tables = self.tables();
        tables.job_mut(job_id)?;
        if tables.sessions.iter().any(|s| s.job_id == job_id && s.is_open()) {
            return Err(StudioError::SessionAlreadyOpen(job_id));
        }

        let session = TimeSession {
            id: tables.id(),
            job_id,
            started_at: at,
            ended_at: None,
            duration_seconds: None,
            note: None,
            created_at: Utc::now(),
        };
        tables.sessions.push(session.clone());
        Ok(session)
    }

    async fn stop_session(
        &self,
        job_id: i32,
        at: DateTime<Utc>,
    ) -> StudioResult<Option<StoppedSession>> {
        let mut tables = self.tables();
        let Some(open) = tables
            .sessions
            .iter_mut()
            .find(|s| s.job_id == job_id && s.is_open())
        else {
            return Ok(None);
        };

        open.ended_at = Some(at);
        open.duration_seconds = Some(time_tracker::session_duration(open.started_at, at));
        let session = open.clone();

        let closed: Vec<TimeSession> = tables
            .sessions
            .iter()
            .filter(|s| s.job_id == job_id)
            .cloned()
            .collect();
        let total = time_tracker::reconcile_total(&closed);
        let job = tables.job_mut(job_id)?;
        job.total_seconds = total;
        job.updated_at = Utc::now();

        Ok(Some(StoppedSession {
            session,
            job_total_seconds: total,
        }))
    }

    async fn load_sessions(&self, job_id: i32) -> StudioResult<Vec<TimeSession>> {
        let mut sessions: Vec<TimeSession> = self
            .tables()
            .sessions
            .iter()
            .filter(|s| s.job_id == job_id)
            .cloned()
            .collect();
        sessions.sort_by_key(|s| s.started_at);
        Ok(sessions)
    }

    async fn load_finance(&self) -> StudioResult<Vec<FinanceEntry>> {
        let mut entries = self.tables().finance.clone();
        // Dated entries newest first, undated at the end
        entries.sort_by(|a, b| match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => y.cmp(&x).then(b.created_at.cmp(&a.created_at)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => b.created_at.cmp(&a.created_at),
        });
        Ok(entries)
    }

    async fn get_finance_entry(&self, id: i32) -> StudioResult<FinanceEntry> {
        self.tables()
            .finance
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| StudioError::not_found("finance entry", id))
    }

    async fn create_finance_entry(&self, entry: &FinanceEntry) -> StudioResult<i32> {
        Ok(self.tables().insert_entry(entry)?.id)
    }

    async fn update_finance_entry(&self, entry: &FinanceEntry) -> StudioResult<()> {
        let mut tables = self.tables();
        if let Some(job_id) = entry.job_id {
            if tables
                .finance
                .iter()
                .any(|e| e.job_id == Some(job_id) && e.id != entry.id)
            {
                return Err(StudioError::validation("this job already has a financial entry"));
            }
        }
        let existing = tables
            .finance
            .iter_mut()
            .find(|e| e.id == entry.id)
            .ok_or_else(|| StudioError::not_found("finance entry", entry.id))?;
        let created_at = existing.created_at;
        *existing = entry.clone();
        existing.created_at = created_at;
        existing.updated_at = Utc::now();
        Ok(())
    }

    async fn update_finance_status(&self, id: i32, status: EntryStatus) -> StudioResult<()> {
        let mut tables = self.tables();
        let entry = tables
            .finance
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| StudioError::not_found("finance entry", id))?;
        entry.status = status;
        entry.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_finance_entry(&self, id: i32) -> StudioResult<()> {
        self.tables().finance.retain(|e| e.id != id);
        Ok(())
    }

    async fn load_categories(&self) -> StudioResult<Vec<PortfolioCategory>> {
        let mut categories = self.tables().categories.clone();
        categories.sort_by_key(|c| (c.position, c.id));
        Ok(categories)
    }

    async fn category_by_slug(&self, slug: &str) -> StudioResult<Option<PortfolioCategory>> {
        Ok(self
            .tables()
            .categories
            .iter()
            .find(|c| c.slug == slug)
            .cloned())
    }

    async fn create_category(&self, category: &PortfolioCategory) -> StudioResult<i32> {
        let mut tables = self.tables();
        if tables.slug_taken(&category.slug, 0) {
            return Err(StudioError::validation(format!(
                "slug {:?} is already in use",
                category.slug
            )));
        }
        let mut created = category.clone();
        created.id = tables.id();
        created.created_at = Utc::now();
        tables.categories.push(created);
        Ok(tables.next_id)
    }

    async fn update_category(&self, category: &PortfolioCategory) -> StudioResult<()> {
        let mut tables = self.tables();
        if tables.slug_taken(&category.slug, category.id) {
            return Err(StudioError::validation(format!(
                "slug {:?} is already in use",
                category.slug
            )));
        }
        let existing = tables
            .categories
            .iter_mut()
            .find(|c| c.id == category.id)
            .ok_or_else(|| StudioError::not_found("category", category.id))?;
        let created_at = existing.created_at;
        *existing = category.clone();
        existing.created_at = created_at;
        Ok(())
    }

    async fn delete_category(&self, id: i32) -> StudioResult<()> {
        let mut tables = self.tables();
        tables.categories.retain(|c| c.id != id);
        for project in tables
            .projects
            .iter_mut()
            .filter(|p| p.category_id == Some(id))
        {
            project.category_id = None;
        }
        Ok(())
    }

    async fn load_projects(&self, filter: ProjectFilter) -> StudioResult<Vec<ProjectWithImages>> {
        let tables = self.tables();
        let mut projects: Vec<&PortfolioProject> = tables
            .projects
            .iter()
            .filter(|p| !filter.published_only || p.published)
            .filter(|p| filter.category_id.is_none() || p.category_id == filter.category_id)
            .collect();
        projects.sort_by_key(|p| (p.position, p.id));
        Ok(projects.into_iter().map(|p| tables.with_images(p)).collect())
    }

    async fn get_project(
        &self,
        id: i32,
        published_only: bool,
    ) -> StudioResult<Option<ProjectWithImages>> {
        let tables = self.tables();
        Ok(tables
            .projects
            .iter()
            .find(|p| p.id == id && (!published_only || p.published))
            .map(|p| tables.with_images(p)))
    }

    async fn save_project(
        &self,
        project: &PortfolioProject,
        images: &[ImageDraft],
    ) -> StudioResult<i32> {
        let mut tables = self.tables();
        let now = Utc::now();

        let project_id = if project.id == 0 {
            let mut created = project.clone();
            created.id = tables.id();
            created.created_at = now;
            created.updated_at = now;
            tables.projects.push(created);
            tables.next_id
        } else {
            let existing = tables
                .projects
                .iter_mut()
                .find(|p| p.id == project.id)
                .ok_or_else(|| StudioError::not_found("project", project.id))?;
            let created_at = existing.created_at;
            *existing = project.clone();
            existing.created_at = created_at;
            existing.updated_at = now;
            project.id
        };

        tables.images.retain(|i| i.project_id != project_id);
        for (position, draft) in images.iter().enumerate() {
            let image = PortfolioImage {
                id: tables.id(),
                project_id,
                url: draft.url.clone(),
                title: draft.title.clone(),
                position: position as i32,
                created_at: now,
            };
            tables.images.push(image);
        }

        Ok(project_id)
    }

    async fn delete_project(&self, id: i32) -> StudioResult<()> {
        let mut tables = self.tables();
        tables.projects.retain(|p| p.id != id);
        tables.images.retain(|i| i.project_id != id);
        Ok(())
    }

    async fn record_page_view(
        &self,
        path: &str,
        user_agent: Option<&str>,
        ip: Option<&str>,
    ) -> StudioResult<()> {
        let mut tables = self.tables();
        let view = PageView {
            id: tables.id(),
            created_at: Utc::now(),
            path: path.to_string(),
            user_agent: user_agent.map(str::to_string),
            ip: ip.map(str::to_string),
        };
        tables.page_views.push(view);
        Ok(())
    }

    async fn count_page_views(&self) -> StudioResult<i64> {
        Ok(self.tables().page_views.len() as i64)
    }

    async fn page_views_since(&self, since: DateTime<Utc>) -> StudioResult<Vec<PageView>> {
        let mut views: Vec<PageView> = self
            .tables()
            .page_views
            .iter()
            .filter(|v| v.created_at >= since)
            .cloned()
            .collect();
        views.sort_by_key(|v| v.created_at);
        Ok(views)
    }

    async fn page_view_paths(&self) -> StudioResult<Vec<String>> {
        Ok(self
            .tables()
            .page_views
            .iter()
            .map(|v| v.path.clone())
            .collect())
    }

    async fn create_contact(&self, form: &ContactForm) -> StudioResult<i32> {
        let mut tables = self.tables();
        let contact = Contact {
            id: tables.id(),
            created_at: Utc::now(),
            name: form.name.clone(),
            email: form.email.clone(),
            message: form.message.clone(),
            read: false,
        };
        tables.contacts.push(contact);
        Ok(tables.next_id)
    }

    async fn load_contacts(&self) -> StudioResult<Vec<Contact>> {
        let mut contacts = self.tables().contacts.clone();
        contacts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(contacts)
    }

    async fn set_contact_read(&self, id: i32, read: bool) -> StudioResult<()> {
        let mut tables = self.tables();
        let contact = tables
            .contacts
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StudioError::not_found("contact", id))?;
        contact.read = read;
        Ok(())
    }

    async fn delete_contact(&self, id: i32) -> StudioResult<()> {
        self.tables().contacts.retain(|c| c.id != id);
        Ok(())
    }

    async fn find_admin(&self, email: &str) -> StudioResult<Option<AdminUser>> {
        Ok(self
            .tables()
            .admins
            .iter()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn upsert_admin(&self, email: &str, password_hash: &str) -> StudioResult<i32> {
        let mut tables = self.tables();
        if let Some(existing) = tables.admins.iter_mut().find(|a| a.email == email) {
            existing.password_hash = password_hash.to_string();
            return Ok(existing.id);
        }
        let user = AdminUser {
            id: tables.id(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        let id = user.id;
        tables.admins.push(user);
        Ok(id)
    }

    async fn update_admin_password(&self, id: i32, password_hash: &str) -> StudioResult<()> {
        let mut tables = self.tables();
        let user = tables
            .admins
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StudioError::not_found("admin user", id))?;
        user.password_hash = password_hash.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntryKind;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, 5).unwrap()
    }

    async fn job_with_value(store: &MemoryStore, value: f64) -> i32 {
        let mut job = Job::new();
        job.title = "Wedding shoot".to_string();
        job.value = value;
        store.save_job(&job, today()).await.unwrap()
    }

    async fn linked_entry(store: &MemoryStore, job_id: i32) -> FinanceEntry {
        store
            .load_finance()
            .await
            .unwrap()
            .into_iter()
            .find(|e| e.job_id == Some(job_id))
            .unwrap()
    }

    #[tokio::test]
    async fn saving_a_job_creates_one_linked_income_entry() {
        let store = MemoryStore::new();
        let job_id = job_with_value(&store, 1500.0).await;

        let entry = linked_entry(&store, job_id).await;
        assert_eq!(entry.kind, EntryKind::Income);
        assert_eq!(entry.description, "Job: Wedding shoot");
        assert_eq!(entry.amount, 1500.0);
        assert_eq!(entry.status, EntryStatus::Receivable);
        assert_eq!(entry.due_date, Some(today()));

        let mut job = store.get_job(job_id).await.unwrap();
        job.value = 1800.0;
        job.title = "Wedding album".to_string();
        store.save_job(&job, today() + Duration::days(3)).await.unwrap();

        let entries = store.load_finance().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].amount, 1800.0);
        assert_eq!(entries[0].description, "Job: Wedding album");
        assert_eq!(entries[0].due_date, Some(today()));
    }

    #[tokio::test]
    async fn payment_toggle_touches_a_single_entry() {
        let store = MemoryStore::new();
        let job_id = job_with_value(&store, 900.0).await;

        let entry = store
            .set_job_payment_status(job_id, PaymentStatus::Paid, today())
            .await
            .unwrap();
        assert_eq!(entry.status, EntryStatus::Paid);
        let entry = store
            .set_job_payment_status(job_id, PaymentStatus::Pending, today())
            .await
            .unwrap();
        assert_eq!(entry.status, EntryStatus::Receivable);

        assert_eq!(store.load_finance().await.unwrap().len(), 1);
        let job = store.get_job(job_id).await.unwrap();
        assert_eq!(job.payment_status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn payment_toggle_recreates_a_deleted_entry() {
        let store = MemoryStore::new();
        let job_id = job_with_value(&store, 300.0).await;
        let entry = linked_entry(&store, job_id).await;
        store.delete_finance_entry(entry.id).await.unwrap();

        let entry = store
            .set_job_payment_status(job_id, PaymentStatus::Paid, today())
            .await
            .unwrap();
        assert_eq!(entry.job_id, Some(job_id));
        assert_eq!(entry.status, EntryStatus::Paid);
        assert_eq!(store.load_finance().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn second_open_session_is_rejected() {
        let store = MemoryStore::new();
        let job_id = job_with_value(&store, 0.0).await;
        let at = Utc::now();

        store.start_session(job_id, at).await.unwrap();
        let err = store.start_session(job_id, at).await.unwrap_err();
        assert!(matches!(err, StudioError::SessionAlreadyOpen(id) if id == job_id));
    }

    #[tokio::test]
    async fn stopping_rewrites_total_from_closed_sessions() {
        let store = MemoryStore::new();
        let job_id = job_with_value(&store, 0.0).await;
        let start = Utc::now() - Duration::hours(2);

        store.start_session(job_id, start).await.unwrap();
        let first = store
            .stop_session(job_id, start + Duration::milliseconds(90_900))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.session.duration_seconds, Some(90));
        assert_eq!(first.job_total_seconds, 90);

        let again = start + Duration::minutes(10);
        store.start_session(job_id, again).await.unwrap();
        let second = store
            .stop_session(job_id, again + Duration::seconds(30))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.job_total_seconds, 120);
        assert_eq!(store.get_job(job_id).await.unwrap().total_seconds, 120);

        assert!(store.stop_session(job_id, Utc::now()).await.unwrap().is_none());
        assert_eq!(store.load_sessions(job_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn saving_a_job_keeps_its_tracked_total() {
        let store = MemoryStore::new();
        let job_id = job_with_value(&store, 0.0).await;
        let start = Utc::now();
        store.start_session(job_id, start).await.unwrap();
        store
            .stop_session(job_id, start + Duration::seconds(45))
            .await
            .unwrap();

        let mut job = store.get_job(job_id).await.unwrap();
        job.total_seconds = 0;
        store.save_job(&job, today()).await.unwrap();
        assert_eq!(store.get_job(job_id).await.unwrap().total_seconds, 45);
    }

    #[tokio::test]
    async fn deleting_a_job_drops_sessions_and_detaches_entry() {
        let store = MemoryStore::new();
        let job_id = job_with_value(&store, 100.0).await;
        store.start_session(job_id, Utc::now()).await.unwrap();

        store.delete_job(job_id).await.unwrap();
        assert!(store.load_sessions(job_id).await.unwrap().is_empty());
        let entries = store.load_finance().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].job_id, None);
    }

    #[tokio::test]
    async fn finance_listing_puts_undated_entries_last() {
        let store = MemoryStore::new();
        let mut undated = FinanceEntry::new(EntryKind::Expense);
        undated.description = "Rent".to_string();
        store.create_finance_entry(&undated).await.unwrap();
        for day in [3, 20, 11] {
            let mut entry = FinanceEntry::new(EntryKind::Income);
            entry.due_date = NaiveDate::from_ymd_opt(2024, 10, day);
            store.create_finance_entry(&entry).await.unwrap();
        }

        let dates: Vec<Option<NaiveDate>> = store
            .load_finance()
            .await
            .unwrap()
            .iter()
            .map(|e| e.due_date)
            .collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 10, 20),
                NaiveDate::from_ymd_opt(2024, 10, 11),
                NaiveDate::from_ymd_opt(2024, 10, 3),
                None,
            ]
        );
    }

    #[tokio::test]
    async fn project_images_are_replaced_and_renumbered() {
        let store = MemoryStore::new();
        let mut project = PortfolioProject::new();
        project.title = "Casa Azul".to_string();
        let drafts: Vec<ImageDraft> = ["a.jpg", "b.jpg", "c.jpg"]
            .iter()
            .map(|url| ImageDraft {
                url: url.to_string(),
                title: None,
            })
            .collect();
        let id = store.save_project(&project, &drafts).await.unwrap();

        let mut saved = store.get_project(id, false).await.unwrap().unwrap();
        assert_eq!(saved.images.len(), 3);
        saved.project.published = true;
        let reordered = vec![drafts[2].clone(), drafts[0].clone()];
        store.save_project(&saved.project, &reordered).await.unwrap();

        let saved = store.get_project(id, true).await.unwrap().unwrap();
        let positions: Vec<(String, i32)> = saved
            .images
            .iter()
            .map(|i| (i.url.clone(), i.position))
            .collect();
        assert_eq!(
            positions,
            vec![("c.jpg".to_string(), 0), ("a.jpg".to_string(), 1)]
        );
    }

    #[tokio::test]
    async fn drafts_stay_off_published_queries() {
        let store = MemoryStore::new();
        let mut project = PortfolioProject::new();
        project.title = "Draft".to_string();
        let id = store.save_project(&project, &[]).await.unwrap();

        assert!(store.get_project(id, true).await.unwrap().is_none());
        assert!(store.load_projects(ProjectFilter::published()).await.unwrap().is_empty());
        assert_eq!(store.load_projects(ProjectFilter::all()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_category_slug_is_a_validation_error() {
        let store = MemoryStore::new();
        let mut category = PortfolioCategory::new(1);
        category.name = "Weddings".to_string();
        category.slug = "weddings".to_string();
        store.create_category(&category).await.unwrap();

        let err = store.create_category(&category).await.unwrap_err();
        assert!(matches!(err, StudioError::Validation(_)));
    }

    #[tokio::test]
    async fn upsert_admin_resets_the_hash() {
        let store = MemoryStore::new();
        let id = store.upsert_admin("me@studio.test", "old").await.unwrap();
        let again = store.upsert_admin("me@studio.test", "new").await.unwrap();
        assert_eq!(id, again);
        let admin = store.find_admin("me@studio.test").await.unwrap().unwrap();
        assert_eq!(admin.password_hash, "new");
    }
}
