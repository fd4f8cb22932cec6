use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, info};

use super::{ProjectFilter, StoppedSession, Store};
use crate::config::Config;
use crate::error::{StudioError, StudioResult};
use crate::models::{
    AdminUser, Client, Contact, ContactForm, EntryStatus, FinanceEntry, ImageDraft, Job,
    JobListing, JobStatus, PageView, PaymentStatus, PortfolioCategory, PortfolioImage,
    PortfolioProject, ProjectWithImages, TimeSession,
};
use crate::services::{jobs, time_tracker};

const OPEN_SESSION_INDEX: &str = "idx_time_tracking_open_session";
const FINANCE_JOB_KEY: &str = "financeiro_job_id_key";
const CATEGORY_SLUG_KEY: &str = "categorias_portfolio_slug_key";

/// Database connection pool
pub struct Database {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct ProjectRow {
    #[sqlx(flatten)]
    project: PortfolioProject,
    category_name: Option<String>,
}

fn violates(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint() == Some(constraint),
        _ => false,
    }
}

impl Database {
    /// Create a new Database instance with a connection pool
    pub async fn new(config: &Config) -> StudioResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(config.database_url())
            .await?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn migrate(&self) -> StudioResult<()> {
        sqlx::migrate!("./migrations").run(self.get_pool()).await?;
        info!("database migrations applied");
        Ok(())
    }

    async fn attach_images(&self, rows: Vec<ProjectRow>) -> StudioResult<Vec<ProjectWithImages>> {
        let ids: Vec<i32> = rows.iter().map(|r| r.project.id).collect();
        let images = sqlx::query_as::<_, PortfolioImage>(
            "SELECT * FROM imagens_portfolio WHERE project_id = ANY($1) ORDER BY position ASC, id ASC",
        )
        .bind(&ids)
        .fetch_all(self.get_pool())
        .await?;

        let mut by_project: HashMap<i32, Vec<PortfolioImage>> = HashMap::new();
        for image in images {
            by_project.entry(image.project_id).or_default().push(image);
        }

        Ok(rows
            .into_iter()
            .map(|row| ProjectWithImages {
                images: by_project.remove(&row.project.id).unwrap_or_default(),
                category_name: row.category_name,
                project: row.project,
            })
            .collect())
    }

    async fn linked_entry_in(
        tx: &mut Transaction<'_, Postgres>,
        job_id: i32,
    ) -> StudioResult<Option<FinanceEntry>> {
        let entry = sqlx::query_as::<_, FinanceEntry>(
            "SELECT * FROM financeiro WHERE job_id = $1 FOR UPDATE",
        )
        .bind(job_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(entry)
    }

    async fn insert_entry_in(
        tx: &mut Transaction<'_, Postgres>,
        entry: &FinanceEntry,
    ) -> StudioResult<FinanceEntry> {
        let created = sqlx::query_as::<_, FinanceEntry>(
            r#"
            INSERT INTO financeiro (kind, job_id, description, amount, due_date, paid_date, status, category)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(entry.kind.as_str())
        .bind(entry.job_id)
        .bind(&entry.description)
        .bind(entry.amount)
        .bind(entry.due_date)
        .bind(entry.paid_date)
        .bind(entry.status.as_str())
        .bind(&entry.category)
        .fetch_one(&mut **tx)
        .await?;

        Ok(created)
    }
}

#[async_trait]
impl Store for Database {
    // Client operations
    async fn load_clients(&self) -> StudioResult<Vec<Client>> {
        let clients = sqlx::query_as::<_, Client>("SELECT * FROM clients ORDER BY company_name ASC")
            .fetch_all(self.get_pool())
            .await?;

        Ok(clients)
    }

    async fn get_client(&self, id: i32) -> StudioResult<Client> {
        sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
            .bind(id)
            .fetch_optional(self.get_pool())
            .await?
            .ok_or_else(|| StudioError::not_found("client", id))
    }

    async fn create_client(&self, client: &Client) -> StudioResult<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO clients (company_name, tax_id, contact_person, personal_tax_id, birth_date,
                                 address, city, state, email, phone)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(&client.company_name)
        .bind(&client.tax_id)
        .bind(&client.contact_person)
        .bind(&client.personal_tax_id)
        .bind(client.birth_date)
        .bind(&client.address)
        .bind(&client.city)
        .bind(&client.state)
        .bind(&client.email)
        .bind(&client.phone)
        .fetch_one(self.get_pool())
        .await?;

        Ok(id)
    }

    async fn update_client(&self, client: &Client) -> StudioResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE clients
            SET company_name = $1, tax_id = $2, contact_person = $3, personal_tax_id = $4,
                birth_date = $5, address = $6, city = $7, state = $8, email = $9, phone = $10,
                updated_at = now()
            WHERE id = $11
            "#,
        )
        .bind(&client.company_name)
        .bind(&client.tax_id)
        .bind(&client.contact_person)
        .bind(&client.personal_tax_id)
        .bind(client.birth_date)
        .bind(&client.address)
        .bind(&client.city)
        .bind(&client.state)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(client.id)
        .execute(self.get_pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StudioError::not_found("client", client.id));
        }
        Ok(())
    }

    async fn delete_client(&self, id: i32) -> StudioResult<()> {
        sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(())
    }

    async fn count_clients(&self) -> StudioResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM clients")
            .fetch_one(self.get_pool())
            .await?;

        Ok(count)
    }

    // Job operations
    async fn load_jobs(&self) -> StudioResult<Vec<JobListing>> {
        let jobs = sqlx::query_as::<_, JobListing>(
            r#"
            SELECT j.*, c.company_name AS client_name
            FROM jobs j
            LEFT JOIN clients c ON c.id = j.client_id
            ORDER BY j.created_at DESC, j.id DESC
            "#,
        )
        .fetch_all(self.get_pool())
        .await?;

        Ok(jobs)
    }

    async fn get_job(&self, id: i32) -> StudioResult<Job> {
        sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(self.get_pool())
            .await?
            .ok_or_else(|| StudioError::not_found("job", id))
    }

    async fn save_job(&self, job: &Job, today: NaiveDate) -> StudioResult<i32> {
        let mut tx = self.pool.begin().await?;

        let job_id = if job.id == 0 {
            sqlx::query_scalar::<_, i32>(
                r#"
                INSERT INTO jobs (client_id, title, notes, value, quantity, status, payment_status)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id
                "#,
            )
            .bind(job.client_id)
            .bind(&job.title)
            .bind(&job.notes)
            .bind(job.value)
            .bind(job.quantity)
            .bind(job.status.as_str())
            .bind(job.payment_status.as_str())
            .fetch_one(&mut *tx)
            .await?
        } else {
            let result = sqlx::query(
                r#"
                UPDATE jobs
                SET client_id = $1, title = $2, notes = $3, value = $4, quantity = $5,
                    status = $6, payment_status = $7, updated_at = now()
                WHERE id = $8
                "#,
            )
            .bind(job.client_id)
            .bind(&job.title)
            .bind(&job.notes)
            .bind(job.value)
            .bind(job.quantity)
            .bind(job.status.as_str())
            .bind(job.payment_status.as_str())
            .bind(job.id)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(StudioError::not_found("job", job.id));
            }
            job.id
        };

        let mut saved = job.clone();
        saved.id = job_id;
        let template = jobs::linked_entry(&saved, today);

        match Self::linked_entry_in(&mut tx, job_id).await? {
            Some(existing) => {
                sqlx::query(
                    r#"
                    UPDATE financeiro
                    SET amount = $1, status = $2, description = $3, updated_at = now()
                    WHERE id = $4
                    "#,
                )
                .bind(template.amount)
                .bind(template.status.as_str())
                .bind(&template.description)
                .bind(existing.id)
                .execute(&mut *tx)
                .await?;
            }
            None => {
                Self::insert_entry_in(&mut tx, &template).await?;
            }
        }

        tx.commit().await?;
        debug!(job_id, "job saved with linked finance entry");

        Ok(job_id)
    }

    async fn update_job_status(&self, id: i32, status: JobStatus) -> StudioResult<()> {
        let result = sqlx::query("UPDATE jobs SET status = $1, updated_at = now() WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(self.get_pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StudioError::not_found("job", id));
        }
        Ok(())
    }

    async fn set_job_payment_status(
        &self,
        id: i32,
        status: PaymentStatus,
        today: NaiveDate,
    ) -> StudioResult<FinanceEntry> {
        let mut tx = self.pool.begin().await?;

        let job = sqlx::query_as::<_, Job>(
            "UPDATE jobs SET payment_status = $1, updated_at = now() WHERE id = $2 RETURNING *",
        )
        .bind(status.as_str())
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StudioError::not_found("job", id))?;

        let entry_status = jobs::finance_status_for(status);
        let entry = match Self::linked_entry_in(&mut tx, id).await? {
            Some(existing) => {
                sqlx::query_as::<_, FinanceEntry>(
                    "UPDATE financeiro SET status = $1, updated_at = now() WHERE id = $2 RETURNING *",
                )
                .bind(entry_status.as_str())
                .bind(existing.id)
                .fetch_one(&mut *tx)
                .await?
            }
            None => Self::insert_entry_in(&mut tx, &jobs::linked_entry(&job, today)).await?,
        };

        tx.commit().await?;

        Ok(entry)
    }

    async fn delete_job(&self, id: i32) -> StudioResult<()> {
        sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(())
    }

    // Time tracking operations
    async fn open_session(&self, job_id: i32) -> StudioResult<Option<TimeSession>> {
        let session = sqlx::query_as::<_, TimeSession>(
            "SELECT * FROM time_tracking WHERE job_id = $1 AND ended_at IS NULL",
        )
        .bind(job_id)
        .fetch_optional(self.get_pool())
        .await?;

        Ok(session)
    }

    async fn start_session(&self, job_id: i32, at: DateTime<Utc>) -> StudioResult<TimeSession> {
        let mut tx = self.pool.begin().await?;

        // Row lock on the job serializes concurrent starts
        sqlx::query_scalar::<_, i32>("SELECT id FROM jobs WHERE id = $1 FOR UPDATE")
            .bind(job_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StudioError::not_found("job", job_id))?;

        let session = sqlx::query_as::<_, TimeSession>(
            "INSERT INTO time_tracking (job_id, started_at) VALUES ($1, $2) RETURNING *",
        )
        .bind(job_id)
        .bind(at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| {
            if violates(&err, OPEN_SESSION_INDEX) {
                StudioError::SessionAlreadyOpen(job_id)
            } else {
                StudioError::from(err)
            }
        })?;

        tx.commit().await?;

        Ok(session)
    }

    async fn stop_session(
        &self,
        job_id: i32,
        at: DateTime<Utc>,
    ) -> StudioResult<Option<StoppedSession>> {
        let mut tx = self.pool.begin().await?;

        let open = sqlx::query_as::<_, TimeSession>(
            "SELECT * FROM time_tracking WHERE job_id = $1 AND ended_at IS NULL FOR UPDATE",
        )
        .bind(job_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(open) = open else {
            return Ok(None);
        };

        let duration = time_tracker::session_duration(open.started_at, at);
        let session = sqlx::query_as::<_, TimeSession>(
            "UPDATE time_tracking SET ended_at = $1, duration_seconds = $2 WHERE id = $3 RETURNING *",
        )
        .bind(at)
        .bind(duration)
        .bind(open.id)
        .fetch_one(&mut *tx)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(duration_seconds), 0)::BIGINT
            FROM time_tracking
            WHERE job_id = $1 AND duration_seconds IS NOT NULL
            "#,
        )
        .bind(job_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE jobs SET total_seconds = $1, updated_at = now() WHERE id = $2")
            .bind(total)
            .bind(job_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(StoppedSession {
            session,
            job_total_seconds: total,
        }))
    }

    async fn load_sessions(&self, job_id: i32) -> StudioResult<Vec<TimeSession>> {
        let sessions = sqlx::query_as::<_, TimeSession>(
            "SELECT * FROM time_tracking WHERE job_id = $1 ORDER BY started_at ASC",
        )
        .bind(job_id)
        .fetch_all(self.get_pool())
        .await?;

        Ok(sessions)
    }

    // Finance operations
    async fn load_finance(&self) -> StudioResult<Vec<FinanceEntry>> {
        let entries = sqlx::query_as::<_, FinanceEntry>(
            "SELECT * FROM financeiro ORDER BY due_date DESC NULLS LAST, created_at DESC",
        )
        .fetch_all(self.get_pool())
        .await?;

        Ok(entries)
    }

    async fn get_finance_entry(&self, id: i32) -> StudioResult<FinanceEntry> {
        sqlx::query_as::<_, FinanceEntry>("SELECT * FROM financeiro WHERE id = $1")
            .bind(id)
            .fetch_optional(self.get_pool())
            .await?
            .ok_or_else(|| StudioError::not_found("finance entry", id))
    }

    async fn create_finance_entry(&self, entry: &FinanceEntry) -> StudioResult<i32> {
        let mut tx = self.pool.begin().await?;
        let created = Self::insert_entry_in(&mut tx, entry).await.map_err(|err| match err {
            StudioError::Database(db) if violates(&db, FINANCE_JOB_KEY) => {
                StudioError::validation("this job already has a financial entry")
            }
            other => other,
        })?;
        tx.commit().await?;

        Ok(created.id)
    }

    async fn update_finance_entry(&self, entry: &FinanceEntry) -> StudioResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE financeiro
            SET kind = $1, job_id = $2, description = $3, amount = $4, due_date = $5,
                paid_date = $6, status = $7, category = $8, updated_at = now()
            WHERE id = $9
            "#,
        )
        .bind(entry.kind.as_str())
        .bind(entry.job_id)
        .bind(&entry.description)
        .bind(entry.amount)
        .bind(entry.due_date)
        .bind(entry.paid_date)
        .bind(entry.status.as_str())
        .bind(&entry.category)
        .bind(entry.id)
        .execute(self.get_pool())
        .await
        .map_err(|err| {
            if violates(&err, FINANCE_JOB_KEY) {
                StudioError::validation("this job already has a financial entry")
            } else {
                StudioError::from(err)
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(StudioError::not_found("finance entry", entry.id));
        }
        Ok(())
    }

    async fn update_finance_status(&self, id: i32, status: EntryStatus) -> StudioResult<()> {
        let result =
            sqlx::query("UPDATE financeiro SET status = $1, updated_at = now() WHERE id = $2")
                .bind(status.as_str())
                .bind(id)
                .execute(self.get_pool())
                .await?;

        if result.rows_affected() == 0 {
            return Err(StudioError::not_found("finance entry", id));
        }
        Ok(())
    }

    async fn delete_finance_entry(&self, id: i32) -> StudioResult<()> {
        sqlx::query("DELETE FROM financeiro WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(())
    }

    // Portfolio operations
    async fn load_categories(&self) -> StudioResult<Vec<PortfolioCategory>> {
        let categories = sqlx::query_as::<_, PortfolioCategory>(
            "SELECT * FROM categorias_portfolio ORDER BY position ASC, id ASC",
        )
        .fetch_all(self.get_pool())
        .await?;

        Ok(categories)
    }

    async fn category_by_slug(&self, slug: &str) -> StudioResult<Option<PortfolioCategory>> {
        let category =
            sqlx::query_as::<_, PortfolioCategory>("SELECT * FROM categorias_portfolio WHERE slug = $1")
                .bind(slug)
                .fetch_optional(self.get_pool())
                .await?;

        Ok(category)
    }

    async fn create_category(&self, category: &PortfolioCategory) -> StudioResult<i32> {
        sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO categorias_portfolio (name, slug, position, active)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&category.name)
        .bind(&category.slug)
        .bind(category.position)
        .bind(category.active)
        .fetch_one(self.get_pool())
        .await
        .map_err(|err| {
            if violates(&err, CATEGORY_SLUG_KEY) {
                StudioError::validation(format!("slug {:?} is already in use", category.slug))
            } else {
                StudioError::from(err)
            }
        })
    }

    async fn update_category(&self, category: &PortfolioCategory) -> StudioResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE categorias_portfolio
            SET name = $1, slug = $2, position = $3, active = $4
            WHERE id = $5
            "#,
        )
        .bind(&category.name)
        .bind(&category.slug)
        .bind(category.position)
        .bind(category.active)
        .bind(category.id)
        .execute(self.get_pool())
        .await
        .map_err(|err| {
            if violates(&err, CATEGORY_SLUG_KEY) {
                StudioError::validation(format!("slug {:?} is already in use", category.slug))
            } else {
                StudioError::from(err)
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(StudioError::not_found("category", category.id));
        }
        Ok(())
    }

    async fn delete_category(&self, id: i32) -> StudioResult<()> {
        sqlx::query("DELETE FROM categorias_portfolio WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(())
    }

    async fn load_projects(&self, filter: ProjectFilter) -> StudioResult<Vec<ProjectWithImages>> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT p.*, c.name AS category_name
            FROM projetos_portfolio p
            LEFT JOIN categorias_portfolio c ON c.id = p.category_id
            WHERE ($1 = FALSE OR p.published)
              AND ($2::INTEGER IS NULL OR p.category_id = $2)
            ORDER BY p.position ASC, p.id ASC
            "#,
        )
        .bind(filter.published_only)
        .bind(filter.category_id)
        .fetch_all(self.get_pool())
        .await?;

        self.attach_images(rows).await
    }

    async fn get_project(
        &self,
        id: i32,
        published_only: bool,
    ) -> StudioResult<Option<ProjectWithImages>> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT p.*, c.name AS category_name
            FROM projetos_portfolio p
            LEFT JOIN categorias_portfolio c ON c.id = p.category_id
            WHERE p.id = $1 AND ($2 = FALSE OR p.published)
            "#,
        )
        .bind(id)
        .bind(published_only)
        .fetch_optional(self.get_pool())
        .await?;

        match row {
            Some(row) => Ok(self.attach_images(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn save_project(
        &self,
        project: &PortfolioProject,
        images: &[ImageDraft],
    ) -> StudioResult<i32> {
        let mut tx = self.pool.begin().await?;

        let project_id = if project.id == 0 {
            sqlx::query_scalar::<_, i32>(
                r#"
                INSERT INTO projetos_portfolio (category_id, title, description, client_name,
                                                project_date, position, published)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id
                "#,
            )
            .bind(project.category_id)
            .bind(&project.title)
            .bind(&project.description)
            .bind(&project.client_name)
            .bind(project.project_date)
            .bind(project.position)
            .bind(project.published)
            .fetch_one(&mut *tx)
            .await?
        } else {
            let result = sqlx::query(
                r#"
                UPDATE projetos_portfolio
                SET category_id = $1, title = $2, description = $3, client_name = $4,
                    project_date = $5, position = $6, published = $7, updated_at = now()
                WHERE id = $8
                "#,
            )
            .bind(project.category_id)
            .bind(&project.title)
            .bind(&project.description)
            .bind(&project.client_name)
            .bind(project.project_date)
            .bind(project.position)
            .bind(project.published)
            .bind(project.id)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(StudioError::not_found("project", project.id));
            }
            project.id
        };

        sqlx::query("DELETE FROM imagens_portfolio WHERE project_id = $1")
            .bind(project_id)
            .execute(&mut *tx)
            .await?;

        for (position, image) in images.iter().enumerate() {
            sqlx::query(
                "INSERT INTO imagens_portfolio (project_id, url, title, position) VALUES ($1, $2, $3, $4)",
            )
            .bind(project_id)
            .bind(&image.url)
            .bind(&image.title)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(project_id)
    }

    async fn delete_project(&self, id: i32) -> StudioResult<()> {
        sqlx::query("DELETE FROM projetos_portfolio WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(())
    }

    // Analytics operations
    async fn record_page_view(
        &self,
        path: &str,
        user_agent: Option<&str>,
        ip: Option<&str>,
    ) -> StudioResult<()> {
        sqlx::query("INSERT INTO page_views (path, user_agent, ip) VALUES ($1, $2, $3)")
            .bind(path)
            .bind(user_agent)
            .bind(ip)
            .execute(self.get_pool())
            .await?;

        Ok(())
    }

    async fn count_page_views(&self) -> StudioResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM page_views")
            .fetch_one(self.get_pool())
            .await?;

        Ok(count)
    }

    async fn page_views_since(&self, since: DateTime<Utc>) -> StudioResult<Vec<PageView>> {
        let views = sqlx::query_as::<_, PageView>(
            "SELECT * FROM page_views WHERE created_at >= $1 ORDER BY created_at ASC",
        )
        .bind(since)
        .fetch_all(self.get_pool())
        .await?;

        Ok(views)
    }

    async fn page_view_paths(&self) -> StudioResult<Vec<String>> {
        let paths = sqlx::query_scalar::<_, String>("SELECT path FROM page_views")
            .fetch_all(self.get_pool())
            .await?;

        Ok(paths)
    }

    // Contact operations
    async fn create_contact(&self, form: &ContactForm) -> StudioResult<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO contacts (name, email, message) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&form.name)
        .bind(&form.email)
        .bind(&form.message)
        .fetch_one(self.get_pool())
        .await?;

        Ok(id)
    }

    async fn load_contacts(&self) -> StudioResult<Vec<Contact>> {
        let contacts =
            sqlx::query_as::<_, Contact>("SELECT * FROM contacts ORDER BY created_at DESC, id DESC")
                .fetch_all(self.get_pool())
                .await?;

        Ok(contacts)
    }

    async fn set_contact_read(&self, id: i32, read: bool) -> StudioResult<()> {
        let result = sqlx::query("UPDATE contacts SET read = $1 WHERE id = $2")
            .bind(read)
            .bind(id)
            .execute(self.get_pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StudioError::not_found("contact", id));
        }
        Ok(())
    }

    async fn delete_contact(&self, id: i32) -> StudioResult<()> {
        sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(())
    }

    // Admin account operations
    async fn find_admin(&self, email: &str) -> StudioResult<Option<AdminUser>> {
        let user = sqlx::query_as::<_, AdminUser>("SELECT * FROM admin_users WHERE email = $1")
            .bind(email)
            .fetch_optional(self.get_pool())
            .await?;

        Ok(user)
    }

    async fn upsert_admin(&self, email: &str, password_hash: &str) -> StudioResult<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO admin_users (email, password_hash)
            VALUES ($1, $2)
            ON CONFLICT (email) DO UPDATE SET password_hash = EXCLUDED.password_hash
            RETURNING id
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(self.get_pool())
        .await?;

        Ok(id)
    }

    async fn update_admin_password(&self, id: i32, password_hash: &str) -> StudioResult<()> {
        let result = sqlx::query("UPDATE admin_users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(self.get_pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StudioError::not_found("admin user", id));
        }
        Ok(())
    }
}

/// Connect to PostgreSQL using the configured URL
pub async fn init(config: &Config) -> StudioResult<Database> {
    Database::new(config).await
}
