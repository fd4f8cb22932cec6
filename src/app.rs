//! Terminal back-office state and the actions each screen can trigger.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{error, info, warn};
use tui::{backend::Backend, Frame};

use crate::db::{ProjectFilter, Store};
use crate::error::{StudioError, StudioResult};
use crate::models::{AdminUser, ImageDraft};
use crate::services::time_tracker::TimeTracker;
use crate::services::{analytics, auth, dashboard};
use crate::storage::BlobStore;
use crate::ui::{
    analytics::{render_analytics, AnalyticsAction, AnalyticsState},
    categories::{render_categories, CategoriesState, CategoryAction},
    category_wizard::{render_category_wizard, CategoryWizardAction, CategoryWizardState},
    change_password::{render_change_password, ChangePasswordAction, ChangePasswordState},
    client_wizard::{render_client_wizard, ClientWizardAction, ClientWizardState},
    clients::{render_clients, ClientAction, ClientsState},
    components::{render_notice, Notice},
    dashboard::{render_dashboard, DashboardAction, DashboardState, Section},
    finance::{render_finance, FinanceAction, FinanceState},
    finance_wizard::{render_finance_wizard, FinanceWizardAction, FinanceWizardState},
    job_wizard::{render_job_wizard, JobWizardAction, JobWizardState},
    jobs::{render_jobs, JobAction, JobsState},
    login::{render_login, LoginAction, LoginState},
    messages::{render_messages, MessageAction, MessagesState},
    project_wizard::{render_project_wizard, ProjectWizardAction, ProjectWizardState},
    projects::{render_projects, ProjectAction, ProjectsState},
};
use crate::ui::{
    analytics as analytics_ui, categories, category_wizard, change_password, client_wizard,
    clients, dashboard as dashboard_ui, finance, finance_wizard, job_wizard, jobs, login,
    messages, project_wizard, projects,
};

// Represents the current screen in the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppScreen {
    Login,
    Dashboard,
    Clients,
    ClientWizard,
    Jobs,
    JobWizard,
    Finance,
    FinanceWizard,
    Categories,
    CategoryWizard,
    Projects,
    ProjectWizard,
    Messages,
    Analytics,
    ChangePassword,
}

// Main application state
pub struct App {
    store: Arc<dyn Store>,
    bucket: BlobStore,
    user: Option<AdminUser>,
    screen: AppScreen,
    notice: Option<Notice>,
    should_quit: bool,
    login_state: LoginState,
    dashboard_state: Option<DashboardState>,
    clients_state: Option<ClientsState>,
    client_wizard_state: Option<ClientWizardState>,
    jobs_state: Option<JobsState>,
    job_wizard_state: Option<JobWizardState>,
    finance_state: Option<FinanceState>,
    finance_wizard_state: Option<FinanceWizardState>,
    categories_state: Option<CategoriesState>,
    category_wizard_state: Option<CategoryWizardState>,
    projects_state: Option<ProjectsState>,
    project_wizard_state: Option<ProjectWizardState>,
    messages_state: Option<MessagesState>,
    analytics_state: Option<AnalyticsState>,
    change_password_state: Option<ChangePasswordState>,
}

impl App {
    pub fn new(store: Arc<dyn Store>, bucket: BlobStore) -> Self {
        Self {
            store,
            bucket,
            user: None,
            screen: AppScreen::Login,
            notice: None,
            should_quit: false,
            login_state: LoginState::new(),
            dashboard_state: None,
            clients_state: None,
            client_wizard_state: None,
            jobs_state: None,
            job_wizard_state: None,
            finance_state: None,
            finance_wizard_state: None,
            categories_state: None,
            category_wizard_state: None,
            projects_state: None,
            project_wizard_state: None,
            messages_state: None,
            analytics_state: None,
            change_password_state: None,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Jobs whose timers are still running
    pub fn running_jobs(&self) -> Vec<i32> {
        self.jobs_state
            .as_ref()
            .map(|s| s.running_jobs())
            .unwrap_or_default()
    }

    pub fn tick(&mut self, now: DateTime<Utc>) {
        if let Some(state) = &mut self.jobs_state {
            state.tick(now);
        }
    }

    pub fn render<B: Backend>(&mut self, f: &mut Frame<B>) {
        match self.screen {
            AppScreen::Login => render_login(f, &mut self.login_state),
            AppScreen::Dashboard => {
                if let Some(state) = &mut self.dashboard_state {
                    render_dashboard(f, state);
                }
            }
            AppScreen::Clients => {
                if let Some(state) = &mut self.clients_state {
                    render_clients(f, state);
                }
            }
            AppScreen::ClientWizard => {
                if let Some(state) = &mut self.client_wizard_state {
                    render_client_wizard(f, state);
                }
            }
            AppScreen::Jobs => {
                if let Some(state) = &mut self.jobs_state {
                    render_jobs(f, state);
                }
            }
            AppScreen::JobWizard => {
                if let Some(state) = &mut self.job_wizard_state {
                    render_job_wizard(f, state);
                }
            }
            AppScreen::Finance => {
                if let Some(state) = &mut self.finance_state {
                    render_finance(f, state);
                }
            }
            AppScreen::FinanceWizard => {
                if let Some(state) = &mut self.finance_wizard_state {
                    render_finance_wizard(f, state);
                }
            }
            AppScreen::Categories => {
                if let Some(state) = &mut self.categories_state {
                    render_categories(f, state);
                }
            }
            AppScreen::CategoryWizard => {
                if let Some(state) = &mut self.category_wizard_state {
                    render_category_wizard(f, state);
                }
            }
            AppScreen::Projects => {
                if let Some(state) = &mut self.projects_state {
                    render_projects(f, state);
                }
            }
            AppScreen::ProjectWizard => {
                if let Some(state) = &mut self.project_wizard_state {
                    render_project_wizard(f, state);
                }
            }
            AppScreen::Messages => {
                if let Some(state) = &mut self.messages_state {
                    render_messages(f, state);
                }
            }
            AppScreen::Analytics => {
                if let Some(state) = &mut self.analytics_state {
                    render_analytics(f, state);
                }
            }
            AppScreen::ChangePassword => {
                if let Some(state) = &mut self.change_password_state {
                    render_change_password(f, state);
                }
            }
        }

        if let Some(notice) = &self.notice {
            render_notice(f, notice);
        }
    }

    /// Run one key press. Store failures are shown to the operator and the
    /// current list is refetched so local optimistic changes are undone.
    pub async fn handle_key(&mut self, key: KeyEvent) {
        self.notice = None;
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if let Err(e) = self.dispatch(key).await {
            error!(screen = ?self.screen, error = %e, "back-office action failed");
            self.notice = Some(Notice::Error(e.to_string()));
            if let Err(e) = self.refresh().await {
                warn!(error = %e, "refetch after failure also failed");
            }
        }
    }

    async fn dispatch(&mut self, key: KeyEvent) -> StudioResult<()> {
        match self.screen {
            AppScreen::Login => self.handle_login_screen(key).await,
            AppScreen::Dashboard => self.handle_dashboard_screen(key).await,
            AppScreen::Clients => self.handle_clients_screen(key).await,
            AppScreen::ClientWizard => self.handle_client_wizard_screen(key).await,
            AppScreen::Jobs => self.handle_jobs_screen(key).await,
            AppScreen::JobWizard => self.handle_job_wizard_screen(key).await,
            AppScreen::Finance => self.handle_finance_screen(key).await,
            AppScreen::FinanceWizard => self.handle_finance_wizard_screen(key).await,
            AppScreen::Categories => self.handle_categories_screen(key).await,
            AppScreen::CategoryWizard => self.handle_category_wizard_screen(key).await,
            AppScreen::Projects => self.handle_projects_screen(key).await,
            AppScreen::ProjectWizard => self.handle_project_wizard_screen(key).await,
            AppScreen::Messages => self.handle_messages_screen(key).await,
            AppScreen::Analytics => self.handle_analytics_screen(key).await,
            AppScreen::ChangePassword => self.handle_change_password_screen(key).await,
        }
    }

    /// Full refetch of the list on screen. Wizards keep what was typed.
    async fn refresh(&mut self) -> StudioResult<()> {
        match self.screen {
            AppScreen::Dashboard => self.load_dashboard().await,
            AppScreen::Clients => self.open(Section::Clients).await,
            AppScreen::Jobs => {
                self.load_jobs().await?;
                self.reload_tracker().await
            }
            AppScreen::Finance => self.open(Section::Finance).await,
            AppScreen::Categories => self.open(Section::Categories).await,
            AppScreen::Projects => self.open(Section::Projects).await,
            AppScreen::Messages => self.open(Section::Messages).await,
            AppScreen::Analytics => self.open(Section::Analytics).await,
            _ => Ok(()),
        }
    }

    async fn load_dashboard(&mut self) -> StudioResult<()> {
        let signed_in_as = self
            .user
            .as_ref()
            .map(|u| u.email.clone())
            .unwrap_or_default();
        let dashboard = dashboard::load(self.store.as_ref()).await?;
        self.dashboard_state = Some(DashboardState::new(dashboard, signed_in_as));
        self.screen = AppScreen::Dashboard;
        Ok(())
    }

    /// Reload jobs, keeping the open tracker when the screen already exists.
    async fn load_jobs(&mut self) -> StudioResult<()> {
        let listings = self.store.load_jobs().await?;
        match &mut self.jobs_state {
            Some(state) => state.replace_jobs(listings),
            None => self.jobs_state = Some(JobsState::new(listings)),
        }
        self.screen = AppScreen::Jobs;
        Ok(())
    }

    /// Resync every open tracker with its stored sessions.
    async fn reload_tracker(&mut self) -> StudioResult<()> {
        let Some(state) = &mut self.jobs_state else {
            return Ok(());
        };
        for job_id in state.tracked_jobs() {
            let job = self.store.get_job(job_id).await?;
            let tracker =
                TimeTracker::load(self.store.as_ref(), job_id, job.total_seconds).await?;
            state.insert_tracker(tracker);
        }
        Ok(())
    }

    async fn open(&mut self, section: Section) -> StudioResult<()> {
        let store = self.store.as_ref();
        match section {
            Section::Clients => {
                self.clients_state = Some(ClientsState::new(store.load_clients().await?));
                self.screen = AppScreen::Clients;
            }
            Section::Jobs => self.load_jobs().await?,
            Section::Finance => {
                self.finance_state = Some(FinanceState::new(store.load_finance().await?));
                self.screen = AppScreen::Finance;
            }
            Section::Categories => {
                self.categories_state =
                    Some(CategoriesState::new(store.load_categories().await?));
                self.screen = AppScreen::Categories;
            }
            Section::Projects => {
                let projects = store.load_projects(ProjectFilter::all()).await?;
                self.projects_state = Some(ProjectsState::new(projects));
                self.screen = AppScreen::Projects;
            }
            Section::Messages => {
                self.messages_state = Some(MessagesState::new(store.load_contacts().await?));
                self.screen = AppScreen::Messages;
            }
            Section::Analytics => {
                let report = analytics::load(store, Local::now()).await?;
                self.analytics_state = Some(AnalyticsState::new(report));
                self.screen = AppScreen::Analytics;
            }
            Section::ChangePassword => {
                self.change_password_state = Some(ChangePasswordState::new());
                self.screen = AppScreen::ChangePassword;
            }
        }
        Ok(())
    }

    async fn handle_login_screen(&mut self, key: KeyEvent) -> StudioResult<()> {
        match login::handle_input(&mut self.login_state, key) {
            Some(LoginAction::Quit) => self.should_quit = true,
            Some(LoginAction::Submit { email, password }) => {
                match auth::login(self.store.as_ref(), &email, &password).await {
                    Ok(user) => {
                        self.user = Some(user);
                        self.login_state = LoginState::new();
                        self.load_dashboard().await?;
                    }
                    Err(e @ StudioError::Unauthorized) => self.login_state.rejected(e.to_string()),
                    Err(e) => return Err(e),
                }
            }
            None => {}
        }
        Ok(())
    }

    async fn handle_dashboard_screen(&mut self, key: KeyEvent) -> StudioResult<()> {
        let Some(state) = &mut self.dashboard_state else {
            return Ok(());
        };
        match dashboard_ui::handle_input(state, key) {
            Some(DashboardAction::Open(section)) => self.open(section).await?,
            Some(DashboardAction::Refresh) => self.load_dashboard().await?,
            Some(DashboardAction::Logout) => {
                if let Some(user) = self.user.take() {
                    info!(user_id = user.id, "admin logged out");
                }
                self.login_state = LoginState::new();
                self.screen = AppScreen::Login;
            }
            None => {}
        }
        Ok(())
    }

    async fn handle_clients_screen(&mut self, key: KeyEvent) -> StudioResult<()> {
        let Some(state) = &mut self.clients_state else {
            return Ok(());
        };
        match clients::handle_input(state, key) {
            Some(ClientAction::Back) => self.load_dashboard().await?,
            Some(ClientAction::NewClient) => {
                self.client_wizard_state = Some(ClientWizardState::new());
                self.screen = AppScreen::ClientWizard;
            }
            Some(ClientAction::EditClient(id)) => {
                let client = self.store.get_client(id).await?;
                self.client_wizard_state = Some(ClientWizardState::from_existing(client));
                self.screen = AppScreen::ClientWizard;
            }
            Some(ClientAction::DeleteClient(id)) => {
                self.store.delete_client(id).await?;
                info!(client_id = id, "client deleted");
            }
            None => {}
        }
        Ok(())
    }

    async fn handle_client_wizard_screen(&mut self, key: KeyEvent) -> StudioResult<()> {
        let Some(state) = &mut self.client_wizard_state else {
            return Ok(());
        };
        match client_wizard::handle_input(state, key) {
            Some(ClientWizardAction::Cancel) => self.open(Section::Clients).await?,
            Some(ClientWizardAction::Save(client)) => {
                if client.id == 0 {
                    let id = self.store.create_client(&client).await?;
                    info!(client_id = id, "client created");
                } else {
                    self.store.update_client(&client).await?;
                }
                self.open(Section::Clients).await?;
                self.notice = Some(Notice::Info(format!("Saved {}", client.company_name)));
            }
            None => {}
        }
        Ok(())
    }

    async fn handle_jobs_screen(&mut self, key: KeyEvent) -> StudioResult<()> {
        let Some(state) = &mut self.jobs_state else {
            return Ok(());
        };
        let today = Local::now().date_naive();
        match jobs::handle_input(state, key) {
            Some(JobAction::Back) => self.load_dashboard().await?,
            Some(JobAction::NewJob) => {
                let clients = self.store.load_clients().await?;
                self.job_wizard_state = Some(JobWizardState::new(&clients));
                self.screen = AppScreen::JobWizard;
            }
            Some(JobAction::EditJob(id)) => {
                let job = self.store.get_job(id).await?;
                let clients = self.store.load_clients().await?;
                self.job_wizard_state = Some(JobWizardState::from_existing(job, &clients));
                self.screen = AppScreen::JobWizard;
            }
            Some(JobAction::DeleteJob(id)) => {
                self.store.delete_job(id).await?;
                info!(job_id = id, "job deleted");
            }
            Some(JobAction::SetStatus(id, status)) => {
                self.store.update_job_status(id, status).await?;
            }
            Some(JobAction::SetPayment(id, status)) => {
                let entry = self.store.set_job_payment_status(id, status, today).await?;
                info!(job_id = id, entry_id = entry.id, status = %entry.status, "job payment updated");
            }
            Some(JobAction::OpenTracker {
                job_id,
                total_seconds,
            }) => {
                let tracker = TimeTracker::load(self.store.as_ref(), job_id, total_seconds).await?;
                state.set_tracker(tracker);
            }
            Some(JobAction::ToggleTimer) => {
                let Some(tracker) = state.tracker_mut() else {
                    return Ok(());
                };
                let job_id = tracker.job_id();
                if tracker.is_running() {
                    tracker.stop(self.store.as_ref(), Utc::now()).await?;
                    let total = tracker.displayed_seconds();
                    state.set_total(job_id, total);
                } else {
                    tracker.start(self.store.as_ref(), Utc::now()).await?;
                }
            }
            None => {}
        }
        Ok(())
    }

    async fn handle_job_wizard_screen(&mut self, key: KeyEvent) -> StudioResult<()> {
        let Some(state) = &mut self.job_wizard_state else {
            return Ok(());
        };
        match job_wizard::handle_input(state, key) {
            Some(JobWizardAction::Cancel) => self.load_jobs().await?,
            Some(JobWizardAction::Save(job)) => {
                let id = self
                    .store
                    .save_job(&job, Local::now().date_naive())
                    .await?;
                info!(job_id = id, "job saved");
                self.load_jobs().await?;
                self.notice = Some(Notice::Info(format!("Saved {}", job.title)));
            }
            None => {}
        }
        Ok(())
    }

    async fn handle_finance_screen(&mut self, key: KeyEvent) -> StudioResult<()> {
        let Some(state) = &mut self.finance_state else {
            return Ok(());
        };
        match finance::handle_input(state, key) {
            Some(FinanceAction::Back) => self.load_dashboard().await?,
            Some(FinanceAction::NewEntry) => {
                self.finance_wizard_state = Some(FinanceWizardState::new());
                self.screen = AppScreen::FinanceWizard;
            }
            Some(FinanceAction::EditEntry(id)) => {
                let entry = self.store.get_finance_entry(id).await?;
                self.finance_wizard_state = Some(FinanceWizardState::from_existing(entry));
                self.screen = AppScreen::FinanceWizard;
            }
            Some(FinanceAction::DeleteEntry(id)) => {
                self.store.delete_finance_entry(id).await?;
                info!(entry_id = id, "financial entry deleted");
            }
            Some(FinanceAction::SetStatus(id, status)) => {
                self.store.update_finance_status(id, status).await?;
            }
            None => {}
        }
        Ok(())
    }

    async fn handle_finance_wizard_screen(&mut self, key: KeyEvent) -> StudioResult<()> {
        let Some(state) = &mut self.finance_wizard_state else {
            return Ok(());
        };
        match finance_wizard::handle_input(state, key) {
            Some(FinanceWizardAction::Cancel) => self.open(Section::Finance).await?,
            Some(FinanceWizardAction::Save(entry)) => {
                if entry.id == 0 {
                    let id = self.store.create_finance_entry(&entry).await?;
                    info!(entry_id = id, kind = %entry.kind, "financial entry created");
                } else {
                    self.store.update_finance_entry(&entry).await?;
                }
                self.open(Section::Finance).await?;
            }
            None => {}
        }
        Ok(())
    }

    async fn handle_categories_screen(&mut self, key: KeyEvent) -> StudioResult<()> {
        let Some(state) = &mut self.categories_state else {
            return Ok(());
        };
        match categories::handle_input(state, key) {
            Some(CategoryAction::Back) => self.load_dashboard().await?,
            Some(CategoryAction::NewCategory(position)) => {
                self.category_wizard_state = Some(CategoryWizardState::new(position));
                self.screen = AppScreen::CategoryWizard;
            }
            Some(CategoryAction::EditCategory(category)) => {
                self.category_wizard_state = Some(CategoryWizardState::from_existing(category));
                self.screen = AppScreen::CategoryWizard;
            }
            Some(CategoryAction::DeleteCategory(id)) => {
                self.store.delete_category(id).await?;
                info!(category_id = id, "portfolio category deleted");
            }
            None => {}
        }
        Ok(())
    }

    async fn handle_category_wizard_screen(&mut self, key: KeyEvent) -> StudioResult<()> {
        let Some(state) = &mut self.category_wizard_state else {
            return Ok(());
        };
        match category_wizard::handle_input(state, key) {
            Some(CategoryWizardAction::Cancel) => self.open(Section::Categories).await?,
            Some(CategoryWizardAction::Save(category)) => {
                if category.id == 0 {
                    self.store.create_category(&category).await?;
                } else {
                    self.store.update_category(&category).await?;
                }
                self.open(Section::Categories).await?;
            }
            None => {}
        }
        Ok(())
    }

    async fn handle_projects_screen(&mut self, key: KeyEvent) -> StudioResult<()> {
        let Some(state) = &mut self.projects_state else {
            return Ok(());
        };
        match projects::handle_input(state, key) {
            Some(ProjectAction::Back) => self.load_dashboard().await?,
            Some(ProjectAction::NewProject) => {
                let categories = self.store.load_categories().await?;
                self.project_wizard_state = Some(ProjectWizardState::new(&categories));
                self.screen = AppScreen::ProjectWizard;
            }
            Some(ProjectAction::EditProject(item)) => {
                let categories = self.store.load_categories().await?;
                self.project_wizard_state =
                    Some(ProjectWizardState::from_existing(item, &categories));
                self.screen = AppScreen::ProjectWizard;
            }
            Some(ProjectAction::DeleteProject(id)) => {
                self.store.delete_project(id).await?;
                info!(project_id = id, "portfolio project deleted");
            }
            Some(ProjectAction::SetPublished(item)) => {
                let images: Vec<ImageDraft> = item.images.iter().map(ImageDraft::from).collect();
                self.store.save_project(&item.project, &images).await?;
            }
            None => {}
        }
        Ok(())
    }

    async fn handle_project_wizard_screen(&mut self, key: KeyEvent) -> StudioResult<()> {
        let Some(state) = &mut self.project_wizard_state else {
            return Ok(());
        };
        match project_wizard::handle_input(state, key) {
            Some(ProjectWizardAction::Cancel) => self.open(Section::Projects).await?,
            Some(ProjectWizardAction::Save(project, images)) => {
                let id = self.store.save_project(&project, &images).await?;
                info!(project_id = id, images = images.len(), "portfolio project saved");
                self.open(Section::Projects).await?;
            }
            Some(ProjectWizardAction::UploadImage(path)) => {
                match upload_file(&self.bucket, &path).await {
                    Ok(url) => state.add_image(ImageDraft { url, title: None }),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "image upload failed");
                        state.upload_failed(format!("Upload failed: {}", e));
                    }
                }
            }
            None => {}
        }
        Ok(())
    }

    async fn handle_messages_screen(&mut self, key: KeyEvent) -> StudioResult<()> {
        let Some(state) = &mut self.messages_state else {
            return Ok(());
        };
        match messages::handle_input(state, key) {
            Some(MessageAction::Back) => self.load_dashboard().await?,
            Some(MessageAction::SetRead(id, read)) => {
                self.store.set_contact_read(id, read).await?;
            }
            Some(MessageAction::DeleteMessage(id)) => {
                self.store.delete_contact(id).await?;
            }
            None => {}
        }
        Ok(())
    }

    async fn handle_analytics_screen(&mut self, key: KeyEvent) -> StudioResult<()> {
        let Some(state) = &mut self.analytics_state else {
            return Ok(());
        };
        match analytics_ui::handle_input(state, key) {
            Some(AnalyticsAction::Back) => self.load_dashboard().await?,
            Some(AnalyticsAction::Refresh) => self.open(Section::Analytics).await?,
            None => {}
        }
        Ok(())
    }

    async fn handle_change_password_screen(&mut self, key: KeyEvent) -> StudioResult<()> {
        let Some(state) = &mut self.change_password_state else {
            return Ok(());
        };
        match change_password::handle_input(state, key) {
            Some(ChangePasswordAction::Cancel) => self.load_dashboard().await?,
            Some(ChangePasswordAction::Submit {
                password,
                confirmation,
            }) => {
                let Some(user) = &self.user else {
                    self.screen = AppScreen::Login;
                    return Ok(());
                };
                match auth::change_password(self.store.as_ref(), user, &password, &confirmation)
                    .await
                {
                    Ok(()) => {
                        self.load_dashboard().await?;
                        self.notice = Some(Notice::Info("Password changed".to_string()));
                    }
                    Err(StudioError::Validation(message)) => state.rejected(message),
                    Err(e) => return Err(e),
                }
            }
            None => {}
        }
        Ok(())
    }
}

/// Read a local file and put it in the bucket; returns the public URL.
pub async fn upload_file(bucket: &BlobStore, path: &Path) -> StudioResult<String> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| StudioError::InvalidValue {
            field: "file",
            value: path.display().to_string(),
        })?
        .to_string();
    let bytes = tokio::fs::read(path).await?;
    let stored = bucket.upload(&file_name, bytes).await?;
    info!(key = %stored.key, "image uploaded");
    Ok(stored.url)
}
