//! Public website and admin login surface.

mod admin;
pub mod pages;
mod public;
pub mod session;
mod tracking;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Router, middleware};
use chrono::Duration;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::Config;
use crate::db::Store;
use crate::error::StudioError;
use crate::mail::ContactNotifier;
use crate::storage::BlobStore;
use session::SessionTable;

/// Shared state for every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub bucket: Arc<BlobStore>,
    pub notifier: Option<Arc<ContactNotifier>>,
    pub sessions: SessionTable,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, bucket: BlobStore, session_ttl: Duration) -> Self {
        Self {
            store,
            bucket: Arc::new(bucket),
            notifier: None,
            sessions: SessionTable::new(session_ttl),
        }
    }

    pub fn with_notifier(mut self, notifier: ContactNotifier) -> Self {
        self.notifier = Some(Arc::new(notifier));
        self
    }
}

impl IntoResponse for StudioError {
    fn into_response(self) -> Response {
        let status = match &self {
            StudioError::NotFound { .. } => StatusCode::NOT_FOUND,
            StudioError::Validation(_) | StudioError::InvalidValue { .. } => {
                StatusCode::BAD_REQUEST
            }
            StudioError::Unauthorized => StatusCode::UNAUTHORIZED,
            StudioError::SessionAlreadyOpen(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        match status {
            StatusCode::NOT_FOUND => (status, Html(pages::not_found())).into_response(),
            StatusCode::INTERNAL_SERVER_ERROR => {
                error!(error = %self, "request failed");
                (status, "internal server error").into_response()
            }
            _ => (status, self.to_string()).into_response(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(public::home))
        .route("/categoria/:slug", get(public::category))
        .route("/projeto/:id", get(public::project))
        .route("/contato", get(public::contact_form).post(public::submit_contact))
        .route("/media/:key", get(public::media))
        .route("/health", get(|| async { "OK" }))
        .route("/auth/login", get(admin::login_form).post(admin::login))
        .route("/auth/logout", post(admin::logout))
        .route("/admin", get(admin::dashboard))
        .route("/admin/analytics", get(admin::analytics))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            tracking::record_page_view,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: &Config, store: Arc<dyn Store>) -> anyhow::Result<()> {
    let bucket = BlobStore::from_config(config)?;
    let mut state = AppState::new(
        store,
        bucket,
        Duration::minutes(config.session_ttl_minutes),
    );
    if let Some(smtp) = config.smtp() {
        info!(to = %smtp.to, "contact notifications enabled");
        state = state.with_notifier(ContactNotifier::new(smtp));
    }

    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "studio site listening");

    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
