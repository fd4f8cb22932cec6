use axum::Form;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};

use super::{AppState, pages};
use crate::db::ProjectFilter;
use crate::error::{StudioError, StudioResult};
use crate::models::{ContactForm, PortfolioCategory};
use crate::services::{contacts, portfolio};

/// Categories shown in the site navigation
async fn nav_categories(state: &AppState) -> StudioResult<Vec<PortfolioCategory>> {
    let categories = state.store.load_categories().await?;
    Ok(portfolio::active_categories(&categories)
        .into_iter()
        .cloned()
        .collect())
}

pub async fn home(State(state): State<AppState>) -> StudioResult<Html<String>> {
    let categories = nav_categories(&state).await?;
    let projects = state.store.load_projects(ProjectFilter::published()).await?;
    Ok(Html(pages::home(&categories, &projects)))
}

pub async fn category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> StudioResult<Html<String>> {
    let current = state
        .store
        .category_by_slug(&slug)
        .await?
        .ok_or_else(|| StudioError::not_found("category", &slug))?;

    let categories = nav_categories(&state).await?;
    let projects = state
        .store
        .load_projects(ProjectFilter::published_in(current.id))
        .await?;
    Ok(Html(pages::category(&categories, &current, &projects)))
}

pub async fn project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> StudioResult<Html<String>> {
    let id: i32 = id
        .parse()
        .map_err(|_| StudioError::not_found("project", &id))?;
    let item = state
        .store
        .get_project(id, true)
        .await?
        .ok_or_else(|| StudioError::not_found("project", id))?;

    let categories = nav_categories(&state).await?;
    Ok(Html(pages::project(&categories, &item)))
}

pub async fn contact_form(State(state): State<AppState>) -> StudioResult<Html<String>> {
    let categories = nav_categories(&state).await?;
    Ok(Html(pages::contact(
        &categories,
        &ContactForm::default(),
        false,
        None,
    )))
}

pub async fn submit_contact(
    State(state): State<AppState>,
    Form(mut form): Form<ContactForm>,
) -> StudioResult<Response> {
    let categories = nav_categories(&state).await?;
    let notifier = state.notifier.as_deref();

    match contacts::submit(state.store.as_ref(), notifier, &mut form).await {
        Ok(_) => Ok(Html(pages::contact(&categories, &form, true, None)).into_response()),
        Err(StudioError::Validation(message)) => Ok((
            StatusCode::BAD_REQUEST,
            Html(pages::contact(&categories, &form, false, Some(&message))),
        )
            .into_response()),
        Err(e) => Err(e),
    }
}

pub async fn media(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    match state.bucket.read(&key).await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, crate::storage::content_type(&key).to_string()),
                (header::CACHE_CONTROL, "public, max-age=3600".to_string()),
            ],
            bytes,
        )
            .into_response(),
        Err(StudioError::InvalidValue { .. }) => StudioError::not_found("object", key).into_response(),
        Err(e) => e.into_response(),
    }
}
