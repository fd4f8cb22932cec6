use axum::Form;
use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use chrono::{Local, Utc};
use serde::Deserialize;
use tracing::info;

use super::session::{self, Session};
use super::{AppState, pages};
use crate::error::{StudioError, StudioResult};
use crate::services::{analytics, auth, dashboard};

const LOGIN_PATH: &str = "/auth/login";

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

async fn current_session(state: &AppState, headers: &HeaderMap) -> Option<Session> {
    let token = session::token_from_headers(headers)?;
    state.sessions.get(&token, Utc::now()).await
}

pub async fn login_form() -> Html<String> {
    Html(pages::login(None))
}

pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    match auth::login(state.store.as_ref(), &form.email, &form.password).await {
        Ok(user) => {
            let token = state.sessions.create(user.id, &user.email, Utc::now()).await;
            let cookie = session::set_cookie(&token, state.sessions.ttl());
            ([(header::SET_COOKIE, cookie)], Redirect::to("/admin")).into_response()
        }
        Err(StudioError::Unauthorized) => (
            StatusCode::UNAUTHORIZED,
            Html(pages::login(Some(&StudioError::Unauthorized.to_string()))),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session::token_from_headers(&headers) {
        state.sessions.remove(&token).await;
        info!("admin logged out");
    }
    (
        [(header::SET_COOKIE, session::clear_cookie())],
        Redirect::to(LOGIN_PATH),
    )
        .into_response()
}

pub async fn dashboard(State(state): State<AppState>, headers: HeaderMap) -> StudioResult<Response> {
    if current_session(&state, &headers).await.is_none() {
        return Ok(Redirect::to(LOGIN_PATH).into_response());
    }
    let dashboard = dashboard::load(state.store.as_ref()).await?;
    Ok(Json(dashboard).into_response())
}

pub async fn analytics(State(state): State<AppState>, headers: HeaderMap) -> StudioResult<Response> {
    if current_session(&state, &headers).await.is_none() {
        return Ok(Redirect::to(LOGIN_PATH).into_response());
    }
    let report = analytics::load(state.store.as_ref(), Local::now()).await?;
    Ok(Json(report).into_response())
}
