use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, Method, Request, header};
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

use super::AppState;

const UNTRACKED_PREFIXES: [&str; 4] = ["/media/", "/health", "/admin", "/auth/"];

/// Public pages are every GET outside media, health and the admin surface.
pub fn is_tracked_page(method: &Method, path: &str) -> bool {
    *method == Method::GET && !UNTRACKED_PREFIXES.iter().any(|p| path.starts_with(p))
}

/// First hop of `X-Forwarded-For`, else the socket peer.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
}

pub async fn record_page_view(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !is_tracked_page(request.method(), request.uri().path()) {
        return next.run(request).await;
    }

    let path = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let ip = client_ip(request.headers(), peer);

    let response = next.run(request).await;
    if response.status().is_success() {
        if let Err(e) = state
            .store
            .record_page_view(&path, user_agent.as_deref(), ip.as_deref())
            .await
        {
            warn!(%path, error = %e, "page view not recorded");
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn only_public_gets_are_tracked() {
        assert!(is_tracked_page(&Method::GET, "/"));
        assert!(is_tracked_page(&Method::GET, "/projeto/3"));
        assert!(!is_tracked_page(&Method::POST, "/contato"));
        assert!(!is_tracked_page(&Method::GET, "/media/1-a.jpg"));
        assert!(!is_tracked_page(&Method::GET, "/admin"));
        assert!(!is_tracked_page(&Method::GET, "/auth/login"));
    }

    #[test]
    fn forwarded_for_wins_over_peer() {
        let peer: SocketAddr = "127.0.0.1:5000".parse().unwrap();
        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers, Some(peer)).as_deref(), Some("127.0.0.1"));

        headers.insert("x-forwarded-for", HeaderValue::from_static(" 198.51.100.2 , 10.0.0.1"));
        assert_eq!(client_ip(&headers, Some(peer)).as_deref(), Some("198.51.100.2"));
    }
}
