use std::collections::HashMap;
use std::sync::Arc;

use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use tokio::sync::RwLock;

pub const SESSION_COOKIE: &str = "studio_session";

/// A logged-in admin
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: i32,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

/// In-process session table keyed by the opaque cookie token
#[derive(Clone)]
pub struct SessionTable {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    ttl: Duration,
}

impl SessionTable {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn create(&self, user_id: i32, email: &str, now: DateTime<Utc>) -> String {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        let token = hex::encode(bytes);

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| s.expires_at > now);
        sessions.insert(
            token.clone(),
            Session {
                user_id,
                email: email.to_string(),
                expires_at: now + self.ttl,
            },
        );
        token
    }

    /// The live session for a token; expired entries are dropped on the way.
    pub async fn get(&self, token: &str, now: DateTime<Utc>) -> Option<Session> {
        let session = self.sessions.read().await.get(token).cloned()?;
        if session.expires_at > now {
            return Some(session);
        }
        self.sessions.write().await.remove(token);
        None
    }

    pub async fn remove(&self, token: &str) {
        self.sessions.write().await.remove(token);
    }
}

/// Value of the session cookie, if the request carries one.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

pub fn set_cookie(token: &str, ttl: Duration) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token,
        ttl.num_seconds()
    )
}

pub fn clear_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[tokio::test]
    async fn sessions_expire_after_ttl() {
        let table = SessionTable::new(Duration::minutes(30));
        let now = Utc::now();
        let token = table.create(1, "owner@studio.test", now).await;

        assert!(table.get(&token, now + Duration::minutes(29)).await.is_some());
        assert!(table.get(&token, now + Duration::minutes(31)).await.is_none());
        assert!(table.get(&token, now).await.is_none());
    }

    #[tokio::test]
    async fn removed_sessions_are_gone() {
        let table = SessionTable::new(Duration::minutes(30));
        let now = Utc::now();
        let token = table.create(1, "owner@studio.test", now).await;
        table.remove(&token).await;
        assert!(table.get(&token, now).await.is_none());
    }

    #[test]
    fn token_is_read_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; studio_session=abc123; other=1"),
        );
        assert_eq!(token_from_headers(&headers).as_deref(), Some("abc123"));

        let empty = HeaderMap::new();
        assert_eq!(token_from_headers(&empty), None);
    }
}
