//! In-memory admin sessions
//!
//! Tokens are random UUIDs handed out on login and presented as
//! `Authorization: Bearer <token>`. Sessions expire 24 hours after login and
//! do not survive a restart.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;
use xicon_common::api::SessionInfo;

/// Session lifetime
pub const SESSION_TTL_HOURS: i64 = 24;

pub type SessionToken = String;

#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at + Duration::hours(SESSION_TTL_HOURS)
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }

    pub fn info(&self, token: &str) -> SessionInfo {
        SessionInfo {
            token: token.to_string(),
            username: self.username.clone(),
            expires_at: self.expires_at(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionToken, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a session and return its token
    pub async fn create_session(&self, session: Session) -> SessionToken {
        let token = Uuid::new_v4().to_string();
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| !s.is_expired(now));
        sessions.insert(token.clone(), session);
        token
    }

    /// Live session for `token`, if any
    pub async fn get_session(&self, token: &str) -> Option<Session> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(token)?;
        if session.is_expired(Utc::now()) {
            return None;
        }
        Some(session.clone())
    }

    /// Drop a session (logout); unknown tokens are ignored
    pub async fn delete_session(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }

    pub async fn cleanup_expired(&self) {
        let now = Utc::now();
        self.sessions.write().await.retain(|_, s| !s.is_expired(now));
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let token = header_value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}
