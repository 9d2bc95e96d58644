use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
pub struct Session {
    pub admin_email: String,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
}

/// The login record the admin pages keep client-side to decide whether to
/// show edit controls. Mirrors the server session's start time.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoginStamp {
    pub is_authenticated: bool,
    pub login_time: DateTime<Utc>,
}

impl LoginStamp {
    pub fn new(login_time: DateTime<Utc>) -> Self {
        Self {
            is_authenticated: true,
            login_time,
        }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.is_authenticated && now - self.login_time < window
    }
}

/// In-memory session table keyed by token hash. The raw token is never kept.
/// Sessions do not survive a restart.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, admin_email: &str, token: &str, expires_at: DateTime<Utc>) -> Session {
        let now = Utc::now();
        let session = Session {
            admin_email: admin_email.to_string(),
            token_hash: hash_token(token),
            expires_at,
            created_at: now,
            last_used_at: now,
        };

        self.sessions
            .write()
            .await
            .insert(session.token_hash.clone(), session.clone());
        session
    }

    /// Live session for `token`, touching its last-used time.
    pub async fn find_by_token(&self, token: &str) -> Option<Session> {
        let token_hash = hash_token(token);
        let now = Utc::now();

        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&token_hash)?;
        if session.expires_at <= now {
            sessions.remove(&token_hash);
            return None;
        }
        session.last_used_at = now;
        Some(session.clone())
    }

    pub async fn delete_by_token(&self, token: &str) {
        self.sessions.write().await.remove(&hash_token(token));
    }

    pub async fn delete_by_admin(&self, admin_email: &str) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.admin_email != admin_email);
        before - sessions.len()
    }

    pub async fn cleanup_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        before - sessions.len()
    }
}

pub(crate) fn hash_token(token: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
