use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use argon2::password_hash::{SaltString, rand_core::OsRng};
use axum::http::{header, HeaderMap};
use axum_extra::extract::CookieJar;
use chrono::{Duration, Utc};
use cookie::{Cookie, SameSite};

use crate::error::{AppError, Result};

pub mod session;

pub use session::{LoginStamp, Session, SessionStore};

pub const SESSION_COOKIE: &str = "session";

pub struct AuthService {
    session_store: SessionStore,
    session_duration: Duration,
}

impl AuthService {
    pub fn new(session_duration_hours: i64) -> Self {
        Self {
            session_store: SessionStore::new(),
            session_duration: Duration::hours(session_duration_hours),
        }
    }

    pub fn session_duration(&self) -> Duration {
        self.session_duration
    }

    pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;

        let argon2 = Argon2::default();

        Ok(argon2.verify_password(password.as_bytes(), &parsed_hash).is_ok())
    }

    pub async fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        Ok(password_hash.to_string())
    }

    pub async fn create_session(&self, admin_email: &str) -> (Session, String) {
        let token = generate_token();
        let expires_at = Utc::now() + self.session_duration;
        let session = self.session_store.create(admin_email, &token, expires_at).await;
        (session, token)
    }

    pub async fn validate_session(&self, token: &str) -> Option<Session> {
        self.session_store.find_by_token(token).await
    }

    pub async fn invalidate_session(&self, token: &str) {
        self.session_store.delete_by_token(token).await
    }

    /// Log an admin out everywhere (password change, rename, removal).
    pub async fn invalidate_admin_sessions(&self, admin_email: &str) {
        let dropped = self.session_store.delete_by_admin(admin_email).await;
        if dropped > 0 {
            tracing::info!("Invalidated {} session(s) for {}", dropped, admin_email);
        }
    }

    pub async fn cleanup_expired_sessions(&self) -> usize {
        self.session_store.cleanup_expired().await
    }

    pub fn create_session_cookie(&self, token: &str, secure: bool) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token.to_string()))
            .path("/")
            .same_site(SameSite::Lax)
            .http_only(true)
            .secure(secure)
            .max_age(cookie::time::Duration::seconds(self.session_duration.num_seconds()))
            .build()
    }

    pub fn create_logout_cookie() -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, ""))
            .path("/")
            .same_site(SameSite::Lax)
            .http_only(true)
            .max_age(cookie::time::Duration::seconds(0))
            .build()
    }
}

/// Session token from an `Authorization: Bearer` header, falling back to the
/// session cookie.
pub fn extract_token(headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    bearer
        .map(str::to_string)
        .or_else(|| jar.get(SESSION_COOKIE).map(|c| c.value().to_string()))
        .filter(|t| !t.is_empty())
}

pub(crate) fn generate_token() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
