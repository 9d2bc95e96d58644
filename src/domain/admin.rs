use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Fewest admins that keep two-person password recovery possible.
pub const MINIMUM_ADMINS: usize = 2;
pub const RECOMMENDED_ADMINS: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminAccount {
    pub email: String,
    pub password_hash: String,
    #[serde(default = "default_active")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

/// Public view of an admin, without password material.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSummary {
    pub email: String,
    pub display_name: String,
    pub active: bool,
    pub protected: bool,
    pub created_at: DateTime<Utc>,
}

impl AdminSummary {
    pub fn from_account(account: &AdminAccount, protected_email: &str) -> Self {
        Self {
            email: account.email.clone(),
            display_name: display_name(&account.email),
            active: account.active,
            protected: account.email == protected_email,
            created_at: account.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAdminRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, max = 128, message = "must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EditAdminRequest {
    pub email: String,
    #[validate(email(message = "must be a valid email address"))]
    pub new_email: Option<String>,
    #[validate(length(min = 6, max = 128, message = "must be at least 6 characters"))]
    pub password: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RemoveAdminRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCount {
    pub current: usize,
    pub minimum: usize,
    pub recommended: usize,
    pub admins: Vec<String>,
    pub is_minimum_met: bool,
}

impl AdminCount {
    pub fn from_accounts(accounts: &[AdminAccount]) -> Self {
        let active: Vec<&AdminAccount> = accounts.iter().filter(|a| a.active).collect();
        Self {
            current: active.len(),
            minimum: MINIMUM_ADMINS,
            recommended: RECOMMENDED_ADMINS.max(MINIMUM_ADMINS),
            admins: active.iter().map(|a| local_part(&a.email).to_string()).collect(),
            is_minimum_met: active.len() >= MINIMUM_ADMINS,
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

/// "mary_jane.smith@school.org" -> "Mary Jane Smith".
pub fn display_name(email: &str) -> String {
    let spaced = local_part(email).replace(['.', '_'], " ");
    let mut out = String::with_capacity(spaced.len());
    let mut at_word_start = true;
    for c in spaced.chars() {
        if c.is_alphanumeric() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.push(c);
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
