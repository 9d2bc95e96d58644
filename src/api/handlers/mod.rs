pub mod admins;
pub mod announcements;
pub mod auth;
pub mod gallery;
pub mod recovery;
pub mod results;
pub mod root;

use serde::Deserialize;

use crate::error::{AppError, Result};

/// `?id=` on the DELETE endpoints.
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

impl IdQuery {
    pub fn require(&self, what: &str) -> Result<i64> {
        let raw = self
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::BadRequest(format!("{} ID required", what)))?;

        raw.parse()
            .map_err(|_| AppError::BadRequest(format!("Invalid {} ID: {}", what.to_lowercase(), raw)))
    }
}
