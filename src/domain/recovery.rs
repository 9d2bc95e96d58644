//! Multi-approver password recovery.
//!
//! A request starts `pending` and collects approvals from other admins. Once
//! the number of distinct approvers reaches `required_approvals` it can be
//! completed (`approved`); any approver may instead reject it. Pending
//! requests that sit longer than the configured window become `expired`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

pub const DEFAULT_REASON: &str = "Password forgotten";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryStatus {
    Pending,
    Approved,
    Rejected,
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Approval {
    pub email: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryRequest {
    pub id: String,
    pub email: String,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
    pub status: RecoveryStatus,
    #[serde(default)]
    pub approvals: Vec<Approval>,
    pub required_approvals: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovery_token: Option<String>,
}

#[derive(Debug, Error, PartialEq)]
pub enum RecoveryError {
    #[error("Cannot approve your own recovery request")]
    SelfApproval,
    #[error("Recovery request is already {0:?}")]
    NotPending(RecoveryStatus),
}

/// Outcome of recording an approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalOutcome {
    /// More approvals are needed.
    Recorded { approvals: usize, required: usize },
    /// Threshold reached; the caller must complete the request.
    ThresholdReached,
}

impl RecoveryRequest {
    pub fn new(email: String, reason: Option<String>, required_approvals: usize, now: DateTime<Utc>) -> Self {
        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_REASON.to_string());

        Self {
            id: Uuid::new_v4().simple().to_string(),
            email,
            reason,
            timestamp: now,
            status: RecoveryStatus::Pending,
            approvals: Vec::new(),
            required_approvals,
            completed_at: None,
            rejected_by: None,
            rejected_at: None,
            recovery_token: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == RecoveryStatus::Pending
    }

    /// Marks a stale pending request as expired. Returns true if the status changed.
    pub fn expire_if_stale(&mut self, now: DateTime<Utc>, ttl: Duration) -> bool {
        if self.is_pending() && now - self.timestamp >= ttl {
            self.status = RecoveryStatus::Expired;
            return true;
        }
        false
    }

    fn ensure_actionable(&self, approver: &str) -> Result<(), RecoveryError> {
        if !self.is_pending() {
            return Err(RecoveryError::NotPending(self.status));
        }
        if self.email == approver {
            return Err(RecoveryError::SelfApproval);
        }
        Ok(())
    }

    /// Records an approval. Repeat approvals by the same admin are ignored.
    pub fn approve(&mut self, approver: &str, now: DateTime<Utc>) -> Result<ApprovalOutcome, RecoveryError> {
        self.ensure_actionable(approver)?;

        if !self.approvals.iter().any(|a| a.email == approver) {
            self.approvals.push(Approval {
                email: approver.to_string(),
                timestamp: now,
            });
        }

        if self.approvals.len() >= self.required_approvals {
            Ok(ApprovalOutcome::ThresholdReached)
        } else {
            Ok(ApprovalOutcome::Recorded {
                approvals: self.approvals.len(),
                required: self.required_approvals,
            })
        }
    }

    pub fn complete(&mut self, token: String, now: DateTime<Utc>) {
        self.status = RecoveryStatus::Approved;
        self.completed_at = Some(now);
        self.recovery_token = Some(token);
    }

    pub fn reject(&mut self, approver: &str, now: DateTime<Utc>) -> Result<(), RecoveryError> {
        self.ensure_actionable(approver)?;
        self.status = RecoveryStatus::Rejected;
        self.rejected_by = Some(approver.to_string());
        self.rejected_at = Some(now);
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRecoveryRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryAction {
    Approve,
    Reject,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApproveRecoveryRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub request_id: String,
    pub action: RecoveryAction,
    pub new_password: Option<String>,
    /// Accepted for compatibility with older clients; must match the session.
    pub approver_email: Option<String>,
}
