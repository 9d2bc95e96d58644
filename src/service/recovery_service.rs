use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::Mutex;

use crate::{
    auth::generate_token,
    domain::*,
    error::{AppError, Result},
    repository::RecoveryRepository,
    service::admin_service::AdminService,
};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug)]
pub struct RecoveryActionOutcome {
    pub message: &'static str,
    pub request: RecoveryRequest,
}

pub struct RecoveryService {
    repo: Arc<dyn RecoveryRepository>,
    admin_service: Arc<AdminService>,
    required_approvals: usize,
    expiry: Duration,
    // Serializes approve/reject so concurrent approvals cannot overwrite each other.
    action_lock: Mutex<()>,
}

impl RecoveryService {
    pub fn new(
        repo: Arc<dyn RecoveryRepository>,
        admin_service: Arc<AdminService>,
        required_approvals: usize,
        expiry_hours: i64,
    ) -> Self {
        Self {
            repo,
            admin_service,
            required_approvals: required_approvals.max(1),
            expiry: Duration::hours(expiry_hours),
            action_lock: Mutex::new(()),
        }
    }

    pub async fn request(&self, request: CreateRecoveryRequest) -> Result<RecoveryRequest> {
        let Some(admin) = self.admin_service.find_active(&request.email).await? else {
            tracing::warn!("Recovery requested for unknown admin {}", request.email);
            return Err(AppError::Unauthorized);
        };

        let now = Utc::now();
        let _guard = self.action_lock.lock().await;
        self.repo.expire_stale(now, self.expiry).await?;

        let created = self
            .repo
            .create(RecoveryRequest::new(admin.email, request.reason, self.required_approvals, now))
            .await?;
        tracing::info!("Recovery request {} opened for {}", created.id, created.email);
        Ok(created)
    }

    pub async fn list_pending(&self) -> Result<Vec<RecoveryRequest>> {
        {
            let _guard = self.action_lock.lock().await;
            self.repo.expire_stale(Utc::now(), self.expiry).await?;
        }
        Ok(self
            .repo
            .list()
            .await?
            .into_iter()
            .filter(RecoveryRequest::is_pending)
            .collect())
    }

    /// Approve or reject a request on behalf of the signed-in `approver`.
    ///
    /// The approval that reaches the threshold must carry the new password;
    /// without it nothing is recorded. The completed request is stored before
    /// the password changes, and put back if the reset fails.
    pub async fn act(&self, approver: &str, action: ApproveRecoveryRequest) -> Result<RecoveryActionOutcome> {
        let approver = normalize_email(approver);
        if let Some(claimed) = action.approver_email.as_deref() {
            if normalize_email(claimed) != approver {
                return Err(AppError::Forbidden(
                    "Approver email does not match the signed-in admin".to_string(),
                ));
            }
        }

        let _guard = self.action_lock.lock().await;
        let now = Utc::now();
        self.repo.expire_stale(now, self.expiry).await?;

        let original = self
            .repo
            .find_by_id(&action.request_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Recovery request not found".to_string()))?;
        let mut request = original.clone();

        match action.action {
            RecoveryAction::Reject => {
                request.reject(&approver, now)?;
                let request = self.repo.update(request).await?;
                tracing::info!("Recovery request {} rejected by {}", request.id, approver);
                Ok(RecoveryActionOutcome {
                    message: "Recovery request rejected",
                    request,
                })
            }
            RecoveryAction::Approve => match request.approve(&approver, now)? {
                ApprovalOutcome::Recorded { approvals, required } => {
                    let request = self.repo.update(request).await?;
                    tracing::info!(
                        "Recovery request {} approved by {} ({}/{})",
                        request.id,
                        approver,
                        approvals,
                        required
                    );
                    Ok(RecoveryActionOutcome {
                        message: "Approval recorded, waiting for more approvals",
                        request,
                    })
                }
                ApprovalOutcome::ThresholdReached => {
                    let password = action
                        .new_password
                        .as_deref()
                        .filter(|p| p.chars().count() >= MIN_PASSWORD_LEN)
                        .ok_or_else(|| {
                            AppError::BadRequest("New password must be at least 6 characters".to_string())
                        })?;

                    request.complete(generate_token(), now);
                    let request = self.repo.update(request).await?;

                    if let Err(e) = self.admin_service.reset_password(&request.email, password).await {
                        tracing::error!("Password reset for {} failed; reopening request {}", request.email, request.id);
                        if let Err(restore) = self.repo.update(original).await {
                            tracing::error!("Failed to reopen recovery request {}: {}", request.id, restore);
                        }
                        return Err(e);
                    }

                    tracing::info!("Recovery request {} completed; password reset for {}", request.id, request.email);
                    Ok(RecoveryActionOutcome {
                        message: "Password reset completed successfully",
                        request,
                    })
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthService;
    use crate::repository::{JsonAdminRepository, JsonRecoveryRepository};
    use tempfile::TempDir;

    async fn setup(tmp: &TempDir) -> (RecoveryService, Arc<AdminService>) {
        let admins = Arc::new(JsonAdminRepository::in_dir(tmp.path(), "admins.json"));
        let auth = Arc::new(AuthService::new(24));
        let admin_service = Arc::new(AdminService::new(admins, auth, "a@school.org"));
        for email in ["a@school.org", "b@school.org", "c@school.org"] {
            admin_service
                .create(CreateAdminRequest {
                    email: email.into(),
                    password: "secret1".into(),
                })
                .await
                .unwrap();
        }

        let repo = Arc::new(JsonRecoveryRepository::in_dir(tmp.path(), "recovery-requests.json"));
        (RecoveryService::new(repo, admin_service.clone(), 2, 72), admin_service)
    }

    fn approve(id: &str, new_password: Option<&str>) -> ApproveRecoveryRequest {
        ApproveRecoveryRequest {
            request_id: id.to_string(),
            action: RecoveryAction::Approve,
            new_password: new_password.map(str::to_string),
            approver_email: None,
        }
    }

    #[tokio::test]
    async fn two_distinct_approvals_reset_the_password() {
        let tmp = TempDir::new().unwrap();
        let (service, admins) = setup(&tmp).await;
        let request = service
            .request(CreateRecoveryRequest { email: "A@school.org".into(), reason: None })
            .await
            .unwrap();
        assert_eq!(request.email, "a@school.org");
        assert_eq!(request.reason, DEFAULT_REASON);

        let err = service.act("a@school.org", approve(&request.id, None)).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let first = service.act("b@school.org", approve(&request.id, None)).await.unwrap();
        assert_eq!(first.request.status, RecoveryStatus::Pending);

        // Same approver again does not count
        let again = service.act("b@school.org", approve(&request.id, None)).await.unwrap();
        assert_eq!(again.request.approvals.len(), 1);

        // Threshold approval without a password records nothing
        let err = service.act("c@school.org", approve(&request.id, Some("123"))).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(service.list_pending().await.unwrap()[0].approvals.len(), 1);

        let done = service
            .act("c@school.org", approve(&request.id, Some("fresh-pass")))
            .await
            .unwrap();
        assert_eq!(done.request.status, RecoveryStatus::Approved);
        assert!(done.request.recovery_token.is_some());
        admins.authenticate("a@school.org", "fresh-pass").await.unwrap();

        let err = service.act("c@school.org", approve(&request.id, None)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(service.list_pending().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn only_admins_can_request_and_approver_must_match_session() {
        let tmp = TempDir::new().unwrap();
        let (service, _) = setup(&tmp).await;

        let err = service
            .request(CreateRecoveryRequest { email: "stranger@x.org".into(), reason: None })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));

        let request = service
            .request(CreateRecoveryRequest { email: "a@school.org".into(), reason: Some("Lost phone".into()) })
            .await
            .unwrap();
        let mut spoofed = approve(&request.id, None);
        spoofed.approver_email = Some("c@school.org".into());
        let err = service.act("b@school.org", spoofed).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn rejection_closes_the_request() {
        let tmp = TempDir::new().unwrap();
        let (service, _) = setup(&tmp).await;
        let request = service
            .request(CreateRecoveryRequest { email: "a@school.org".into(), reason: None })
            .await
            .unwrap();

        let outcome = service
            .act(
                "b@school.org",
                ApproveRecoveryRequest {
                    request_id: request.id.clone(),
                    action: RecoveryAction::Reject,
                    new_password: None,
                    approver_email: Some("B@school.org".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(outcome.request.status, RecoveryStatus::Rejected);
        assert_eq!(outcome.request.rejected_by.as_deref(), Some("b@school.org"));

        let err = service.act("c@school.org", approve("nope", None)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn password_is_untouched_when_the_completed_request_cannot_be_stored() {
        let tmp = TempDir::new().unwrap();
        let (service, admins) = setup(&tmp).await;
        let request = service
            .request(CreateRecoveryRequest { email: "a@school.org".into(), reason: None })
            .await
            .unwrap();
        service.act("b@school.org", approve(&request.id, None)).await.unwrap();

        // The store writes through a sibling temp file; a directory in its place fails the write
        std::fs::create_dir(tmp.path().join("recovery-requests.json.tmp")).unwrap();
        let err = service
            .act("c@school.org", approve(&request.id, Some("fresh-pass")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Io(_)));

        admins.authenticate("a@school.org", "secret1").await.unwrap();
        assert!(admins.authenticate("a@school.org", "fresh-pass").await.is_err());
        let pending = service.list_pending().await.unwrap();
        assert_eq!(pending[0].status, RecoveryStatus::Pending);
        assert_eq!(pending[0].approvals.len(), 1);
    }

    #[tokio::test]
    async fn failed_reset_reopens_the_request() {
        let tmp = TempDir::new().unwrap();
        let (service, admins) = setup(&tmp).await;
        let request = service
            .request(CreateRecoveryRequest { email: "c@school.org".into(), reason: None })
            .await
            .unwrap();
        service.act("a@school.org", approve(&request.id, None)).await.unwrap();

        // The account disappears before the final approval
        admins.remove("c@school.org").await.unwrap();
        let err = service
            .act("b@school.org", approve(&request.id, Some("fresh-pass")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let pending = service.list_pending().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].approvals.len(), 1);
        assert!(pending[0].recovery_token.is_none());
    }
}
