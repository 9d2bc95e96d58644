use std::sync::Arc;

use chrono::Utc;

use crate::{
    auth::AuthService,
    domain::*,
    error::{AppError, Result},
    repository::AdminRepository,
};

pub struct AdminService {
    repo: Arc<dyn AdminRepository>,
    auth_service: Arc<AuthService>,
    protected_admin: String,
}

impl AdminService {
    pub fn new(repo: Arc<dyn AdminRepository>, auth_service: Arc<AuthService>, protected_admin: &str) -> Self {
        Self {
            repo,
            auth_service,
            protected_admin: normalize_email(protected_admin),
        }
    }

    pub fn protected_admin(&self) -> &str {
        &self.protected_admin
    }

    /// Active admin with this email, if any.
    pub async fn find_active(&self, email: &str) -> Result<Option<AdminAccount>> {
        Ok(self
            .repo
            .find_by_email(&normalize_email(email))
            .await?
            .filter(|a| a.active))
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> Result<AdminAccount> {
        let Some(admin) = self.find_active(email).await? else {
            tracing::warn!("Login attempt for unknown or inactive admin {}", email);
            return Err(AppError::InvalidCredentials);
        };

        if !AuthService::verify_password(password, &admin.password_hash).await? {
            tracing::warn!("Failed login for {}", admin.email);
            return Err(AppError::InvalidCredentials);
        }

        Ok(admin)
    }

    pub async fn create(&self, request: CreateAdminRequest) -> Result<AdminSummary> {
        let now = Utc::now();
        let admin = AdminAccount {
            email: normalize_email(&request.email),
            password_hash: AuthService::hash_password(&request.password).await?,
            active: true,
            created_at: now,
            updated_at: now,
        };

        let created = self.repo.create(admin).await?;
        tracing::info!("Admin {} created", created.email);
        Ok(AdminSummary::from_account(&created, &self.protected_admin))
    }

    pub async fn edit(&self, request: EditAdminRequest) -> Result<AdminSummary> {
        let email = normalize_email(&request.email);
        let mut admin = self
            .repo
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::NotFound("Admin not found".to_string()))?;

        let new_email = request
            .new_email
            .as_deref()
            .map(normalize_email)
            .filter(|e| *e != email);
        let is_protected = email == self.protected_admin;

        if is_protected && new_email.is_some() {
            return Err(AppError::Forbidden("The primary admin's email cannot be changed".to_string()));
        }
        if is_protected && request.active == Some(false) {
            return Err(AppError::Forbidden("The primary admin cannot be deactivated".to_string()));
        }

        let mut revoke_sessions = false;
        if let Some(new_email) = new_email {
            admin.email = new_email;
            revoke_sessions = true;
        }
        if let Some(password) = &request.password {
            admin.password_hash = AuthService::hash_password(password).await?;
            revoke_sessions = true;
        }
        if let Some(active) = request.active {
            revoke_sessions |= admin.active && !active;
            admin.active = active;
        }
        admin.updated_at = Utc::now();

        let updated = self.repo.update(&email, admin).await?;
        if revoke_sessions {
            self.auth_service.invalidate_admin_sessions(&email).await;
        }

        tracing::info!("Admin {} updated", updated.email);
        Ok(AdminSummary::from_account(&updated, &self.protected_admin))
    }

    pub async fn remove(&self, email: &str) -> Result<()> {
        let email = normalize_email(email);
        if email == self.protected_admin {
            return Err(AppError::Forbidden("The primary admin cannot be removed".to_string()));
        }

        if !self.repo.delete(&email).await? {
            return Err(AppError::NotFound("Admin not found".to_string()));
        }
        self.auth_service.invalidate_admin_sessions(&email).await;

        tracing::info!("Admin {} removed", email);
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<AdminSummary>> {
        Ok(self
            .repo
            .list()
            .await?
            .iter()
            .map(|a| AdminSummary::from_account(a, &self.protected_admin))
            .collect())
    }

    pub async fn count(&self) -> Result<AdminCount> {
        Ok(AdminCount::from_accounts(&self.repo.list().await?))
    }

    /// Set a new password for `email`, logging it out everywhere.
    pub async fn reset_password(&self, email: &str, password: &str) -> Result<()> {
        let mut admin = self
            .repo
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound("Admin not found".to_string()))?;

        admin.password_hash = AuthService::hash_password(password).await?;
        admin.updated_at = Utc::now();
        self.repo.update(email, admin).await?;
        self.auth_service.invalidate_admin_sessions(email).await;
        Ok(())
    }

    /// Create the primary admin on first start, when there are no admins yet.
    pub async fn bootstrap(&self, password: Option<&str>) -> Result<()> {
        if !self.repo.list().await?.is_empty() {
            return Ok(());
        }

        let Some(password) = password.filter(|p| !p.is_empty()) else {
            tracing::warn!(
                "No admin accounts exist and no bootstrap password is configured; admin pages are unusable"
            );
            return Ok(());
        };

        self.create(CreateAdminRequest {
            email: self.protected_admin.clone(),
            password: password.to_string(),
        })
        .await?;
        tracing::info!("Bootstrapped primary admin {}", self.protected_admin);
        Ok(())
    }
}
