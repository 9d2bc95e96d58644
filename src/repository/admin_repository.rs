use async_trait::async_trait;

use crate::{
    domain::AdminAccount,
    error::{AppError, Result},
    repository::{AdminRepository, JsonStore},
};

#[async_trait]
impl AdminRepository for JsonStore<AdminAccount> {
    async fn list(&self) -> Result<Vec<AdminAccount>> {
        self.load().await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AdminAccount>> {
        Ok(self.load().await?.into_iter().find(|a| a.email == email))
    }

    async fn create(&self, admin: AdminAccount) -> Result<AdminAccount> {
        self.mutate(|admins| {
            if admins.iter().any(|a| a.email == admin.email) {
                return Err(AppError::Conflict("Admin already exists".to_string()));
            }
            admins.push(admin.clone());
            Ok(admin)
        })
        .await
    }

    async fn update(&self, email: &str, admin: AdminAccount) -> Result<AdminAccount> {
        self.mutate(|admins| {
            if admin.email != email && admins.iter().any(|a| a.email == admin.email) {
                return Err(AppError::Conflict("Another admin already uses that email".to_string()));
            }
            let slot = admins
                .iter_mut()
                .find(|a| a.email == email)
                .ok_or_else(|| AppError::NotFound("Admin not found".to_string()))?;
            *slot = admin.clone();
            Ok(admin)
        })
        .await
    }

    async fn delete(&self, email: &str) -> Result<bool> {
        Ok(!self.remove_where(|a| a.email == email).await?.is_empty())
    }
}
