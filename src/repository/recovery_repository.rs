use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::{
    domain::RecoveryRequest,
    error::{AppError, Result},
    repository::{JsonStore, RecoveryRepository},
};

#[async_trait]
impl RecoveryRepository for JsonStore<RecoveryRequest> {
    async fn list(&self) -> Result<Vec<RecoveryRequest>> {
        self.load().await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<RecoveryRequest>> {
        Ok(self.load().await?.into_iter().find(|r| r.id == id))
    }

    async fn create(&self, request: RecoveryRequest) -> Result<RecoveryRequest> {
        self.mutate(|requests| {
            if requests.iter().any(|r| r.email == request.email && r.is_pending()) {
                return Err(AppError::BadRequest(
                    "You already have a pending recovery request".to_string(),
                ));
            }
            requests.push(request.clone());
            Ok(request)
        })
        .await
    }

    async fn update(&self, request: RecoveryRequest) -> Result<RecoveryRequest> {
        self.mutate(|requests| {
            let slot = requests
                .iter_mut()
                .find(|r| r.id == request.id)
                .ok_or_else(|| AppError::NotFound("Recovery request not found".to_string()))?;
            *slot = request.clone();
            Ok(request)
        })
        .await
    }

    async fn expire_stale(&self, now: DateTime<Utc>, ttl: Duration) -> Result<usize> {
        let current = self.load().await?;
        if !current.iter().any(|r| r.is_pending() && now - r.timestamp >= ttl) {
            return Ok(0);
        }

        self.mutate(|requests| {
            Ok(requests
                .iter_mut()
                .map(|r| r.expire_if_stale(now, ttl))
                .filter(|changed| *changed)
                .count())
        })
        .await
    }
}
