use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use crate::domain::*;
use crate::error::Result;

pub mod json_store;
pub mod announcement_repository;
pub mod gallery_repository;
pub mod admin_repository;
pub mod recovery_repository;
pub mod result_repository;

pub use json_store::{next_id, JsonStore};

pub type JsonAnnouncementRepository = JsonStore<Announcement>;
pub type JsonGalleryRepository = JsonStore<GalleryPhoto>;
pub type JsonAdminRepository = JsonStore<AdminAccount>;
pub type JsonRecoveryRepository = JsonStore<RecoveryRequest>;
pub type JsonResultRepository = JsonStore<AcademicResult>;

#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    /// Newest first.
    async fn list(&self) -> Result<Vec<Announcement>>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Announcement>>;
    async fn create(&self, announcement: Announcement) -> Result<Announcement>;
    /// Returns the removed announcement, if there was one.
    async fn delete(&self, id: i64) -> Result<Option<Announcement>>;
}

#[async_trait]
pub trait GalleryRepository: Send + Sync {
    /// Newest first.
    async fn list(&self) -> Result<Vec<GalleryPhoto>>;
    async fn find_by_id(&self, id: i64) -> Result<Option<GalleryPhoto>>;
    async fn create(&self, photo: GalleryPhoto) -> Result<GalleryPhoto>;
    async fn update(&self, id: i64, patch: GalleryPatch) -> Result<Option<GalleryPhoto>>;
    async fn delete(&self, id: i64) -> Result<Option<GalleryPhoto>>;
}

#[async_trait]
pub trait AdminRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<AdminAccount>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<AdminAccount>>;
    async fn create(&self, admin: AdminAccount) -> Result<AdminAccount>;
    /// Replaces the account stored under `email`; `admin.email` may differ (rename).
    async fn update(&self, email: &str, admin: AdminAccount) -> Result<AdminAccount>;
    async fn delete(&self, email: &str) -> Result<bool>;
}

#[async_trait]
pub trait RecoveryRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<RecoveryRequest>>;
    async fn find_by_id(&self, id: &str) -> Result<Option<RecoveryRequest>>;
    /// Fails with a conflict if the email already has a pending request.
    async fn create(&self, request: RecoveryRequest) -> Result<RecoveryRequest>;
    async fn update(&self, request: RecoveryRequest) -> Result<RecoveryRequest>;
    /// Marks stale pending requests as expired, returning how many changed.
    async fn expire_stale(&self, now: DateTime<Utc>, ttl: Duration) -> Result<usize>;
}

#[async_trait]
pub trait ResultRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<AcademicResult>>;
    async fn create(&self, result: AcademicResult) -> Result<AcademicResult>;
    async fn delete(&self, id: i64) -> Result<Option<AcademicResult>>;
}
