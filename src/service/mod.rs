pub mod admin_service;
pub mod announcement_service;
pub mod gallery_service;
pub mod recovery_service;

use std::sync::Arc;

use crate::auth::AuthService;
use crate::config::Settings;
use crate::repository::*;
use admin_service::AdminService;
use announcement_service::AnnouncementService;
use gallery_service::GalleryService;
use recovery_service::RecoveryService;

pub struct ServiceContext {
    pub announcement_repo: Arc<dyn AnnouncementRepository>,
    pub gallery_repo: Arc<dyn GalleryRepository>,
    pub admin_repo: Arc<dyn AdminRepository>,
    pub recovery_repo: Arc<dyn RecoveryRepository>,
    pub result_repo: Arc<dyn ResultRepository>,
    pub auth_service: Arc<AuthService>,
    pub announcement_service: Arc<AnnouncementService>,
    pub gallery_service: Arc<GalleryService>,
    pub admin_service: Arc<AdminService>,
    pub recovery_service: Arc<RecoveryService>,
}

impl ServiceContext {
    pub fn new(
        announcement_repo: Arc<dyn AnnouncementRepository>,
        gallery_repo: Arc<dyn GalleryRepository>,
        admin_repo: Arc<dyn AdminRepository>,
        recovery_repo: Arc<dyn RecoveryRepository>,
        result_repo: Arc<dyn ResultRepository>,
        auth_service: Arc<AuthService>,
        settings: &Settings,
    ) -> Self {
        let uploads_dir = settings.storage.uploads_dir.clone();

        let announcement_service = Arc::new(AnnouncementService::new(
            announcement_repo.clone(),
            uploads_dir.clone(),
            settings.uploads.clone(),
            settings.content.preview_chars,
        ));
        let gallery_service = Arc::new(GalleryService::new(
            gallery_repo.clone(),
            uploads_dir,
            settings.uploads.clone(),
        ));
        let admin_service = Arc::new(AdminService::new(
            admin_repo.clone(),
            auth_service.clone(),
            &settings.auth.protected_admin,
        ));
        let recovery_service = Arc::new(RecoveryService::new(
            recovery_repo.clone(),
            admin_service.clone(),
            settings.recovery.required_approvals,
            settings.recovery.expiry_hours,
        ));

        Self {
            announcement_repo,
            gallery_repo,
            admin_repo,
            recovery_repo,
            result_repo,
            auth_service,
            announcement_service,
            gallery_service,
            admin_service,
            recovery_service,
        }
    }

    /// JSON-file repositories under `storage.data_dir`.
    pub fn from_settings(settings: &Settings) -> Self {
        let data_dir = &settings.storage.data_dir;

        Self::new(
            Arc::new(JsonAnnouncementRepository::in_dir(data_dir, json_store::ANNOUNCEMENTS_FILE)),
            Arc::new(JsonGalleryRepository::in_dir(data_dir, json_store::GALLERY_FILE)),
            Arc::new(JsonAdminRepository::in_dir(data_dir, json_store::ADMINS_FILE)),
            Arc::new(JsonRecoveryRepository::in_dir(data_dir, json_store::RECOVERY_FILE)),
            Arc::new(JsonResultRepository::in_dir(data_dir, json_store::RESULTS_FILE)),
            Arc::new(AuthService::new(settings.auth.session_duration_hours)),
            settings,
        )
    }
}
