use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;

use crate::{
    config::UploadConfig,
    content,
    domain::*,
    error::{AppError, Result},
    repository::{next_id, AnnouncementRepository},
    web::uploads,
};

pub struct AnnouncementService {
    repo: Arc<dyn AnnouncementRepository>,
    uploads_dir: PathBuf,
    upload_limits: UploadConfig,
    preview_chars: usize,
}

impl AnnouncementService {
    pub fn new(
        repo: Arc<dyn AnnouncementRepository>,
        uploads_dir: PathBuf,
        upload_limits: UploadConfig,
        preview_chars: usize,
    ) -> Self {
        Self {
            repo,
            uploads_dir,
            upload_limits,
            preview_chars,
        }
    }

    /// Newest first, each with a bounded preview of its body.
    pub async fn list(&self) -> Result<Vec<AnnouncementView>> {
        let announcements = self.repo.list().await?;

        Ok(announcements
            .into_iter()
            .map(|mut announcement| {
                let excerpt = content::excerpt(&announcement.content, self.preview_chars);
                // Stored bodies are sanitized on write; records written by hand are not.
                announcement.content = excerpt.full;
                AnnouncementView {
                    announcement,
                    preview: excerpt.preview,
                    truncated: excerpt.truncated,
                }
            })
            .collect())
    }

    pub async fn create(&self, request: CreateAnnouncementRequest) -> Result<Announcement> {
        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::BadRequest("Title is required".to_string()));
        }

        let body = content::sanitize(&request.content);
        if content::plain_text(&body).trim().is_empty() {
            return Err(AppError::BadRequest("Content is required".to_string()));
        }

        let id = next_id();
        let image = match request.image.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(data_url) => {
                let bytes = uploads::decode_data_url(data_url)?;
                let stem = format!("announcement-{}", id);
                Some(uploads::save_uploaded_image(&self.uploads_dir, &stem, bytes, &self.upload_limits).await?)
            }
            None => None,
        };

        let now = Utc::now();
        let announcement = Announcement {
            id,
            title,
            content: body,
            announcement_type: request.announcement_type,
            date: request.date.unwrap_or_else(|| now.date_naive()),
            image,
            date_created: now,
            date_modified: None,
        };

        let stored_image = announcement.image.clone();
        match self.repo.create(announcement).await {
            Ok(created) => {
                tracing::info!(
                    "Announcement {} created ({}): {}",
                    created.id,
                    created.announcement_type.as_str(),
                    created.title
                );
                Ok(created)
            }
            Err(e) => {
                if let Some(path) = &stored_image {
                    uploads::delete_uploaded_file(&self.uploads_dir, path).await;
                }
                Err(e)
            }
        }
    }

    /// Returns whether anything was removed. Unknown ids are not an error.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let Some(removed) = self.repo.delete(id).await? else {
            return Ok(false);
        };

        if let Some(image) = &removed.image {
            uploads::delete_uploaded_file(&self.uploads_dir, image).await;
        }
        tracing::info!("Announcement {} deleted", id);
        Ok(true)
    }
}
