use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::{
    config::UploadConfig,
    domain::*,
    error::{AppError, Result},
    repository::{next_id, GalleryRepository},
    web::uploads,
};

/// One file taken from a multipart upload.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub filename: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Serialize)]
pub struct UploadOutcome {
    pub photos: Vec<GalleryPhoto>,
    pub skipped: Vec<SkippedUpload>,
}

pub struct GalleryService {
    repo: Arc<dyn GalleryRepository>,
    uploads_dir: PathBuf,
    upload_limits: UploadConfig,
}

impl GalleryService {
    pub fn new(repo: Arc<dyn GalleryRepository>, uploads_dir: PathBuf, upload_limits: UploadConfig) -> Self {
        Self {
            repo,
            uploads_dir,
            upload_limits,
        }
    }

    pub async fn list(&self, category: Option<&str>) -> Result<Vec<GalleryPhoto>> {
        let photos = self.repo.list().await?;
        let Some(raw) = category.filter(|c| !c.trim().is_empty()) else {
            return Ok(photos);
        };

        let wanted = normalize_category(Some(raw));
        Ok(photos.into_iter().filter(|p| p.category == wanted).collect())
    }

    pub async fn categories(&self) -> Result<Vec<GalleryCategory>> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for photo in self.repo.list().await? {
            *counts.entry(photo.category).or_default() += 1;
        }

        Ok(counts
            .into_iter()
            .map(|(name, count)| GalleryCategory { name, count })
            .collect())
    }

    /// Store every file under `title`, numbering titles when there are several.
    ///
    /// Files that are not images, or are too large, are skipped and reported.
    /// The upload fails only when nothing could be stored.
    pub async fn upload(
        &self,
        title: &str,
        category: Option<&str>,
        files: Vec<PhotoUpload>,
    ) -> Result<UploadOutcome> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::BadRequest("Title is required".to_string()));
        }
        if files.is_empty() {
            return Err(AppError::BadRequest("No image files were uploaded".to_string()));
        }
        if files.len() > self.upload_limits.max_files {
            return Err(AppError::BadRequest(format!(
                "At most {} photos can be uploaded at once",
                self.upload_limits.max_files
            )));
        }

        let category = normalize_category(category);
        let multiple = files.len() > 1;
        let mut photos = Vec::new();
        let mut skipped = Vec::new();
        let mut first_rejection = None;

        for (index, file) in files.into_iter().enumerate() {
            let id = next_id();
            let stem = format!("gallery-{}", id);

            let image = match uploads::save_uploaded_image(&self.uploads_dir, &stem, file.data, &self.upload_limits).await {
                Ok(path) => path,
                Err(e @ (AppError::BadRequest(_) | AppError::PayloadTooLarge(_))) => {
                    tracing::warn!("Skipping gallery upload {}: {}", file.filename, e);
                    skipped.push(SkippedUpload {
                        filename: file.filename,
                        message: e.to_string(),
                    });
                    first_rejection.get_or_insert(e);
                    continue;
                }
                Err(e) => return Err(e),
            };

            let now = Utc::now();
            let photo = GalleryPhoto {
                id,
                title: if multiple { numbered_title(title, index) } else { title.to_string() },
                category: category.clone(),
                image,
                date: now.date_naive(),
                date_created: now,
            };
            photos.push(self.repo.create(photo).await?);
        }

        if photos.is_empty() {
            if let Some(e) = first_rejection {
                return Err(e);
            }
        }

        tracing::info!(
            "Gallery upload \"{}\": {} stored, {} skipped",
            title,
            photos.len(),
            skipped.len()
        );
        Ok(UploadOutcome { photos, skipped })
    }

    pub async fn update(&self, request: UpdateGalleryPhotoRequest) -> Result<GalleryPhoto> {
        let title = request.title.map(|t| t.trim().to_string());
        if title.as_deref() == Some("") {
            return Err(AppError::BadRequest("Title cannot be empty".to_string()));
        }

        let patch = GalleryPatch {
            title,
            category: request.category,
        };
        self.repo
            .update(request.id, patch)
            .await?
            .ok_or_else(|| AppError::NotFound("Photo not found".to_string()))
    }

    pub async fn update_title(&self, request: UpdateGalleryTitleRequest) -> Result<GalleryPhoto> {
        self.update(UpdateGalleryPhotoRequest {
            id: request.id,
            title: Some(request.title),
            category: None,
        })
        .await
    }

    /// Returns whether anything was removed. The image file is removed best-effort.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let Some(removed) = self.repo.delete(id).await? else {
            return Ok(false);
        };
        uploads::delete_uploaded_file(&self.uploads_dir, &removed.image).await;
        Ok(true)
    }
}
