use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    api::{extract::ValidatedJson, handlers::IdQuery, state::AppState},
    domain::{GalleryCategory, GalleryPhoto, UpdateGalleryPhotoRequest, UpdateGalleryTitleRequest},
    error::{AppError, Result},
    service::gallery_service::PhotoUpload,
};

#[derive(Debug, Deserialize)]
pub struct GalleryQuery {
    pub category: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<GalleryQuery>,
) -> Result<Json<Vec<GalleryPhoto>>> {
    let photos = state
        .service_context
        .gallery_service
        .list(query.category.as_deref())
        .await?;
    Ok(Json(photos))
}

pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<GalleryCategory>>> {
    Ok(Json(state.service_context.gallery_service.categories().await?))
}

/// Multipart form: `title`, optional `category`, and one or more image files.
pub async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> Result<Json<Value>> {
    let mut title = None;
    let mut category = None;
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if let Some(filename) = field.file_name().map(str::to_string) {
            let data = field.bytes().await?;
            // Browsers send an empty part when no file was chosen
            if !data.is_empty() {
                files.push(PhotoUpload {
                    filename,
                    data: data.to_vec(),
                });
            }
            continue;
        }

        match name.as_str() {
            "title" => title = Some(field.text().await?),
            "category" => category = Some(field.text().await?),
            other => tracing::debug!("Ignoring unexpected gallery form field {}", other),
        }
    }

    let title = title.ok_or_else(|| AppError::BadRequest("Title is required".to_string()))?;
    let outcome = state
        .service_context
        .gallery_service
        .upload(&title, category.as_deref(), files)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("{} photo(s) uploaded", outcome.photos.len()),
        "photos": outcome.photos,
        "skipped": outcome.skipped,
    })))
}

pub async fn update(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<UpdateGalleryPhotoRequest>,
) -> Result<Json<Value>> {
    let photo = state.service_context.gallery_service.update(request).await?;
    Ok(Json(json!({ "success": true, "photo": photo })))
}

pub async fn update_title(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<UpdateGalleryTitleRequest>,
) -> Result<Json<Value>> {
    let photo = state.service_context.gallery_service.update_title(request).await?;
    Ok(Json(json!({ "success": true, "photo": photo })))
}

pub async fn delete(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<Value>> {
    let id = query.require("Photo")?;
    state.service_context.gallery_service.delete(id).await?;
    Ok(Json(json!({ "success": true })))
}
