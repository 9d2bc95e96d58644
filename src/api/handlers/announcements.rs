use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::{json, Value};

use crate::{
    api::{extract::ValidatedJson, handlers::IdQuery, state::AppState},
    domain::{AnnouncementView, CreateAnnouncementRequest},
    error::Result,
};

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<AnnouncementView>>> {
    let announcements = state.service_context.announcement_service.list().await?;
    Ok(Json(announcements))
}

pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateAnnouncementRequest>,
) -> Result<Json<Value>> {
    let announcement = state.service_context.announcement_service.create(request).await?;
    Ok(Json(json!({
        "success": true,
        "announcement": announcement,
    })))
}

pub async fn delete(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<Value>> {
    let id = query.require("Announcement")?;
    state.service_context.announcement_service.delete(id).await?;
    Ok(Json(json!({ "success": true })))
}
