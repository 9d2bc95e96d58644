use axum::{
    extract::State,
    Extension, Json,
};
use serde_json::{json, Value};

use crate::{
    api::{extract::ValidatedJson, middleware::auth::CurrentAdmin, state::AppState},
    domain::{AdminCount, AdminSummary, CreateAdminRequest, EditAdminRequest, RemoveAdminRequest},
    error::{AppError, Result},
};

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAdmin>,
    ValidatedJson(request): ValidatedJson<CreateAdminRequest>,
) -> Result<Json<Value>> {
    let admin = state.service_context.admin_service.create(request).await?;
    tracing::info!("{} added admin {}", current.email, admin.email);
    Ok(Json(json!({
        "success": true,
        "message": "Admin created",
        "admin": admin,
    })))
}

pub async fn edit(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<EditAdminRequest>,
) -> Result<Json<Value>> {
    let admin = state.service_context.admin_service.edit(request).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Admin updated",
        "admin": admin,
    })))
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAdmin>,
    ValidatedJson(request): ValidatedJson<RemoveAdminRequest>,
) -> Result<Json<Value>> {
    if request.email.trim().eq_ignore_ascii_case(&current.email) {
        return Err(AppError::BadRequest("You cannot remove your own account".to_string()));
    }

    state.service_context.admin_service.remove(&request.email).await?;
    tracing::info!("{} removed admin {}", current.email, request.email);
    Ok(Json(json!({ "success": true, "message": "Admin removed" })))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<AdminSummary>>> {
    Ok(Json(state.service_context.admin_service.list().await?))
}

pub async fn count(State(state): State<AppState>) -> Result<Json<AdminCount>> {
    Ok(Json(state.service_context.admin_service.count().await?))
}
