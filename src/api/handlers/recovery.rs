use axum::{
    extract::State,
    Extension, Json,
};
use serde_json::{json, Value};

use crate::{
    api::{extract::ValidatedJson, middleware::auth::CurrentAdmin, state::AppState},
    domain::{ApproveRecoveryRequest, CreateRecoveryRequest, RecoveryRequest},
    error::Result,
};

pub async fn request_recovery(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateRecoveryRequest>,
) -> Result<Json<Value>> {
    let created = state.service_context.recovery_service.request(request).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Recovery request submitted. Please contact other admins for approval.",
        "requestId": created.id,
    })))
}

pub async fn list_pending(State(state): State<AppState>) -> Result<Json<Vec<RecoveryRequest>>> {
    Ok(Json(state.service_context.recovery_service.list_pending().await?))
}

pub async fn act(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAdmin>,
    ValidatedJson(request): ValidatedJson<ApproveRecoveryRequest>,
) -> Result<Json<Value>> {
    let outcome = state
        .service_context
        .recovery_service
        .act(&current.email, request)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": outcome.message,
        "request": outcome.request,
    })))
}
