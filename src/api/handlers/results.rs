use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::{json, Value};

use crate::{
    api::{extract::ValidatedJson, handlers::IdQuery, state::AppState},
    domain::{AcademicResult, CreateResultRequest, ResultFilter},
    error::Result,
    repository::next_id,
};

pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<ResultFilter>,
) -> Result<Json<Vec<AcademicResult>>> {
    let results = state.service_context.result_repo.list().await?;
    Ok(Json(results.into_iter().filter(|r| filter.matches(r)).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateResultRequest>,
) -> Result<Json<Value>> {
    let result = AcademicResult {
        id: next_id(),
        year: request.year,
        grade: request.grade.trim().to_string(),
        subject: request.subject.trim().to_string(),
        pass_rate: request.pass_rate,
        enrolled: request.enrolled,
        passed: request.passed,
        notes: request.notes.trim().to_string(),
    };

    let result = state.service_context.result_repo.create(result).await?;
    tracing::info!("Result {} added: {} {} {}", result.id, result.year, result.grade, result.subject);
    Ok(Json(json!({ "success": true, "result": result })))
}

pub async fn delete(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<Value>> {
    let id = query.require("Result")?;
    state.service_context.result_repo.delete(id).await?;
    Ok(Json(json!({ "success": true })))
}
