use axum::{http::StatusCode, Json, response::IntoResponse};
use serde_json::json;

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}

pub async fn api_info() -> impl IntoResponse {
    Json(json!({
        "name": "Schoolhouse API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "operational",
        "endpoints": {
            "announcements": "/api/announcements",
            "gallery": "/api/gallery",
            "results": "/api/results",
            "auth": "/api/auth",
            "health": "/health"
        }
    }))
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({
        "success": false,
        "message": "API endpoint not found"
    })))
}
