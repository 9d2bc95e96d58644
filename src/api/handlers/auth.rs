use axum::{
    extract::State,
    http::HeaderMap,
    Json,
};
use axum_extra::extract::CookieJar;
use serde_json::{json, Value};

use crate::{
    api::{extract::ValidatedJson, state::AppState},
    auth::{extract_token, AuthService, LoginStamp},
    domain::{display_name, LoginRequest},
    error::Result,
};

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<Value>)> {
    let admin = state
        .service_context
        .admin_service
        .authenticate(&req.email, &req.password)
        .await?;

    let auth_service = &state.service_context.auth_service;
    let (session, token) = auth_service.create_session(&admin.email).await;
    let cookie = auth_service.create_session_cookie(&token, state.settings.auth.secure_cookies);
    let stamp = LoginStamp::new(session.created_at);

    tracing::info!("Admin {} logged in", admin.email);

    Ok((
        jar.add(cookie),
        Json(json!({
            "success": true,
            "token": token,
            "email": display_name(&admin.email),
            "loginTime": stamp.login_time,
            "expiresAt": session.expires_at,
            "session": stamp,
        })),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> (CookieJar, Json<Value>) {
    if let Some(token) = extract_token(&headers, &jar) {
        state.service_context.auth_service.invalidate_session(&token).await;
    }

    (
        jar.add(AuthService::create_logout_cookie()),
        Json(json!({ "success": true })),
    )
}
