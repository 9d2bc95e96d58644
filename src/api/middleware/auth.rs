use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::{
    api::state::AppState,
    auth::extract_token,
    error::AppError,
};

/// The signed-in admin, available to handlers behind [`require_auth`].
#[derive(Debug, Clone)]
pub struct CurrentAdmin {
    pub email: String,
    pub token: String,
}

pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(request.headers(), &jar).ok_or(AppError::Unauthorized)?;

    let auth_service = &state.service_context.auth_service;
    let session = auth_service
        .validate_session(&token)
        .await
        .ok_or(AppError::Unauthorized)?;

    // The account may have been removed or deactivated since login
    let Some(admin) = state
        .service_context
        .admin_service
        .find_active(&session.admin_email)
        .await?
    else {
        auth_service.invalidate_session(&token).await;
        return Err(AppError::Unauthorized);
    };

    request.extensions_mut().insert(CurrentAdmin {
        email: admin.email,
        token,
    });

    Ok(next.run(request).await)
}
