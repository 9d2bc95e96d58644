pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    Router,
    routing::{get, post, put},
};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::TraceLayer,
};
use std::sync::Arc;

use crate::{
    config::Settings,
    service::ServiceContext,
};
use state::AppState;

pub fn create_app(service_context: Arc<ServiceContext>, settings: Arc<Settings>) -> Router {
    let app_state = AppState::new(service_context, settings);

    Router::new()
        .route("/health", get(handlers::root::health_check))
        .nest("/api", api_routes(app_state.clone()))
        .with_state(app_state)

        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn api_routes(state: AppState) -> Router<AppState> {
    // Image-carrying routes get room for full-size uploads; the per-file
    // ceiling is enforced when the image is stored.
    let uploads = &state.settings.uploads;
    let announcement_limit = DefaultBodyLimit::max(uploads.announcement_body_limit());
    let gallery_limit = DefaultBodyLimit::max(uploads.gallery_body_limit());

    Router::new()
        .route("/", get(handlers::root::api_info))
        .nest("/announcements", announcement_routes(state.clone()).layer(announcement_limit))
        .nest("/gallery", gallery_routes(state.clone()).layer(gallery_limit))
        .nest("/results", result_routes(state.clone()))
        .merge(auth_routes())
        .merge(admin_routes(state.clone()))
        .merge(recovery_routes(state))
        .fallback(handlers::root::not_found)
}

fn announcement_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Reading is public; writing needs a session
        .route("/", get(handlers::announcements::list).merge(
            post(handlers::announcements::create)
                .delete(handlers::announcements::delete)
                .route_layer(axum::middleware::from_fn_with_state(
                    state,
                    middleware::auth::require_auth,
                )),
        ))
}

fn gallery_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::gallery::list).merge(
            post(handlers::gallery::upload)
                .put(handlers::gallery::update)
                .delete(handlers::gallery::delete)
                .route_layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    middleware::auth::require_auth,
                )),
        ))
        .route("/categories", get(handlers::gallery::categories))
        .route("/update", put(handlers::gallery::update_title).route_layer(
            axum::middleware::from_fn_with_state(state, middleware::auth::require_auth),
        ))
}

fn result_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::results::list).merge(
            post(handlers::results::create)
                .delete(handlers::results::delete)
                .route_layer(axum::middleware::from_fn_with_state(
                    state,
                    middleware::auth::require_auth,
                )),
        ))
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .route("/admin-count", get(handlers::admins::count))
        .route("/password-recovery", post(handlers::recovery::request_recovery))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/create-admin", post(handlers::admins::create))
        .route("/edit-admin", post(handlers::admins::edit))
        .route("/remove-admin", post(handlers::admins::remove))
        .route("/admins-list", get(handlers::admins::list))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ))
}

fn recovery_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/recovery-requests", get(handlers::recovery::list_pending))
        .route("/approve-recovery", post(handlers::recovery::act))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ))
}
