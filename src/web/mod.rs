pub mod uploads;

use axum::{
    extract::Request,
    handler::HandlerWithoutStateExt,
    http::{header, HeaderValue, StatusCode, Uri},
    response::{Html, IntoResponse},
    Router,
};
use tower_http::{services::ServeDir, set_header::SetResponseHeaderLayer};

use crate::config::Settings;

/// Static site plus stored uploads. Every response is marked uncacheable so
/// edits to the site show up without a hard refresh.
pub fn create_web_routes(settings: &Settings) -> Router {
    let site = ServeDir::new(&settings.server.public_dir)
        .not_found_service(not_found_page.into_service());
    let uploads = ServeDir::new(&settings.storage.uploads_dir)
        .not_found_service(not_found_page.into_service());

    Router::new()
        .nest_service("/uploads", uploads)
        .fallback_service(site)
        .layer(axum::middleware::map_request(resolve_page_path))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate, max-age=0"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::PRAGMA,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::EXPIRES,
            HeaderValue::from_static("0"),
        ))
}

/// `/about` is served from `about.html`. `/` falls through to `index.html`.
async fn resolve_page_path(mut request: Request) -> Request {
    if let Some(rewritten) = page_path(request.uri()) {
        *request.uri_mut() = rewritten;
    }
    request
}

fn page_path(uri: &Uri) -> Option<Uri> {
    let path = uri.path();
    let last = path.rsplit('/').next().unwrap_or_default();
    if path.ends_with('/') || last.is_empty() || last.contains('.') {
        return None;
    }

    let rewritten = match uri.query() {
        Some(query) => format!("{}.html?{}", path, query),
        None => format!("{}.html", path),
    };
    rewritten.parse().ok()
}

async fn not_found_page() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Html("<h1>404 - Page Not Found</h1>"))
}
