pub mod api;
pub mod auth;
pub mod config;
pub mod content;
pub mod domain;
pub mod error;
pub mod repository;
pub mod service;
pub mod web;

use std::sync::Arc;

use axum::Router;

use crate::{config::Settings, service::ServiceContext};

/// JSON API merged with the static site.
pub fn create_router(service_context: Arc<ServiceContext>, settings: Arc<Settings>) -> Router {
    let web_app = web::create_web_routes(&settings);
    api::create_app(service_context, settings).merge(web_app)
}
