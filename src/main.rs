use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use schoolhouse::{config::Settings, create_router, service::ServiceContext};

const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "schoolhouse=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    tracing::info!("Starting schoolhouse on {}:{}", settings.server.host, settings.server.port);

    tokio::fs::create_dir_all(&settings.storage.data_dir).await?;
    tokio::fs::create_dir_all(&settings.storage.uploads_dir).await?;
    if !settings.server.public_dir.is_dir() {
        tracing::warn!(
            "Static site directory {} does not exist; only the API will be served",
            settings.server.public_dir.display()
        );
    }

    let service_context = Arc::new(ServiceContext::from_settings(&settings));

    service_context
        .admin_service
        .bootstrap(settings.auth.bootstrap_password.as_deref())
        .await?;
    let admin_count = service_context.admin_service.count().await?;
    if !admin_count.is_minimum_met {
        tracing::warn!(
            "Only {} active admin(s); password recovery needs at least {}",
            admin_count.current,
            admin_count.minimum
        );
    }

    // Expired sessions are rejected on use; this just keeps the table small
    let auth_service = service_context.auth_service.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = auth_service.cleanup_expired_sessions().await;
            if removed > 0 {
                tracing::debug!("Removed {} expired session(s)", removed);
            }
        }
    });

    let app = create_router(service_context, Arc::new(settings.clone()));

    let listener = tokio::net::TcpListener::bind(
        format!("{}:{}", settings.server.host, settings.server.port)
    ).await?;

    tracing::info!("Server listening on http://{}:{}", settings.server.host, settings.server.port);

    axum::serve(listener, app).await?;

    Ok(())
}
