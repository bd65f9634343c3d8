use std::sync::Arc;
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clubgrid::{
    api,
    clock::{Clock, SystemClock},
    config::Settings,
    mail::{Mailer, SmtpMailer},
    service::ServiceContext,
    storage::LocalObjectStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clubgrid=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    tracing::info!("Starting ClubGrid server on {}:{}", settings.server.host, settings.server.port);

    // Initialize database
    let db_pool = SqlitePoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect(&settings.database.url)
        .await?;

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    // Outbound mail is optional
    let mailer: Option<Arc<dyn Mailer>> = match &settings.mail {
        Some(mail_config) => {
            tracing::info!("Mail delivery via {}", mail_config.smtp_host);
            Some(Arc::new(SmtpMailer::new(mail_config)?))
        }
        None => {
            tracing::info!("Mail not configured, notifications will be skipped");
            None
        }
    };

    let object_store = Arc::new(LocalObjectStore::new(
        &settings.storage.root_dir,
        &settings.storage.public_url_prefix,
    ));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // Create service context
    let service_context = Arc::new(ServiceContext::new(
        db_pool.clone(),
        &settings,
        clock,
        mailer,
        object_store,
    ));

    match service_context.auth_service.cleanup_expired_sessions().await {
        Ok(removed) if removed > 0 => tracing::info!("Removed {} expired sessions", removed),
        Ok(_) => {}
        Err(e) => tracing::warn!("Session cleanup failed: {}", e),
    }

    let settings = Arc::new(settings);
    let app = api::create_app(service_context, settings.clone());

    let listener = tokio::net::TcpListener::bind(
        format!("{}:{}", settings.server.host, settings.server.port)
    ).await?;

    tracing::info!("Server listening on http://{}:{}", settings.server.host, settings.server.port);

    axum::serve(listener, app).await?;

    Ok(())
}
