use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use event_registration_api::{
    app::{self, Backends},
    config::{Config, StorageBackend},
    middleware,
    services::EmailService,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load().context("failed to load configuration")?;

    middleware::init_logging(&config.logging);
    middleware::init_metrics().context("failed to install metrics recorder")?;

    info!(
        "Starting event registration API v{}",
        env!("CARGO_PKG_VERSION")
    );

    info!("Admin API key configured");

    let email = EmailService::new(config.email.clone());
    if !email.is_enabled() {
        warn!("Email delivery is disabled; registrations will report emailSent=false");
    }
    let notifier = Arc::new(email);

    let backends = match config.storage.backend {
        StorageBackend::Postgres => {
            let pool = persistence::db::create_pool(&config.database)
                .await
                .context("failed to connect to database")?;

            info!("Running database migrations...");
            sqlx::migrate!("../persistence/src/migrations")
                .run(&pool)
                .await?;
            info!("Migrations completed");

            Backends::postgres(pool, notifier)
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; data is lost on restart");
            Backends::in_memory(notifier)
        }
    };

    let addr = config.socket_addr().context("invalid server address")?;
    let app = app::create_app(config, backends);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
