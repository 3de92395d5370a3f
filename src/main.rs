use std::sync::Arc;

use todo_sessions_api::{config::Config, db, error::StartupError, route::create_router, AppState};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Entry point of the application
#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_level))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Connect to the database, creating the file if needed
    let pool = db::connect(&config.database_url, config.max_connections).await?;
    info!("Connected to {}", config.database_url);

    db::create_schema(&pool).await?;
    info!("Database schema ready");

    let app_state = Arc::new(AppState { db: pool });
    let app = create_router(app_state);

    info!("Server listening on {}", config.bind_address);
    axum::Server::try_bind(&config.bind_address)?
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => warn!("Received Ctrl+C, shutting down"),
        Err(e) => {
            warn!("Unable to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await
        }
    }
}
