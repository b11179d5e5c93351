//! SENTRA Server — application entry point.

use std::net::SocketAddr;

use anyhow::Context;
use sentra_server::{AppState, ServerConfig, build_router};
use tokio::signal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration — fail fast if invalid.
    let config = ServerConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(config.log_level.parse().context("invalid LOG_LEVEL")?),
        )
        .json()
        .init();

    tracing::info!("Starting SENTRA server");

    let db = sentra_db::DbManager::connect(&config.db).await?;
    sentra_db::run_migrations(db.client()).await?;

    let auth_config = config.auth_config()?;
    let state = AppState::new(db.client().clone(), auth_config);

    // The built-in roles are load-bearing: resolving the first login
    // fails without them, so reconcile the catalog before serving.
    state
        .gate
        .engine()
        .ensure_builtin_roles()
        .await
        .context("seeding built-in roles")?;

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        },
    }
}
