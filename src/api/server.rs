use std::net::SocketAddr;

use axum::{Router, routing::get, routing::post};
use tokio::net::TcpListener;
use tracing::info;

use super::services::{echo, health};
use super::state::AppState;
use crate::config::Config;
use crate::handlers::ContentSettings;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Router with all demo routes attached to `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", post(echo))
        .route("/health", get(health))
        .with_state(state)
}

pub async fn run(address: Option<SocketAddr>) -> Result<(), AnyError> {
    info!("Loading configuration");
    let config = Config::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let address = address.unwrap_or(config.server.bind_addr);

    let mut settings = ContentSettings::with_defaults();
    settings.set_default_content_type(Some(config.content.default_content_type.clone()));

    let state = AppState::new(config, settings);
    let app = router(state);

    let listener = TcpListener::bind(address).await?;
    info!(%address, "mimebox demo server listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = signal(SignalKind::terminate())
            .expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
