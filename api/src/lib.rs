use std::{env, sync::Arc};

pub mod core;
mod error_handler;
mod routes;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::signal;
use tracing::{error, info};

use crate::routes::{health::health_route::health_route, webhook::github_webhook_route::github_webhook_route};

pub use crate::core::app_state::AppState;
pub use crate::error_handler::{AppError, AppResult};

const DEFAULT_ADDRESS: &str = "0.0.0.0:3000";

/// Builds the HTTP router over shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/webhooks/github", post(github_webhook_route))
        .route("/health", get(health_route))
        .with_state(state)
}

/// Loads configuration and serves webhooks until Ctrl+C.
pub async fn start() -> AppResult<()> {
    let address = env::var("API_ADDRESS").unwrap_or_else(|_| DEFAULT_ADDRESS.into());
    let state = Arc::new(AppState::from_env()?);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(AppError::Bind)?;
    info!(%address, "webhook server listening");

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("webhook server stopped");
    Ok(())
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
