/**
 * Server Initialization
 *
 * Builds the application state from a loaded configuration and an open
 * database pool, then assembles the router. Binding the listener and
 * shutdown live in `main`.
 */

use axum::Router;
use sqlx::SqlitePool;

use crate::backend::routes::router::create_router;
use crate::backend::server::config::AppConfig;
use crate::backend::server::state::AppState;

pub fn create_app(config: AppConfig, pool: SqlitePool) -> Router<()> {
    tracing::info!("Initializing Love Letters backend");
    tracing::debug!(config = ?config, "Loaded configuration");

    if config.public_base_url.is_none() {
        tracing::warn!(
            "PUBLIC_BASE_URL is not set, upload URLs fall back to localhost:{}",
            config.port
        );
    }

    let app_state = AppState::new(config, pool);

    tracing::info!(
        spotify = app_state.spotify.is_some(),
        upload_dir = %app_state.config.upload_dir.display(),
        "Router configured"
    );

    create_router(app_state)
}
