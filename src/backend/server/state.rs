/**
 * Application State
 *
 * `AppState` is cloned into every handler. It holds the database pool, the
 * loaded configuration, the optional Spotify client and the rate limiter.
 *
 * # State Extraction
 *
 * The `FromRef` implementations let handlers extract only the part they
 * need:
 *
 * ```rust,ignore
 * async fn handler(State(pool): State<SqlitePool>) {}
 * async fn spotify(State(client): State<Option<SpotifyClient>>) {}
 * ```
 */

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::backend::middleware::RateLimiter;
use crate::backend::server::config::AppConfig;
use crate::backend::spotify::SpotifyClient;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    /// `None` when Spotify credentials are not configured
    pub spotify: Option<SpotifyClient>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(config: AppConfig, db: SqlitePool) -> Self {
        let spotify = match config.spotify.clone() {
            Some(spotify_config) => match SpotifyClient::new(spotify_config) {
                Ok(client) => Some(client),
                Err(e) => {
                    tracing::error!("Failed to build Spotify client, Spotify routes disabled: {}", e);
                    None
                }
            },
            None => {
                tracing::info!("Spotify is not configured");
                None
            }
        };

        let rate_limiter = Arc::new(RateLimiter::new(
            config.rate_limit_requests,
            config.rate_limit_window,
        ));

        Self {
            db,
            config: Arc::new(config),
            spotify,
            rate_limiter,
        }
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Option<SpotifyClient> {
    fn from_ref(state: &AppState) -> Self {
        state.spotify.clone()
    }
}
