/**
 * Router Configuration
 *
 * Combines the route tables into a single Axum router and applies the
 * middleware stack.
 *
 * # Route Groups
 *
 * 1. **Public**: `/health`, `/auth/...`, `/spotify/login`, `/spotify/callback`
 * 2. **Authenticated**: `/letter/...`, `/user/...`, remaining `/spotify/...`
 *    (bearer token checked by `auth_middleware` via `route_layer`, so
 *    unknown paths still fall through to the 404 handler)
 * 3. **Static**: `/uploads/...` served from the upload directory with
 *    `X-Content-Type-Options: nosniff`
 * 4. **Fallback**: JSON 404
 *
 * # Layers (outermost first)
 *
 * `TraceLayer` → `CorsLayer` → rate limiting → body size limit
 */

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS},
        HeaderName, HeaderValue, Method,
    },
    middleware::from_fn_with_state,
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};

use crate::backend::error::BackendError;
use crate::backend::middleware::{auth_middleware, rate_limit_middleware};
use crate::backend::routes::api_routes::{auth_routes, letter_routes, user_routes};
use crate::backend::routes::spotify_routes::{spotify_public_routes, spotify_routes};
use crate::backend::server::config::AppConfig;
use crate::backend::server::state::AppState;
use crate::backend::spotify::handlers::ACCESS_TOKEN_HEADER;

/// Room for the text fields of a multipart letter on top of two files
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Create the Axum router with all routes and middleware configured
pub fn create_router(app_state: AppState) -> Router<()> {
    let config = app_state.config.clone();

    let public = Router::new()
        .route("/health", get(health))
        .merge(auth_routes())
        .merge(spotify_public_routes());

    let protected = Router::new()
        .merge(letter_routes())
        .merge(user_routes())
        .merge(spotify_routes())
        .route_layer(from_fn_with_state(app_state.clone(), auth_middleware));

    let body_limit = config
        .max_upload_bytes
        .saturating_mul(2)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .merge(public)
        .merge(protected)
        .nest_service(
            "/uploads",
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::overriding(
                    X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .service(ServeDir::new(&config.upload_dir)),
        )
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(from_fn_with_state(app_state.clone(), rate_limit_middleware))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&config)),
        )
        .with_state(app_state)
}

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn not_found() -> BackendError {
    BackendError::not_found("Route not found")
}

/// CORS restricted to the configured origins
///
/// Origins that are not valid header values are skipped with a warning.
pub fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static(ACCESS_TOKEN_HEADER),
        ])
}
