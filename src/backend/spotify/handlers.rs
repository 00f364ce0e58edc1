//! HTTP handlers for `/spotify`
//!
//! `login` and `callback` are public (the browser lands on them during the
//! OAuth dance). The rest require a bearer token, and the Web API proxies
//! additionally need the caller's Spotify token in the
//! `spotify-access-token` header.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{Json, Redirect},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backend::error::BackendError;
use crate::backend::extract::JsonBody;
use crate::backend::spotify::client::SpotifyClient;
use crate::shared::error::{require_non_blank, SharedError, Validate};

pub const ACCESS_TOKEN_HEADER: &str = "spotify-access-token";

fn configured(spotify: Option<SpotifyClient>) -> Result<SpotifyClient, BackendError> {
    spotify.ok_or_else(|| {
        tracing::warn!("Spotify request while Spotify is not configured");
        BackendError::ServiceUnavailable("Spotify integration is not configured".to_string())
    })
}

/// Read the caller's Spotify token from the `spotify-access-token` header
fn access_token(headers: &HeaderMap) -> Result<&str, BackendError> {
    headers
        .get(ACCESS_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| BackendError::bad_request("Missing spotify-access-token header"))
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TrackParams {
    pub id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

impl Validate for RefreshRequest {
    fn validate(&self) -> Result<(), SharedError> {
        require_non_blank("refreshToken", &self.refresh_token)
    }
}

/// GET /spotify/login
pub async fn login(State(spotify): State<Option<SpotifyClient>>) -> Result<Redirect, BackendError> {
    let url = configured(spotify)?.authorization_url()?;
    Ok(Redirect::to(url.as_str()))
}

/// GET /spotify/callback?code=
pub async fn callback(
    State(spotify): State<Option<SpotifyClient>>,
    Query(params): Query<CallbackParams>,
) -> Result<Json<Value>, BackendError> {
    let spotify = configured(spotify)?;

    if let Some(error) = params.error {
        tracing::warn!("Spotify authorization was not granted: {}", error);
        return Err(BackendError::bad_request(format!(
            "Spotify authorization failed: {}",
            error
        )));
    }

    let code = params.code.unwrap_or_default();
    Ok(Json(spotify.exchange_code(&code).await?))
}

/// POST /spotify/refresh
pub async fn refresh(
    State(spotify): State<Option<SpotifyClient>>,
    JsonBody(request): JsonBody<RefreshRequest>,
) -> Result<Json<Value>, BackendError> {
    let spotify = configured(spotify)?;
    Ok(Json(spotify.refresh_token(&request.refresh_token).await?))
}

/// GET /spotify/search?query=
pub async fn search(
    State(spotify): State<Option<SpotifyClient>>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Result<Json<Value>, BackendError> {
    let spotify = configured(spotify)?;
    let token = access_token(&headers)?;
    let query = params.query.unwrap_or_default();
    Ok(Json(spotify.search_tracks(&query, token).await?))
}

/// GET /spotify/song?id=
pub async fn song(
    State(spotify): State<Option<SpotifyClient>>,
    headers: HeaderMap,
    Query(params): Query<TrackParams>,
) -> Result<Json<Value>, BackendError> {
    let spotify = configured(spotify)?;
    let token = access_token(&headers)?;
    let id = params.id.unwrap_or_default();
    Ok(Json(spotify.get_track(&id, token).await?))
}

/// GET /spotify/me
pub async fn me(
    State(spotify): State<Option<SpotifyClient>>,
    headers: HeaderMap,
) -> Result<Json<Value>, BackendError> {
    let spotify = configured(spotify)?;
    let token = access_token(&headers)?;
    Ok(Json(spotify.get_profile(token).await?))
}
