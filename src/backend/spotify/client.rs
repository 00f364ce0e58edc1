/**
 * Spotify Web API Client
 *
 * Stateless wrapper around the Spotify accounts service (OAuth code and
 * refresh-token exchanges) and the Web API (track search, track metadata,
 * user profile). Payloads are passed through unchanged as JSON values.
 *
 * Access tokens are supplied by the caller on every request and never
 * stored.
 *
 * # Error Mapping
 *
 * | upstream | returned |
 * |---|---|
 * | 401 | 401 access token invalid or expired |
 * | 403 | 403 access denied |
 * | 429 | 429 rate limited |
 * | anything else, network, bad JSON | 502 |
 */

use std::time::Duration;

use axum::http::StatusCode;
use reqwest::{Client, Response, Url};
use serde_json::Value;

use crate::backend::error::BackendError;
use crate::backend::server::config::SpotifyConfig;

pub const SCOPES: &str = "user-read-private user-read-email";
pub const SEARCH_LIMIT: &str = "10";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct SpotifyClient {
    http: Client,
    config: SpotifyConfig,
}

impl SpotifyClient {
    pub fn new(config: SpotifyConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { http, config })
    }

    fn accounts(&self, path: &str) -> String {
        format!("{}{}", self.config.accounts_url.trim_end_matches('/'), path)
    }

    fn api(&self, path: &str) -> String {
        format!("{}{}", self.config.api_url.trim_end_matches('/'), path)
    }

    /// URL of the Spotify consent page for this application
    pub fn authorization_url(&self) -> Result<Url, BackendError> {
        Url::parse_with_params(
            &self.accounts("/authorize"),
            &[
                ("response_type", "code"),
                ("client_id", self.config.client_id.as_str()),
                ("scope", SCOPES),
                ("redirect_uri", self.config.redirect_uri.as_str()),
            ],
        )
        .map_err(|e| BackendError::Config(format!("Invalid Spotify accounts URL: {}", e)))
    }

    /// Exchange an authorization code for tokens
    pub async fn exchange_code(&self, code: &str) -> Result<Value, BackendError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(BackendError::validation("code", "authorization code is required"));
        }

        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ])
        .await
    }

    /// Obtain a fresh access token from a refresh token
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<Value, BackendError> {
        let refresh_token = refresh_token.trim();
        if refresh_token.is_empty() {
            return Err(BackendError::validation("refreshToken", "must not be empty"));
        }

        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    /// Search tracks by free text
    pub async fn search_tracks(&self, query: &str, access_token: &str) -> Result<Value, BackendError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(BackendError::validation("query", "must not be empty"));
        }

        self.api_get(
            "/search",
            &[("q", query), ("type", "track"), ("limit", SEARCH_LIMIT)],
            access_token,
        )
        .await
    }

    /// Metadata for a single track
    pub async fn get_track(&self, id: &str, access_token: &str) -> Result<Value, BackendError> {
        let id = id.trim();
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(BackendError::validation("id", "must be a Spotify track ID"));
        }

        self.api_get(&format!("/tracks/{}", id), &[], access_token).await
    }

    /// Profile of the user owning the access token
    pub async fn get_profile(&self, access_token: &str) -> Result<Value, BackendError> {
        self.api_get("/me", &[], access_token).await
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<Value, BackendError> {
        let response = self
            .http
            .post(self.accounts("/api/token"))
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(form)
            .send()
            .await
            .map_err(network_error)?;

        read_json(response).await
    }

    async fn api_get(
        &self,
        path: &str,
        query: &[(&str, &str)],
        access_token: &str,
    ) -> Result<Value, BackendError> {
        let response = self
            .http
            .get(self.api(path))
            .query(query)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(network_error)?;

        read_json(response).await
    }
}

fn network_error(e: reqwest::Error) -> BackendError {
    tracing::error!("Spotify request failed: {}", e);
    BackendError::upstream(StatusCode::BAD_GATEWAY, "Failed to reach Spotify")
}

/// Translate an upstream status into the error returned to our client
pub fn upstream_error(status: StatusCode) -> BackendError {
    match status.as_u16() {
        401 => BackendError::upstream(
            StatusCode::UNAUTHORIZED,
            "Spotify access token is invalid or expired",
        ),
        403 => BackendError::upstream(StatusCode::FORBIDDEN, "Spotify denied access to this resource"),
        429 => BackendError::upstream(
            StatusCode::TOO_MANY_REQUESTS,
            "Spotify rate limit exceeded, try again later",
        ),
        _ => BackendError::upstream(
            StatusCode::BAD_GATEWAY,
            format!("Spotify request failed with status {}", status.as_u16()),
        ),
    }
}

async fn read_json(response: Response) -> Result<Value, BackendError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), body = %body, "Spotify returned an error");
        return Err(upstream_error(status));
    }

    response.json::<Value>().await.map_err(|e| {
        tracing::error!("Failed to parse Spotify response: {}", e);
        BackendError::upstream(StatusCode::BAD_GATEWAY, "Invalid response from Spotify")
    })
}
