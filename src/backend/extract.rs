/**
 * Request Extractors
 *
 * Thin wrappers over axum's extractors that reject with `BackendError`, so
 * malformed input gets the same `{"error", "status"}` body as every other
 * failure.
 *
 * - `JsonBody<T>` - JSON body, then [`Validate::validate`]
 * - `OptionalJsonBody<T>` - same, but an empty body means `T::default()`
 * - `PathId` - a UUID path segment
 */

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::shared::Validate;

/// JSON request body that has passed boundary validation
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| BackendError::validation("body", rejection.body_text()))?;

        value.validate()?;
        Ok(JsonBody(value))
    }
}

/// Like [`JsonBody`], for endpoints whose every field is optional
///
/// An empty body is accepted without a `Content-Type` header.
#[derive(Debug, Clone)]
pub struct OptionalJsonBody<T>(pub T);

impl<S, T> FromRequest<S> for OptionalJsonBody<T>
where
    T: DeserializeOwned + Validate + Default,
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| BackendError::validation("body", rejection.body_text()))?;

        let value = if bytes.iter().all(u8::is_ascii_whitespace) {
            T::default()
        } else {
            let Json(value) = Json::<T>::from_bytes(&bytes)
                .map_err(|rejection| BackendError::validation("body", rejection.body_text()))?;
            value
        };

        value.validate()?;
        Ok(OptionalJsonBody(value))
    }
}

/// A single UUID path parameter
#[derive(Debug, Clone, Copy)]
pub struct PathId(pub Uuid);

impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<Uuid>::from_request_parts(parts, state)
            .await
            .map_err(|_| BackendError::validation("id", "must be a valid UUID"))?;
        Ok(PathId(id))
    }
}
