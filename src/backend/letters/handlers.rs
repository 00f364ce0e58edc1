//! HTTP handlers for letters
//!
//! Every handler here sits behind the auth middleware and takes the caller
//! from [`AuthUser`].

use axum::{
    extract::{multipart::Field, FromRequest, Multipart, Request, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::Json,
};
use bytes::{Bytes, BytesMut};
use chrono::Utc;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::extract::{JsonBody, OptionalJsonBody, PathId};
use crate::backend::letters::service;
use crate::backend::letters::uploads::{
    discard_uploads, public_base, public_url, store_upload, PendingUpload, UploadKind,
};
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::{
    CreateLetterRequest, Letter, SendLetterRequest, SharedError, UpdateLetterRequest, Validate,
};

/// POST /letter
///
/// Accepts a JSON body, or `multipart/form-data` with text fields plus
/// optional `photo` and `song` files.
pub async fn create_letter(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    request: Request,
) -> Result<(StatusCode, Json<Letter>), BackendError> {
    let headers = request.headers().clone();
    let is_multipart = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.to_ascii_lowercase().starts_with("multipart/form-data"));

    let letter = if is_multipart {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|rejection| BackendError::bad_request(rejection.body_text()))?;
        create_from_multipart(&state, user.user_id, &headers, multipart).await?
    } else {
        let JsonBody(payload) = JsonBody::<CreateLetterRequest>::from_request(request, &state).await?;
        service::create_letter(&state.db, user.user_id, payload, Utc::now()).await?
    };

    Ok((StatusCode::CREATED, Json(letter)))
}

#[derive(Debug, Default)]
struct LetterForm {
    recipient_id: Option<String>,
    content: Option<String>,
    subject: Option<String>,
    song_url: Option<String>,
    photo_url: Option<String>,
    photo: Option<PendingUpload>,
    song: Option<PendingUpload>,
}

impl LetterForm {
    fn into_request(self) -> Result<(CreateLetterRequest, Option<PendingUpload>, Option<PendingUpload>), BackendError> {
        let recipient_id = self
            .recipient_id
            .ok_or_else(|| SharedError::missing("recipientId"))?;
        let recipient_id = Uuid::parse_str(recipient_id.trim())
            .map_err(|_| SharedError::validation("recipientId", "must be a valid UUID"))?;
        let content = self.content.ok_or_else(|| SharedError::missing("content"))?;

        let request = CreateLetterRequest {
            recipient_id,
            content,
            subject: non_empty(self.subject),
            // Uploaded files replace the matching URL field
            song_url: if self.song.is_some() { None } else { non_empty(self.song_url) },
            photo_url: if self.photo.is_some() { None } else { non_empty(self.photo_url) },
        };
        request.validate()?;

        Ok((request, self.photo, self.song))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> BackendError {
    tracing::warn!("Malformed multipart body: {}", err);
    BackendError::bad_request(format!("Invalid multipart body: {}", err.body_text()))
}

async fn read_file(field: &mut Field<'_>, kind: UploadKind, limit: usize) -> Result<Bytes, BackendError> {
    let mut bytes = BytesMut::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if bytes.len() + chunk.len() > limit {
            return Err(BackendError::validation(
                kind.field(),
                format!("file must not exceed {} bytes", limit),
            ));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes.freeze())
}

async fn create_from_multipart(
    state: &AppState,
    author_id: Uuid,
    headers: &HeaderMap,
    mut multipart: Multipart,
) -> Result<Letter, BackendError> {
    let limit = state.config.max_upload_bytes;
    let mut form = LetterForm::default();

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if let Some(kind) = UploadKind::from_field(&name) {
            let content_type = field.content_type().map(str::to_string);
            let file_name = field.file_name().map(str::to_string);
            let bytes = read_file(&mut field, kind, limit).await?;

            // Browsers submit empty file inputs as zero-byte parts
            if bytes.is_empty() && file_name.as_deref().unwrap_or_default().is_empty() {
                continue;
            }

            let upload = PendingUpload::new(kind, content_type.as_deref(), bytes)?;
            match kind {
                UploadKind::Photo => form.photo = Some(upload),
                UploadKind::Song => form.song = Some(upload),
            }
            continue;
        }

        let slot = match name.as_str() {
            "recipientId" => &mut form.recipient_id,
            "content" => &mut form.content,
            "subject" => &mut form.subject,
            "songUrl" => &mut form.song_url,
            "photoUrl" => &mut form.photo_url,
            _ => {
                tracing::debug!("Ignoring multipart field '{}'", name);
                continue;
            }
        };
        *slot = Some(field.text().await.map_err(multipart_error)?);
    }

    let (mut request, photo, song) = form.into_request()?;

    let base = public_base(&state.config, headers);
    let mut stored = Vec::new();
    for upload in [photo, song].into_iter().flatten() {
        let file_name = match store_upload(&state.config.upload_dir, &upload).await {
            Ok(name) => name,
            Err(e) => {
                discard_uploads(&state.config.upload_dir, &stored).await;
                return Err(e);
            }
        };
        let url = public_url(&base, &file_name);
        match upload.kind {
            UploadKind::Photo => request.photo_url = Some(url),
            UploadKind::Song => request.song_url = Some(url),
        }
        stored.push(file_name);
    }

    match service::create_letter(&state.db, author_id, request, Utc::now()).await {
        Ok(letter) => Ok(letter),
        Err(e) => {
            discard_uploads(&state.config.upload_dir, &stored).await;
            Err(e)
        }
    }
}

/// PATCH /letter/{id}
pub async fn edit_letter(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    PathId(letter_id): PathId,
    JsonBody(patch): JsonBody<UpdateLetterRequest>,
) -> Result<Json<Letter>, BackendError> {
    let letter = service::edit_letter(&state.db, letter_id, user.user_id, patch, Utc::now()).await?;
    Ok(Json(letter))
}

/// POST /letter/{id}/send
pub async fn send_letter(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    PathId(letter_id): PathId,
    OptionalJsonBody(request): OptionalJsonBody<SendLetterRequest>,
) -> Result<Json<Letter>, BackendError> {
    let letter = service::send_letter(&state.db, letter_id, user.user_id, request, Utc::now()).await?;
    Ok(Json(letter))
}

/// GET /letter/drafts
pub async fn list_drafts(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<Letter>>, BackendError> {
    Ok(Json(service::list_drafts(&state.db, user.user_id).await?))
}

/// GET /letter/sent
pub async fn list_sent(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<Letter>>, BackendError> {
    Ok(Json(service::list_sent(&state.db, user.user_id).await?))
}

/// GET /letter/sent/{id}
pub async fn get_sent(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    PathId(letter_id): PathId,
) -> Result<Json<Letter>, BackendError> {
    Ok(Json(service::get_sent(&state.db, letter_id, user.user_id).await?))
}

/// GET /letter/received
pub async fn list_received(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<Letter>>, BackendError> {
    Ok(Json(
        service::list_received(&state.db, user.user_id, Utc::now()).await?,
    ))
}

/// GET /letter/received/{id}
///
/// Opens the letter on first read.
pub async fn get_received(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    PathId(letter_id): PathId,
) -> Result<Json<Letter>, BackendError> {
    Ok(Json(
        service::get_received(&state.db, letter_id, user.user_id, Utc::now()).await?,
    ))
}
