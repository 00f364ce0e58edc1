//! Upload storage for letter attachments
//!
//! Photos and songs posted with a letter are written to the configured
//! upload directory as `<millis>-<uuid><ext>` and served back under
//! `/uploads/<file>`.

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use axum::http::{header::HOST, HeaderMap};
use bytes::Bytes;
use chrono::Utc;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::server::config::AppConfig;

/// Which attachment a multipart file field carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Photo,
    Song,
}

impl UploadKind {
    /// Map a multipart field name to an upload kind
    pub fn from_field(name: &str) -> Option<Self> {
        match name {
            "photo" => Some(UploadKind::Photo),
            "song" => Some(UploadKind::Song),
            _ => None,
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            UploadKind::Photo => "photo",
            UploadKind::Song => "song",
        }
    }

    /// Accepted MIME subtypes and the extension they are stored with
    fn subtypes(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            UploadKind::Photo => &[("png", ".png"), ("jpeg", ".jpg"), ("jpg", ".jpg"), ("webp", ".webp")],
            UploadKind::Song => &[
                ("mpeg", ".mp3"),
                ("mp3", ".mp3"),
                ("wav", ".wav"),
                ("ogg", ".ogg"),
                ("aac", ".aac"),
            ],
        }
    }

    fn top_level(&self) -> &'static str {
        match self {
            UploadKind::Photo => "image",
            UploadKind::Song => "audio",
        }
    }

    /// Default extension for an accepted content type, `None` if rejected
    pub fn extension_for(&self, content_type: &str) -> Option<&'static str> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        let (top, sub) = essence.split_once('/')?;
        if top != self.top_level() {
            return None;
        }
        self.subtypes()
            .iter()
            .find(|(accepted, _)| *accepted == sub)
            .map(|(_, ext)| *ext)
    }

    pub fn rejection(&self) -> BackendError {
        match self {
            UploadKind::Photo => BackendError::validation(
                "photo",
                "only PNG, JPEG and WEBP images are allowed",
            ),
            UploadKind::Song => BackendError::validation(
                "song",
                "only MPEG, MP3, WAV, OGG and AAC audio is allowed",
            ),
        }
    }
}

/// A validated attachment held in memory until the letter is accepted
#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub kind: UploadKind,
    pub extension: String,
    pub bytes: Bytes,
}

impl PendingUpload {
    /// Validate the content type and pick the stored extension
    ///
    /// The extension always comes from the accepted content type, never
    /// from the client's file name, so `/uploads` only ever serves image
    /// and audio types.
    pub fn new(kind: UploadKind, content_type: Option<&str>, bytes: Bytes) -> Result<Self, BackendError> {
        let extension = content_type
            .and_then(|ct| kind.extension_for(ct))
            .ok_or_else(|| kind.rejection())?
            .to_string();

        Ok(Self {
            kind,
            extension,
            bytes,
        })
    }
}

/// Write a pending upload, returning the stored file name
pub async fn store_upload(dir: &Path, upload: &PendingUpload) -> Result<String, BackendError> {
    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        tracing::error!("Failed to create upload directory {}: {:?}", dir.display(), e);
        BackendError::internal("Failed to store upload")
    })?;

    let file_name = format!(
        "{}-{}{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        upload.extension
    );

    tokio::fs::write(dir.join(&file_name), &upload.bytes).await.map_err(|e| {
        tracing::error!("Failed to write upload {}: {:?}", file_name, e);
        BackendError::internal("Failed to store upload")
    })?;

    tracing::info!(file = %file_name, kind = upload.kind.field(), bytes = upload.bytes.len(), "Upload stored");
    Ok(file_name)
}

/// Best-effort removal of files written for a letter that was not created
pub async fn discard_uploads(dir: &Path, file_names: &[String]) {
    for name in file_names {
        let path: PathBuf = dir.join(name);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::warn!("Failed to remove orphaned upload {}: {:?}", path.display(), e);
        }
    }
}

/// Origin used to build public upload URLs
///
/// Without `PUBLIC_BASE_URL` only a loopback `Host` header is echoed back.
/// Any other host falls back to `localhost` on the configured port.
pub fn public_base(config: &AppConfig, headers: &HeaderMap) -> String {
    if let Some(base) = &config.public_base_url {
        return base.clone();
    }

    let host = headers
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .filter(|h| is_loopback_host(h))
        .map(str::to_string)
        .unwrap_or_else(|| format!("localhost:{}", config.port));

    format!("http://{}", host)
}

fn is_loopback_host(host: &str) -> bool {
    let name = match host.strip_prefix('[') {
        Some(rest) => match rest.split_once(']') {
            Some((name, port)) if port.is_empty() || port.starts_with(':') => name,
            _ => return false,
        },
        None => host.split(':').next().unwrap_or_default(),
    };
    let port_ok = host
        .rsplit_once(':')
        .filter(|_| !host.ends_with(']'))
        .map(|(_, port)| !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(true);

    port_ok
        && (name.eq_ignore_ascii_case("localhost")
            || name.parse::<IpAddr>().map(|ip| ip.is_loopback()).unwrap_or(false))
}

pub fn public_url(base: &str, file_name: &str) -> String {
    format!("{}/uploads/{}", base.trim_end_matches('/'), file_name)
}
