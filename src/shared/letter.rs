//! Letter Data Structure
//!
//! A letter moves through a strictly forward lifecycle:
//!
//! ```text
//! DRAFT ──send(no date / past date)──▶ SENT ─────┐
//!   │                                           ├──recipient opens──▶ OPENED
//!   └───send(future date)──▶ SCHEDULED ─────────┘
//! ```
//!
//! Only the author can touch a DRAFT. Only the recipient can open a letter,
//! and only once its delivery date has passed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::{require_http_url, require_non_blank, SharedError, Validate};

/// Lifecycle status of a letter
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LetterStatus {
    /// Being written; visible and editable only by the author
    Draft,
    /// Sent with a delivery date in the future
    Scheduled,
    /// Sent for immediate delivery
    Sent,
    /// Read by the recipient
    Opened,
}

impl Default for LetterStatus {
    fn default() -> Self {
        LetterStatus::Draft
    }
}

impl LetterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LetterStatus::Draft => "DRAFT",
            LetterStatus::Scheduled => "SCHEDULED",
            LetterStatus::Sent => "SENT",
            LetterStatus::Opened => "OPENED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "DRAFT" => Some(LetterStatus::Draft),
            "SCHEDULED" => Some(LetterStatus::Scheduled),
            "SENT" => Some(LetterStatus::Sent),
            "OPENED" => Some(LetterStatus::Opened),
            _ => None,
        }
    }
}

impl std::fmt::Display for LetterStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A letter as stored and as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Letter {
    /// Unique letter ID
    pub id: Uuid,
    /// User who wrote the letter
    pub author_id: Uuid,
    /// User the letter is addressed to
    pub recipient_id: Uuid,
    /// Optional subject line
    pub subject: Option<String>,
    /// Letter body
    pub content: String,
    /// Public URL of an attached photo
    pub photo_url: Option<String>,
    /// Song link or public URL of an uploaded audio file
    pub song_url: Option<String>,
    /// Current lifecycle status
    #[serde(default)]
    pub status: LetterStatus,
    /// When the draft was created
    pub created_at: DateTime<Utc>,
    /// When authoring concluded (last edit or send)
    pub finished_at: Option<DateTime<Utc>>,
    /// When the letter becomes visible to the recipient
    pub delivery_date: Option<DateTime<Utc>>,
}

impl Letter {
    /// Create a fresh draft
    pub fn draft(author_id: Uuid, request: CreateLetterRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            recipient_id: request.recipient_id,
            subject: request.subject,
            content: request.content,
            photo_url: request.photo_url,
            song_url: request.song_url,
            status: LetterStatus::Draft,
            created_at: now,
            finished_at: None,
            delivery_date: None,
        }
    }

    /// Check if the letter is still a draft
    pub fn is_draft(&self) -> bool {
        self.status == LetterStatus::Draft
    }

    /// Whether the recipient may see the letter at `now`
    pub fn is_delivered(&self, now: DateTime<Utc>) -> bool {
        !self.is_draft() && self.delivery_date.is_some_and(|date| date <= now)
    }
}

/// Request to draft a new letter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateLetterRequest {
    /// Recipient user ID
    pub recipient_id: Uuid,
    /// Letter body
    pub content: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub song_url: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl Validate for CreateLetterRequest {
    fn validate(&self) -> Result<(), SharedError> {
        require_non_blank("content", &self.content)?;
        require_http_url("songUrl", self.song_url.as_deref())?;
        require_http_url("photoUrl", self.photo_url.as_deref())?;
        Ok(())
    }
}

/// Partial update of a draft; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLetterRequest {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub song_url: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl Validate for UpdateLetterRequest {
    fn validate(&self) -> Result<(), SharedError> {
        if let Some(content) = &self.content {
            require_non_blank("content", content)?;
        }
        require_http_url("songUrl", self.song_url.as_deref())?;
        require_http_url("photoUrl", self.photo_url.as_deref())?;
        Ok(())
    }
}

/// Request to send a draft now or at a later date
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SendLetterRequest {
    /// Delivery date; `None` means deliver immediately
    #[serde(default)]
    pub delivery_date: Option<DateTime<Utc>>,
}

impl Validate for SendLetterRequest {
    fn validate(&self) -> Result<(), SharedError> {
        Ok(())
    }
}
