/**
 * Letter Service
 *
 * Lifecycle rules and access control for letters. Every time-dependent
 * operation takes `now` from the caller; handlers pass `Utc::now()`.
 *
 * # Guards
 *
 * Author operations check, in order: the letter exists (404), the caller
 * wrote it (403), it is still a draft (403). Recipient reads check: the
 * letter exists (404), it is addressed to the caller (403), it is not a
 * draft (403), its delivery date has passed (403).
 */

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::backend::auth::users::get_user_by_id;
use crate::backend::error::BackendError;
use crate::backend::letters::db;
use crate::shared::{CreateLetterRequest, Letter, LetterStatus, SendLetterRequest, UpdateLetterRequest};

const NOT_FOUND: &str = "Letter not found";
const NOT_AUTHOR: &str = "Only the author can access this letter";
const NOT_DRAFT: &str = "Only drafts can be changed";
const NOT_RECIPIENT: &str = "This letter is not addressed to you";
const NOT_SENT: &str = "This letter has not been sent";
const NOT_DELIVERED: &str = "This letter has not been delivered yet";

async fn find(pool: &SqlitePool, letter_id: Uuid) -> Result<Letter, BackendError> {
    db::get_letter(pool, letter_id)
        .await?
        .ok_or_else(|| BackendError::not_found(NOT_FOUND))
}

fn ensure_author(letter: &Letter, author_id: Uuid) -> Result<(), BackendError> {
    if letter.author_id != author_id {
        tracing::warn!(letter = %letter.id, caller = %author_id, "Caller is not the author");
        return Err(BackendError::forbidden(NOT_AUTHOR));
    }
    Ok(())
}

fn ensure_draft(letter: &Letter) -> Result<(), BackendError> {
    if !letter.is_draft() {
        tracing::warn!(letter = %letter.id, status = %letter.status, "Letter is no longer a draft");
        return Err(BackendError::forbidden(NOT_DRAFT));
    }
    Ok(())
}

/// Persist a new draft owned by `author_id`
pub async fn create_letter(
    pool: &SqlitePool,
    author_id: Uuid,
    request: CreateLetterRequest,
    now: DateTime<Utc>,
) -> Result<Letter, BackendError> {
    let recipient = get_user_by_id(pool, request.recipient_id).await.map_err(|e| {
        tracing::warn!("Recipient lookup failed: {:?}", e);
        BackendError::bad_request(format!("Failed to create letter: {}", e))
    })?;
    if recipient.is_none() {
        return Err(BackendError::bad_request(
            "Failed to create letter: recipient does not exist",
        ));
    }

    let letter = Letter::draft(author_id, request, now);
    let letter = db::insert_letter(pool, &letter).await.map_err(|e| {
        tracing::warn!("Failed to create letter: {:?}", e);
        BackendError::bad_request(format!("Failed to create letter: {}", e))
    })?;

    tracing::info!(letter = %letter.id, author = %author_id, "Draft created");
    Ok(letter)
}

/// Apply a patch to one of the author's drafts
pub async fn edit_letter(
    pool: &SqlitePool,
    letter_id: Uuid,
    author_id: Uuid,
    patch: UpdateLetterRequest,
    now: DateTime<Utc>,
) -> Result<Letter, BackendError> {
    let letter = find(pool, letter_id).await?;
    ensure_author(&letter, author_id)?;
    ensure_draft(&letter)?;

    commit_edit(pool, &letter, &patch, now).await
}

/// Write a checked draft. A letter sent since it was read stays untouched.
async fn commit_edit(
    pool: &SqlitePool,
    draft: &Letter,
    patch: &UpdateLetterRequest,
    now: DateTime<Utc>,
) -> Result<Letter, BackendError> {
    let letter = db::update_draft(pool, draft.id, draft.author_id, patch, now)
        .await?
        .ok_or_else(|| BackendError::forbidden(NOT_DRAFT))?;

    tracing::info!(letter = %letter.id, "Draft edited");
    Ok(letter)
}

/// Send a draft, immediately or at a future delivery date
///
/// A delivery date strictly after `now` schedules the letter for exactly
/// that date. No date, or one at or before `now`, sends it with
/// `delivery_date = now`.
pub async fn send_letter(
    pool: &SqlitePool,
    letter_id: Uuid,
    author_id: Uuid,
    request: SendLetterRequest,
    now: DateTime<Utc>,
) -> Result<Letter, BackendError> {
    let letter = find(pool, letter_id).await?;
    ensure_author(&letter, author_id)?;
    ensure_draft(&letter)?;

    commit_send(pool, &letter, request, now).await
}

async fn commit_send(
    pool: &SqlitePool,
    draft: &Letter,
    request: SendLetterRequest,
    now: DateTime<Utc>,
) -> Result<Letter, BackendError> {
    let (status, delivery_date) = match request.delivery_date {
        Some(date) if date > now => (LetterStatus::Scheduled, date),
        _ => (LetterStatus::Sent, now),
    };

    let letter = db::send_draft(pool, draft.id, draft.author_id, status, delivery_date, now)
        .await?
        .ok_or_else(|| BackendError::forbidden(NOT_DRAFT))?;

    tracing::info!(letter = %letter.id, status = %letter.status, "Letter sent");
    Ok(letter)
}

/// The author's drafts, newest first
pub async fn list_drafts(pool: &SqlitePool, author_id: Uuid) -> Result<Vec<Letter>, BackendError> {
    Ok(db::list_drafts(pool, author_id).await?)
}

/// The author's scheduled and sent letters, newest first
pub async fn list_sent(pool: &SqlitePool, author_id: Uuid) -> Result<Vec<Letter>, BackendError> {
    Ok(db::list_sent(pool, author_id).await?)
}

/// One of the author's letters, in any state
pub async fn get_sent(pool: &SqlitePool, letter_id: Uuid, author_id: Uuid) -> Result<Letter, BackendError> {
    let letter = find(pool, letter_id).await?;
    ensure_author(&letter, author_id)?;
    Ok(letter)
}

/// Letters delivered to the recipient by `now`
pub async fn list_received(
    pool: &SqlitePool,
    recipient_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Vec<Letter>, BackendError> {
    Ok(db::list_received(pool, recipient_id, now).await?)
}

/// Read a delivered letter, marking it opened
///
/// Reading an already opened letter returns it without writing.
pub async fn get_received(
    pool: &SqlitePool,
    letter_id: Uuid,
    recipient_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Letter, BackendError> {
    let letter = find(pool, letter_id).await?;

    if letter.recipient_id != recipient_id {
        tracing::warn!(letter = %letter.id, caller = %recipient_id, "Caller is not the recipient");
        return Err(BackendError::forbidden(NOT_RECIPIENT));
    }
    if letter.is_draft() {
        return Err(BackendError::forbidden(NOT_SENT));
    }
    if !letter.is_delivered(now) {
        return Err(BackendError::forbidden(NOT_DELIVERED));
    }
    if letter.status == LetterStatus::Opened {
        return Ok(letter);
    }

    match db::mark_opened(pool, letter_id, recipient_id, now).await? {
        Some(opened) => {
            tracing::info!(letter = %opened.id, "Letter opened");
            Ok(opened)
        }
        None => {
            // Opened concurrently
            let current = find(pool, letter_id).await?;
            if current.status == LetterStatus::Opened {
                Ok(current)
            } else {
                Err(BackendError::forbidden(NOT_DELIVERED))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::auth::users::create_user;
    use crate::backend::server::config::load_database;
    use assert_matches::assert_matches;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    struct Fixture {
        pool: SqlitePool,
        alice: Uuid,
        bob: Uuid,
        carol: Uuid,
    }

    async fn fixture() -> Fixture {
        let pool = load_database("sqlite::memory:").await.unwrap();
        let alice = create_user(&pool, "alice@example.com", "hash", "Alice").await.unwrap().id;
        let bob = create_user(&pool, "bob@example.com", "hash", "Bob").await.unwrap().id;
        let carol = create_user(&pool, "carol@example.com", "hash", "Carol").await.unwrap().id;
        Fixture { pool, alice, bob, carol }
    }

    fn letter_to(recipient: Uuid, content: &str) -> CreateLetterRequest {
        CreateLetterRequest {
            recipient_id: recipient,
            content: content.to_string(),
            subject: None,
            song_url: None,
            photo_url: None,
        }
    }

    #[tokio::test]
    async fn test_create_returns_draft() {
        let f = fixture().await;
        let now = Utc::now();
        let letter = create_letter(&f.pool, f.alice, letter_to(f.bob, "hi"), now).await.unwrap();

        assert_eq!(letter.status, LetterStatus::Draft);
        assert_eq!(letter.author_id, f.alice);
        assert_eq!(letter.created_at, now);
        assert_eq!(letter.delivery_date, None);
    }

    #[tokio::test]
    async fn test_create_for_unknown_recipient_is_bad_request() {
        let f = fixture().await;
        let err = create_letter(&f.pool, f.alice, letter_to(Uuid::new_v4(), "hi"), Utc::now())
            .await
            .unwrap_err();
        assert_matches!(err, BackendError::BadRequest(message) if message.starts_with("Failed to create letter"));
    }

    #[tokio::test]
    async fn test_edit_guards() {
        let f = fixture().await;
        let now = Utc::now();
        let letter = create_letter(&f.pool, f.alice, letter_to(f.bob, "hi"), now).await.unwrap();
        let patch = UpdateLetterRequest {
            content: Some("hello again".to_string()),
            ..Default::default()
        };

        let err = edit_letter(&f.pool, Uuid::new_v4(), f.alice, patch.clone(), now).await.unwrap_err();
        assert_matches!(err, BackendError::NotFound(_));

        let err = edit_letter(&f.pool, letter.id, f.bob, patch.clone(), now).await.unwrap_err();
        assert_matches!(err, BackendError::Forbidden(_));

        let later = now + Duration::minutes(3);
        let edited = edit_letter(&f.pool, letter.id, f.alice, patch.clone(), later).await.unwrap();
        assert_eq!(edited.content, "hello again");
        assert_eq!(edited.subject, None);
        assert_eq!(edited.finished_at, Some(later));

        send_letter(&f.pool, letter.id, f.alice, SendLetterRequest::default(), later).await.unwrap();
        let err = edit_letter(&f.pool, letter.id, f.alice, patch, later).await.unwrap_err();
        assert_matches!(err, BackendError::Forbidden(_));
    }

    #[tokio::test]
    async fn test_send_without_date_delivers_now() {
        let f = fixture().await;
        let now = Utc::now();
        let letter = create_letter(&f.pool, f.alice, letter_to(f.bob, "hi"), now).await.unwrap();

        let sent = send_letter(&f.pool, letter.id, f.alice, SendLetterRequest::default(), now)
            .await
            .unwrap();
        assert_eq!(sent.status, LetterStatus::Sent);
        assert_eq!(sent.delivery_date, Some(now));
        assert_eq!(sent.finished_at, Some(now));

        let err = send_letter(&f.pool, letter.id, f.alice, SendLetterRequest::default(), now)
            .await
            .unwrap_err();
        assert_matches!(err, BackendError::Forbidden(_));
    }

    #[tokio::test]
    async fn test_send_with_past_date_is_immediate() {
        let f = fixture().await;
        let now = Utc::now();
        let letter = create_letter(&f.pool, f.alice, letter_to(f.bob, "hi"), now).await.unwrap();

        let request = SendLetterRequest {
            delivery_date: Some(now - Duration::days(1)),
        };
        let sent = send_letter(&f.pool, letter.id, f.alice, request, now).await.unwrap();
        assert_eq!(sent.status, LetterStatus::Sent);
        assert_eq!(sent.delivery_date, Some(now));
    }

    #[tokio::test]
    async fn test_scheduled_delivery_with_simulated_clock() {
        let f = fixture().await;
        let t0 = Utc::now();
        let letter = create_letter(&f.pool, f.alice, letter_to(f.bob, "soon"), t0).await.unwrap();

        let deliver_at = t0 + Duration::hours(24);
        let scheduled = send_letter(
            &f.pool,
            letter.id,
            f.alice,
            SendLetterRequest {
                delivery_date: Some(deliver_at),
            },
            t0,
        )
        .await
        .unwrap();
        assert_eq!(scheduled.status, LetterStatus::Scheduled);
        assert_eq!(scheduled.delivery_date, Some(deliver_at));

        assert!(list_received(&f.pool, f.bob, t0).await.unwrap().is_empty());
        let err = get_received(&f.pool, letter.id, f.bob, t0).await.unwrap_err();
        assert_matches!(err, BackendError::Forbidden(_));

        let t1 = t0 + Duration::hours(25);
        let received = list_received(&f.pool, f.bob, t1).await.unwrap();
        assert_eq!(received.len(), 1);

        let opened = get_received(&f.pool, letter.id, f.bob, t1).await.unwrap();
        assert_eq!(opened.status, LetterStatus::Opened);

        let again = get_received(&f.pool, letter.id, f.bob, t1 + Duration::hours(1)).await.unwrap();
        assert_eq!(again, opened);
    }

    #[tokio::test]
    async fn test_received_guards() {
        let f = fixture().await;
        let now = Utc::now();
        let draft = create_letter(&f.pool, f.alice, letter_to(f.bob, "draft"), now).await.unwrap();

        let err = get_received(&f.pool, Uuid::new_v4(), f.bob, now).await.unwrap_err();
        assert_matches!(err, BackendError::NotFound(_));

        let err = get_received(&f.pool, draft.id, f.bob, now).await.unwrap_err();
        assert_matches!(err, BackendError::Forbidden(message) if message == NOT_SENT);

        send_letter(&f.pool, draft.id, f.alice, SendLetterRequest::default(), now).await.unwrap();
        let err = get_received(&f.pool, draft.id, f.carol, now).await.unwrap_err();
        assert_matches!(err, BackendError::Forbidden(message) if message == NOT_RECIPIENT);

        assert_eq!(
            get_received(&f.pool, draft.id, f.bob, now).await.unwrap().status,
            LetterStatus::Opened
        );
    }

    #[tokio::test]
    async fn test_author_lists() {
        let f = fixture().await;
        let t0 = Utc::now();

        let first = create_letter(&f.pool, f.alice, letter_to(f.bob, "one"), t0).await.unwrap();
        let second =
            create_letter(&f.pool, f.alice, letter_to(f.bob, "two"), t0 + Duration::seconds(1))
                .await
                .unwrap();
        let third =
            create_letter(&f.pool, f.alice, letter_to(f.carol, "three"), t0 + Duration::seconds(2))
                .await
                .unwrap();
        create_letter(&f.pool, f.bob, letter_to(f.alice, "not mine"), t0).await.unwrap();

        let drafts = list_drafts(&f.pool, f.alice).await.unwrap();
        assert_eq!(
            drafts.iter().map(|l| l.id).collect::<Vec<_>>(),
            vec![third.id, second.id, first.id]
        );

        let t1 = t0 + Duration::seconds(10);
        send_letter(&f.pool, first.id, f.alice, SendLetterRequest::default(), t1).await.unwrap();
        send_letter(
            &f.pool,
            second.id,
            f.alice,
            SendLetterRequest {
                delivery_date: Some(t1 + Duration::days(3)),
            },
            t1,
        )
        .await
        .unwrap();

        let sent = list_sent(&f.pool, f.alice).await.unwrap();
        assert_eq!(
            sent.iter().map(|l| l.id).collect::<Vec<_>>(),
            vec![second.id, first.id]
        );
        assert_eq!(list_drafts(&f.pool, f.alice).await.unwrap().len(), 1);

        get_received(&f.pool, first.id, f.bob, t1).await.unwrap();
        let sent = list_sent(&f.pool, f.alice).await.unwrap();
        assert_eq!(sent.iter().map(|l| l.id).collect::<Vec<_>>(), vec![second.id]);
        assert_eq!(
            get_sent(&f.pool, first.id, f.alice).await.unwrap().status,
            LetterStatus::Opened
        );

        let err = get_sent(&f.pool, first.id, f.bob).await.unwrap_err();
        assert_matches!(err, BackendError::Forbidden(_));
    }

    #[tokio::test]
    async fn test_edit_after_concurrent_send_is_forbidden() {
        let f = fixture().await;
        let now = Utc::now();
        let created = create_letter(&f.pool, f.alice, letter_to(f.bob, "hi"), now).await.unwrap();
        let draft = find(&f.pool, created.id).await.unwrap();
        ensure_draft(&draft).unwrap();

        db::send_draft(&f.pool, draft.id, f.alice, LetterStatus::Sent, now, now)
            .await
            .unwrap()
            .unwrap();

        let patch = UpdateLetterRequest {
            content: Some("too late".to_string()),
            ..Default::default()
        };
        let err = commit_edit(&f.pool, &draft, &patch, now).await.unwrap_err();
        assert_matches!(err, BackendError::Forbidden(message) if message == NOT_DRAFT);

        let stored = find(&f.pool, draft.id).await.unwrap();
        assert_eq!(stored.status, LetterStatus::Sent);
        assert_eq!(stored.content, "hi");
    }

    #[tokio::test]
    async fn test_send_after_concurrent_send_is_forbidden() {
        let f = fixture().await;
        let now = Utc::now();
        let created = create_letter(&f.pool, f.alice, letter_to(f.bob, "hi"), now).await.unwrap();
        let draft = find(&f.pool, created.id).await.unwrap();
        ensure_draft(&draft).unwrap();

        let later = now + Duration::days(2);
        db::send_draft(&f.pool, draft.id, f.alice, LetterStatus::Scheduled, later, now)
            .await
            .unwrap()
            .unwrap();

        let err = commit_send(&f.pool, &draft, SendLetterRequest { delivery_date: None }, now)
            .await
            .unwrap_err();
        assert_matches!(err, BackendError::Forbidden(message) if message == NOT_DRAFT);

        let stored = find(&f.pool, draft.id).await.unwrap();
        assert_eq!(stored.status, LetterStatus::Scheduled);
        assert_eq!(stored.delivery_date, Some(later));
    }
}
