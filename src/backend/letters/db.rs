//! Database operations for letters
//!
//! Lifecycle transitions are single conditional `UPDATE ... RETURNING`
//! statements: the expected current status is part of the `WHERE` clause,
//! so a transition that lost a race affects no row and returns `None`.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::shared::{Letter, LetterStatus, UpdateLetterRequest};

const LETTER_COLUMNS: &str = "id, author_id, recipient_id, subject, content, photo_url, song_url, \
     status, created_at, finished_at, delivery_date";

fn letter_from_row(row: &SqliteRow) -> Result<Letter, sqlx::Error> {
    let status: String = row.try_get("status")?;
    let status = LetterStatus::parse(&status).ok_or_else(|| sqlx::Error::ColumnDecode {
        index: "status".to_string(),
        source: format!("unknown letter status '{}'", status).into(),
    })?;

    Ok(Letter {
        id: row.try_get("id")?,
        author_id: row.try_get("author_id")?,
        recipient_id: row.try_get("recipient_id")?,
        subject: row.try_get("subject")?,
        content: row.try_get("content")?,
        photo_url: row.try_get("photo_url")?,
        song_url: row.try_get("song_url")?,
        status,
        created_at: row.try_get("created_at")?,
        finished_at: row.try_get("finished_at")?,
        delivery_date: row.try_get("delivery_date")?,
    })
}

fn letters_from_rows(rows: Vec<SqliteRow>) -> Result<Vec<Letter>, sqlx::Error> {
    rows.iter().map(letter_from_row).collect()
}

/// Insert a letter as given
pub async fn insert_letter(pool: &SqlitePool, letter: &Letter) -> Result<Letter, sqlx::Error> {
    let row = sqlx::query(&format!(
        r#"
        INSERT INTO letters (id, author_id, recipient_id, subject, content, photo_url, song_url,
                             status, created_at, finished_at, delivery_date)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {LETTER_COLUMNS}
        "#
    ))
    .bind(letter.id)
    .bind(letter.author_id)
    .bind(letter.recipient_id)
    .bind(&letter.subject)
    .bind(&letter.content)
    .bind(&letter.photo_url)
    .bind(&letter.song_url)
    .bind(letter.status.as_str())
    .bind(letter.created_at)
    .bind(letter.finished_at)
    .bind(letter.delivery_date)
    .fetch_one(pool)
    .await?;

    letter_from_row(&row)
}

/// Get a letter by ID
pub async fn get_letter(pool: &SqlitePool, id: Uuid) -> Result<Option<Letter>, sqlx::Error> {
    let row = sqlx::query(&format!("SELECT {LETTER_COLUMNS} FROM letters WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(letter_from_row).transpose()
}

/// Author's drafts, newest first
pub async fn list_drafts(pool: &SqlitePool, author_id: Uuid) -> Result<Vec<Letter>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {LETTER_COLUMNS}
        FROM letters
        WHERE author_id = ? AND status = 'DRAFT'
        ORDER BY created_at DESC
        "#
    ))
    .bind(author_id)
    .fetch_all(pool)
    .await?;

    letters_from_rows(rows)
}

/// Author's scheduled and sent letters, newest first
pub async fn list_sent(pool: &SqlitePool, author_id: Uuid) -> Result<Vec<Letter>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {LETTER_COLUMNS}
        FROM letters
        WHERE author_id = ? AND status IN ('SCHEDULED', 'SENT')
        ORDER BY created_at DESC
        "#
    ))
    .bind(author_id)
    .fetch_all(pool)
    .await?;

    letters_from_rows(rows)
}

/// Letters delivered to the recipient by `now`, newest delivery first
pub async fn list_received(
    pool: &SqlitePool,
    recipient_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Vec<Letter>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {LETTER_COLUMNS}
        FROM letters
        WHERE recipient_id = ?
          AND status != 'DRAFT'
          AND delivery_date IS NOT NULL
          AND delivery_date <= ?
        ORDER BY delivery_date DESC
        "#
    ))
    .bind(recipient_id)
    .bind(now)
    .fetch_all(pool)
    .await?;

    letters_from_rows(rows)
}

/// Apply a patch to a draft owned by `author_id`
///
/// Returns `None` when no draft matched (already sent, or not the author).
pub async fn update_draft(
    pool: &SqlitePool,
    id: Uuid,
    author_id: Uuid,
    patch: &UpdateLetterRequest,
    now: DateTime<Utc>,
) -> Result<Option<Letter>, sqlx::Error> {
    let row = sqlx::query(&format!(
        r#"
        UPDATE letters
        SET subject = COALESCE(?, subject),
            content = COALESCE(?, content),
            song_url = COALESCE(?, song_url),
            photo_url = COALESCE(?, photo_url),
            finished_at = ?
        WHERE id = ? AND author_id = ? AND status = 'DRAFT'
        RETURNING {LETTER_COLUMNS}
        "#
    ))
    .bind(&patch.subject)
    .bind(&patch.content)
    .bind(&patch.song_url)
    .bind(&patch.photo_url)
    .bind(now)
    .bind(id)
    .bind(author_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(letter_from_row).transpose()
}

/// Move a draft to `status` with the given delivery date
pub async fn send_draft(
    pool: &SqlitePool,
    id: Uuid,
    author_id: Uuid,
    status: LetterStatus,
    delivery_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<Option<Letter>, sqlx::Error> {
    let row = sqlx::query(&format!(
        r#"
        UPDATE letters
        SET status = ?,
            delivery_date = ?,
            finished_at = COALESCE(finished_at, ?)
        WHERE id = ? AND author_id = ? AND status = 'DRAFT'
        RETURNING {LETTER_COLUMNS}
        "#
    ))
    .bind(status.as_str())
    .bind(delivery_date)
    .bind(now)
    .bind(id)
    .bind(author_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(letter_from_row).transpose()
}

/// Mark a delivered letter as opened by its recipient
pub async fn mark_opened(
    pool: &SqlitePool,
    id: Uuid,
    recipient_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Option<Letter>, sqlx::Error> {
    let row = sqlx::query(&format!(
        r#"
        UPDATE letters
        SET status = 'OPENED'
        WHERE id = ?
          AND recipient_id = ?
          AND status IN ('SCHEDULED', 'SENT')
          AND delivery_date IS NOT NULL
          AND delivery_date <= ?
        RETURNING {LETTER_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(recipient_id)
    .bind(now)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(letter_from_row).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::auth::users::create_user;
    use crate::backend::server::config::load_database;
    use crate::shared::CreateLetterRequest;
    use chrono::Duration;

    async fn setup() -> (SqlitePool, Uuid, Uuid) {
        let pool = load_database("sqlite::memory:").await.unwrap();
        let author = create_user(&pool, "a@example.com", "hash", "Author").await.unwrap();
        let recipient = create_user(&pool, "r@example.com", "hash", "Recipient").await.unwrap();
        (pool, author.id, recipient.id)
    }

    fn draft(author: Uuid, recipient: Uuid, now: DateTime<Utc>) -> Letter {
        Letter::draft(
            author,
            CreateLetterRequest {
                recipient_id: recipient,
                content: "hello".to_string(),
                subject: Some("hi".to_string()),
                song_url: None,
                photo_url: None,
            },
            now,
        )
    }

    #[tokio::test]
    async fn test_insert_and_get_round_trip() {
        let (pool, author, recipient) = setup().await;
        let letter = draft(author, recipient, Utc::now());

        let stored = insert_letter(&pool, &letter).await.unwrap();
        assert_eq!(stored, letter);
        assert_eq!(get_letter(&pool, letter.id).await.unwrap(), Some(letter));
        assert_eq!(get_letter(&pool, Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unknown_recipient_violates_foreign_key() {
        let (pool, author, _) = setup().await;
        let letter = draft(author, Uuid::new_v4(), Utc::now());
        assert!(insert_letter(&pool, &letter).await.is_err());
    }

    #[tokio::test]
    async fn test_send_only_affects_drafts() {
        let (pool, author, recipient) = setup().await;
        let now = Utc::now();
        let letter = insert_letter(&pool, &draft(author, recipient, now)).await.unwrap();

        let sent = send_draft(&pool, letter.id, author, LetterStatus::Sent, now, now)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(sent.status, LetterStatus::Sent);
        assert_eq!(sent.finished_at, Some(now));

        let again = send_draft(&pool, letter.id, author, LetterStatus::Sent, now, now)
            .await
            .unwrap();
        assert!(again.is_none());

        let patched = update_draft(&pool, letter.id, author, &UpdateLetterRequest::default(), now)
            .await
            .unwrap();
        assert!(patched.is_none());
    }

    #[tokio::test]
    async fn test_received_filters_on_delivery_date() {
        let (pool, author, recipient) = setup().await;
        let now = Utc::now();

        let due = insert_letter(&pool, &draft(author, recipient, now)).await.unwrap();
        send_draft(&pool, due.id, author, LetterStatus::Sent, now - Duration::minutes(5), now)
            .await
            .unwrap();

        let later = insert_letter(&pool, &draft(author, recipient, now)).await.unwrap();
        send_draft(&pool, later.id, author, LetterStatus::Scheduled, now + Duration::days(1), now)
            .await
            .unwrap();

        insert_letter(&pool, &draft(author, recipient, now)).await.unwrap();

        let received = list_received(&pool, recipient, now).await.unwrap();
        assert_eq!(received.iter().map(|l| l.id).collect::<Vec<_>>(), vec![due.id]);

        let tomorrow = list_received(&pool, recipient, now + Duration::days(2)).await.unwrap();
        assert_eq!(
            tomorrow.iter().map(|l| l.id).collect::<Vec<_>>(),
            vec![later.id, due.id]
        );
    }

    #[tokio::test]
    async fn test_mark_opened_requires_delivery() {
        let (pool, author, recipient) = setup().await;
        let now = Utc::now();
        let letter = insert_letter(&pool, &draft(author, recipient, now)).await.unwrap();
        send_draft(&pool, letter.id, author, LetterStatus::Scheduled, now + Duration::hours(1), now)
            .await
            .unwrap();

        assert!(mark_opened(&pool, letter.id, recipient, now).await.unwrap().is_none());
        assert!(mark_opened(&pool, letter.id, author, now + Duration::hours(2))
            .await
            .unwrap()
            .is_none());

        let opened = mark_opened(&pool, letter.id, recipient, now + Duration::hours(2))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(opened.status, LetterStatus::Opened);
    }
}
