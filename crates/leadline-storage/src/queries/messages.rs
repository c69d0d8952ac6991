// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only conversation log and media records.
//!
//! Inbound appends are the idempotency boundary for duplicate webhook
//! delivery: the partial unique index on provider_sid turns a re-delivered
//! message into a detected no-op instead of a second row.

use leadline_core::LeadlineError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{Direction, MediaRecord, MessageType, SmsMessage};
use crate::queries::{column_enum, column_json};

const MESSAGE_COLUMNS: &str =
    "id, lead_id, client_id, direction, message_type, body, provider_sid, created_at";

fn row_to_message(row: &rusqlite::Row<'_>) -> Result<SmsMessage, rusqlite::Error> {
    Ok(SmsMessage {
        id: row.get(0)?,
        lead_id: row.get(1)?,
        client_id: row.get(2)?,
        direction: column_enum::<Direction>(3, row.get(3)?)?,
        message_type: column_enum::<MessageType>(4, row.get(4)?)?,
        body: row.get(5)?,
        provider_sid: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// Append one inbound message. Returns `None` when the provider sid has
/// already been persisted (duplicate webhook delivery).
pub async fn append_inbound(
    db: &Database,
    lead_id: i64,
    client_id: &str,
    message_type: MessageType,
    body: &str,
    provider_sid: &str,
) -> Result<Option<i64>, LeadlineError> {
    let client_id = client_id.to_string();
    let message_type = message_type.to_string();
    let body = body.to_string();
    let provider_sid = provider_sid.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.execute(
                "INSERT INTO messages (lead_id, client_id, direction, message_type, body, provider_sid)
                 VALUES (?1, ?2, 'inbound', ?3, ?4, ?5)",
                params![lead_id, client_id, message_type, body, provider_sid],
            );
            match result {
                Ok(_) => Ok(Some(conn.last_insert_rowid())),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    Ok(None)
                }
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Append one outbound message record.
pub async fn append_outbound(
    db: &Database,
    lead_id: i64,
    client_id: &str,
    message_type: MessageType,
    body: &str,
    provider_sid: Option<&str>,
) -> Result<i64, LeadlineError> {
    let client_id = client_id.to_string();
    let message_type = message_type.to_string();
    let body = body.to_string();
    let provider_sid = provider_sid.map(|s| s.to_string());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (lead_id, client_id, direction, message_type, body, provider_sid)
                 VALUES (?1, ?2, 'outbound', ?3, ?4, ?5)",
                params![lead_id, client_id, message_type, body, provider_sid],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The most recent `limit` messages for a lead, oldest first, for responder
/// history.
pub async fn recent_history(
    db: &Database,
    lead_id: i64,
    limit: usize,
) -> Result<Vec<SmsMessage>, LeadlineError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM (
                     SELECT {MESSAGE_COLUMNS} FROM messages
                     WHERE lead_id = ?1 ORDER BY id DESC LIMIT ?2
                 ) ORDER BY id ASC"
            ))?;
            let rows = stmt.query_map(params![lead_id, limit as i64], row_to_message)?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Count messages for a lead (used by tests and dashboards).
pub async fn count_for_lead(db: &Database, lead_id: i64) -> Result<i64, LeadlineError> {
    db.connection()
        .call(move |conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM messages WHERE lead_id = ?1",
                params![lead_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Persist one processed media item against its message.
pub async fn insert_media(
    db: &Database,
    message_id: i64,
    url: &str,
    content_type: &str,
    description: Option<&str>,
    tags: &[String],
) -> Result<i64, LeadlineError> {
    let url = url.to_string();
    let content_type = content_type.to_string();
    let description = description.map(|d| d.to_string());
    let tags = serde_json::to_string(tags)
        .map_err(|e| LeadlineError::Internal(format!("media tags serialize: {e}")))?;
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO media (message_id, url, content_type, description, tags)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![message_id, url, content_type, description, tags],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Media records attached to a message.
pub async fn media_for_message(
    db: &Database,
    message_id: i64,
) -> Result<Vec<MediaRecord>, LeadlineError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, message_id, url, content_type, description, tags
                 FROM media WHERE message_id = ?1 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![message_id], |row| {
                Ok(MediaRecord {
                    id: row.get(0)?,
                    message_id: row.get(1)?,
                    url: row.get(2)?,
                    content_type: row.get(3)?,
                    description: row.get(4)?,
                    tags: column_json(5, row.get(5)?)?,
                })
            })?;
            let mut records = Vec::new();
            for row in rows {
                records.push(row?);
            }
            Ok(records)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{seed_client, seed_lead, setup_db};

    #[tokio::test]
    async fn duplicate_provider_sid_is_detected_not_inserted() {
        let (db, _dir) = setup_db().await;
        seed_client(&db, "c1", "+15550001111", "active").await;
        let lead_id = seed_lead(&db, "c1", "+15557778888").await;

        let first = append_inbound(&db, lead_id, "c1", MessageType::Sms, "hi", "SM100")
            .await
            .unwrap();
        assert!(first.is_some());

        let second = append_inbound(&db, lead_id, "c1", MessageType::Sms, "hi", "SM100")
            .await
            .unwrap();
        assert!(second.is_none(), "re-delivery must not insert a second row");

        assert_eq!(count_for_lead(&db, lead_id).await.unwrap(), 1);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn outbound_sids_do_not_collide_with_inbound_index() {
        let (db, _dir) = setup_db().await;
        seed_client(&db, "c1", "+15550001111", "active").await;
        let lead_id = seed_lead(&db, "c1", "+15557778888").await;

        append_inbound(&db, lead_id, "c1", MessageType::Sms, "hi", "SM200")
            .await
            .unwrap();
        // Same sid on an outbound row is allowed; the dedup index only
        // covers inbound.
        append_outbound(&db, lead_id, "c1", MessageType::AiResponse, "hello!", Some("SM200"))
            .await
            .unwrap();

        assert_eq!(count_for_lead(&db, lead_id).await.unwrap(), 2);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn recent_history_returns_last_n_oldest_first() {
        let (db, _dir) = setup_db().await;
        seed_client(&db, "c1", "+15550001111", "active").await;
        let lead_id = seed_lead(&db, "c1", "+15557778888").await;

        for i in 0..5 {
            append_inbound(
                &db,
                lead_id,
                "c1",
                MessageType::Sms,
                &format!("msg {i}"),
                &format!("SM{i}"),
            )
            .await
            .unwrap();
        }

        let history = recent_history(&db, lead_id, 3).await.unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].body, "msg 2");
        assert_eq!(history[2].body, "msg 4");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn media_round_trips_tags() {
        let (db, _dir) = setup_db().await;
        seed_client(&db, "c1", "+15550001111", "active").await;
        let lead_id = seed_lead(&db, "c1", "+15557778888").await;
        let msg_id = append_inbound(&db, lead_id, "c1", MessageType::Mms, "", "SM300")
            .await
            .unwrap()
            .unwrap();

        insert_media(
            &db,
            msg_id,
            "https://cdn.example.com/a.jpg",
            "image/jpeg",
            Some("water heater, visible rust"),
            &["plumbing".to_string(), "rust".to_string()],
        )
        .await
        .unwrap();

        let media = media_for_message(&db, msg_id).await.unwrap();
        assert_eq!(media.len(), 1);
        assert_eq!(media[0].tags, vec!["plumbing", "rust"]);
        assert_eq!(
            media[0].description.as_deref(),
            Some("water heater, visible rust")
        );

        db.close().await.unwrap();
    }
}
