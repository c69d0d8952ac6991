// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scheduled sequence steps and bulk cancellation.

use leadline_core::LeadlineError;
use rusqlite::params;

use crate::database::Database;
use crate::models::ScheduledMessage;

fn row_to_scheduled(row: &rusqlite::Row<'_>) -> Result<ScheduledMessage, rusqlite::Error> {
    Ok(ScheduledMessage {
        id: row.get(0)?,
        lead_id: row.get(1)?,
        client_id: row.get(2)?,
        body: row.get(3)?,
        send_at: row.get(4)?,
        sent: row.get(5)?,
        cancelled: row.get(6)?,
        cancel_reason: row.get(7)?,
    })
}

/// Enqueue a future sequence step for a lead.
pub async fn schedule(
    db: &Database,
    lead_id: i64,
    client_id: &str,
    body: &str,
    send_at: &str,
) -> Result<i64, LeadlineError> {
    let client_id = client_id.to_string();
    let body = body.to_string();
    let send_at = send_at.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO scheduled_messages (lead_id, client_id, body, send_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![lead_id, client_id, body, send_at],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Cancel every pending, un-sent step for a lead in one conditional update.
///
/// One bulk `WHERE sent = 0 AND cancelled = 0` statement, not a read-then-
/// write loop: two concurrent inbound replies cannot both "win" a
/// cancellation race or leave a partial cancellation behind. Returns the
/// number of steps cancelled.
pub async fn cancel_pending_for_lead(
    db: &Database,
    lead_id: i64,
    reason: &str,
) -> Result<usize, LeadlineError> {
    let reason = reason.to_string();
    db.connection()
        .call(move |conn| {
            let cancelled = conn.execute(
                "UPDATE scheduled_messages
                 SET cancelled = 1, cancel_reason = ?2
                 WHERE lead_id = ?1 AND sent = 0 AND cancelled = 0",
                params![lead_id, reason],
            )?;
            Ok(cancelled)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Steps still awaiting send for a lead.
pub async fn pending_for_lead(
    db: &Database,
    lead_id: i64,
) -> Result<Vec<ScheduledMessage>, LeadlineError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, lead_id, client_id, body, send_at, sent, cancelled, cancel_reason
                 FROM scheduled_messages
                 WHERE lead_id = ?1 AND sent = 0 AND cancelled = 0
                 ORDER BY send_at ASC",
            )?;
            let rows = stmt.query_map(params![lead_id], row_to_scheduled)?;
            let mut steps = Vec::new();
            for row in rows {
                steps.push(row?);
            }
            Ok(steps)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
