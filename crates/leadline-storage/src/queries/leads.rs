// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead find-or-create and state transitions.
//!
//! Leads are never deleted, only status-transitioned. The partial unique
//! index on (client_id, phone) WHERE deleted = 0 enforces the one-lead-per-
//! pair invariant at the storage layer.

use leadline_core::LeadlineError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{ConversationMode, Lead, LeadStage};
use crate::queries::column_enum;

const LEAD_COLUMNS: &str = "id, client_id, phone, name, conversation_mode, opted_out,
     action_required, action_reason, stage, created_at, updated_at";

fn row_to_lead(row: &rusqlite::Row<'_>) -> Result<Lead, rusqlite::Error> {
    Ok(Lead {
        id: row.get(0)?,
        client_id: row.get(1)?,
        phone: row.get(2)?,
        name: row.get(3)?,
        conversation_mode: column_enum::<ConversationMode>(4, row.get(4)?)?,
        opted_out: row.get(5)?,
        action_required: row.get(6)?,
        action_reason: row.get(7)?,
        stage: column_enum::<LeadStage>(8, row.get(8)?)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

/// Find the non-deleted lead for (client, phone).
pub async fn find(
    db: &Database,
    client_id: &str,
    phone: &str,
) -> Result<Option<Lead>, LeadlineError> {
    let client_id = client_id.to_string();
    let phone = phone.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {LEAD_COLUMNS} FROM leads
                 WHERE client_id = ?1 AND phone = ?2 AND deleted = 0"
            ))?;
            let result = stmt.query_row(params![client_id, phone], row_to_lead);
            match result {
                Ok(lead) => Ok(Some(lead)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a lead by id.
pub async fn get(db: &Database, id: i64) -> Result<Option<Lead>, LeadlineError> {
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = ?1"))?;
            let result = stmt.query_row(params![id], row_to_lead);
            match result {
                Ok(lead) => Ok(Some(lead)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Find or create the lead for (client, phone). Returns the lead and whether
/// it was newly created (feeds the conversation-started counter).
///
/// A concurrent insert racing past the read collides with the partial unique
/// index; the loser re-reads and returns the winner's row.
pub async fn find_or_create(
    db: &Database,
    client_id: &str,
    phone: &str,
) -> Result<(Lead, bool), LeadlineError> {
    let client_id = client_id.to_string();
    let phone = phone.to_string();
    db.connection()
        .call(move |conn| {
            let select = format!(
                "SELECT {LEAD_COLUMNS} FROM leads
                 WHERE client_id = ?1 AND phone = ?2 AND deleted = 0"
            );
            let existing = conn
                .prepare(&select)?
                .query_row(params![client_id, phone], row_to_lead);
            match existing {
                Ok(lead) => return Ok((lead, false)),
                Err(rusqlite::Error::QueryReturnedNoRows) => {}
                Err(e) => return Err(e.into()),
            }

            let inserted = conn.execute(
                "INSERT INTO leads (client_id, phone) VALUES (?1, ?2)",
                params![client_id, phone],
            );
            match inserted {
                Ok(_) => {
                    let lead = conn
                        .prepare(&select)?
                        .query_row(params![client_id, phone], row_to_lead)?;
                    Ok((lead, true))
                }
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    // Lost the race; the other writer's row is the lead.
                    let lead = conn
                        .prepare(&select)?
                        .query_row(params![client_id, phone], row_to_lead)?;
                    Ok((lead, false))
                }
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Flag the lead opted-out. Idempotent.
pub async fn mark_opted_out(db: &Database, id: i64) -> Result<(), LeadlineError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE leads SET opted_out = 1,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Set the lead's lifecycle stage.
pub async fn set_stage(db: &Database, id: i64, stage: LeadStage) -> Result<(), LeadlineError> {
    let stage = stage.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE leads SET stage = ?2,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id, stage],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Switch who owns the conversation (AI or human takeover).
pub async fn set_conversation_mode(
    db: &Database,
    id: i64,
    mode: ConversationMode,
) -> Result<(), LeadlineError> {
    let mode = mode.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE leads SET conversation_mode = ?2,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id, mode],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Set or clear the action-required flag and its reason.
pub async fn set_action_required(
    db: &Database,
    id: i64,
    required: bool,
    reason: Option<&str>,
) -> Result<(), LeadlineError> {
    let reason = reason.map(|r| r.to_string());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE leads SET action_required = ?2, action_reason = ?3,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id, required, reason],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
