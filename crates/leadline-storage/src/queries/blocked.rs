// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Opt-out blocklist. Existence of a row blocks all sends to the pair.

use leadline_core::LeadlineError;
use rusqlite::params;

use crate::database::Database;

/// Record an opt-out. Insert-or-ignore so repeated STOP messages stay
/// idempotent. Returns true when a new row was inserted.
pub async fn block(db: &Database, client_id: &str, phone: &str) -> Result<bool, LeadlineError> {
    let client_id = client_id.to_string();
    let phone = phone.to_string();
    db.connection()
        .call(move |conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO blocked_numbers (client_id, phone) VALUES (?1, ?2)",
                params![client_id, phone],
            )?;
            Ok(inserted > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// True when (client, phone) is blocked.
pub async fn is_blocked(db: &Database, client_id: &str, phone: &str) -> Result<bool, LeadlineError> {
    let client_id = client_id.to_string();
    let phone = phone.to_string();
    db.connection()
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM blocked_numbers WHERE client_id = ?1 AND phone = ?2",
                params![client_id, phone],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Remove a block (explicit re-subscribe, admin action).
pub async fn unblock(db: &Database, client_id: &str, phone: &str) -> Result<(), LeadlineError> {
    let client_id = client_id.to_string();
    let phone = phone.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "DELETE FROM blocked_numbers WHERE client_id = ?1 AND phone = ?2",
                params![client_id, phone],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
