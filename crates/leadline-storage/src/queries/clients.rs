// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tenant lookup and atomic message counters.
//!
//! Clients are mutated by billing/admin flows elsewhere; the core only reads
//! them and bumps counters. Counter updates are `SET x = x + 1` so concurrent
//! inbound traffic never loses increments to read-modify-write races.

use leadline_core::LeadlineError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{AiMode, Client, ClientStatus};
use crate::queries::column_enum;

const CLIENT_COLUMNS: &str = "id, business_name, owner_name, platform_number, owner_phone,
     status, ai_mode, auto_respond, contractor_ping, timezone,
     messages_this_month, messages_today, created_at, updated_at";

fn row_to_client(row: &rusqlite::Row<'_>) -> Result<Client, rusqlite::Error> {
    Ok(Client {
        id: row.get(0)?,
        business_name: row.get(1)?,
        owner_name: row.get(2)?,
        platform_number: row.get(3)?,
        owner_phone: row.get(4)?,
        status: column_enum::<ClientStatus>(5, row.get(5)?)?,
        ai_mode: column_enum::<AiMode>(6, row.get(6)?)?,
        auto_respond: row.get(7)?,
        contractor_ping: row.get(8)?,
        timezone: row.get(9)?,
        messages_this_month: row.get(10)?,
        messages_today: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

/// Find the active client assigned the given platform number.
///
/// Paused and cancelled tenants are invisible here; the router drops their
/// inbound traffic before any side effect.
pub async fn find_active_by_number(
    db: &Database,
    platform_number: &str,
) -> Result<Option<Client>, LeadlineError> {
    let platform_number = platform_number.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CLIENT_COLUMNS} FROM clients
                 WHERE platform_number = ?1 AND status = 'active'"
            ))?;
            let result = stmt.query_row(params![platform_number], row_to_client);
            match result {
                Ok(client) => Ok(Some(client)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a client by id.
pub async fn get(db: &Database, id: &str) -> Result<Option<Client>, LeadlineError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = ?1"))?;
            let result = stmt.query_row(params![id], row_to_client);
            match result {
                Ok(client) => Ok(Some(client)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Atomically bump the daily and monthly message counters.
pub async fn increment_message_counters(db: &Database, id: &str) -> Result<(), LeadlineError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE clients SET
                 messages_today = messages_today + 1,
                 messages_this_month = messages_this_month + 1,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Atomically bump the conversations-started counter (new lead created).
pub async fn increment_conversations_started(db: &Database, id: &str) -> Result<(), LeadlineError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE clients SET
                 conversations_started = conversations_started + 1,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{seed_client, setup_db};

    #[tokio::test]
    async fn find_active_ignores_paused_and_cancelled() {
        let (db, _dir) = setup_db().await;
        seed_client(&db, "c1", "+15550001111", "active").await;
        seed_client(&db, "c2", "+15550002222", "paused").await;

        let found = find_active_by_number(&db, "+15550001111").await.unwrap();
        assert_eq!(found.unwrap().id, "c1");

        let paused = find_active_by_number(&db, "+15550002222").await.unwrap();
        assert!(paused.is_none());

        let unknown = find_active_by_number(&db, "+15559999999").await.unwrap();
        assert!(unknown.is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn counters_increment_atomically() {
        let (db, _dir) = setup_db().await;
        seed_client(&db, "c1", "+15550001111", "active").await;

        for _ in 0..3 {
            increment_message_counters(&db, "c1").await.unwrap();
        }

        let client = get(&db, "c1").await.unwrap().unwrap();
        assert_eq!(client.messages_today, 3);
        assert_eq!(client.messages_this_month, 3);

        db.close().await.unwrap();
    }
}
