// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Team member lookup for assignment and notification fan-out.

use leadline_core::LeadlineError;
use rusqlite::params;

use crate::database::Database;
use crate::models::TeamMember;

const MEMBER_COLUMNS: &str =
    "id, client_id, name, phone, email, active, notify_escalations, notify_hot_transfers";

fn row_to_member(row: &rusqlite::Row<'_>) -> Result<TeamMember, rusqlite::Error> {
    Ok(TeamMember {
        id: row.get(0)?,
        client_id: row.get(1)?,
        name: row.get(2)?,
        phone: row.get(3)?,
        email: row.get(4)?,
        active: row.get(5)?,
        notify_escalations: row.get(6)?,
        notify_hot_transfers: row.get(7)?,
    })
}

/// Get one team member by id.
pub async fn get(db: &Database, id: &str) -> Result<Option<TeamMember>, LeadlineError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MEMBER_COLUMNS} FROM team_members WHERE id = ?1"
            ))?;
            let result = stmt.query_row(params![id], row_to_member);
            match result {
                Ok(member) => Ok(Some(member)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Active members for a client, stable id order.
pub async fn active_for_client(
    db: &Database,
    client_id: &str,
) -> Result<Vec<TeamMember>, LeadlineError> {
    let client_id = client_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MEMBER_COLUMNS} FROM team_members
                 WHERE client_id = ?1 AND active = 1 ORDER BY id ASC"
            ))?;
            let rows = stmt.query_map(params![client_id], row_to_member)?;
            let mut members = Vec::new();
            for row in rows {
                members.push(row?);
            }
            Ok(members)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Active members subscribed to escalation notifications.
pub async fn escalation_subscribers(
    db: &Database,
    client_id: &str,
) -> Result<Vec<TeamMember>, LeadlineError> {
    let client_id = client_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MEMBER_COLUMNS} FROM team_members
                 WHERE client_id = ?1 AND active = 1 AND notify_escalations = 1
                 ORDER BY id ASC"
            ))?;
            let rows = stmt.query_map(params![client_id], row_to_member)?;
            let mut members = Vec::new();
            for row in rows {
                members.push(row?);
            }
            Ok(members)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{seed_client, seed_member, setup_db};

    #[tokio::test]
    async fn subscribers_filter_on_active_and_flag() {
        let (db, _dir) = setup_db().await;
        seed_client(&db, "c1", "+15550001111", "active").await;
        seed_member(&db, "m1", "c1", true, true).await;
        seed_member(&db, "m2", "c1", true, false).await;
        seed_member(&db, "m3", "c1", false, true).await;

        let active = active_for_client(&db, "c1").await.unwrap();
        assert_eq!(active.len(), 2);

        let subs = escalation_subscribers(&db, "c1").await.unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].id, "m1");

        db.close().await.unwrap();
    }
}
