// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database seeding helpers for router and escalation tests.

use rusqlite::params;
use tempfile::tempdir;

use leadline_storage::Database;
use leadline_storage::queries::leads;

/// Open a fresh migrated database in a temp directory.
pub async fn setup_db() -> (Database, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test.db");
    let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
    (db, dir)
}

/// Options for seeding a client row. Defaults model a typical active tenant
/// in legacy AI mode.
#[derive(Debug, Clone)]
pub struct SeedClient {
    pub id: String,
    pub platform_number: String,
    pub owner_phone: Option<String>,
    pub status: String,
    pub ai_mode: String,
    pub auto_respond: bool,
    pub contractor_ping: bool,
}

impl Default for SeedClient {
    fn default() -> Self {
        Self {
            id: "c1".into(),
            platform_number: "+15550001111".into(),
            owner_phone: Some("+15550009999".into()),
            status: "active".into(),
            ai_mode: "legacy".into(),
            auto_respond: true,
            contractor_ping: false,
        }
    }
}

/// Insert a client row.
pub async fn seed_client(db: &Database, spec: SeedClient) {
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO clients (id, business_name, owner_name, platform_number,
                                      owner_phone, status, ai_mode, auto_respond,
                                      contractor_ping)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    spec.id,
                    format!("{} Plumbing Co", spec.id),
                    "Jordan",
                    spec.platform_number,
                    spec.owner_phone,
                    spec.status,
                    spec.ai_mode,
                    spec.auto_respond,
                    spec.contractor_ping,
                ],
            )?;
            Ok(())
        })
        .await
        .unwrap();
}

/// Find-or-create a lead and return its id.
pub async fn seed_lead(db: &Database, client_id: &str, phone: &str) -> i64 {
    let (lead, _) = leads::find_or_create(db, client_id, phone).await.unwrap();
    lead.id
}

/// Insert an active team member.
pub async fn seed_member(
    db: &Database,
    id: &str,
    client_id: &str,
    active: bool,
    notify_escalations: bool,
) {
    let id = id.to_string();
    let client_id = client_id.to_string();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO team_members (id, client_id, name, phone, email, active,
                                           notify_escalations)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    id,
                    client_id,
                    format!("member {id}"),
                    format!("+1555100{id}"),
                    format!("{id}@example.com"),
                    active,
                    notify_escalations,
                ],
            )?;
            Ok(())
        })
        .await
        .unwrap();
}

/// Insert an escalation rule and return its id.
#[allow(clippy::too_many_arguments)]
pub async fn seed_rule(
    db: &Database,
    client_id: &str,
    name: &str,
    priority: i64,
    triggers: &[&str],
    assign_to: Option<&str>,
    notify_channels: &[&str],
    auto_response: Option<&str>,
) -> i64 {
    let client_id = client_id.to_string();
    let name = name.to_string();
    let triggers = serde_json::to_string(triggers).unwrap();
    let notify_channels = serde_json::to_string(notify_channels).unwrap();
    let assign_to = assign_to.map(|a| a.to_string());
    let auto_response = auto_response.map(|a| a.to_string());
    db.connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.execute(
                "INSERT INTO escalation_rules
                     (client_id, name, priority, enabled, triggers, assign_to,
                      notify_channels, auto_response)
                 VALUES (?1, ?2, ?3, 1, ?4, ?5, ?6, ?7)",
                params![
                    client_id,
                    name,
                    priority,
                    triggers,
                    assign_to,
                    notify_channels,
                    auto_response
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .unwrap()
}

/// Rewind an escalation's deadline so the next sweep sees it breached.
pub async fn force_deadline_past(db: &Database, id: i64) {
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "UPDATE escalations
                 SET sla_deadline = strftime('%Y-%m-%dT%H:%M:%fZ', 'now', '-5 minutes')
                 WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .unwrap();
}
