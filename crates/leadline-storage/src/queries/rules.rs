// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Escalation rule lookup. Rules are admin-managed elsewhere; the engine
//! only reads them and bumps trigger stats.

use leadline_core::LeadlineError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{EscalationRule, NotifyChannel};
use crate::queries::column_json;

fn row_to_rule(row: &rusqlite::Row<'_>) -> Result<EscalationRule, rusqlite::Error> {
    Ok(EscalationRule {
        id: row.get(0)?,
        client_id: row.get(1)?,
        name: row.get(2)?,
        priority: row.get(3)?,
        enabled: row.get(4)?,
        triggers: column_json::<Vec<String>>(5, row.get(5)?)?,
        assign_to: row.get(6)?,
        notify_channels: column_json::<Vec<NotifyChannel>>(7, row.get(7)?)?,
        auto_response: row.get(8)?,
        trigger_count: row.get(9)?,
        last_triggered_at: row.get(10)?,
    })
}

/// Enabled rules for a client, most urgent priority first. First match wins.
pub async fn enabled_for_client(
    db: &Database,
    client_id: &str,
) -> Result<Vec<EscalationRule>, LeadlineError> {
    let client_id = client_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, client_id, name, priority, enabled, triggers, assign_to,
                        notify_channels, auto_response, trigger_count, last_triggered_at
                 FROM escalation_rules
                 WHERE client_id = ?1 AND enabled = 1
                 ORDER BY priority ASC, id ASC",
            )?;
            let rows = stmt.query_map(params![client_id], row_to_rule)?;
            let mut rules = Vec::new();
            for row in rows {
                rules.push(row?);
            }
            Ok(rules)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Bump a matched rule's trigger counter and stamp the trigger time.
pub async fn record_trigger(db: &Database, rule_id: i64) -> Result<(), LeadlineError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE escalation_rules SET
                 trigger_count = trigger_count + 1,
                 last_triggered_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![rule_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{seed_client, seed_rule, setup_db};

    #[tokio::test]
    async fn rules_come_back_priority_ordered_and_enabled_only() {
        let (db, _dir) = setup_db().await;
        seed_client(&db, "c1", "+15550001111", "active").await;
        seed_rule(&db, "c1", "low", 50, true, &["price"], None).await;
        seed_rule(&db, "c1", "urgent", 1, true, &["emergency"], Some("round_robin")).await;
        seed_rule(&db, "c1", "disabled", 2, false, &["never"], None).await;

        let rules = enabled_for_client(&db, "c1").await.unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].name, "urgent");
        assert_eq!(rules[0].assign_to.as_deref(), Some("round_robin"));
        assert_eq!(rules[1].name, "low");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn record_trigger_bumps_count_and_timestamp() {
        let (db, _dir) = setup_db().await;
        seed_client(&db, "c1", "+15550001111", "active").await;
        let rule_id = seed_rule(&db, "c1", "urgent", 1, true, &["emergency"], None).await;

        record_trigger(&db, rule_id).await.unwrap();
        record_trigger(&db, rule_id).await.unwrap();

        let rules = enabled_for_client(&db, "c1").await.unwrap();
        assert_eq!(rules[0].trigger_count, 2);
        assert!(rules[0].last_triggered_at.is_some());

        db.close().await.unwrap();
    }
}
