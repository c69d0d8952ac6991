// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Escalation queue rows: dedup-guarded insert, guarded transitions, and the
//! SLA breach sweep.
//!
//! Every transition uses a conditional `WHERE status ...` guard rather than
//! read-then-write, so concurrent inbound messages and human actions cannot
//! corrupt the state machine. The partial unique index on open escalations
//! backstops two concurrent creates racing past the dedup read.

use std::collections::HashMap;

use leadline_core::LeadlineError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{Escalation, EscalationResolution, EscalationStatus};
use crate::queries::column_enum;

const ESCALATION_COLUMNS: &str = "id, lead_id, client_id, reason, details, priority, status,
     assignee_id, sla_deadline, sla_breach, first_response_at, resolved_by, resolution,
     created_at, updated_at";

fn row_to_escalation(row: &rusqlite::Row<'_>) -> Result<Escalation, rusqlite::Error> {
    let resolution: Option<String> = row.get(12)?;
    Ok(Escalation {
        id: row.get(0)?,
        lead_id: row.get(1)?,
        client_id: row.get(2)?,
        reason: row.get(3)?,
        details: row.get(4)?,
        priority: row.get(5)?,
        status: column_enum::<EscalationStatus>(6, row.get(6)?)?,
        assignee_id: row.get(7)?,
        sla_deadline: row.get(8)?,
        sla_breach: row.get(9)?,
        first_response_at: row.get(10)?,
        resolved_by: row.get(11)?,
        resolution: resolution
            .map(|r| column_enum::<EscalationResolution>(12, r))
            .transpose()?,
        created_at: row.get(13)?,
        updated_at: row.get(14)?,
    })
}

/// Fields for a new escalation row.
#[derive(Debug, Clone)]
pub struct NewEscalation {
    pub lead_id: i64,
    pub client_id: String,
    pub reason: String,
    pub details: Option<String>,
    /// 1 is most urgent.
    pub priority: i64,
    /// When set, the row is born `assigned`; otherwise `pending`.
    pub assignee_id: Option<String>,
    /// SLA window in minutes from creation time.
    pub deadline_minutes: i64,
}

/// Outcome of an insert attempt against the open-escalation invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new row was created.
    Created(i64),
    /// An open escalation already existed (or won a concurrent race); its
    /// priority has been upgraded if the new request was more urgent.
    Reused(i64),
}

impl InsertOutcome {
    pub fn id(self) -> i64 {
        match self {
            InsertOutcome::Created(id) | InsertOutcome::Reused(id) => id,
        }
    }
}

/// The open (pending or assigned) escalation for a lead, if any.
pub async fn find_open_for_lead(
    db: &Database,
    lead_id: i64,
) -> Result<Option<Escalation>, LeadlineError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ESCALATION_COLUMNS} FROM escalations
                 WHERE lead_id = ?1 AND status IN ('pending', 'assigned')"
            ))?;
            let result = stmt.query_row(params![lead_id], row_to_escalation);
            match result {
                Ok(escalation) => Ok(Some(escalation)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get an escalation by id.
pub async fn get(db: &Database, id: i64) -> Result<Option<Escalation>, LeadlineError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ESCALATION_COLUMNS} FROM escalations WHERE id = ?1"
            ))?;
            let result = stmt.query_row(params![id], row_to_escalation);
            match result {
                Ok(escalation) => Ok(Some(escalation)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert a new open escalation, falling back to reuse-and-upgrade when the
/// open-escalation unique index reports a concurrent winner.
///
/// The SLA deadline is computed SQL-side from the creation instant.
pub async fn insert_open(
    db: &Database,
    new: NewEscalation,
) -> Result<InsertOutcome, LeadlineError> {
    db.connection()
        .call(move |conn| {
            let status = if new.assignee_id.is_some() {
                "assigned"
            } else {
                "pending"
            };
            let inserted = conn.execute(
                "INSERT INTO escalations
                     (lead_id, client_id, reason, details, priority, status, assignee_id,
                      sla_deadline)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7,
                         strftime('%Y-%m-%dT%H:%M:%fZ', 'now', '+' || ?8 || ' minutes'))",
                params![
                    new.lead_id,
                    new.client_id,
                    new.reason,
                    new.details,
                    new.priority,
                    status,
                    new.assignee_id,
                    new.deadline_minutes,
                ],
            );
            match inserted {
                Ok(_) => Ok(InsertOutcome::Created(conn.last_insert_rowid())),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    // Lost the race to a concurrent create. Upgrade the
                    // winner's priority if ours is more urgent.
                    conn.execute(
                        "UPDATE escalations
                         SET priority = MIN(priority, ?2),
                             updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                         WHERE lead_id = ?1 AND status IN ('pending', 'assigned')",
                        params![new.lead_id, new.priority],
                    )?;
                    let id = conn.query_row(
                        "SELECT id FROM escalations
                         WHERE lead_id = ?1 AND status IN ('pending', 'assigned')",
                        params![new.lead_id],
                        |row| row.get(0),
                    )?;
                    Ok(InsertOutcome::Reused(id))
                }
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Upgrade an open escalation's priority if the new value is more urgent.
/// A numerically higher (less urgent) value never downgrades the row.
pub async fn upgrade_priority(db: &Database, id: i64, priority: i64) -> Result<(), LeadlineError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE escalations
                 SET priority = MIN(priority, ?2),
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1 AND status IN ('pending', 'assigned')",
                params![id, priority],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Counts of open escalations per assignee for a client, feeding round-robin
/// balance. A point-in-time snapshot: acceptable staleness, no lock.
pub async fn open_counts_by_assignee(
    db: &Database,
    client_id: &str,
) -> Result<HashMap<String, i64>, LeadlineError> {
    let client_id = client_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT assignee_id, COUNT(*) FROM escalations
                 WHERE client_id = ?1 AND status IN ('pending', 'assigned')
                   AND assignee_id IS NOT NULL
                 GROUP BY assignee_id",
            )?;
            let rows = stmt.query_map(params![client_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?;
            let mut counts = HashMap::new();
            for row in rows {
                let (assignee, count) = row?;
                counts.insert(assignee, count);
            }
            Ok(counts)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Move pending -> assigned (or reassign an already-assigned row).
/// Returns false when the row was not in an assignable state.
pub async fn assign(db: &Database, id: i64, assignee_id: &str) -> Result<bool, LeadlineError> {
    let assignee_id = assignee_id.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE escalations
                 SET status = 'assigned', assignee_id = ?2,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1 AND status IN ('pending', 'assigned')",
                params![id, assignee_id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Move -> in_progress, stamping first-response time once (response-time
/// metrics read it). Returns false when the row was already resolved.
pub async fn start_progress(db: &Database, id: i64, member_id: &str) -> Result<bool, LeadlineError> {
    let member_id = member_id.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE escalations
                 SET status = 'in_progress', assignee_id = ?2,
                     first_response_at = COALESCE(first_response_at,
                                                  strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1 AND status != 'resolved'",
                params![id, member_id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Move -> resolved with resolver and resolution. Returns false when the row
/// was already resolved.
pub async fn resolve(
    db: &Database,
    id: i64,
    resolved_by: &str,
    resolution: EscalationResolution,
) -> Result<bool, LeadlineError> {
    let resolved_by = resolved_by.to_string();
    let resolution = resolution.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE escalations
                 SET status = 'resolved', resolved_by = ?2, resolution = ?3,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1 AND status != 'resolved'",
                params![id, resolved_by, resolution],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Flip `sla_breach` on every open row whose deadline passed, evaluated
/// against one snapshot time, and return the newly-flagged rows.
///
/// Only the boolean moves; status is untouched and already-flagged rows are
/// excluded, so a second pass never re-notifies. Safe to run concurrently
/// with itself.
pub async fn sweep_breaches(db: &Database) -> Result<Vec<Escalation>, LeadlineError> {
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let now: String =
                tx.query_row("SELECT strftime('%Y-%m-%dT%H:%M:%fZ', 'now')", [], |row| {
                    row.get(0)
                })?;

            let breached = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT {ESCALATION_COLUMNS} FROM escalations
                     WHERE sla_breach = 0 AND status IN ('pending', 'assigned')
                       AND sla_deadline <= ?1
                     ORDER BY id ASC"
                ))?;
                let rows = stmt.query_map(params![now], row_to_escalation)?;
                let mut breached = Vec::new();
                for row in rows {
                    breached.push(row?);
                }
                breached
            };

            tx.execute(
                "UPDATE escalations
                 SET sla_breach = 1,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE sla_breach = 0 AND status IN ('pending', 'assigned')
                   AND sla_deadline <= ?1",
                params![now],
            )?;
            tx.commit()?;

            // Report rows as flagged.
            Ok(breached
                .into_iter()
                .map(|e| Escalation {
                    sla_breach: true,
                    ..e
                })
                .collect())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{force_deadline_past, seed_client, seed_lead, setup_db};

    fn new_escalation(lead_id: i64, priority: i64) -> NewEscalation {
        NewEscalation {
            lead_id,
            client_id: "c1".into(),
            reason: "needs human".into(),
            details: None,
            priority,
            assignee_id: None,
            deadline_minutes: 240,
        }
    }

    #[tokio::test]
    async fn second_insert_reuses_and_upgrades_priority() {
        let (db, _dir) = setup_db().await;
        seed_client(&db, "c1", "+15550001111", "active").await;
        let lead_id = seed_lead(&db, "c1", "+15557778888").await;

        let first = insert_open(&db, new_escalation(lead_id, 3)).await.unwrap();
        let InsertOutcome::Created(id) = first else {
            panic!("first insert must create");
        };

        let second = insert_open(&db, new_escalation(lead_id, 1)).await.unwrap();
        assert_eq!(second, InsertOutcome::Reused(id));

        let row = get(&db, id).await.unwrap().unwrap();
        assert_eq!(row.priority, 1, "more urgent request upgrades");
        assert_eq!(row.status, EscalationStatus::Pending);

        // Less urgent request never downgrades.
        insert_open(&db, new_escalation(lead_id, 4)).await.unwrap();
        let row = get(&db, id).await.unwrap().unwrap();
        assert_eq!(row.priority, 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn resolved_escalation_frees_the_lead_for_a_new_one() {
        let (db, _dir) = setup_db().await;
        seed_client(&db, "c1", "+15550001111", "active").await;
        let lead_id = seed_lead(&db, "c1", "+15557778888").await;

        let first = insert_open(&db, new_escalation(lead_id, 3)).await.unwrap();
        assert!(resolve(&db, first.id(), "m1", EscalationResolution::Handled)
            .await
            .unwrap());

        let second = insert_open(&db, new_escalation(lead_id, 3)).await.unwrap();
        assert!(matches!(second, InsertOutcome::Created(_)));
        assert_ne!(second.id(), first.id());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn transitions_guard_against_resolved_rows() {
        let (db, _dir) = setup_db().await;
        seed_client(&db, "c1", "+15550001111", "active").await;
        let lead_id = seed_lead(&db, "c1", "+15557778888").await;

        let id = insert_open(&db, new_escalation(lead_id, 3)).await.unwrap().id();

        assert!(assign(&db, id, "m1").await.unwrap());
        assert!(start_progress(&db, id, "m1").await.unwrap());
        let row = get(&db, id).await.unwrap().unwrap();
        assert_eq!(row.status, EscalationStatus::InProgress);
        assert!(row.first_response_at.is_some());

        assert!(resolve(&db, id, "m1", EscalationResolution::Converted)
            .await
            .unwrap());
        // Every transition refuses a resolved row.
        assert!(!assign(&db, id, "m2").await.unwrap());
        assert!(!start_progress(&db, id, "m2").await.unwrap());
        assert!(!resolve(&db, id, "m2", EscalationResolution::Lost).await.unwrap());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn first_response_time_is_stamped_once() {
        let (db, _dir) = setup_db().await;
        seed_client(&db, "c1", "+15550001111", "active").await;
        let lead_id = seed_lead(&db, "c1", "+15557778888").await;
        let id = insert_open(&db, new_escalation(lead_id, 3)).await.unwrap().id();

        start_progress(&db, id, "m1").await.unwrap();
        let stamped = get(&db, id).await.unwrap().unwrap().first_response_at;

        start_progress(&db, id, "m2").await.unwrap();
        let again = get(&db, id).await.unwrap().unwrap().first_response_at;
        assert_eq!(stamped, again);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn sweep_flags_once_and_never_twice() {
        let (db, _dir) = setup_db().await;
        seed_client(&db, "c1", "+15550001111", "active").await;
        let lead_id = seed_lead(&db, "c1", "+15557778888").await;
        let id = insert_open(&db, new_escalation(lead_id, 3)).await.unwrap().id();

        // Nothing breached yet.
        assert!(sweep_breaches(&db).await.unwrap().is_empty());

        force_deadline_past(&db, id).await;

        let flagged = sweep_breaches(&db).await.unwrap();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].id, id);
        assert!(flagged[0].sla_breach);

        // A second pass finds nothing to re-notify.
        assert!(sweep_breaches(&db).await.unwrap().is_empty());

        let row = get(&db, id).await.unwrap().unwrap();
        assert!(row.sla_breach);
        assert_eq!(row.status, EscalationStatus::Pending, "status untouched");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn sweep_ignores_resolved_rows_past_deadline() {
        let (db, _dir) = setup_db().await;
        seed_client(&db, "c1", "+15550001111", "active").await;
        let lead_id = seed_lead(&db, "c1", "+15557778888").await;
        let id = insert_open(&db, new_escalation(lead_id, 3)).await.unwrap().id();

        force_deadline_past(&db, id).await;
        resolve(&db, id, "m1", EscalationResolution::Handled).await.unwrap();

        assert!(sweep_breaches(&db).await.unwrap().is_empty());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn open_counts_exclude_resolved_and_unassigned() {
        let (db, _dir) = setup_db().await;
        seed_client(&db, "c1", "+15550001111", "active").await;
        let l1 = seed_lead(&db, "c1", "+15557770001").await;
        let l2 = seed_lead(&db, "c1", "+15557770002").await;
        let l3 = seed_lead(&db, "c1", "+15557770003").await;

        let mut e1 = new_escalation(l1, 3);
        e1.assignee_id = Some("m1".into());
        insert_open(&db, e1).await.unwrap();

        let mut e2 = new_escalation(l2, 3);
        e2.assignee_id = Some("m1".into());
        let id2 = insert_open(&db, e2).await.unwrap().id();
        resolve(&db, id2, "m1", EscalationResolution::Handled).await.unwrap();

        insert_open(&db, new_escalation(l3, 3)).await.unwrap();

        let counts = open_counts_by_assignee(&db, "c1").await.unwrap();
        assert_eq!(counts.get("m1"), Some(&1));
        assert_eq!(counts.len(), 1);

        db.close().await.unwrap();
    }
}
