// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic SLA breach sweep.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use leadline_core::traits::Notifier;
use leadline_core::types::Escalation;
use leadline_core::LeadlineError;
use leadline_storage::queries::{escalations, team};
use leadline_storage::Database;

/// Background job that flags past-deadline open escalations and emails the
/// breach to each subscribed team member.
///
/// Each pass evaluates deadlines against one snapshot time and only flips
/// the `sla_breach` boolean on rows still unflagged, so a row is notified at
/// most once no matter how often the sweep runs or overlaps itself.
pub struct SlaSweeper {
    db: Database,
    notifier: Arc<dyn Notifier>,
    interval: Duration,
}

impl SlaSweeper {
    pub fn new(db: Database, notifier: Arc<dyn Notifier>, interval: Duration) -> Self {
        Self {
            db,
            notifier,
            interval,
        }
    }

    /// Runs the sweep loop until the cancellation token is triggered.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(interval_secs = self.interval.as_secs(), "sla sweeper running");
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick fires immediately; skip it so startup is quiet.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.sweep_once().await {
                        error!(error = %e, "sla sweep pass failed");
                    }
                }
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping sla sweeper");
                    break;
                }
            }
        }
    }

    /// One sweep pass. Returns the number of newly-flagged rows.
    pub async fn sweep_once(&self) -> Result<usize, LeadlineError> {
        let breached = escalations::sweep_breaches(&self.db).await?;
        if breached.is_empty() {
            return Ok(0);
        }
        info!(count = breached.len(), "sla breaches flagged");

        let mut by_client: BTreeMap<String, Vec<&Escalation>> = BTreeMap::new();
        for escalation in &breached {
            by_client
                .entry(escalation.client_id.clone())
                .or_default()
                .push(escalation);
        }

        for (client_id, rows) in by_client {
            let subscribers = match team::escalation_subscribers(&self.db, &client_id).await {
                Ok(subscribers) => subscribers,
                Err(e) => {
                    warn!(client_id = %client_id, error = %e, "subscriber lookup failed");
                    continue;
                }
            };
            for escalation in rows {
                let body = format!(
                    "SLA breached on escalation #{} ({}): deadline was {}",
                    escalation.id, escalation.reason, escalation.sla_deadline
                );
                for member in &subscribers {
                    if let Err(e) = self
                        .notifier
                        .send_email(member, "SLA breach", &body)
                        .await
                    {
                        warn!(
                            escalation_id = escalation.id,
                            member_id = %member.id,
                            error = %e,
                            "breach notification failed"
                        );
                    }
                }
            }
        }
        Ok(breached.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadline_storage::queries::escalations::NewEscalation;
    use leadline_test_utils::{
        force_deadline_past, seed_client, seed_lead, seed_member, setup_db, MockNotifier,
        SeedClient,
    };

    async fn open_escalation(db: &Database, lead_id: i64) -> i64 {
        escalations::insert_open(
            db,
            NewEscalation {
                lead_id,
                client_id: "c1".into(),
                reason: "needs human".into(),
                details: None,
                priority: 3,
                assignee_id: None,
                deadline_minutes: 240,
            },
        )
        .await
        .unwrap()
        .id()
    }

    #[tokio::test]
    async fn sweep_flags_once_and_never_renotifies() {
        let (db, _dir) = setup_db().await;
        seed_client(&db, SeedClient::default()).await;
        seed_member(&db, "m1", "c1", true, true).await;
        let lead_id = seed_lead(&db, "c1", "+15550002222").await;
        let id = open_escalation(&db, lead_id).await;
        force_deadline_past(&db, id).await;

        let notifier = Arc::new(MockNotifier::new());
        let sweeper =
            SlaSweeper::new(db.clone(), notifier.clone(), Duration::from_secs(300));

        assert_eq!(sweeper.sweep_once().await.unwrap(), 1);
        assert_eq!(notifier.delivered().len(), 1);
        assert_eq!(notifier.delivered()[0].channel, "email");

        // The row is already flagged: a second pass is silent.
        assert_eq!(sweeper.sweep_once().await.unwrap(), 0);
        assert_eq!(notifier.delivered().len(), 1);

        let row = escalations::get(&db, id).await.unwrap().unwrap();
        assert!(row.sla_breach);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn unbreached_rows_are_untouched() {
        let (db, _dir) = setup_db().await;
        seed_client(&db, SeedClient::default()).await;
        seed_member(&db, "m1", "c1", true, true).await;
        let lead_id = seed_lead(&db, "c1", "+15550002222").await;
        let id = open_escalation(&db, lead_id).await;

        let notifier = Arc::new(MockNotifier::new());
        let sweeper =
            SlaSweeper::new(db.clone(), notifier.clone(), Duration::from_secs(300));

        assert_eq!(sweeper.sweep_once().await.unwrap(), 0);
        assert!(notifier.delivered().is_empty());
        let row = escalations::get(&db, id).await.unwrap().unwrap();
        assert!(!row.sla_breach);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn breach_email_failure_is_tolerated_per_member() {
        let (db, _dir) = setup_db().await;
        seed_client(&db, SeedClient::default()).await;
        seed_member(&db, "m1", "c1", true, true).await;
        seed_member(&db, "m2", "c1", true, true).await;
        let lead_id = seed_lead(&db, "c1", "+15550002222").await;
        let id = open_escalation(&db, lead_id).await;
        force_deadline_past(&db, id).await;

        let notifier = Arc::new(MockNotifier::new());
        notifier.fail_email(true);
        let sweeper =
            SlaSweeper::new(db.clone(), notifier.clone(), Duration::from_secs(300));

        // Rows are flagged even when no notification lands.
        assert_eq!(sweeper.sweep_once().await.unwrap(), 1);
        assert!(notifier.delivered().is_empty());
        let row = escalations::get(&db, id).await.unwrap().unwrap();
        assert!(row.sla_breach);

        db.close().await.unwrap();
    }
}
