// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Escalation creation and lifecycle transitions.

use std::sync::Arc;

use tracing::{debug, info, warn};

use leadline_config::SlaConfig;
use leadline_core::traits::{
    ConsentBasis, MessageCategory, Notifier, SendGateway, SendRequest,
};
use leadline_core::types::{
    ConversationMode, EscalationResolution, EscalationRule, LeadStage, NotifyChannel, TeamMember,
};
use leadline_core::LeadlineError;
use leadline_storage::queries::escalations::{InsertOutcome, NewEscalation};
use leadline_storage::queries::{clients, escalations, leads, rules, team};
use leadline_storage::Database;

/// Request to open an escalation for a lead.
#[derive(Debug, Clone)]
pub struct CreateEscalation {
    pub lead_id: i64,
    pub client_id: String,
    pub reason: String,
    pub details: Option<String>,
    /// 1 is most urgent. Defaults to 3 via [`CreateEscalation::new`].
    pub priority: i64,
}

impl CreateEscalation {
    pub fn new(lead_id: i64, client_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            lead_id,
            client_id: client_id.into(),
            reason: reason.into(),
            details: None,
            priority: 3,
        }
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Queue engine over the escalations table and the notification channels.
pub struct EscalationEngine {
    db: Database,
    notifier: Arc<dyn Notifier>,
    gateway: Arc<dyn SendGateway>,
    sla: SlaConfig,
}

impl EscalationEngine {
    pub fn new(
        db: Database,
        notifier: Arc<dyn Notifier>,
        gateway: Arc<dyn SendGateway>,
        sla: SlaConfig,
    ) -> Self {
        Self {
            db,
            notifier,
            gateway,
            sla,
        }
    }

    /// Open an escalation, or reuse the lead's already-open one.
    ///
    /// A second request for a lead with an open (pending or assigned)
    /// escalation never inserts a duplicate: it upgrades the open row's
    /// priority when the new request is more urgent and returns its id.
    pub async fn create_escalation(
        &self,
        request: CreateEscalation,
    ) -> Result<i64, LeadlineError> {
        if let Some(open) = escalations::find_open_for_lead(&self.db, request.lead_id).await? {
            escalations::upgrade_priority(&self.db, open.id, request.priority).await?;
            debug!(
                escalation_id = open.id,
                lead_id = request.lead_id,
                "reusing open escalation"
            );
            return Ok(open.id);
        }

        let matched = self.match_rule(&request).await?;
        if let Some(rule) = &matched {
            rules::record_trigger(&self.db, rule.id).await?;
        }

        let assignee = self.resolve_assignee(&request.client_id, matched.as_ref()).await?;

        let deadline_minutes = if request.priority <= 2 {
            i64::from(self.sla.urgent_deadline_minutes)
        } else {
            i64::from(self.sla.standard_deadline_minutes)
        };

        let outcome = escalations::insert_open(
            &self.db,
            NewEscalation {
                lead_id: request.lead_id,
                client_id: request.client_id.clone(),
                reason: request.reason.clone(),
                details: request.details.clone(),
                priority: request.priority,
                assignee_id: assignee.as_ref().map(|m| m.id.clone()),
                deadline_minutes,
            },
        )
        .await?;

        let id = outcome.id();
        if let InsertOutcome::Reused(_) = outcome {
            debug!(escalation_id = id, "lost create race, reusing winner");
            return Ok(id);
        }

        leads::set_stage(&self.db, request.lead_id, LeadStage::Escalated).await?;
        leads::set_action_required(&self.db, request.lead_id, true, Some(&request.reason)).await?;

        info!(
            escalation_id = id,
            lead_id = request.lead_id,
            client_id = %request.client_id,
            priority = request.priority,
            assignee = assignee.as_ref().map(|m| m.id.as_str()),
            "escalation created"
        );

        let channels = matched
            .as_ref()
            .map(|rule| rule.notify_channels.clone())
            .unwrap_or_else(|| vec![NotifyChannel::Sms, NotifyChannel::Email]);
        self.notify_recipients(id, &request, assignee.as_ref(), &channels)
            .await?;

        if let Some(response) = matched.as_ref().and_then(|rule| rule.auto_response.clone()) {
            self.send_auto_response(&request, response).await;
        }

        Ok(id)
    }

    /// First enabled rule, in priority order, whose trigger set matches the
    /// reason by keyword containment or exact match.
    async fn match_rule(
        &self,
        request: &CreateEscalation,
    ) -> Result<Option<EscalationRule>, LeadlineError> {
        let reason = request.reason.to_lowercase();
        let candidates = rules::enabled_for_client(&self.db, &request.client_id).await?;
        Ok(candidates.into_iter().find(|rule| {
            rule.triggers.iter().any(|trigger| {
                let trigger = trigger.to_lowercase();
                reason.contains(&trigger) || reason == trigger
            })
        }))
    }

    /// Resolve the rule's assignment target to a team member, if any.
    ///
    /// `"round_robin"` picks the active member with the fewest open
    /// escalations; ties break on id order, a point-in-time balance with no
    /// lock. An empty team falls back to unassigned.
    async fn resolve_assignee(
        &self,
        client_id: &str,
        rule: Option<&EscalationRule>,
    ) -> Result<Option<TeamMember>, LeadlineError> {
        let Some(target) = rule.and_then(|r| r.assign_to.as_deref()) else {
            return Ok(None);
        };

        if target == "round_robin" {
            let members = team::active_for_client(&self.db, client_id).await?;
            if members.is_empty() {
                return Ok(None);
            }
            let counts = escalations::open_counts_by_assignee(&self.db, client_id).await?;
            let picked = members
                .into_iter()
                .min_by_key(|m| counts.get(&m.id).copied().unwrap_or(0));
            return Ok(picked);
        }

        let member = team::get(&self.db, target).await?;
        if member.is_none() {
            warn!(client_id, target, "rule assigns to unknown member");
        }
        Ok(member)
    }

    /// Fan out to the assignee or, if unassigned, every escalation
    /// subscriber. Each recipient and channel attempt is independent;
    /// failures are logged, never propagated.
    async fn notify_recipients(
        &self,
        escalation_id: i64,
        request: &CreateEscalation,
        assignee: Option<&TeamMember>,
        channels: &[NotifyChannel],
    ) -> Result<(), LeadlineError> {
        let recipients = match assignee {
            Some(member) => vec![member.clone()],
            None => team::escalation_subscribers(&self.db, &request.client_id).await?,
        };

        let body = format!(
            "New escalation (priority {}): {} [lead {}]",
            request.priority, request.reason, request.lead_id
        );
        for member in &recipients {
            for channel in channels {
                let attempt = match channel {
                    NotifyChannel::Sms => self.notifier.send_sms(member, &body).await,
                    NotifyChannel::Email => {
                        self.notifier
                            .send_email(member, "Escalation alert", &body)
                            .await
                    }
                };
                if let Err(e) = attempt {
                    warn!(
                        escalation_id,
                        member_id = %member.id,
                        channel = %channel,
                        error = %e,
                        "escalation notification failed"
                    );
                }
            }
        }
        Ok(())
    }

    /// Send the matched rule's auto-response to the lead. Never fatal to
    /// escalation creation.
    async fn send_auto_response(&self, request: &CreateEscalation, body: String) {
        let result = self.auto_response_send(request, body).await;
        if let Err(e) = result {
            warn!(
                lead_id = request.lead_id,
                error = %e,
                "escalation auto-response failed"
            );
        }
    }

    async fn auto_response_send(
        &self,
        request: &CreateEscalation,
        body: String,
    ) -> Result<(), LeadlineError> {
        let lead = leads::get(&self.db, request.lead_id)
            .await?
            .ok_or_else(|| LeadlineError::Internal(format!("no lead {}", request.lead_id)))?;
        let client = clients::get(&self.db, &request.client_id)
            .await?
            .ok_or_else(|| LeadlineError::Internal(format!("no client {}", request.client_id)))?;
        self.gateway
            .send(SendRequest {
                client_id: client.id.clone(),
                to: lead.phone,
                from: client.platform_number,
                body,
                category: MessageCategory::EscalationAutoResponse,
                consent_basis: ConsentBasis::InboundReply,
                lead_id: Some(lead.id),
                queue_on_quiet_hours: true,
                metadata: None,
            })
            .await?;
        Ok(())
    }

    /// Move pending -> assigned (or reassign). Returns false when the row is
    /// already resolved.
    pub async fn assign_escalation(
        &self,
        id: i64,
        assignee_id: &str,
    ) -> Result<bool, LeadlineError> {
        let changed = escalations::assign(&self.db, id, assignee_id).await?;
        if changed {
            info!(escalation_id = id, assignee_id, "escalation assigned");
        }
        Ok(changed)
    }

    /// A staff member takes the conversation: escalation -> in_progress with
    /// first-response stamped once, and the lead flips to human mode.
    pub async fn take_over_conversation(
        &self,
        id: i64,
        member_id: &str,
    ) -> Result<bool, LeadlineError> {
        let changed = escalations::start_progress(&self.db, id, member_id).await?;
        if !changed {
            return Ok(false);
        }
        if let Some(escalation) = escalations::get(&self.db, id).await? {
            leads::set_conversation_mode(&self.db, escalation.lead_id, ConversationMode::Human)
                .await?;
        }
        info!(escalation_id = id, member_id, "conversation taken over");
        Ok(true)
    }

    /// Resolve the escalation and map the resolution onto the lead's stage.
    /// `returned_to_ai` also hands the conversation back to the AI.
    pub async fn resolve_escalation(
        &self,
        id: i64,
        resolved_by: &str,
        resolution: EscalationResolution,
    ) -> Result<bool, LeadlineError> {
        let changed = escalations::resolve(&self.db, id, resolved_by, resolution).await?;
        if !changed {
            return Ok(false);
        }
        if let Some(escalation) = escalations::get(&self.db, id).await? {
            let stage = match resolution {
                EscalationResolution::Converted => LeadStage::Booked,
                EscalationResolution::Lost => LeadStage::Lost,
                EscalationResolution::ReturnedToAi => LeadStage::Nurturing,
                _ => LeadStage::Qualifying,
            };
            leads::set_stage(&self.db, escalation.lead_id, stage).await?;
            leads::set_action_required(&self.db, escalation.lead_id, false, None).await?;
            if resolution == EscalationResolution::ReturnedToAi {
                leads::set_conversation_mode(&self.db, escalation.lead_id, ConversationMode::Ai)
                    .await?;
            }
        }
        info!(escalation_id = id, resolved_by, resolution = %resolution, "escalation resolved");
        Ok(true)
    }
}
