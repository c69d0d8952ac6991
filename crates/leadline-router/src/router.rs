// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The inbound conversation router.
//!
//! One inbound SMS becomes exactly one [`RouterOutcome`] by walking an
//! ordered stage pipeline. Stage order is data ([`STAGE_ORDER`]), each stage
//! either continues or terminates the walk, and the whole pipeline is safe
//! to retry on the same provider sid: the inbound message row is the
//! completion marker, so a re-delivered webhook stops at the duplicate
//! check before any send or charge can repeat.

use std::sync::Arc;

use tracing::{debug, info, warn};

use leadline_config::RouterConfig;
use leadline_core::traits::{
    AiResponder, ApprovalHandler, AutonomousAgent, BookingAgent, BookingIntent,
    BusinessHoursOracle, ConsentBasis, FlowSuggester, GenerateRequest, LeadScorer, MediaProcessor,
    MessageCategory, RingGroupRequest, ScoreRequest, SendGateway, SendRequest, TelephonyBridge,
};
use leadline_core::types::{
    AiMode, Client, ConversationMode, InboundSms, Lead, MessageType, RouterOutcome,
};
use leadline_core::LeadlineError;
use leadline_escalation::{CreateEscalation, EscalationEngine};
use leadline_storage::queries::{blocked, clients, leads, messages, scheduled};
use leadline_storage::Database;

use crate::keywords;
use crate::lane::BackgroundLane;

/// The external services the router delegates to.
pub struct Collaborators {
    pub gateway: Arc<dyn SendGateway>,
    pub responder: Arc<dyn AiResponder>,
    pub booking: Arc<dyn BookingAgent>,
    pub bridge: Arc<dyn TelephonyBridge>,
    pub media: Arc<dyn MediaProcessor>,
    pub agent: Arc<dyn AutonomousAgent>,
    pub scorer: Arc<dyn LeadScorer>,
    pub hours: Arc<dyn BusinessHoursOracle>,
    pub approval: Arc<dyn ApprovalHandler>,
    pub suggester: Arc<dyn FlowSuggester>,
}

/// Pipeline stages, executed strictly in [`STAGE_ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stage {
    ResolveTenant,
    DashboardWord,
    OwnerApproval,
    OptOut,
    Blocklist,
    ResolveLead,
    PersistMessage,
    Scoring,
    HumanMode,
    CancelSequence,
    HotIntent,
    BookingIntent,
    AutonomousAgent,
    MediaOnly,
    LegacyReply,
    ContractorPing,
}

pub(crate) const STAGE_ORDER: &[Stage] = &[
    Stage::ResolveTenant,
    Stage::DashboardWord,
    Stage::OwnerApproval,
    Stage::OptOut,
    Stage::Blocklist,
    Stage::ResolveLead,
    Stage::PersistMessage,
    Stage::Scoring,
    Stage::HumanMode,
    Stage::CancelSequence,
    Stage::HotIntent,
    Stage::BookingIntent,
    Stage::AutonomousAgent,
    Stage::MediaOnly,
    Stage::LegacyReply,
    Stage::ContractorPing,
];

/// What a stage decided: keep walking, or stop with an outcome.
pub(crate) enum StageFlow {
    Continue,
    Terminal(RouterOutcome),
}

/// Mutable state threaded through the pipeline.
struct StageCtx {
    event: InboundSms,
    client: Option<Client>,
    lead: Option<Lead>,
    is_new_lead: bool,
    message_id: Option<i64>,
    /// AI-derived media descriptions joined for responder context.
    media_context: Option<String>,
    /// The outbound reply text, once one was sent. Drives the contractor ping.
    reply_body: Option<String>,
    /// Outcome staged by a reply-producing stage for the ping stage to return.
    pending: Option<RouterOutcome>,
}

impl StageCtx {
    fn new(event: InboundSms) -> Self {
        Self {
            event,
            client: None,
            lead: None,
            is_new_lead: false,
            message_id: None,
            media_context: None,
            reply_body: None,
            pending: None,
        }
    }

    fn client(&self) -> Result<&Client, LeadlineError> {
        self.client
            .as_ref()
            .ok_or_else(|| LeadlineError::Internal("stage ran before tenant resolution".into()))
    }

    fn lead(&self) -> Result<&Lead, LeadlineError> {
        self.lead
            .as_ref()
            .ok_or_else(|| LeadlineError::Internal("stage ran before lead resolution".into()))
    }
}

/// Routes one inbound SMS through the stage pipeline.
pub struct InboundRouter {
    db: Database,
    config: RouterConfig,
    collab: Collaborators,
    escalation: Arc<EscalationEngine>,
    lane: BackgroundLane,
}

impl InboundRouter {
    pub fn new(
        db: Database,
        config: RouterConfig,
        collab: Collaborators,
        escalation: Arc<EscalationEngine>,
        lane: BackgroundLane,
    ) -> Self {
        Self {
            db,
            config,
            collab,
            escalation,
            lane,
        }
    }

    /// Route one inbound event to exactly one outcome.
    pub async fn handle(&self, event: InboundSms) -> Result<RouterOutcome, LeadlineError> {
        let provider_sid = event.provider_sid.clone();
        let mut ctx = StageCtx::new(event);
        for stage in STAGE_ORDER {
            match self.run_stage(*stage, &mut ctx).await? {
                StageFlow::Continue => {}
                StageFlow::Terminal(outcome) => {
                    info!(provider_sid = %provider_sid, stage = ?stage, outcome = ?outcome, "routed");
                    return Ok(outcome);
                }
            }
        }
        // ContractorPing always terminates; this is unreachable in practice.
        Err(LeadlineError::Internal(
            "pipeline exhausted without a terminal outcome".into(),
        ))
    }

    async fn run_stage(
        &self,
        stage: Stage,
        ctx: &mut StageCtx,
    ) -> Result<StageFlow, LeadlineError> {
        match stage {
            Stage::ResolveTenant => self.resolve_tenant(ctx).await,
            Stage::DashboardWord => self.dashboard_word(ctx).await,
            Stage::OwnerApproval => self.owner_approval(ctx).await,
            Stage::OptOut => self.opt_out(ctx).await,
            Stage::Blocklist => self.blocklist(ctx).await,
            Stage::ResolveLead => self.resolve_lead(ctx).await,
            Stage::PersistMessage => self.persist_message(ctx).await,
            Stage::Scoring => self.scoring(ctx),
            Stage::HumanMode => self.human_mode(ctx),
            Stage::CancelSequence => self.cancel_sequence(ctx).await,
            Stage::HotIntent => self.hot_intent(ctx).await,
            Stage::BookingIntent => self.booking_intent(ctx).await,
            Stage::AutonomousAgent => self.autonomous_agent(ctx).await,
            Stage::MediaOnly => self.media_only(ctx).await,
            Stage::LegacyReply => self.legacy_reply(ctx).await,
            Stage::ContractorPing => self.contractor_ping(ctx),
        }
    }

    /// Stage 1. The only stage allowed to reject before any row exists.
    async fn resolve_tenant(&self, ctx: &mut StageCtx) -> Result<StageFlow, LeadlineError> {
        match clients::find_active_by_number(&self.db, &ctx.event.to).await? {
            Some(client) => {
                ctx.client = Some(client);
                Ok(StageFlow::Continue)
            }
            None => {
                debug!(to = %ctx.event.to, "no active tenant for destination");
                Ok(StageFlow::Terminal(RouterOutcome::Dropped {
                    reason: "no tenant".into(),
                }))
            }
        }
    }

    /// Stage 2. The literal control word bypasses consent logic because the
    /// link is not customer-facing content.
    async fn dashboard_word(&self, ctx: &mut StageCtx) -> Result<StageFlow, LeadlineError> {
        if ctx.event.body.trim() != "DASHBOARD" {
            return Ok(StageFlow::Continue);
        }
        let client = ctx.client()?.clone();
        let link = format!("{}/{}", self.config.dashboard_base_url, client.id);
        self.send(
            &client,
            &ctx.event.from,
            format!("Your dashboard: {link}"),
            MessageCategory::DashboardLink,
            ConsentBasis::Transactional,
            None,
        )
        .await?;
        Ok(StageFlow::Terminal(RouterOutcome::DashboardLink))
    }

    /// Stage 3. The owner's own replies are offered to the pending-approval
    /// handler first.
    async fn owner_approval(&self, ctx: &mut StageCtx) -> Result<StageFlow, LeadlineError> {
        let client = ctx.client()?;
        if client.owner_phone.as_deref() != Some(ctx.event.from.as_str()) {
            return Ok(StageFlow::Continue);
        }
        match self
            .collab
            .approval
            .handle_owner_reply(client, &ctx.event.body)
            .await
        {
            Ok(true) => Ok(StageFlow::Terminal(RouterOutcome::OwnerApproval)),
            Ok(false) => Ok(StageFlow::Continue),
            Err(e) => {
                warn!(client_id = %client.id, error = %e, "approval handler failed");
                Ok(StageFlow::Continue)
            }
        }
    }

    /// Stage 4. Idempotent against repeated stop words: the blocked row is
    /// insert-or-ignore and the confirmation is safe to resend.
    async fn opt_out(&self, ctx: &mut StageCtx) -> Result<StageFlow, LeadlineError> {
        if !keywords::is_stop_word(&ctx.event.body) {
            return Ok(StageFlow::Continue);
        }
        let client = ctx.client()?.clone();
        let newly_blocked = blocked::block(&self.db, &client.id, &ctx.event.from).await?;
        if let Some(lead) = leads::find(&self.db, &client.id, &ctx.event.from).await? {
            leads::mark_opted_out(&self.db, lead.id).await?;
            scheduled::cancel_pending_for_lead(&self.db, lead.id, "Opted out").await?;
        }
        info!(
            client_id = %client.id,
            from = %ctx.event.from,
            newly_blocked,
            "opt-out processed"
        );
        self.send(
            &client,
            &ctx.event.from,
            self.config.opt_out_confirmation.clone(),
            MessageCategory::OptOutConfirmation,
            ConsentBasis::Transactional,
            None,
        )
        .await?;
        Ok(StageFlow::Terminal(RouterOutcome::OptedOut))
    }

    /// Stage 5. Silent drop: no charge, no lead mutation.
    async fn blocklist(&self, ctx: &mut StageCtx) -> Result<StageFlow, LeadlineError> {
        let client = ctx.client()?;
        if blocked::is_blocked(&self.db, &client.id, &ctx.event.from).await? {
            debug!(client_id = %client.id, from = %ctx.event.from, "sender is blocked");
            return Ok(StageFlow::Terminal(RouterOutcome::Dropped {
                reason: "blocked".into(),
            }));
        }
        Ok(StageFlow::Continue)
    }

    /// Stage 6.
    async fn resolve_lead(&self, ctx: &mut StageCtx) -> Result<StageFlow, LeadlineError> {
        let client = ctx.client()?.clone();
        let (lead, is_new) = leads::find_or_create(&self.db, &client.id, &ctx.event.from).await?;
        if is_new {
            clients::increment_conversations_started(&self.db, &client.id).await?;
        }
        ctx.lead = Some(lead);
        ctx.is_new_lead = is_new;
        Ok(StageFlow::Continue)
    }

    /// Stage 7. The inbound row is the retry-dedup boundary; media items are
    /// persisted independently so one bad item cannot sink the text path.
    async fn persist_message(&self, ctx: &mut StageCtx) -> Result<StageFlow, LeadlineError> {
        let client_id = ctx.client()?.id.clone();
        let lead_id = ctx.lead()?.id;
        let message_type = if ctx.event.media.is_empty() {
            MessageType::Sms
        } else {
            MessageType::Mms
        };
        let Some(message_id) = messages::append_inbound(
            &self.db,
            lead_id,
            &client_id,
            message_type,
            &ctx.event.body,
            &ctx.event.provider_sid,
        )
        .await?
        else {
            debug!(provider_sid = %ctx.event.provider_sid, "duplicate webhook delivery");
            return Ok(StageFlow::Terminal(RouterOutcome::Duplicate));
        };
        ctx.message_id = Some(message_id);

        let mut descriptions = Vec::new();
        for item in &ctx.event.media {
            match self.collab.media.process(item).await {
                Ok(processed) => {
                    messages::insert_media(
                        &self.db,
                        message_id,
                        &processed.url,
                        &processed.content_type,
                        processed.description.as_deref(),
                        &processed.tags,
                    )
                    .await?;
                    if let Some(description) = processed.description {
                        descriptions.push(description);
                    }
                }
                Err(e) => {
                    warn!(url = %item.url, error = %e, "media processing failed, item skipped");
                }
            }
        }
        if !descriptions.is_empty() {
            ctx.media_context = Some(descriptions.join("; "));
        }
        Ok(StageFlow::Continue)
    }

    /// Stage 8. Never blocks delivery; quick heuristics decide whether the
    /// deep AI-assisted score is worth requesting.
    fn scoring(&self, ctx: &mut StageCtx) -> Result<StageFlow, LeadlineError> {
        let request = ScoreRequest {
            lead_id: ctx.lead()?.id,
            client_id: ctx.client()?.id.clone(),
            body: ctx.event.body.clone(),
            deep: keywords::needs_deep_score(&ctx.event.body),
        };
        let scorer = self.collab.scorer.clone();
        self.lane
            .dispatch("lead-scoring", async move { scorer.score(request).await });
        Ok(StageFlow::Continue)
    }

    /// Stage 9. A human owns this conversation: persist and stay silent.
    fn human_mode(&self, ctx: &mut StageCtx) -> Result<StageFlow, LeadlineError> {
        if ctx.lead()?.conversation_mode == ConversationMode::Human {
            return Ok(StageFlow::Terminal(RouterOutcome::HumanMode));
        }
        Ok(StageFlow::Continue)
    }

    /// Stage 10. One bulk conditional update; a reply always interrupts the
    /// drip sequence.
    async fn cancel_sequence(&self, ctx: &mut StageCtx) -> Result<StageFlow, LeadlineError> {
        let cancelled =
            scheduled::cancel_pending_for_lead(&self.db, ctx.lead()?.id, "Lead replied").await?;
        if cancelled > 0 {
            debug!(lead_id = ctx.lead()?.id, cancelled, "sequence interrupted");
        }
        Ok(StageFlow::Continue)
    }

    /// Stage 11. In-hours hot intent rings the team; every degraded branch
    /// (closed, bridge refusal, bridge error, oracle error) lands on an
    /// escalation so the lead is never silently lost.
    async fn hot_intent(&self, ctx: &mut StageCtx) -> Result<StageFlow, LeadlineError> {
        if !keywords::is_hot_intent(&ctx.event.body) {
            return Ok(StageFlow::Continue);
        }
        let client = ctx.client()?.clone();
        let lead = ctx.lead()?.clone();

        let in_hours = match self
            .collab
            .hours
            .is_within_business_hours(&client.id, &client.timezone)
            .await
        {
            Ok(open) => open,
            Err(e) => {
                warn!(client_id = %client.id, error = %e, "hours oracle failed, treating as closed");
                false
            }
        };

        if in_hours {
            let bridge_result = self
                .collab
                .bridge
                .initiate_ring_group(RingGroupRequest {
                    lead_id: lead.id,
                    client_id: client.id.clone(),
                    lead_phone: lead.phone.clone(),
                    platform_number: client.platform_number.clone(),
                })
                .await;
            match bridge_result {
                Ok(result) if result.initiated => {
                    self.send(
                        &client,
                        &lead.phone,
                        self.config.hot_transfer_ack.clone(),
                        MessageCategory::HotTransferAck,
                        ConsentBasis::InboundReply,
                        Some(lead.id),
                    )
                    .await?;
                    messages::append_outbound(
                        &self.db,
                        lead.id,
                        &client.id,
                        MessageType::HotTransfer,
                        &self.config.hot_transfer_ack,
                        None,
                    )
                    .await?;
                    info!(lead_id = lead.id, call_sid = result.call_sid.as_deref(), "hot transfer bridged");
                    return Ok(StageFlow::Terminal(RouterOutcome::HotTransfer {
                        bridged: true,
                        outside_hours: false,
                        escalation_id: None,
                    }));
                }
                Ok(_) => {
                    warn!(lead_id = lead.id, "ring group did not initiate");
                }
                Err(e) => {
                    warn!(lead_id = lead.id, error = %e, "telephony bridge failed");
                }
            }
            // Bridge did not connect: acknowledge and hand to a human.
            self.send(
                &client,
                &lead.phone,
                self.config.hot_fallback_ack.clone(),
                MessageCategory::HotTransferAck,
                ConsentBasis::InboundReply,
                Some(lead.id),
            )
            .await?;
            let escalation_id = self
                .escalation
                .create_escalation(
                    CreateEscalation::new(lead.id, &client.id, "Hot lead: bridge unavailable")
                        .with_priority(1),
                )
                .await?;
            return Ok(StageFlow::Terminal(RouterOutcome::HotTransfer {
                bridged: false,
                outside_hours: false,
                escalation_id: Some(escalation_id),
            }));
        }

        self.send(
            &client,
            &lead.phone,
            self.config.after_hours_ack.clone(),
            MessageCategory::AfterHoursAck,
            ConsentBasis::InboundReply,
            Some(lead.id),
        )
        .await?;
        let escalation_id = self
            .escalation
            .create_escalation(
                CreateEscalation::new(lead.id, &client.id, "Hot lead outside business hours")
                    .with_priority(1),
            )
            .await?;
        Ok(StageFlow::Terminal(RouterOutcome::HotTransfer {
            bridged: false,
            outside_hours: true,
            escalation_id: Some(escalation_id),
        }))
    }

    /// Stage 12. Handler failure falls through, never errors the pipeline.
    async fn booking_intent(&self, ctx: &mut StageCtx) -> Result<StageFlow, LeadlineError> {
        if ctx.event.body.trim().is_empty() {
            return Ok(StageFlow::Continue);
        }
        let client = ctx.client()?.clone();
        let lead = ctx.lead()?.clone();
        let history =
            messages::recent_history(&self.db, lead.id, self.config.history_turns).await?;

        let intent = match self
            .collab
            .booking
            .detect_intent(&ctx.event.body, &history)
            .await
        {
            Ok(intent) => intent,
            Err(e) => {
                warn!(lead_id = lead.id, error = %e, "booking intent detection failed");
                return Ok(StageFlow::Continue);
            }
        };
        if intent == BookingIntent::None {
            return Ok(StageFlow::Continue);
        }

        match self
            .collab
            .booking
            .handle(&lead, &ctx.event.body, &history)
            .await
        {
            Ok(Some(reply)) => {
                self.send(
                    &client,
                    &lead.phone,
                    reply.reply.clone(),
                    MessageCategory::AiResponse,
                    ConsentBasis::InboundReply,
                    Some(lead.id),
                )
                .await?;
                messages::append_outbound(
                    &self.db,
                    lead.id,
                    &client.id,
                    MessageType::AiResponse,
                    &reply.reply,
                    None,
                )
                .await?;
                Ok(StageFlow::Terminal(RouterOutcome::Booking {
                    appointment_created: reply.appointment_created,
                }))
            }
            Ok(None) => Ok(StageFlow::Continue),
            Err(e) => {
                warn!(lead_id = lead.id, error = %e, "booking handler failed, falling through");
                Ok(StageFlow::Continue)
            }
        }
    }

    /// Stage 13. Full-turn delegation; failure falls back to the legacy
    /// responder.
    async fn autonomous_agent(&self, ctx: &mut StageCtx) -> Result<StageFlow, LeadlineError> {
        let client = ctx.client()?;
        if client.ai_mode != AiMode::Autonomous || !client.auto_respond {
            return Ok(StageFlow::Continue);
        }
        let lead_id = ctx.lead()?.id;
        let message_id = ctx.message_id.ok_or_else(|| {
            LeadlineError::Internal("agent stage ran before message persistence".into())
        })?;
        match self
            .collab
            .agent
            .process_incoming_message(lead_id, message_id, &ctx.event.body)
            .await
        {
            Ok(result) => {
                debug!(lead_id, replied = result.replied, "agent handled turn");
                Ok(StageFlow::Terminal(RouterOutcome::AgentReply))
            }
            Err(e) => {
                warn!(lead_id, error = %e, "agent failed, falling back to legacy responder");
                Ok(StageFlow::Continue)
            }
        }
    }

    /// Stage 14. Media but no text: canned ack, the AI generator is never
    /// invoked.
    async fn media_only(&self, ctx: &mut StageCtx) -> Result<StageFlow, LeadlineError> {
        if !ctx.event.is_media_only() {
            return Ok(StageFlow::Continue);
        }
        let client = ctx.client()?.clone();
        let lead = ctx.lead()?.clone();
        let context = match &ctx.media_context {
            Some(context) => format!(" - {context}"),
            None => String::new(),
        };
        let body = self.config.photo_ack.replace("{context}", &context);
        self.send(
            &client,
            &lead.phone,
            body.clone(),
            MessageCategory::MediaAck,
            ConsentBasis::InboundReply,
            Some(lead.id),
        )
        .await?;
        messages::append_outbound(&self.db, lead.id, &client.id, MessageType::Sms, &body, None)
            .await?;
        ctx.reply_body = Some(body);
        ctx.pending = Some(RouterOutcome::MediaAck);
        Ok(StageFlow::Continue)
    }

    /// Stage 15. The last reply-producing stage. A should-escalate signal or
    /// a generator failure both land on an escalation rather than a reply.
    async fn legacy_reply(&self, ctx: &mut StageCtx) -> Result<StageFlow, LeadlineError> {
        if ctx.pending.is_some() {
            return Ok(StageFlow::Continue);
        }
        let client = ctx.client()?.clone();
        let lead = ctx.lead()?.clone();
        let history =
            messages::recent_history(&self.db, lead.id, self.config.history_turns).await?;

        let reply = match self
            .collab
            .responder
            .generate(GenerateRequest {
                client_id: client.id.clone(),
                body: ctx.event.body.clone(),
                business_name: client.business_name.clone(),
                owner_name: client.owner_name.clone(),
                history,
                media_context: ctx.media_context.clone(),
            })
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                warn!(lead_id = lead.id, error = %e, "generation failed, escalating");
                let escalation_id = self
                    .escalation
                    .create_escalation(
                        CreateEscalation::new(lead.id, &client.id, "AI response failed")
                            .with_priority(2),
                    )
                    .await?;
                ctx.pending = Some(RouterOutcome::AiReply {
                    escalation_id: Some(escalation_id),
                });
                return Ok(StageFlow::Continue);
            }
        };

        if reply.should_escalate {
            let reason = reply
                .escalation_reason
                .unwrap_or_else(|| "AI requested human takeover".into());
            let escalation_id = self
                .escalation
                .create_escalation(
                    CreateEscalation::new(lead.id, &client.id, reason).with_priority(2),
                )
                .await?;
            ctx.pending = Some(RouterOutcome::AiReply {
                escalation_id: Some(escalation_id),
            });
            return Ok(StageFlow::Continue);
        }

        self.send(
            &client,
            &lead.phone,
            reply.response.clone(),
            MessageCategory::AiResponse,
            ConsentBasis::InboundReply,
            Some(lead.id),
        )
        .await?;
        messages::append_outbound(
            &self.db,
            lead.id,
            &client.id,
            MessageType::AiResponse,
            &reply.response,
            None,
        )
        .await?;
        clients::increment_message_counters(&self.db, &client.id).await?;

        let suggester = self.collab.suggester.clone();
        let (lead_id, client_id) = (lead.id, client.id.clone());
        self.lane.dispatch("flow-suggestion", async move {
            suggester.check(lead_id, &client_id).await
        });

        ctx.reply_body = Some(reply.response);
        ctx.pending = Some(RouterOutcome::AiReply {
            escalation_id: None,
        });
        Ok(StageFlow::Continue)
    }

    /// Stage 16. Best-effort ping to the owner's phone; dispatched on the
    /// background lane so nothing here can roll back the reply.
    fn contractor_ping(&self, ctx: &mut StageCtx) -> Result<StageFlow, LeadlineError> {
        let outcome = ctx
            .pending
            .take()
            .unwrap_or(RouterOutcome::AiReply {
                escalation_id: None,
            });
        let client = ctx.client()?;
        if client.contractor_ping {
            if let (Some(owner_phone), Some(reply)) =
                (client.owner_phone.clone(), ctx.reply_body.clone())
            {
                let gateway = self.collab.gateway.clone();
                let request = SendRequest {
                    client_id: client.id.clone(),
                    to: owner_phone,
                    from: client.platform_number.clone(),
                    body: format!("Replied to {}: {}", ctx.event.from, reply),
                    category: MessageCategory::ContractorPing,
                    consent_basis: ConsentBasis::Transactional,
                    lead_id: ctx.lead.as_ref().map(|l| l.id),
                    queue_on_quiet_hours: true,
                    metadata: None,
                };
                self.lane.dispatch("contractor-ping", async move {
                    gateway.send(request).await.map(|_| ())
                });
            }
        }
        Ok(StageFlow::Terminal(outcome))
    }

    /// All lead-facing sends go through the compliance gateway. A gateway
    /// rejection here is fatal to the pipeline per the error taxonomy.
    async fn send(
        &self,
        client: &Client,
        to: &str,
        body: String,
        category: MessageCategory,
        consent_basis: ConsentBasis,
        lead_id: Option<i64>,
    ) -> Result<(), LeadlineError> {
        self.collab
            .gateway
            .send(SendRequest {
                client_id: client.id.clone(),
                to: to.to_string(),
                from: client.platform_number.clone(),
                body,
                category,
                consent_basis,
                lead_id,
                queue_on_quiet_hours: true,
                metadata: None,
            })
            .await?;
        Ok(())
    }
}
