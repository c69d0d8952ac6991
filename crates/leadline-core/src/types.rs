// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the router, escalation engine, and storage layer.
//!
//! Timestamps are RFC 3339 UTC strings (`%Y-%m-%dT%H:%M:%fZ`), written by the
//! storage layer so that SQL-side comparisons stay lexicographic-safe.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Tenant lifecycle status. Only `Active` tenants receive routed messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    Active,
    Paused,
    Cancelled,
}

/// Which automation generation the tenant runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AiMode {
    /// Full-turn delegation to the autonomous agent collaborator.
    Autonomous,
    /// Single-shot legacy responder.
    Legacy,
}

/// A business using the platform, identified by its assigned messaging number.
///
/// Mutated by billing/admin flows elsewhere; read-only to the core except for
/// the message counters, which are incremented atomically at the storage layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub business_name: String,
    pub owner_name: String,
    /// The tenant's assigned platform number (webhook destination).
    pub platform_number: String,
    /// The owner's personal phone, used for approval replies and activity pings.
    pub owner_phone: Option<String>,
    pub status: ClientStatus,
    pub ai_mode: AiMode,
    /// When false, the autonomous agent is configured but explicitly muted.
    pub auto_respond: bool,
    /// Best-effort SMS ping to the owner after each automated reply.
    pub contractor_ping: bool,
    /// IANA timezone for the business-hours oracle.
    pub timezone: String,
    pub messages_this_month: i64,
    pub messages_today: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Whether the AI or a human currently owns a lead's conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ConversationMode {
    Ai,
    Human,
}

/// Lead lifecycle stage, derived from router and escalation activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LeadStage {
    New,
    Qualifying,
    Nurturing,
    Escalated,
    Booked,
    Lost,
}

/// A prospective customer of a tenant. At most one non-deleted lead exists
/// per (client, phone) pair; never deleted, only status-transitioned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: i64,
    pub client_id: String,
    pub phone: String,
    pub name: Option<String>,
    pub conversation_mode: ConversationMode,
    pub opted_out: bool,
    pub action_required: bool,
    pub action_reason: Option<String>,
    pub stage: LeadStage,
    pub created_at: String,
    pub updated_at: String,
}

/// Message direction relative to the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Inbound,
    Outbound,
}

/// Conversation log entry type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Sms,
    Mms,
    AiResponse,
    Escalation,
    HotTransfer,
}

/// One immutable conversation log entry. Created once per physical message,
/// never mutated. The provider sid is the webhook dedup boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmsMessage {
    pub id: i64,
    pub lead_id: i64,
    pub client_id: String,
    pub direction: Direction,
    pub message_type: MessageType,
    pub body: String,
    pub provider_sid: Option<String>,
    pub created_at: String,
}

/// A persisted media attachment with AI-derived context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRecord {
    pub id: i64,
    pub message_id: i64,
    pub url: String,
    pub content_type: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

/// An opt-out record. Existence blocks all future sends to this (client,
/// phone) pair until explicitly removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockedNumber {
    pub client_id: String,
    pub phone: String,
    pub created_at: String,
}

/// A pending future send tied to a lead. An inbound reply cancels all of a
/// lead's un-sent, un-cancelled steps in one bulk update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledMessage {
    pub id: i64,
    pub lead_id: i64,
    pub client_id: String,
    pub body: String,
    pub send_at: String,
    pub sent: bool,
    pub cancelled: bool,
    pub cancel_reason: Option<String>,
}

/// Priority-ordered escalation matcher. Read-only to the engine at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationRule {
    pub id: i64,
    pub client_id: String,
    pub name: String,
    pub priority: i64,
    pub enabled: bool,
    /// Keyword or exact-type triggers matched against the escalation reason.
    pub triggers: Vec<String>,
    /// `"round_robin"`, a literal team member id, or `None` for unassigned.
    pub assign_to: Option<String>,
    pub notify_channels: Vec<NotifyChannel>,
    pub auto_response: Option<String>,
    pub trigger_count: i64,
    pub last_triggered_at: Option<String>,
}

/// Notification delivery channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotifyChannel {
    Sms,
    Email,
}

/// Escalation queue entry state machine: pending -> assigned -> in_progress -> resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EscalationStatus {
    Pending,
    Assigned,
    InProgress,
    Resolved,
}

/// How a resolved escalation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EscalationResolution {
    Handled,
    ReturnedToAi,
    Converted,
    Lost,
    NoAction,
}

/// A work item representing "a human must respond to this lead".
///
/// At most one pending-or-assigned escalation exists per lead; a second
/// trigger reuses/upgrades the open one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Escalation {
    pub id: i64,
    pub lead_id: i64,
    pub client_id: String,
    pub reason: String,
    pub details: Option<String>,
    /// 1 is most urgent.
    pub priority: i64,
    pub status: EscalationStatus,
    pub assignee_id: Option<String>,
    pub sla_deadline: String,
    pub sla_breach: bool,
    pub first_response_at: Option<String>,
    pub resolved_by: Option<String>,
    pub resolution: Option<EscalationResolution>,
    pub created_at: String,
    pub updated_at: String,
}

/// A tenant staff member, used for escalation assignment and notification fan-out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: String,
    pub client_id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub active: bool,
    pub notify_escalations: bool,
    pub notify_hot_transfers: bool,
}

/// One media item as delivered by the webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub url: String,
    pub content_type: String,
    pub provider_id: Option<String>,
}

/// The inbound webhook payload: the only inbound shape the core defines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundSms {
    /// Destination number (the tenant's platform number).
    pub to: String,
    /// Sender number (the lead, or the owner's own phone).
    pub from: String,
    pub body: String,
    pub provider_sid: String,
    pub media: Vec<MediaItem>,
}

impl InboundSms {
    /// True when the message carried media but no usable text.
    pub fn is_media_only(&self) -> bool {
        !self.media.is_empty() && self.body.trim().is_empty()
    }
}

/// Exactly one outcome is produced per inbound event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RouterOutcome {
    /// No active tenant, blocked sender, or empty event. No reply was sent.
    Dropped { reason: String },
    /// Re-delivered provider sid; the original delivery already completed.
    Duplicate,
    /// "DASHBOARD" control word handled via the side channel.
    DashboardLink,
    /// The tenant owner's reply was consumed by the pending-approval handler.
    OwnerApproval,
    /// Stop-word received; sender blocked and confirmation sent.
    OptedOut,
    /// Lead is in human mode; persisted with no automated reply.
    HumanMode,
    /// Hot intent detected. `bridged` and `outside_hours` are mutually
    /// exclusive; an out-of-hours hit creates an escalation instead.
    HotTransfer {
        bridged: bool,
        outside_hours: bool,
        escalation_id: Option<i64>,
    },
    /// Booking-conversation handler produced the reply.
    Booking { appointment_created: bool },
    /// Autonomous agent handled the full turn.
    AgentReply,
    /// Media-only message acknowledged without invoking the AI generator.
    MediaAck,
    /// Legacy AI reply sent, or escalated instead when the generator asked for it.
    AiReply { escalation_id: Option<i64> },
}
