// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Compliance send gateway: the sole authorized path for outbound dispatch.
//!
//! The gateway enforces consent, quiet-hours, and rate rules. The core never
//! sends a message by any other path and never reimplements those rules.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::LeadlineError;

/// Outbound message category, used by the gateway for rule selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessageCategory {
    AiResponse,
    OptOutConfirmation,
    HotTransferAck,
    AfterHoursAck,
    MediaAck,
    EscalationAutoResponse,
    DashboardLink,
    ContractorPing,
}

/// Consent basis the tenant asserts for this send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ConsentBasis {
    /// The lead initiated this conversation by texting in.
    InboundReply,
    /// Required transactional/compliance content (opt-out confirmations).
    Transactional,
}

/// One outbound dispatch request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendRequest {
    pub client_id: String,
    pub to: String,
    pub from: String,
    pub body: String,
    pub category: MessageCategory,
    pub consent_basis: ConsentBasis,
    pub lead_id: Option<i64>,
    /// When true, the gateway queues instead of rejecting during quiet hours.
    pub queue_on_quiet_hours: bool,
    pub metadata: Option<serde_json::Value>,
}

/// Gateway dispatch result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendReceipt {
    pub sent: bool,
    pub message_sid: Option<String>,
}

/// The only path allowed to dispatch an outbound message.
#[async_trait]
pub trait SendGateway: Send + Sync {
    async fn send(&self, request: SendRequest) -> Result<SendReceipt, LeadlineError>;
}
