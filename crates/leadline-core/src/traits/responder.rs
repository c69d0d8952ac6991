// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Legacy AI response generator collaborator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LeadlineError;
use crate::types::SmsMessage;

/// Request for one generated reply, carrying recent conversation history
/// (last 20 turns) and any media context string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub client_id: String,
    pub body: String,
    pub business_name: String,
    pub owner_name: String,
    pub history: Vec<SmsMessage>,
    pub media_context: Option<String>,
}

/// Generator output. When `should_escalate` is set the router creates an
/// escalation instead of sending `response`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiReply {
    pub response: String,
    pub confidence: f64,
    pub should_escalate: bool,
    pub escalation_reason: Option<String>,
}

/// Synchronous request/response reply generation.
#[async_trait]
pub trait AiResponder: Send + Sync {
    async fn generate(&self, request: GenerateRequest) -> Result<AiReply, LeadlineError>;
}
