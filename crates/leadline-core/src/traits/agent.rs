// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Autonomous agent collaborator for full-turn delegation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LeadlineError;

/// Result of an autonomous agent turn. The agent owns its own sends through
/// the gateway; the router only records that the turn completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    pub replied: bool,
    pub summary: Option<String>,
}

/// Delegates the entire inbound turn when the tenant runs in autonomous mode.
/// On failure the router falls through to the legacy responder.
#[async_trait]
pub trait AutonomousAgent: Send + Sync {
    async fn process_incoming_message(
        &self,
        lead_id: i64,
        message_id: i64,
        body: &str,
    ) -> Result<AgentResult, LeadlineError>;
}
