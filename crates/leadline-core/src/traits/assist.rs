// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Owner-assist collaborators: pending-approval replies and flow suggestions.

use async_trait::async_trait;

use crate::error::LeadlineError;
use crate::types::Client;

/// Offers the tenant owner's own inbound reply (yes/no on a pending flow
/// suggestion) to the approval flow. Returns true when the reply was consumed.
#[async_trait]
pub trait ApprovalHandler: Send + Sync {
    async fn handle_owner_reply(
        &self,
        client: &Client,
        body: &str,
    ) -> Result<bool, LeadlineError>;
}

/// Fire-and-forget check for whether a conversation warrants suggesting a
/// follow-up flow to the owner.
#[async_trait]
pub trait FlowSuggester: Send + Sync {
    async fn check(&self, lead_id: i64, client_id: &str) -> Result<(), LeadlineError>;
}
