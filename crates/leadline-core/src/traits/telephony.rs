// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telephony bridge collaborator for hot-transfer live calls.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LeadlineError;

/// Request to ring the tenant's hot-transfer group and bridge the lead in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingGroupRequest {
    pub lead_id: i64,
    pub client_id: String,
    pub lead_phone: String,
    pub platform_number: String,
}

/// Bridge attempt result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingGroupResult {
    pub initiated: bool,
    pub call_sid: Option<String>,
}

/// Physically bridging the call is out of scope; only the attempt contract is.
#[async_trait]
pub trait TelephonyBridge: Send + Sync {
    async fn initiate_ring_group(
        &self,
        request: RingGroupRequest,
    ) -> Result<RingGroupResult, LeadlineError>;
}
