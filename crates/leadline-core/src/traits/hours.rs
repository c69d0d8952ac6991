// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Business-hours oracle collaborator.

use async_trait::async_trait;

use crate::error::LeadlineError;

/// Answers "is this tenant open right now" for hot-transfer gating.
#[async_trait]
pub trait BusinessHoursOracle: Send + Sync {
    async fn is_within_business_hours(
        &self,
        client_id: &str,
        timezone: &str,
    ) -> Result<bool, LeadlineError>;
}
