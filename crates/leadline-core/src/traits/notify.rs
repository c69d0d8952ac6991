// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Staff notification channels (SMS and email), each independently fallible.

use async_trait::async_trait;

use crate::error::LeadlineError;
use crate::types::TeamMember;

/// Internal staff notifications. These are not lead-facing and do not go
/// through the compliance gateway; each delivery attempt is independent and
/// failure-tolerant.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_sms(&self, member: &TeamMember, body: &str) -> Result<(), LeadlineError>;

    async fn send_email(
        &self,
        member: &TeamMember,
        subject: &str,
        body: &str,
    ) -> Result<(), LeadlineError>;
}
