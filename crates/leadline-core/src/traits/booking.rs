// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Booking-intent classifier and booking-conversation handler.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::LeadlineError;
use crate::types::{Lead, SmsMessage};

/// Classified booking intent over one message plus history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingIntent {
    None,
    Requesting,
    Confirming,
    Rescheduling,
    Cancelling,
}

/// Result of delegating a turn to the booking-conversation handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingReply {
    pub reply: String,
    pub appointment_created: bool,
}

/// Booking collaborator. `handle` returning `None` means the handler chose
/// not to produce a reply and the router falls through.
#[async_trait]
pub trait BookingAgent: Send + Sync {
    async fn detect_intent(
        &self,
        body: &str,
        history: &[SmsMessage],
    ) -> Result<BookingIntent, LeadlineError>;

    async fn handle(
        &self,
        lead: &Lead,
        body: &str,
        history: &[SmsMessage],
    ) -> Result<Option<BookingReply>, LeadlineError>;
}
