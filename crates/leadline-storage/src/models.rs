// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `leadline-core::types` so they can
//! cross collaborator trait boundaries. This module re-exports them for
//! convenience within the storage crate.

pub use leadline_core::types::{
    AiMode, BlockedNumber, Client, ClientStatus, ConversationMode, Direction, Escalation,
    EscalationResolution, EscalationRule, EscalationStatus, Lead, LeadStage, MediaRecord,
    MessageType, NotifyChannel, ScheduledMessage, SmsMessage, TeamMember,
};
