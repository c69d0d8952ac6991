// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits: the external services the core consumes.
//!
//! Each collaborator is a black box specified only at its request/response
//! boundary. Implementations carry their own bounded timeouts; the router
//! and escalation engine treat every failure as degradable, never surfacing
//! collaborator errors to the lead.

pub mod agent;
pub mod assist;
pub mod booking;
pub mod gateway;
pub mod hours;
pub mod media;
pub mod notify;
pub mod responder;
pub mod scoring;
pub mod telephony;

pub use agent::{AgentResult, AutonomousAgent};
pub use assist::{ApprovalHandler, FlowSuggester};
pub use booking::{BookingAgent, BookingIntent, BookingReply};
pub use gateway::{ConsentBasis, MessageCategory, SendGateway, SendReceipt, SendRequest};
pub use hours::BusinessHoursOracle;
pub use media::{MediaProcessor, ProcessedMedia};
pub use notify::Notifier;
pub use responder::{AiReply, AiResponder, GenerateRequest};
pub use scoring::{LeadScorer, ScoreRequest};
pub use telephony::{RingGroupRequest, RingGroupResult, TelephonyBridge};
