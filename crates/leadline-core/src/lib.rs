// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Leadline SMS lead-engagement platform.
//!
//! This crate provides the domain types, error type, and collaborator trait
//! definitions used throughout the Leadline workspace. External services
//! (compliance gateway, AI responder, telephony bridge, and friends) are
//! consumed exclusively through the traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::LeadlineError;
pub use types::{InboundSms, RouterOutcome};

// Re-export all collaborator traits at crate root.
pub use traits::{
    AiResponder, ApprovalHandler, AutonomousAgent, BookingAgent, BusinessHoursOracle,
    FlowSuggester, LeadScorer, MediaProcessor, Notifier, SendGateway, TelephonyBridge,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_variants_construct_and_display() {
        let cases: Vec<(LeadlineError, &str)> = vec![
            (LeadlineError::Config("bad".into()), "configuration error"),
            (
                LeadlineError::Storage {
                    source: Box::new(std::io::Error::other("disk")),
                },
                "storage error",
            ),
            (
                LeadlineError::Gateway {
                    message: "rejected".into(),
                    source: None,
                },
                "gateway error",
            ),
            (
                LeadlineError::collaborator("responder", "timed out"),
                "collaborator error (responder)",
            ),
            (
                LeadlineError::Notification {
                    channel: "email".into(),
                    message: "bounced".into(),
                },
                "notification error (email)",
            ),
            (
                LeadlineError::Timeout {
                    duration: std::time::Duration::from_secs(5),
                },
                "timed out",
            ),
            (LeadlineError::Internal("oops".into()), "internal error"),
        ];
        for (err, needle) in cases {
            assert!(err.to_string().contains(needle), "{err}");
        }
    }

    #[test]
    fn all_collaborator_traits_are_exported() {
        // If any trait module is missing or fails to compile, this test
        // won't compile.
        fn _assert_gateway<T: SendGateway>() {}
        fn _assert_responder<T: AiResponder>() {}
        fn _assert_booking<T: BookingAgent>() {}
        fn _assert_hours<T: BusinessHoursOracle>() {}
        fn _assert_bridge<T: TelephonyBridge>() {}
        fn _assert_media<T: MediaProcessor>() {}
        fn _assert_agent<T: AutonomousAgent>() {}
        fn _assert_scorer<T: LeadScorer>() {}
        fn _assert_notifier<T: Notifier>() {}
        fn _assert_approval<T: ApprovalHandler>() {}
        fn _assert_suggester<T: FlowSuggester>() {}
    }
}
