// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Leadline integration tests.
//!
//! Provides mock collaborators and database seeding infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! Every mock records the calls it receives and can be scripted to fail, so
//! tests can assert both the happy path and the degrade-gracefully branches.

pub mod mocks;
pub mod seed;

pub use mocks::{
    MockAgent, MockApproval, MockBooking, MockBridge, MockGateway, MockMedia, MockNotifier,
    MockOracle, MockResponder, MockScorer, MockSuggester,
};
pub use seed::{SeedClient, force_deadline_past, seed_client, seed_lead, seed_member, seed_rule,
    setup_db};
