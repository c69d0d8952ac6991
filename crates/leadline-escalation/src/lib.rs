// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Escalation queue and SLA engine.
//!
//! Turns a "needs a human" signal into an assigned, deadline-tracked
//! escalation: dedup against the open row, rule matching, round-robin
//! assignment, notification fan-out, and a periodic breach sweep.

pub mod engine;
pub mod sweep;

pub use engine::{CreateEscalation, EscalationEngine};
pub use sweep::SlaSweeper;
