// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound conversation router.
//!
//! Every inbound SMS walks a fixed stage pipeline (tenant resolution through
//! contractor ping) and produces exactly one outcome. See [`router`] for the
//! pipeline, [`keywords`] for the heuristic detectors, and [`lane`] for the
//! fire-and-forget side-task lane.

pub mod keywords;
pub mod lane;
pub mod router;

pub use lane::BackgroundLane;
pub use router::{Collaborators, InboundRouter};
