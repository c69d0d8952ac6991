// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead-scoring collaborator, invoked fire-and-forget off the hot path.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LeadlineError;

/// One scoring update request. `deep` requests the AI-assisted score, used
/// only when quick heuristics flag urgency/intent/budget signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRequest {
    pub lead_id: i64,
    pub client_id: String,
    pub body: String,
    pub deep: bool,
}

/// Scoring failures never block message delivery; the background lane logs
/// and swallows them.
#[async_trait]
pub trait LeadScorer: Send + Sync {
    async fn score(&self, request: ScoreRequest) -> Result<(), LeadlineError>;
}
