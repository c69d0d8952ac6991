// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Media processing collaborator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LeadlineError;
use crate::types::MediaItem;

/// AI-derived context for one processed media item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedMedia {
    pub url: String,
    pub content_type: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

/// Per-item processing; one item's failure is isolated from the others and
/// from the text path.
#[async_trait]
pub trait MediaProcessor: Send + Sync {
    async fn process(&self, item: &MediaItem) -> Result<ProcessedMedia, LeadlineError>;
}
