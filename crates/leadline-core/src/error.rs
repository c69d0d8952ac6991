// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Leadline platform.

use thiserror::Error;

/// The primary error type used across the router, escalation engine, and
/// collaborator trait boundaries.
#[derive(Debug, Error)]
pub enum LeadlineError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, constraint violation).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Compliance send gateway rejected or failed an outbound dispatch.
    #[error("gateway error: {message}")]
    Gateway {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An external collaborator (AI responder, telephony bridge, media
    /// processor, autonomous agent, scorer) failed. Callers degrade to the
    /// next applicable branch rather than surfacing this to the lead.
    #[error("collaborator error ({name}): {message}")]
    Collaborator {
        name: String,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A notification channel (SMS/email) delivery attempt failed.
    #[error("notification error ({channel}): {message}")]
    Notification { channel: String, message: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LeadlineError {
    /// Shorthand for a collaborator failure without an underlying source.
    pub fn collaborator(name: impl Into<String>, message: impl Into<String>) -> Self {
        LeadlineError::Collaborator {
            name: name.into(),
            message: message.into(),
            source: None,
        }
    }
}
