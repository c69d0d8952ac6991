// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration error type and terminal rendering.

use thiserror::Error;

/// A single configuration problem, suitable for terminal rendering.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Figment extraction failure (parse error, unknown key, type mismatch).
    #[error("{0}")]
    Extraction(#[from] Box<figment::Error>),

    /// Post-deserialization semantic validation failure.
    #[error("{message}")]
    Validation { message: String },
}

impl ConfigError {
    /// Shorthand for a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ConfigError::Validation {
            message: message.into(),
        }
    }
}

/// Render all collected config errors to stderr.
pub fn render_errors(errors: &[ConfigError]) {
    eprintln!(
        "leadline: configuration invalid ({} error{})",
        errors.len(),
        if errors.len() == 1 { "" } else { "s" }
    );
    for err in errors {
        eprintln!("  - {err}");
    }
}
