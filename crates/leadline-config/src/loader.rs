// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports hierarchy: `./leadline.toml` > `~/.config/leadline/leadline.toml`
//! > `/etc/leadline/leadline.toml`, with environment variable overrides via
//! the `LEADLINE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::LeadlineConfig;

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/leadline/leadline.toml` (system-wide)
/// 3. `~/.config/leadline/leadline.toml` (user XDG config)
/// 4. `./leadline.toml` (local directory)
/// 5. `LEADLINE_*` environment variables
pub fn load_config() -> Result<LeadlineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LeadlineConfig::default()))
        .merge(Toml::file("/etc/leadline/leadline.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("leadline/leadline.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("leadline.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no file hierarchy).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<LeadlineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LeadlineConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LeadlineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LeadlineConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `LEADLINE_STORAGE_DATABASE_PATH` must map
/// to `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("LEADLINE_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: LEADLINE_SLA_SWEEP_INTERVAL_SECS -> "sla_sweep_interval_secs"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("server_", "server.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("router_", "router.", 1)
            .replacen("sla_", "sla.", 1)
            .replacen("connect_", "connect.", 1);
        mapped.into()
    })
}
