// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Leadline platform.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Leadline configuration.
///
/// Loaded from TOML files with environment variable overrides. All sections
/// are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LeadlineConfig {
    /// Webhook server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Inbound conversation router settings.
    #[serde(default)]
    pub router: RouterConfig,

    /// Escalation SLA settings.
    #[serde(default)]
    pub sla: SlaConfig,

    /// External collaborator service endpoints.
    #[serde(default)]
    pub connect: ConnectConfig,
}

/// Webhook HTTP server settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Tracing filter directive (e.g. "info", "leadline_router=debug").
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8480
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("leadline").join("leadline.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("leadline.db"))
        .to_string_lossy()
        .into_owned()
}

/// Inbound conversation router settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RouterConfig {
    /// Conversation history turns handed to the AI responder.
    #[serde(default = "default_history_turns")]
    pub history_turns: usize,
    /// Base URL for the "DASHBOARD" control-word link.
    #[serde(default = "default_dashboard_base")]
    pub dashboard_base_url: String,
    /// Confirmation text sent after an opt-out stop word.
    #[serde(default = "default_opt_out_confirmation")]
    pub opt_out_confirmation: String,
    /// Acknowledgment sent when a hot transfer is bridged.
    #[serde(default = "default_hot_ack")]
    pub hot_transfer_ack: String,
    /// Acknowledgment sent on hot intent outside business hours.
    #[serde(default = "default_after_hours_ack")]
    pub after_hours_ack: String,
    /// Acknowledgment sent when an in-hours bridge attempt fails.
    #[serde(default = "default_hot_fallback_ack")]
    pub hot_fallback_ack: String,
    /// Canned acknowledgment for media-only messages. `{context}` is replaced
    /// with the AI-derived media description.
    #[serde(default = "default_photo_ack")]
    pub photo_ack: String,
    /// Queue depth for the fire-and-forget background lane.
    #[serde(default = "default_lane_depth")]
    pub background_lane_depth: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            history_turns: default_history_turns(),
            dashboard_base_url: default_dashboard_base(),
            opt_out_confirmation: default_opt_out_confirmation(),
            hot_transfer_ack: default_hot_ack(),
            after_hours_ack: default_after_hours_ack(),
            hot_fallback_ack: default_hot_fallback_ack(),
            photo_ack: default_photo_ack(),
            background_lane_depth: default_lane_depth(),
        }
    }
}

fn default_history_turns() -> usize {
    20
}

fn default_dashboard_base() -> String {
    "https://app.leadline.io/dashboard".to_string()
}

fn default_opt_out_confirmation() -> String {
    "You have been unsubscribed and will receive no further messages. Reply START to re-subscribe."
        .to_string()
}

fn default_hot_ack() -> String {
    "Great timing! We're calling you right now.".to_string()
}

fn default_after_hours_ack() -> String {
    "Thanks for reaching out! We're closed right now, but someone will call you first thing tomorrow."
        .to_string()
}

fn default_hot_fallback_ack() -> String {
    "We couldn't connect you just now, but a team member will call you right back.".to_string()
}

fn default_photo_ack() -> String {
    "Thanks for the photo{context}! We'll take a look and get right back to you.".to_string()
}

fn default_lane_depth() -> usize {
    256
}

/// Escalation SLA settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SlaConfig {
    /// Deadline for priority 1-2 escalations, in minutes.
    #[serde(default = "default_urgent_deadline")]
    pub urgent_deadline_minutes: u32,
    /// Deadline for priority 3+ escalations, in minutes.
    #[serde(default = "default_standard_deadline")]
    pub standard_deadline_minutes: u32,
    /// Interval between SLA breach sweeps, in seconds.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl Default for SlaConfig {
    fn default() -> Self {
        Self {
            urgent_deadline_minutes: default_urgent_deadline(),
            standard_deadline_minutes: default_standard_deadline(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

fn default_urgent_deadline() -> u32 {
    60
}

fn default_standard_deadline() -> u32 {
    240
}

fn default_sweep_interval() -> u64 {
    300
}

/// External collaborator service endpoints.
///
/// Each collaborator is an HTTP service; an unset URL disables that
/// collaborator (the router degrades to its fallback branch).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectConfig {
    /// Compliance send gateway base URL. Required for serving.
    #[serde(default)]
    pub gateway_url: Option<String>,
    /// AI response generator base URL.
    #[serde(default)]
    pub responder_url: Option<String>,
    /// Booking classifier/handler base URL.
    #[serde(default)]
    pub booking_url: Option<String>,
    /// Telephony bridge base URL.
    #[serde(default)]
    pub telephony_url: Option<String>,
    /// Media processor base URL.
    #[serde(default)]
    pub media_url: Option<String>,
    /// Autonomous agent base URL.
    #[serde(default)]
    pub agent_url: Option<String>,
    /// Lead scorer base URL.
    #[serde(default)]
    pub scoring_url: Option<String>,
    /// Staff notification service base URL.
    #[serde(default)]
    pub notify_url: Option<String>,
    /// Business-hours oracle base URL.
    #[serde(default)]
    pub hours_url: Option<String>,
    /// Owner-assist service base URL (approval replies, flow suggestions).
    #[serde(default)]
    pub assist_url: Option<String>,
    /// Per-call timeout for collaborator requests, in seconds.
    #[serde(default = "default_connect_timeout")]
    pub timeout_secs: u64,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            gateway_url: None,
            responder_url: None,
            booking_url: None,
            telephony_url: None,
            media_url: None,
            agent_url: None,
            scoring_url: None,
            notify_url: None,
            hours_url: None,
            assist_url: None,
            timeout_secs: default_connect_timeout(),
        }
    }
}

fn default_connect_timeout() -> u64 {
    10
}
