// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty paths and sane SLA windows.

use crate::error::ConfigError;
use crate::model::LeadlineConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &LeadlineConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // Bind address must be present and parseable as IP or plain hostname.
    let addr = config.server.host.trim();
    if addr.is_empty() {
        errors.push(ConfigError::validation("server.host must not be empty"));
    } else {
        let is_valid_ip = addr.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = addr
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::validation(format!(
                "server.host `{addr}` is not a valid IP address or hostname"
            )));
        }
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.database_path must not be empty",
        ));
    }

    if config.router.history_turns == 0 {
        errors.push(ConfigError::validation(
            "router.history_turns must be at least 1",
        ));
    }

    if config.router.background_lane_depth == 0 {
        errors.push(ConfigError::validation(
            "router.background_lane_depth must be at least 1",
        ));
    }

    if config.sla.urgent_deadline_minutes == 0 {
        errors.push(ConfigError::validation(
            "sla.urgent_deadline_minutes must be at least 1",
        ));
    }

    if config.sla.standard_deadline_minutes == 0 {
        errors.push(ConfigError::validation(
            "sla.standard_deadline_minutes must be at least 1",
        ));
    }

    if config.sla.urgent_deadline_minutes > config.sla.standard_deadline_minutes {
        errors.push(ConfigError::validation(format!(
            "sla.urgent_deadline_minutes ({}) must not exceed sla.standard_deadline_minutes ({})",
            config.sla.urgent_deadline_minutes, config.sla.standard_deadline_minutes
        )));
    }

    if config.sla.sweep_interval_secs < 10 {
        errors.push(ConfigError::validation(format!(
            "sla.sweep_interval_secs must be at least 10, got {}",
            config.sla.sweep_interval_secs
        )));
    }

    if config.connect.timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "connect.timeout_secs must be at least 1",
        ));
    }

    for (field, url) in [
        ("connect.gateway_url", &config.connect.gateway_url),
        ("connect.responder_url", &config.connect.responder_url),
        ("connect.booking_url", &config.connect.booking_url),
        ("connect.telephony_url", &config.connect.telephony_url),
        ("connect.media_url", &config.connect.media_url),
        ("connect.agent_url", &config.connect.agent_url),
        ("connect.scoring_url", &config.connect.scoring_url),
        ("connect.notify_url", &config.connect.notify_url),
        ("connect.hours_url", &config.connect.hours_url),
        ("connect.assist_url", &config.connect.assist_url),
    ] {
        if let Some(url) = url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                errors.push(ConfigError::validation(format!(
                    "{field} `{url}` must start with http:// or https://"
                )));
            }
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&LeadlineConfig::default()).is_ok());
    }

    #[test]
    fn collects_all_errors_instead_of_failing_fast() {
        let mut config = LeadlineConfig::default();
        config.server.host = String::new();
        config.storage.database_path = String::new();
        config.sla.sweep_interval_secs = 1;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn urgent_deadline_must_not_exceed_standard() {
        let mut config = LeadlineConfig::default();
        config.sla.urgent_deadline_minutes = 500;

        let errors = validate_config(&config).unwrap_err();
        assert!(
            errors
                .iter()
                .any(|e| e.to_string().contains("urgent_deadline_minutes"))
        );
    }

    #[test]
    fn collaborator_urls_must_be_http() {
        let mut config = LeadlineConfig::default();
        config.connect.gateway_url = Some("ftp://gateway".into());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("gateway_url"));
    }
}
