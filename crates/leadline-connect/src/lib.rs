// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP implementations of the collaborator traits.
//!
//! Each collaborator service is reached over JSON-over-HTTP at a base URL
//! from `[connect]` config, with one bounded timeout per call. Failures map
//! to [`LeadlineError::Collaborator`] (degradable), except the compliance
//! gateway which maps to the fatal [`LeadlineError::Gateway`].

use std::time::Duration;

use leadline_config::ConnectConfig;
use leadline_core::LeadlineError;

mod ai;
mod client;
mod gateway;
mod ops;

pub use ai::{HttpAgent, HttpBooking, HttpMedia, HttpResponder, HttpScorer};
pub use gateway::HttpGateway;
pub use ops::{HttpAssist, HttpBridge, HttpHours, HttpNotifier};

/// The full set of HTTP collaborator clients, built from `[connect]` config.
#[derive(Debug)]
pub struct HttpCollaborators {
    pub gateway: HttpGateway,
    pub responder: HttpResponder,
    pub booking: HttpBooking,
    pub bridge: HttpBridge,
    pub media: HttpMedia,
    pub agent: HttpAgent,
    pub scorer: HttpScorer,
    pub notifier: HttpNotifier,
    pub hours: HttpHours,
    pub assist: HttpAssist,
}

fn require<'a>(url: &'a Option<String>, key: &str) -> Result<&'a str, LeadlineError> {
    url.as_deref()
        .ok_or_else(|| LeadlineError::Config(format!("connect.{key} is required for serving")))
}

impl HttpCollaborators {
    /// Build every client, failing fast on any missing base URL.
    pub fn from_config(config: &ConnectConfig) -> Result<Self, LeadlineError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        Ok(Self {
            gateway: HttpGateway::new(require(&config.gateway_url, "gateway_url")?, timeout)?,
            responder: HttpResponder::new(
                require(&config.responder_url, "responder_url")?,
                timeout,
            )?,
            booking: HttpBooking::new(require(&config.booking_url, "booking_url")?, timeout)?,
            bridge: HttpBridge::new(require(&config.telephony_url, "telephony_url")?, timeout)?,
            media: HttpMedia::new(require(&config.media_url, "media_url")?, timeout)?,
            agent: HttpAgent::new(require(&config.agent_url, "agent_url")?, timeout)?,
            scorer: HttpScorer::new(require(&config.scoring_url, "scoring_url")?, timeout)?,
            notifier: HttpNotifier::new(require(&config.notify_url, "notify_url")?, timeout)?,
            hours: HttpHours::new(require(&config.hours_url, "hours_url")?, timeout)?,
            assist: HttpAssist::new(require(&config.assist_url, "assist_url")?, timeout)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_url_fails_fast_with_the_key_name() {
        let config = ConnectConfig::default();
        let err = HttpCollaborators::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("connect.gateway_url"));
    }

    #[test]
    fn full_config_builds_every_client() {
        let config = ConnectConfig {
            gateway_url: Some("http://localhost:9001".into()),
            responder_url: Some("http://localhost:9002".into()),
            booking_url: Some("http://localhost:9003".into()),
            telephony_url: Some("http://localhost:9004".into()),
            media_url: Some("http://localhost:9005".into()),
            agent_url: Some("http://localhost:9006".into()),
            scoring_url: Some("http://localhost:9007".into()),
            notify_url: Some("http://localhost:9008".into()),
            hours_url: Some("http://localhost:9009".into()),
            assist_url: Some("http://localhost:9010".into()),
            timeout_secs: 5,
        };
        assert!(HttpCollaborators::from_config(&config).is_ok());
    }
}
