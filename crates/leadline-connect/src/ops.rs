// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP clients for the operational collaborators: telephony, business
//! hours, staff notifications, and owner assist.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use leadline_core::traits::{
    ApprovalHandler, BusinessHoursOracle, FlowSuggester, Notifier, RingGroupRequest,
    RingGroupResult, TelephonyBridge,
};
use leadline_core::types::{Client, TeamMember};
use leadline_core::LeadlineError;

use crate::client::ServiceClient;

/// Telephony bridge service.
#[derive(Debug, Clone)]
pub struct HttpBridge {
    client: ServiceClient,
}

impl HttpBridge {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LeadlineError> {
        Ok(Self {
            client: ServiceClient::new("telephony", base_url, timeout)?,
        })
    }
}

#[async_trait]
impl TelephonyBridge for HttpBridge {
    async fn initiate_ring_group(
        &self,
        request: RingGroupRequest,
    ) -> Result<RingGroupResult, LeadlineError> {
        self.client.post_json("/ring-group", &request).await
    }
}

#[derive(Serialize)]
struct HoursRequest<'a> {
    client_id: &'a str,
    timezone: &'a str,
}

#[derive(Deserialize)]
struct HoursResponse {
    open: bool,
}

/// Business-hours oracle service.
#[derive(Debug, Clone)]
pub struct HttpHours {
    client: ServiceClient,
}

impl HttpHours {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LeadlineError> {
        Ok(Self {
            client: ServiceClient::new("hours", base_url, timeout)?,
        })
    }
}

#[async_trait]
impl BusinessHoursOracle for HttpHours {
    async fn is_within_business_hours(
        &self,
        client_id: &str,
        timezone: &str,
    ) -> Result<bool, LeadlineError> {
        let response: HoursResponse = self
            .client
            .post_json(
                "/business-hours",
                &HoursRequest {
                    client_id,
                    timezone,
                },
            )
            .await?;
        Ok(response.open)
    }
}

#[derive(Serialize)]
struct SmsNotification<'a> {
    member: &'a TeamMember,
    body: &'a str,
}

#[derive(Serialize)]
struct EmailNotification<'a> {
    member: &'a TeamMember,
    subject: &'a str,
    body: &'a str,
}

/// Staff notification service (SMS and email channels).
#[derive(Debug, Clone)]
pub struct HttpNotifier {
    client: ServiceClient,
}

impl HttpNotifier {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LeadlineError> {
        Ok(Self {
            client: ServiceClient::new("notify", base_url, timeout)?,
        })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn send_sms(&self, member: &TeamMember, body: &str) -> Result<(), LeadlineError> {
        self.client
            .post_unit("/sms", &SmsNotification { member, body })
            .await
            .map_err(|e| LeadlineError::Notification {
                channel: "sms".into(),
                message: e.to_string(),
            })
    }

    async fn send_email(
        &self,
        member: &TeamMember,
        subject: &str,
        body: &str,
    ) -> Result<(), LeadlineError> {
        self.client
            .post_unit(
                "/email",
                &EmailNotification {
                    member,
                    subject,
                    body,
                },
            )
            .await
            .map_err(|e| LeadlineError::Notification {
                channel: "email".into(),
                message: e.to_string(),
            })
    }
}

#[derive(Serialize)]
struct OwnerReplyRequest<'a> {
    client_id: &'a str,
    body: &'a str,
}

#[derive(Deserialize)]
struct OwnerReplyResponse {
    consumed: bool,
}

#[derive(Serialize)]
struct FlowCheckRequest<'a> {
    lead_id: i64,
    client_id: &'a str,
}

/// Owner-assist service: pending-approval replies and flow suggestions.
#[derive(Debug, Clone)]
pub struct HttpAssist {
    client: ServiceClient,
}

impl HttpAssist {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LeadlineError> {
        Ok(Self {
            client: ServiceClient::new("assist", base_url, timeout)?,
        })
    }
}

#[async_trait]
impl ApprovalHandler for HttpAssist {
    async fn handle_owner_reply(
        &self,
        client: &Client,
        body: &str,
    ) -> Result<bool, LeadlineError> {
        let response: OwnerReplyResponse = self
            .client
            .post_json(
                "/owner-reply",
                &OwnerReplyRequest {
                    client_id: &client.id,
                    body,
                },
            )
            .await?;
        Ok(response.consumed)
    }
}

#[async_trait]
impl FlowSuggester for HttpAssist {
    async fn check(&self, lead_id: i64, client_id: &str) -> Result<(), LeadlineError> {
        self.client
            .post_unit("/flow-check", &FlowCheckRequest { lead_id, client_id })
            .await
    }
}
