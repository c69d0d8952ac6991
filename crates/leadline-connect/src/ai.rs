// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP clients for the AI-backed collaborators: response generation,
//! booking, autonomous agent, media processing, and lead scoring.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use leadline_core::traits::{
    AgentResult, AiReply, AiResponder, AutonomousAgent, BookingAgent, BookingIntent, BookingReply,
    GenerateRequest, LeadScorer, MediaProcessor, ProcessedMedia, ScoreRequest,
};
use leadline_core::types::{Lead, MediaItem, SmsMessage};
use leadline_core::LeadlineError;

use crate::client::ServiceClient;

/// Legacy response generator service.
#[derive(Debug, Clone)]
pub struct HttpResponder {
    client: ServiceClient,
}

impl HttpResponder {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LeadlineError> {
        Ok(Self {
            client: ServiceClient::new("responder", base_url, timeout)?,
        })
    }
}

#[async_trait]
impl AiResponder for HttpResponder {
    async fn generate(&self, request: GenerateRequest) -> Result<AiReply, LeadlineError> {
        self.client.post_json("/generate", &request).await
    }
}

#[derive(Serialize)]
struct IntentRequest<'a> {
    body: &'a str,
    history: &'a [SmsMessage],
}

#[derive(Deserialize)]
struct IntentResponse {
    intent: BookingIntent,
}

#[derive(Serialize)]
struct HandleRequest<'a> {
    lead: &'a Lead,
    body: &'a str,
    history: &'a [SmsMessage],
}

#[derive(Deserialize)]
struct HandleResponse {
    reply: Option<BookingReply>,
}

/// Booking classifier and conversation handler service.
#[derive(Debug, Clone)]
pub struct HttpBooking {
    client: ServiceClient,
}

impl HttpBooking {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LeadlineError> {
        Ok(Self {
            client: ServiceClient::new("booking", base_url, timeout)?,
        })
    }
}

#[async_trait]
impl BookingAgent for HttpBooking {
    async fn detect_intent(
        &self,
        body: &str,
        history: &[SmsMessage],
    ) -> Result<BookingIntent, LeadlineError> {
        let response: IntentResponse = self
            .client
            .post_json("/intent", &IntentRequest { body, history })
            .await?;
        Ok(response.intent)
    }

    async fn handle(
        &self,
        lead: &Lead,
        body: &str,
        history: &[SmsMessage],
    ) -> Result<Option<BookingReply>, LeadlineError> {
        let response: HandleResponse = self
            .client
            .post_json(
                "/handle",
                &HandleRequest {
                    lead,
                    body,
                    history,
                },
            )
            .await?;
        Ok(response.reply)
    }
}

#[derive(Serialize)]
struct AgentTurnRequest<'a> {
    lead_id: i64,
    message_id: i64,
    body: &'a str,
}

/// Autonomous agent service.
#[derive(Debug, Clone)]
pub struct HttpAgent {
    client: ServiceClient,
}

impl HttpAgent {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LeadlineError> {
        Ok(Self {
            client: ServiceClient::new("agent", base_url, timeout)?,
        })
    }
}

#[async_trait]
impl AutonomousAgent for HttpAgent {
    async fn process_incoming_message(
        &self,
        lead_id: i64,
        message_id: i64,
        body: &str,
    ) -> Result<AgentResult, LeadlineError> {
        self.client
            .post_json(
                "/process-message",
                &AgentTurnRequest {
                    lead_id,
                    message_id,
                    body,
                },
            )
            .await
    }
}

/// Media processing service.
#[derive(Debug, Clone)]
pub struct HttpMedia {
    client: ServiceClient,
}

impl HttpMedia {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LeadlineError> {
        Ok(Self {
            client: ServiceClient::new("media", base_url, timeout)?,
        })
    }
}

#[async_trait]
impl MediaProcessor for HttpMedia {
    async fn process(&self, item: &MediaItem) -> Result<ProcessedMedia, LeadlineError> {
        self.client.post_json("/process", item).await
    }
}

/// Lead scoring service. Fire-and-forget on the caller's side; the response
/// body is ignored.
#[derive(Debug, Clone)]
pub struct HttpScorer {
    client: ServiceClient,
}

impl HttpScorer {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LeadlineError> {
        Ok(Self {
            client: ServiceClient::new("scoring", base_url, timeout)?,
        })
    }
}

#[async_trait]
impl LeadScorer for HttpScorer {
    async fn score(&self, request: ScoreRequest) -> Result<(), LeadlineError> {
        self.client.post_unit("/score", &request).await
    }
}
