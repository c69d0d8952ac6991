// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock collaborator implementations.
//!
//! State lives behind `std::sync::Mutex`; no lock is ever held across an
//! await point.

use std::collections::VecDeque;
use std::sync::{
    Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;

use leadline_core::LeadlineError;
use leadline_core::traits::{
    AgentResult, AiReply, AiResponder, ApprovalHandler, AutonomousAgent, BookingAgent,
    BookingIntent, BookingReply, BusinessHoursOracle, FlowSuggester, LeadScorer, MediaProcessor,
    Notifier, ProcessedMedia, RingGroupRequest, RingGroupResult, SendGateway, SendReceipt,
    SendRequest, TelephonyBridge,
};
use leadline_core::types::{Client, Lead, MediaItem, SmsMessage, TeamMember};

fn failure(name: &str) -> LeadlineError {
    LeadlineError::collaborator(name, "scripted failure")
}

/// Records every send; scriptable hard failure. Issues sequential sids.
#[derive(Default)]
pub struct MockGateway {
    pub sends: Mutex<Vec<SendRequest>>,
    fail: AtomicBool,
    counter: AtomicUsize,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SendRequest> {
        self.sends.lock().unwrap().clone()
    }
}

#[async_trait]
impl SendGateway for MockGateway {
    async fn send(&self, request: SendRequest) -> Result<SendReceipt, LeadlineError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(LeadlineError::Gateway {
                message: "scripted rejection".into(),
                source: None,
            });
        }
        self.sends.lock().unwrap().push(request);
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(SendReceipt {
            sent: true,
            message_sid: Some(format!("SMOUT{n}")),
        })
    }
}

/// FIFO-scripted reply generator. Empty queue yields a default
/// non-escalating reply.
#[derive(Default)]
pub struct MockResponder {
    replies: Mutex<VecDeque<AiReply>>,
    fail: AtomicBool,
    pub requests: Mutex<Vec<String>>,
}

impl MockResponder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_reply(&self, reply: AiReply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn push_escalation(&self, reason: &str) {
        self.push_reply(AiReply {
            response: String::new(),
            confidence: 0.2,
            should_escalate: true,
            escalation_reason: Some(reason.to_string()),
        });
    }

    pub fn fail_next(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Bodies of every generate request received.
    pub fn seen(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiResponder for MockResponder {
    async fn generate(
        &self,
        request: leadline_core::traits::GenerateRequest,
    ) -> Result<AiReply, LeadlineError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(failure("responder"));
        }
        self.requests.lock().unwrap().push(request.body.clone());
        Ok(self.replies.lock().unwrap().pop_front().unwrap_or(AiReply {
            response: "Thanks for reaching out! How can we help?".into(),
            confidence: 0.9,
            should_escalate: false,
            escalation_reason: None,
        }))
    }
}

/// Scriptable booking classifier/handler.
pub struct MockBooking {
    intent: Mutex<BookingIntent>,
    reply: Mutex<Option<BookingReply>>,
    fail_handle: AtomicBool,
}

impl Default for MockBooking {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBooking {
    pub fn new() -> Self {
        Self {
            intent: Mutex::new(BookingIntent::None),
            reply: Mutex::new(None),
            fail_handle: AtomicBool::new(false),
        }
    }

    pub fn script(&self, intent: BookingIntent, reply: Option<BookingReply>) {
        *self.intent.lock().unwrap() = intent;
        *self.reply.lock().unwrap() = reply;
    }

    pub fn fail_handle(&self, fail: bool) {
        self.fail_handle.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl BookingAgent for MockBooking {
    async fn detect_intent(
        &self,
        _body: &str,
        _history: &[SmsMessage],
    ) -> Result<BookingIntent, LeadlineError> {
        Ok(*self.intent.lock().unwrap())
    }

    async fn handle(
        &self,
        _lead: &Lead,
        _body: &str,
        _history: &[SmsMessage],
    ) -> Result<Option<BookingReply>, LeadlineError> {
        if self.fail_handle.load(Ordering::SeqCst) {
            return Err(failure("booking"));
        }
        Ok(self.reply.lock().unwrap().clone())
    }
}

/// Fixed business-hours answer.
pub struct MockOracle {
    open: AtomicBool,
    fail: AtomicBool,
}

impl MockOracle {
    pub fn new(open: bool) -> Self {
        Self {
            open: AtomicBool::new(open),
            fail: AtomicBool::new(false),
        }
    }

    pub fn set_open(&self, open: bool) {
        self.open.store(open, Ordering::SeqCst);
    }

    pub fn fail_next(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl BusinessHoursOracle for MockOracle {
    async fn is_within_business_hours(
        &self,
        _client_id: &str,
        _timezone: &str,
    ) -> Result<bool, LeadlineError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(failure("hours"));
        }
        Ok(self.open.load(Ordering::SeqCst))
    }
}

/// Scriptable ring-group bridge.
#[derive(Default)]
pub struct MockBridge {
    initiated: AtomicBool,
    fail: AtomicBool,
    pub requests: Mutex<Vec<RingGroupRequest>>,
}

impl MockBridge {
    pub fn new(initiated: bool) -> Self {
        Self {
            initiated: AtomicBool::new(initiated),
            fail: AtomicBool::new(false),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_next(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl TelephonyBridge for MockBridge {
    async fn initiate_ring_group(
        &self,
        request: RingGroupRequest,
    ) -> Result<RingGroupResult, LeadlineError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(failure("telephony"));
        }
        self.requests.lock().unwrap().push(request);
        let initiated = self.initiated.load(Ordering::SeqCst);
        Ok(RingGroupResult {
            initiated,
            call_sid: initiated.then(|| "CA100".to_string()),
        })
    }
}

/// Derives a deterministic description from the url; urls containing
/// "fail" error out, for isolation tests.
#[derive(Default)]
pub struct MockMedia;

impl MockMedia {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MediaProcessor for MockMedia {
    async fn process(&self, item: &MediaItem) -> Result<ProcessedMedia, LeadlineError> {
        if item.url.contains("fail") {
            return Err(failure("media"));
        }
        Ok(ProcessedMedia {
            url: item.url.clone(),
            content_type: item.content_type.clone(),
            description: Some(format!("photo from {}", item.url)),
            tags: vec!["test".to_string()],
        })
    }
}

/// Scriptable autonomous agent.
#[derive(Default)]
pub struct MockAgent {
    fail: AtomicBool,
    pub turns: Mutex<Vec<(i64, i64, String)>>,
}

impl MockAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl AutonomousAgent for MockAgent {
    async fn process_incoming_message(
        &self,
        lead_id: i64,
        message_id: i64,
        body: &str,
    ) -> Result<AgentResult, LeadlineError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(failure("agent"));
        }
        self.turns
            .lock()
            .unwrap()
            .push((lead_id, message_id, body.to_string()));
        Ok(AgentResult {
            replied: true,
            summary: Some("handled by agent".into()),
        })
    }
}

/// Records scoring requests.
#[derive(Default)]
pub struct MockScorer {
    pub requests: Mutex<Vec<leadline_core::traits::ScoreRequest>>,
    fail: AtomicBool,
}

impl MockScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl LeadScorer for MockScorer {
    async fn score(
        &self,
        request: leadline_core::traits::ScoreRequest,
    ) -> Result<(), LeadlineError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(failure("scoring"));
        }
        self.requests.lock().unwrap().push(request);
        Ok(())
    }
}

/// One recorded delivery attempt by the mock notifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub member_id: String,
    pub channel: &'static str,
    pub body: String,
}

/// Records SMS/email deliveries; either channel can be scripted to fail.
#[derive(Default)]
pub struct MockNotifier {
    pub deliveries: Mutex<Vec<Delivery>>,
    fail_sms: AtomicBool,
    fail_email: AtomicBool,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_sms(&self, fail: bool) {
        self.fail_sms.store(fail, Ordering::SeqCst);
    }

    pub fn fail_email(&self, fail: bool) {
        self.fail_email.store(fail, Ordering::SeqCst);
    }

    pub fn delivered(&self) -> Vec<Delivery> {
        self.deliveries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send_sms(&self, member: &TeamMember, body: &str) -> Result<(), LeadlineError> {
        if self.fail_sms.load(Ordering::SeqCst) {
            return Err(LeadlineError::Notification {
                channel: "sms".into(),
                message: "scripted failure".into(),
            });
        }
        self.deliveries.lock().unwrap().push(Delivery {
            member_id: member.id.clone(),
            channel: "sms",
            body: body.to_string(),
        });
        Ok(())
    }

    async fn send_email(
        &self,
        member: &TeamMember,
        _subject: &str,
        body: &str,
    ) -> Result<(), LeadlineError> {
        if self.fail_email.load(Ordering::SeqCst) {
            return Err(LeadlineError::Notification {
                channel: "email".into(),
                message: "scripted failure".into(),
            });
        }
        self.deliveries.lock().unwrap().push(Delivery {
            member_id: member.id.clone(),
            channel: "email",
            body: body.to_string(),
        });
        Ok(())
    }
}

/// Consumes owner replies matching "yes"/"no" when armed.
#[derive(Default)]
pub struct MockApproval {
    armed: AtomicBool,
    pub consumed: Mutex<Vec<String>>,
}

impl MockApproval {
    pub fn new(armed: bool) -> Self {
        Self {
            armed: AtomicBool::new(armed),
            consumed: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ApprovalHandler for MockApproval {
    async fn handle_owner_reply(
        &self,
        _client: &Client,
        body: &str,
    ) -> Result<bool, LeadlineError> {
        let normalized = body.trim().to_lowercase();
        if self.armed.load(Ordering::SeqCst) && (normalized == "yes" || normalized == "no") {
            self.consumed.lock().unwrap().push(body.to_string());
            return Ok(true);
        }
        Ok(false)
    }
}

/// Records flow-suggestion checks.
#[derive(Default)]
pub struct MockSuggester {
    pub checks: Mutex<Vec<(i64, String)>>,
}

impl MockSuggester {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FlowSuggester for MockSuggester {
    async fn check(&self, lead_id: i64, client_id: &str) -> Result<(), LeadlineError> {
        self.checks
            .lock()
            .unwrap()
            .push((lead_id, client_id.to_string()));
        Ok(())
    }
}
