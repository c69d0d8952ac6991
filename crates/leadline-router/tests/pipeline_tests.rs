// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end pipeline tests over mocked collaborators.

use std::sync::Arc;

use tokio::task::JoinHandle;

use leadline_config::{RouterConfig, SlaConfig};
use leadline_core::traits::{BookingIntent, BookingReply, MessageCategory};
use leadline_core::types::{ConversationMode, InboundSms, MediaItem, MessageType, RouterOutcome};
use leadline_escalation::EscalationEngine;
use leadline_router::{BackgroundLane, Collaborators, InboundRouter};
use leadline_storage::queries::{blocked, clients, escalations, leads, messages, scheduled};
use leadline_storage::Database;
use leadline_test_utils::{
    seed_client, seed_lead, setup_db, MockAgent, MockApproval, MockBooking, MockBridge,
    MockGateway, MockMedia, MockNotifier, MockOracle, MockResponder, MockScorer, MockSuggester,
    SeedClient,
};

const LEAD_PHONE: &str = "+15557770001";

struct Harness {
    db: Database,
    _dir: tempfile::TempDir,
    router: InboundRouter,
    worker: JoinHandle<()>,
    gateway: Arc<MockGateway>,
    responder: Arc<MockResponder>,
    booking: Arc<MockBooking>,
    bridge: Arc<MockBridge>,
    agent: Arc<MockAgent>,
    scorer: Arc<MockScorer>,
    oracle: Arc<MockOracle>,
    approval: Arc<MockApproval>,
    suggester: Arc<MockSuggester>,
}

impl Harness {
    async fn new(client: SeedClient) -> Self {
        let (db, dir) = setup_db().await;
        seed_client(&db, client).await;

        let gateway = Arc::new(MockGateway::new());
        let responder = Arc::new(MockResponder::new());
        let booking = Arc::new(MockBooking::new());
        let bridge = Arc::new(MockBridge::new(true));
        let agent = Arc::new(MockAgent::new());
        let scorer = Arc::new(MockScorer::new());
        let oracle = Arc::new(MockOracle::new(true));
        let approval = Arc::new(MockApproval::new(true));
        let suggester = Arc::new(MockSuggester::new());

        let engine = Arc::new(EscalationEngine::new(
            db.clone(),
            Arc::new(MockNotifier::new()),
            gateway.clone(),
            SlaConfig::default(),
        ));
        let (lane, worker) = BackgroundLane::start(64);
        let router = InboundRouter::new(
            db.clone(),
            RouterConfig::default(),
            Collaborators {
                gateway: gateway.clone(),
                responder: responder.clone(),
                booking: booking.clone(),
                bridge: bridge.clone(),
                media: Arc::new(MockMedia::new()),
                agent: agent.clone(),
                scorer: scorer.clone(),
                hours: oracle.clone(),
                approval: approval.clone(),
                suggester: suggester.clone(),
            },
            engine,
            lane,
        );

        Self {
            db,
            _dir: dir,
            router,
            worker,
            gateway,
            responder,
            booking,
            bridge,
            agent,
            scorer,
            oracle,
            approval,
            suggester,
        }
    }

    async fn default_tenant() -> Self {
        Self::new(SeedClient::default()).await
    }

    /// Drop the router (and with it the lane sender) and wait for the
    /// background worker to drain, so lane side effects are observable.
    async fn drain(self) -> (Database, tempfile::TempDir) {
        drop(self.router);
        self.worker.await.unwrap();
        (self.db, self._dir)
    }
}

fn sms(sid: &str, body: &str) -> InboundSms {
    InboundSms {
        to: "+15550001111".into(),
        from: LEAD_PHONE.into(),
        body: body.into(),
        provider_sid: sid.into(),
        media: Vec::new(),
    }
}

fn media_item(url: &str) -> MediaItem {
    MediaItem {
        url: url.into(),
        content_type: "image/jpeg".into(),
        provider_id: None,
    }
}

#[tokio::test]
async fn unknown_destination_drops_without_rows() {
    let h = Harness::default_tenant().await;
    let mut event = sms("SM1", "hello");
    event.to = "+15550005555".into();

    let outcome = h.router.handle(event).await.unwrap();
    assert_eq!(
        outcome,
        RouterOutcome::Dropped {
            reason: "no tenant".into()
        }
    );
    assert!(leads::find(&h.db, "c1", LEAD_PHONE).await.unwrap().is_none());
    assert!(h.gateway.sent().is_empty());
}

#[tokio::test]
async fn dashboard_word_sends_link_and_terminates() {
    let h = Harness::default_tenant().await;
    let outcome = h.router.handle(sms("SM1", "DASHBOARD")).await.unwrap();
    assert_eq!(outcome, RouterOutcome::DashboardLink);

    let sends = h.gateway.sent();
    assert_eq!(sends.len(), 1);
    assert_eq!(sends[0].category, MessageCategory::DashboardLink);
    assert!(sends[0].body.contains("/c1"));
    // No lead is created for a control word.
    assert!(leads::find(&h.db, "c1", LEAD_PHONE).await.unwrap().is_none());
}

#[tokio::test]
async fn owner_reply_is_offered_to_approval_handler_first() {
    let h = Harness::default_tenant().await;
    let mut event = sms("SM1", "yes");
    event.from = "+15550009999".into();

    let outcome = h.router.handle(event).await.unwrap();
    assert_eq!(outcome, RouterOutcome::OwnerApproval);
    assert_eq!(h.approval.consumed.lock().unwrap().len(), 1);
    assert!(h.gateway.sent().is_empty());
}

#[tokio::test]
async fn stop_word_blocks_cancels_and_confirms_idempotently() {
    let h = Harness::default_tenant().await;
    let lead_id = seed_lead(&h.db, "c1", LEAD_PHONE).await;
    for n in 0..3 {
        scheduled::schedule(&h.db, lead_id, "c1", "drip", &format!("2026-09-0{}T09:00:00Z", n + 1))
            .await
            .unwrap();
    }

    let outcome = h.router.handle(sms("SM1", "STOP")).await.unwrap();
    assert_eq!(outcome, RouterOutcome::OptedOut);
    assert!(blocked::is_blocked(&h.db, "c1", LEAD_PHONE).await.unwrap());
    assert!(scheduled::pending_for_lead(&h.db, lead_id).await.unwrap().is_empty());
    let lead = leads::get(&h.db, lead_id).await.unwrap().unwrap();
    assert!(lead.opted_out);

    let sends = h.gateway.sent();
    assert_eq!(sends.len(), 1);
    assert_eq!(sends[0].category, MessageCategory::OptOutConfirmation);

    // A repeated stop word stays idempotent: one blocked row, a resent
    // confirmation, nothing else.
    let outcome = h.router.handle(sms("SM2", "stop")).await.unwrap();
    assert_eq!(outcome, RouterOutcome::OptedOut);
    assert_eq!(h.gateway.sent().len(), 2);
}

#[tokio::test]
async fn blocked_sender_is_dropped_before_persistence() {
    let h = Harness::default_tenant().await;
    let lead_id = seed_lead(&h.db, "c1", LEAD_PHONE).await;
    h.router.handle(sms("SM1", "stop")).await.unwrap();
    let before = messages::count_for_lead(&h.db, lead_id).await.unwrap();

    let outcome = h.router.handle(sms("SM2", "are you still there?")).await.unwrap();
    assert_eq!(
        outcome,
        RouterOutcome::Dropped {
            reason: "blocked".into()
        }
    );
    assert_eq!(messages::count_for_lead(&h.db, lead_id).await.unwrap(), before);
    assert!(h.responder.seen().is_empty());
}

#[tokio::test]
async fn redelivered_sid_is_duplicate_without_double_send() {
    let h = Harness::default_tenant().await;
    let outcome = h.router.handle(sms("SM1", "how much for a repair?")).await.unwrap();
    assert_eq!(outcome, RouterOutcome::AiReply { escalation_id: None });
    assert_eq!(h.gateway.sent().len(), 1);

    let outcome = h.router.handle(sms("SM1", "how much for a repair?")).await.unwrap();
    assert_eq!(outcome, RouterOutcome::Duplicate);
    assert_eq!(h.gateway.sent().len(), 1);

    let lead = leads::find(&h.db, "c1", LEAD_PHONE).await.unwrap().unwrap();
    // One inbound, one outbound.
    assert_eq!(messages::count_for_lead(&h.db, lead.id).await.unwrap(), 2);
}

#[tokio::test]
async fn human_mode_never_generates_an_automated_reply() {
    let h = Harness::default_tenant().await;
    let lead_id = seed_lead(&h.db, "c1", LEAD_PHONE).await;
    leads::set_conversation_mode(&h.db, lead_id, ConversationMode::Human)
        .await
        .unwrap();

    let outcome = h.router.handle(sms("SM1", "call me asap please")).await.unwrap();
    assert_eq!(outcome, RouterOutcome::HumanMode);
    assert!(h.gateway.sent().is_empty());
    assert!(h.responder.seen().is_empty());
    // The inbound message is still persisted.
    assert_eq!(messages::count_for_lead(&h.db, lead_id).await.unwrap(), 1);
}

#[tokio::test]
async fn reply_cancels_every_pending_sequence_step() {
    let h = Harness::default_tenant().await;
    let lead_id = seed_lead(&h.db, "c1", LEAD_PHONE).await;
    for n in 0..4 {
        scheduled::schedule(&h.db, lead_id, "c1", "drip", &format!("2026-09-0{}T09:00:00Z", n + 1))
            .await
            .unwrap();
    }

    h.router.handle(sms("SM1", "sounds good")).await.unwrap();
    assert!(scheduled::pending_for_lead(&h.db, lead_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn hot_intent_in_hours_bridges_and_acks_once() {
    let h = Harness::default_tenant().await;
    let outcome = h.router.handle(sms("SM1", "please call me asap")).await.unwrap();
    assert_eq!(
        outcome,
        RouterOutcome::HotTransfer {
            bridged: true,
            outside_hours: false,
            escalation_id: None,
        }
    );
    assert_eq!(h.bridge.requests.lock().unwrap().len(), 1);

    let sends = h.gateway.sent();
    assert_eq!(sends.len(), 1);
    assert_eq!(sends[0].category, MessageCategory::HotTransferAck);

    let lead = leads::find(&h.db, "c1", LEAD_PHONE).await.unwrap().unwrap();
    let history = messages::recent_history(&h.db, lead.id, 10).await.unwrap();
    let transfers: Vec<_> = history
        .iter()
        .filter(|m| m.message_type == MessageType::HotTransfer)
        .collect();
    assert_eq!(transfers.len(), 1);
}

#[tokio::test]
async fn hot_intent_after_hours_escalates_instead() {
    let h = Harness::default_tenant().await;
    h.oracle.set_open(false);

    let outcome = h.router.handle(sms("SM1", "emergency, call now")).await.unwrap();
    let RouterOutcome::HotTransfer {
        bridged,
        outside_hours,
        escalation_id,
    } = outcome
    else {
        panic!("expected hot transfer outcome, got {outcome:?}");
    };
    assert!(!bridged);
    assert!(outside_hours);
    let escalation_id = escalation_id.unwrap();

    let escalation = escalations::get(&h.db, escalation_id).await.unwrap().unwrap();
    assert_eq!(escalation.priority, 1);

    let sends = h.gateway.sent();
    assert_eq!(sends.len(), 1);
    assert_eq!(sends[0].category, MessageCategory::AfterHoursAck);
}

#[tokio::test]
async fn bridge_failure_degrades_to_escalation() {
    let h = Harness::default_tenant().await;
    h.bridge.fail_next(true);

    let outcome = h.router.handle(sms("SM1", "call me right now")).await.unwrap();
    let RouterOutcome::HotTransfer {
        bridged,
        outside_hours,
        escalation_id,
    } = outcome
    else {
        panic!("expected hot transfer outcome, got {outcome:?}");
    };
    assert!(!bridged);
    assert!(!outside_hours);
    assert!(escalation_id.is_some());
    assert_eq!(h.gateway.sent()[0].category, MessageCategory::HotTransferAck);
}

#[tokio::test]
async fn booking_intent_delegates_to_the_handler() {
    let h = Harness::default_tenant().await;
    h.booking.script(
        BookingIntent::Requesting,
        Some(BookingReply {
            reply: "Does Tuesday at 2pm work?".into(),
            appointment_created: true,
        }),
    );

    let outcome = h.router.handle(sms("SM1", "can I book you next week")).await.unwrap();
    assert_eq!(
        outcome,
        RouterOutcome::Booking {
            appointment_created: true
        }
    );
    assert_eq!(h.gateway.sent().len(), 1);
    assert!(h.responder.seen().is_empty());
}

#[tokio::test]
async fn booking_handler_failure_falls_through_to_legacy() {
    let h = Harness::default_tenant().await;
    h.booking.script(BookingIntent::Requesting, None);
    h.booking.fail_handle(true);

    let outcome = h.router.handle(sms("SM1", "can I book you next week")).await.unwrap();
    assert_eq!(outcome, RouterOutcome::AiReply { escalation_id: None });
    assert_eq!(h.responder.seen().len(), 1);
}

#[tokio::test]
async fn autonomous_tenant_delegates_the_full_turn() {
    let h = Harness::new(SeedClient {
        ai_mode: "autonomous".into(),
        ..SeedClient::default()
    })
    .await;

    let outcome = h.router.handle(sms("SM1", "hi there")).await.unwrap();
    assert_eq!(outcome, RouterOutcome::AgentReply);
    assert_eq!(h.agent.turns.lock().unwrap().len(), 1);
    assert!(h.responder.seen().is_empty());
}

#[tokio::test]
async fn agent_failure_falls_back_to_legacy_responder() {
    let h = Harness::new(SeedClient {
        ai_mode: "autonomous".into(),
        ..SeedClient::default()
    })
    .await;
    h.agent.fail_next(true);

    let outcome = h.router.handle(sms("SM1", "hi there")).await.unwrap();
    assert_eq!(outcome, RouterOutcome::AiReply { escalation_id: None });
    assert_eq!(h.responder.seen().len(), 1);
}

#[tokio::test]
async fn muted_autonomous_tenant_uses_legacy_responder() {
    let h = Harness::new(SeedClient {
        ai_mode: "autonomous".into(),
        auto_respond: false,
        ..SeedClient::default()
    })
    .await;

    let outcome = h.router.handle(sms("SM1", "hi there")).await.unwrap();
    assert_eq!(outcome, RouterOutcome::AiReply { escalation_id: None });
    assert!(h.agent.turns.lock().unwrap().is_empty());
}

#[tokio::test]
async fn media_only_message_never_reaches_the_generator() {
    let h = Harness::default_tenant().await;
    let mut event = sms("SM1", "");
    event.media = vec![media_item("https://cdn.example.com/leak.jpg")];

    let outcome = h.router.handle(event).await.unwrap();
    assert_eq!(outcome, RouterOutcome::MediaAck);
    assert!(h.responder.seen().is_empty());

    let sends = h.gateway.sent();
    assert_eq!(sends.len(), 1);
    assert_eq!(sends[0].category, MessageCategory::MediaAck);
    assert!(sends[0].body.contains("photo"));

    let lead = leads::find(&h.db, "c1", LEAD_PHONE).await.unwrap().unwrap();
    let history = messages::recent_history(&h.db, lead.id, 10).await.unwrap();
    let inbound = &history[0];
    assert_eq!(inbound.message_type, MessageType::Mms);
    let media = messages::media_for_message(&h.db, inbound.id).await.unwrap();
    assert_eq!(media.len(), 1);
    assert!(media[0].description.is_some());
}

#[tokio::test]
async fn one_bad_media_item_does_not_sink_the_rest() {
    let h = Harness::default_tenant().await;
    let mut event = sms("SM1", "");
    event.media = vec![
        media_item("https://cdn.example.com/fail/one.jpg"),
        media_item("https://cdn.example.com/two.jpg"),
    ];

    let outcome = h.router.handle(event).await.unwrap();
    assert_eq!(outcome, RouterOutcome::MediaAck);

    let lead = leads::find(&h.db, "c1", LEAD_PHONE).await.unwrap().unwrap();
    let history = messages::recent_history(&h.db, lead.id, 10).await.unwrap();
    let media = messages::media_for_message(&h.db, history[0].id).await.unwrap();
    assert_eq!(media.len(), 1);
    assert!(media[0].url.ends_with("two.jpg"));
}

#[tokio::test]
async fn legacy_reply_persists_counts_and_suggests() {
    let h = Harness::default_tenant().await;
    let outcome = h.router.handle(sms("SM1", "tell me more")).await.unwrap();
    assert_eq!(outcome, RouterOutcome::AiReply { escalation_id: None });

    let lead = leads::find(&h.db, "c1", LEAD_PHONE).await.unwrap().unwrap();
    assert_eq!(messages::count_for_lead(&h.db, lead.id).await.unwrap(), 2);

    let client = clients::get(&h.db, "c1").await.unwrap().unwrap();
    assert_eq!(client.messages_today, 1);
    assert_eq!(client.messages_this_month, 1);

    let suggester = h.suggester.clone();
    let (db, _dir) = h.drain().await;
    assert_eq!(suggester.checks.lock().unwrap().len(), 1);
    db.close().await.unwrap();
}

#[tokio::test]
async fn generator_escalation_signal_creates_escalation_instead_of_reply() {
    let h = Harness::default_tenant().await;
    h.responder.push_escalation("lead is angry");

    let outcome = h.router.handle(sms("SM1", "this is unacceptable")).await.unwrap();
    let RouterOutcome::AiReply { escalation_id } = outcome else {
        panic!("expected ai reply outcome, got {outcome:?}");
    };
    let escalation_id = escalation_id.unwrap();
    let escalation = escalations::get(&h.db, escalation_id).await.unwrap().unwrap();
    assert_eq!(escalation.reason, "lead is angry");
    // No lead-facing send happened.
    assert!(h.gateway.sent().is_empty());
}

#[tokio::test]
async fn generator_failure_escalates_rather_than_erroring() {
    let h = Harness::default_tenant().await;
    h.responder.fail_next(true);

    let outcome = h.router.handle(sms("SM1", "hello?")).await.unwrap();
    let RouterOutcome::AiReply { escalation_id } = outcome else {
        panic!("expected ai reply outcome, got {outcome:?}");
    };
    assert!(escalation_id.is_some());
    assert!(h.gateway.sent().is_empty());
}

#[tokio::test]
async fn contractor_ping_reaches_the_owner_phone() {
    let h = Harness::new(SeedClient {
        contractor_ping: true,
        ..SeedClient::default()
    })
    .await;

    let outcome = h.router.handle(sms("SM1", "tell me more")).await.unwrap();
    assert_eq!(outcome, RouterOutcome::AiReply { escalation_id: None });

    let gateway = h.gateway.clone();
    let (db, _dir) = h.drain().await;
    let sends = gateway.sent();
    assert_eq!(sends.len(), 2);
    let ping = sends
        .iter()
        .find(|s| s.category == MessageCategory::ContractorPing)
        .unwrap();
    assert_eq!(ping.to, "+15550009999");
    assert!(ping.body.contains(LEAD_PHONE));
    db.close().await.unwrap();
}

#[tokio::test]
async fn scoring_runs_off_path_with_the_deep_flag() {
    let h = Harness::default_tenant().await;
    h.router
        .handle(sms("SM1", "I need a quote asap, budget is $8000"))
        .await
        .unwrap();
    h.router.handle(sms("SM2", "ok thanks")).await.unwrap();

    let scorer = h.scorer.clone();
    let (db, _dir) = h.drain().await;
    let requests = scorer.requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].deep);
    assert!(!requests[1].deep);
    db.close().await.unwrap();
}
