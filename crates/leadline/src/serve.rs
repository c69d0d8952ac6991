// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `leadline serve` command implementation.
//!
//! Wires SQLite storage, the HTTP collaborator clients, the inbound
//! conversation router, the escalation engine, and the SLA sweeper, then
//! serves the provider webhook until a shutdown signal arrives.

use std::sync::Arc;
use std::time::Duration;

use leadline_config::LeadlineConfig;
use leadline_connect::HttpCollaborators;
use leadline_core::LeadlineError;
use leadline_escalation::{EscalationEngine, SlaSweeper};
use leadline_router::{BackgroundLane, Collaborators, InboundRouter};
use leadline_storage::Database;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Runs the `leadline serve` command.
pub async fn run_serve(config: LeadlineConfig) -> Result<(), LeadlineError> {
    init_tracing(&config.server.log_level);

    info!("starting leadline serve");

    let db = Database::open(&config.storage.database_path).await?;

    let http = HttpCollaborators::from_config(&config.connect)?;
    let gateway = Arc::new(http.gateway);
    let notifier = Arc::new(http.notifier);
    let assist = Arc::new(http.assist);

    let escalation = Arc::new(EscalationEngine::new(
        db.clone(),
        notifier.clone(),
        gateway.clone(),
        config.sla.clone(),
    ));

    let (lane, lane_worker) = BackgroundLane::start(config.router.background_lane_depth);

    let collab = Collaborators {
        gateway,
        responder: Arc::new(http.responder),
        booking: Arc::new(http.booking),
        bridge: Arc::new(http.bridge),
        media: Arc::new(http.media),
        agent: Arc::new(http.agent),
        scorer: Arc::new(http.scorer),
        hours: Arc::new(http.hours),
        approval: assist.clone(),
        suggester: assist,
    };

    let router = Arc::new(InboundRouter::new(
        db.clone(),
        config.router.clone(),
        collab,
        escalation,
        lane,
    ));

    let cancel = CancellationToken::new();

    let sweeper = SlaSweeper::new(
        db,
        notifier,
        Duration::from_secs(config.sla.sweep_interval_secs),
    );
    let sweep_cancel = cancel.clone();
    let sweep_handle = tokio::spawn(async move {
        sweeper.run(sweep_cancel).await;
    });

    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            signal_cancel.cancel();
        }
    });

    let app = crate::webhook::app(router);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener =
        tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| LeadlineError::Config(format!("failed to bind webhook server to {addr}: {e}")))?;

    info!("webhook server listening on {addr}");

    let serve_cancel = cancel.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { serve_cancel.cancelled().await })
        .await
        .map_err(|e| LeadlineError::Internal(format!("webhook server error: {e}")))?;

    // The webhook router is the only BackgroundLane sender; once the server
    // stops and every in-flight handler returns, the lane drains and exits.
    cancel.cancel();
    if let Err(e) = sweep_handle.await {
        warn!(error = %e, "sla sweeper task panicked");
    }
    if let Err(e) = lane_worker.await {
        warn!(error = %e, "background lane worker panicked");
    }

    info!("leadline serve stopped");
    Ok(())
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("leadline={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
