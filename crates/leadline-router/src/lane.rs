// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded fire-and-forget lane for off-path side tasks.
//!
//! Scoring, flow-suggestion checks, and contractor pings run here so they
//! can never block or fail the primary response path. Task errors are
//! logged and swallowed; a full queue drops the task with a warning rather
//! than applying backpressure to the webhook.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use leadline_core::LeadlineError;

type Task = (
    &'static str,
    Pin<Box<dyn Future<Output = Result<(), LeadlineError>> + Send>>,
);

/// Handle for dispatching background tasks.
#[derive(Clone)]
pub struct BackgroundLane {
    tx: mpsc::Sender<Task>,
}

impl BackgroundLane {
    /// Start the lane worker. The worker drains until every sender handle
    /// is dropped, so shutdown is dropping the lane.
    pub fn start(depth: usize) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<Task>(depth);
        let worker = tokio::spawn(async move {
            while let Some((label, task)) = rx.recv().await {
                if let Err(e) = task.await {
                    warn!(task = label, error = %e, "background task failed");
                } else {
                    debug!(task = label, "background task done");
                }
            }
        });
        (Self { tx }, worker)
    }

    /// Enqueue a task. Never blocks; a full lane drops the task.
    pub fn dispatch<F>(&self, label: &'static str, task: F)
    where
        F: Future<Output = Result<(), LeadlineError>> + Send + 'static,
    {
        if self.tx.try_send((label, Box::pin(task))).is_err() {
            warn!(task = label, "background lane full, task dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn tasks_run_and_errors_are_swallowed() {
        let (lane, worker) = BackgroundLane::start(8);
        let ran = Arc::new(AtomicUsize::new(0));

        let counter = ran.clone();
        lane.dispatch("ok", async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        lane.dispatch("boom", async {
            Err(LeadlineError::Internal("scripted".into()))
        });
        let counter = ran.clone();
        lane.dispatch("after-failure", async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        drop(lane);
        worker.await.unwrap();
        assert_eq!(ran.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn full_lane_drops_instead_of_blocking() {
        let (lane, worker) = BackgroundLane::start(1);
        // Park the worker on a task that waits for a signal, and wait until
        // the worker has actually picked it up.
        let (started_tx, started_rx) = tokio::sync::oneshot::channel::<()>();
        let (release, gate) = tokio::sync::oneshot::channel::<()>();
        lane.dispatch("parked", async move {
            let _ = started_tx.send(());
            let _ = gate.await;
            Ok(())
        });
        started_rx.await.unwrap();

        // Fill the single queue slot, then overflow it.
        lane.dispatch("queued", async { Ok(()) });
        lane.dispatch("dropped", async { panic!("must never run") });

        release.send(()).unwrap();
        drop(lane);
        worker.await.unwrap();
    }
}
