//! Deferred work units and their completion signals.

use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

use tokio::sync::oneshot;
use tracing::warn;

use crate::error::BridgeError;

pub(crate) type WorkFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

/// How a deferred work unit ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkOutcome {
    /// The unit ran to completion.
    Completed,
    /// The unit returned an error (also propagated out of `start()`).
    Failed(String),
    /// The unit was never run: still queued at shutdown, or enqueued
    /// after the run had ended.
    Abandoned,
}

/// One labelled, fire-and-forget unit of deferred work.
///
/// Created by [`BridgeHandle::enqueue`](crate::BridgeHandle::enqueue) and
/// destroyed once the poll cycle has awaited it. No result value flows
/// back to the enqueuer beyond the [`Completion`] signal.
pub struct WorkUnit {
    label: String,
    fut: WorkFuture,
    done: oneshot::Sender<WorkOutcome>,
}

impl WorkUnit {
    pub(crate) fn new(label: String, fut: WorkFuture) -> (Self, Completion) {
        let (done, rx) = oneshot::channel();
        (Self { label, fut, done }, Completion { rx })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Await the unit to completion, logging a stall warning every
    /// `stall_warn` while it runs. The unit is never cancelled here; a
    /// stuck future stalls its caller, and the warnings are the flag.
    pub(crate) async fn run(self, stall_warn: Duration) -> Result<(), BridgeError> {
        let Self {
            label,
            mut fut,
            done,
        } = self;
        let started = Instant::now();

        let result = loop {
            tokio::select! {
                result = &mut fut => break result,
                _ = tokio::time::sleep(stall_warn) => {
                    warn!(
                        work = %label,
                        elapsed_secs = started.elapsed().as_secs(),
                        "deferred work unit still running"
                    );
                }
            }
        };

        match result {
            Ok(()) => {
                let _ = done.send(WorkOutcome::Completed);
                Ok(())
            }
            Err(source) => {
                let _ = done.send(WorkOutcome::Failed(format!("{source:#}")));
                Err(BridgeError::WorkUnit { label, source })
            }
        }
    }

    /// Resolve the completion signal without running the unit.
    pub(crate) fn abandon(self) {
        let _ = self.done.send(WorkOutcome::Abandoned);
    }
}

impl std::fmt::Debug for WorkUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkUnit").field("label", &self.label).finish()
    }
}

/// Awaitable completion signal for an enqueued work unit.
///
/// Dropping it keeps the unit fire-and-forget; awaiting it reports the
/// [`WorkOutcome`]. A unit that disappears without resolving (e.g. its
/// queue was torn down mid-flight) reads as `Abandoned`.
#[derive(Debug)]
pub struct Completion {
    rx: oneshot::Receiver<WorkOutcome>,
}

impl Completion {
    pub async fn wait(self) -> WorkOutcome {
        self.rx.await.unwrap_or(WorkOutcome::Abandoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_STALL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn successful_unit_signals_completed() {
        let (unit, completion) = WorkUnit::new("ok".into(), Box::pin(async { Ok(()) }));
        unit.run(NO_STALL).await.unwrap();
        assert_eq!(completion.wait().await, WorkOutcome::Completed);
    }

    #[tokio::test]
    async fn failing_unit_signals_failed_and_errors() {
        let (unit, completion) = WorkUnit::new(
            "boom".into(),
            Box::pin(async { Err(anyhow::anyhow!("backend unavailable")) }),
        );

        let err = unit.run(NO_STALL).await.unwrap_err();
        match err {
            BridgeError::WorkUnit { label, .. } => assert_eq!(label, "boom"),
            other => panic!("unexpected error: {other}"),
        }

        match completion.wait().await {
            WorkOutcome::Failed(message) => assert!(message.contains("backend unavailable")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn abandoned_unit_signals_abandoned() {
        let (unit, completion) = WorkUnit::new("never".into(), Box::pin(async { Ok(()) }));
        unit.abandon();
        assert_eq!(completion.wait().await, WorkOutcome::Abandoned);
    }

    #[tokio::test]
    async fn dropped_unit_reads_as_abandoned() {
        let (unit, completion) = WorkUnit::new("dropped".into(), Box::pin(async { Ok(()) }));
        drop(unit);
        assert_eq!(completion.wait().await, WorkOutcome::Abandoned);
    }
}
