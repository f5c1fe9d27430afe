//! The deferred work queue: multi-producer, drained only by the poll
//! cycle, at most one unit per iteration.

use tokio::sync::mpsc;

use crate::work::WorkUnit;

pub(crate) fn channel() -> (WorkSender, WorkQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (WorkSender { tx }, WorkQueue { rx })
}

/// Producer side. Cloned into every [`BridgeHandle`](crate::BridgeHandle),
/// so synchronous UI callbacks can append mid-refresh without blocking.
#[derive(Debug, Clone)]
pub(crate) struct WorkSender {
    tx: mpsc::UnboundedSender<WorkUnit>,
}

impl WorkSender {
    /// Append a unit. Returns the unit back if the queue has been torn
    /// down so the caller can resolve its completion signal.
    pub(crate) fn push(&self, unit: WorkUnit) -> Result<(), WorkUnit> {
        self.tx.send(unit).map_err(|rejected| rejected.0)
    }
}

/// Consumer side, owned by the poll cycle.
#[derive(Debug)]
pub(crate) struct WorkQueue {
    rx: mpsc::UnboundedReceiver<WorkUnit>,
}

impl WorkQueue {
    /// Pop the earliest unit if one is queued. Never waits.
    pub(crate) fn try_next(&mut self) -> Option<WorkUnit> {
        self.rx.try_recv().ok()
    }

    pub(crate) fn len(&self) -> usize {
        self.rx.len()
    }

    /// Close the queue and resolve every remaining unit as abandoned.
    /// Returns how many were dropped.
    pub(crate) fn drain_abandoned(&mut self) -> usize {
        self.rx.close();
        let mut dropped = 0;
        while let Ok(unit) = self.rx.try_recv() {
            unit.abandon();
            dropped += 1;
        }
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::work::WorkOutcome;

    fn unit(label: &str) -> (WorkUnit, crate::work::Completion) {
        WorkUnit::new(label.into(), Box::pin(async { Ok(()) }))
    }

    #[tokio::test]
    async fn pops_in_fifo_order() {
        let (tx, mut rx) = channel();
        for label in ["a", "b", "c"] {
            tx.push(unit(label).0).unwrap();
        }
        assert_eq!(rx.try_next().unwrap().label(), "a");
        assert_eq!(rx.try_next().unwrap().label(), "b");
        assert_eq!(rx.try_next().unwrap().label(), "c");
        assert!(rx.try_next().is_none());
    }

    #[tokio::test]
    async fn empty_queue_pops_none() {
        let (_tx, mut rx) = channel();
        assert!(rx.try_next().is_none());
    }

    #[tokio::test]
    async fn drain_abandons_pending_units() {
        let (tx, mut rx) = channel();
        let (first, c1) = unit("one");
        let (second, c2) = unit("two");
        tx.push(first).unwrap();
        tx.push(second).unwrap();

        assert_eq!(rx.drain_abandoned(), 2);
        assert_eq!(c1.wait().await, WorkOutcome::Abandoned);
        assert_eq!(c2.wait().await, WorkOutcome::Abandoned);
    }

    #[tokio::test]
    async fn push_after_close_returns_the_unit() {
        let (tx, mut rx) = channel();
        rx.drain_abandoned();
        let (rejected, completion) = unit("late");
        let rejected = tx.push(rejected).unwrap_err();
        rejected.abandon();
        assert_eq!(completion.wait().await, WorkOutcome::Abandoned);
    }
}
