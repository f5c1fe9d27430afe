//! Tagged run lifecycle shared by every cooperative unit.
//!
//! The bridge owns a [`Lifecycle`] (the single writer); each cooperative
//! unit holds a [`LifecycleWatcher`] and checks the phase at the top of its
//! loop. Watchers can also await a phase change mid-sleep, so a stop
//! request interrupts a wait instead of being observed a full interval
//! late.

use tokio::sync::watch;

/// Where a bridge run is in its life.
///
/// Phases only ever advance: `Running` to `Stopping` to `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// All cooperative units are (or may still be) iterating.
    Running,
    /// A stop was requested; units exit at their next phase check.
    Stopping,
    /// Every unit has completed and `start()` has resolved.
    Stopped,
}

/// The writer side of the lifecycle. Owned by the bridge, shared with
/// handles behind an `Arc`.
#[derive(Debug)]
pub(crate) struct Lifecycle {
    tx: watch::Sender<Phase>,
}

impl Lifecycle {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(Phase::Running);
        Self { tx }
    }

    pub(crate) fn phase(&self) -> Phase {
        *self.tx.borrow()
    }

    /// Advance `Running` to `Stopping`. Returns `true` only on the first
    /// call that actually makes the edge, so callers can log exactly once.
    pub(crate) fn request_stop(&self) -> bool {
        self.tx.send_if_modified(|phase| {
            if *phase == Phase::Running {
                *phase = Phase::Stopping;
                true
            } else {
                false
            }
        })
    }

    /// Mark the run finished. Idempotent; never regresses a later phase.
    pub(crate) fn mark_stopped(&self) {
        self.tx.send_if_modified(|phase| {
            if *phase == Phase::Stopped {
                false
            } else {
                *phase = Phase::Stopped;
                true
            }
        });
    }

    pub(crate) fn watcher(&self) -> LifecycleWatcher {
        LifecycleWatcher {
            rx: self.tx.subscribe(),
        }
    }
}

/// Read side of the lifecycle, cloned into every cooperative unit.
#[derive(Debug, Clone)]
pub(crate) struct LifecycleWatcher {
    rx: watch::Receiver<Phase>,
}

impl LifecycleWatcher {
    pub(crate) fn phase(&self) -> Phase {
        *self.rx.borrow()
    }

    pub(crate) fn is_running(&self) -> bool {
        self.phase() == Phase::Running
    }

    /// Resolve once the phase has left `Running`. Used to race against
    /// interval sleeps. A closed channel counts as stopped.
    pub(crate) async fn stop_requested(&mut self) {
        loop {
            if *self.rx.borrow_and_update() != Phase::Running {
                return;
            }
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}
