//! Counters recorded across a bridge run.

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters shared between the cooperative units. Read through
/// [`BridgeHandle::metrics`](crate::BridgeHandle::metrics).
#[derive(Debug, Default)]
pub struct BridgeMetrics {
    poll_iterations: AtomicU64,
    work_completed: AtomicU64,
    work_failed: AtomicU64,
    work_abandoned: AtomicU64,
    task_ticks: AtomicU64,
}

impl BridgeMetrics {
    pub(crate) fn record_poll_iteration(&self) {
        self.poll_iterations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_work_completed(&self) {
        self.work_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_work_failed(&self) {
        self.work_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_work_abandoned(&self, count: u64) {
        self.work_abandoned.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn record_task_tick(&self) {
        self.task_ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            poll_iterations: self.poll_iterations.load(Ordering::Relaxed),
            work_completed: self.work_completed.load(Ordering::Relaxed),
            work_failed: self.work_failed.load(Ordering::Relaxed),
            work_abandoned: self.work_abandoned.load(Ordering::Relaxed),
            task_ticks: self.task_ticks.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub poll_iterations: u64,
    pub work_completed: u64,
    pub work_failed: u64,
    pub work_abandoned: u64,
    pub task_ticks: u64,
}
