//! Background tasks: fixed, independently timed cooperative loops.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::bridge::BridgeHandle;
use crate::error::BridgeError;
use crate::lifecycle::LifecycleWatcher;
use crate::metrics::BridgeMetrics;

/// One long-lived cooperative loop, registered on the bridge before the
/// run starts.
///
/// The bridge drives every task with the same shape: check the lifecycle
/// at the top, run one `tick`, sleep `interval()`, repeat. Nothing orders
/// one task's iterations relative to another's; implementations must not
/// depend on any particular interleaving.
#[async_trait]
pub trait BackgroundTask: Send {
    /// Name used in logs and error reports.
    fn name(&self) -> &str;

    /// Sleep interval between ticks.
    fn interval(&self) -> Duration;

    /// One unit of domain work. An error ends the whole run (after the
    /// sibling units have wound down cooperatively).
    async fn tick(&mut self, handle: &BridgeHandle) -> anyhow::Result<()>;
}

/// The shared check-tick-sleep loop around a registered task.
pub(crate) async fn run_task_loop(
    mut task: Box<dyn BackgroundTask>,
    handle: BridgeHandle,
    mut lifecycle: LifecycleWatcher,
    metrics: Arc<BridgeMetrics>,
) -> Result<(), BridgeError> {
    let name = task.name().to_string();
    let interval = task.interval();
    debug!(task = %name, interval_ms = interval.as_millis() as u64, "background task started");

    while lifecycle.is_running() {
        if let Err(source) = task.tick(&handle).await {
            return Err(BridgeError::Task { name, source });
        }
        metrics.record_task_tick();

        // Race the sleep against a stop so the task exits promptly
        // instead of a full interval late.
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = lifecycle.stop_requested() => {}
        }
    }

    debug!(task = %name, "background task stopped");
    Ok(())
}
