//! The poll cycle: refresh the UI surface, sleep, drain at most one
//! deferred work unit, repeat until the lifecycle leaves `Running`.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::lifecycle::LifecycleWatcher;
use crate::metrics::BridgeMetrics;
use crate::queue::WorkQueue;
use crate::ui::UiSurface;

pub(crate) async fn run_poll_cycle(
    mut ui: Box<dyn UiSurface>,
    mut queue: WorkQueue,
    mut lifecycle: LifecycleWatcher,
    config: BridgeConfig,
    metrics: Arc<BridgeMetrics>,
) -> Result<(), BridgeError> {
    debug!(
        interval_ms = config.poll_interval_ms,
        "poll cycle started"
    );

    let result = loop {
        // The only exit check: an in-progress refresh or awaited work
        // unit is never interrupted.
        if !lifecycle.is_running() {
            break Ok(());
        }

        // 1. Pump the UI. Callbacks fired in here may enqueue new work.
        if let Err(source) = ui.refresh() {
            break Err(BridgeError::Ui { source });
        }

        // 2. Yield for the poll interval, cutting the wait short if a
        // stop arrives mid-sleep.
        tokio::select! {
            _ = tokio::time::sleep(config.poll_interval()) => {}
            _ = lifecycle.stop_requested() => {}
        }

        // 3. Drain at most one unit, FIFO. Anything else queued waits
        // for later iterations.
        if let Some(unit) = queue.try_next() {
            debug!(work = %unit.label(), pending = queue.len(), "running deferred work unit");
            match unit.run(config.stall_warn_after()).await {
                Ok(()) => metrics.record_work_completed(),
                Err(e) => {
                    metrics.record_work_failed();
                    break Err(e);
                }
            }
        }

        metrics.record_poll_iteration();
    };

    let dropped = queue.drain_abandoned();
    if dropped > 0 {
        metrics.record_work_abandoned(dropped as u64);
        warn!(count = dropped, "abandoning queued work units at shutdown");
    }

    debug!("poll cycle stopped");
    result
}
