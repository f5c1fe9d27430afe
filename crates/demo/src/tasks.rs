//! Sample background tasks for the demo run.

use std::time::Duration;

use async_trait::async_trait;
use fenster_bridge::{BackgroundTask, BridgeHandle};
use tracing::info;

/// Counts up once per interval; a metronome for watching the bridge
/// interleave polling, deferred jobs, and background work.
pub struct CounterTask {
    count: u64,
    interval: Duration,
}

impl CounterTask {
    pub fn new(interval: Duration) -> Self {
        Self { count: 0, interval }
    }
}

#[async_trait]
impl BackgroundTask for CounterTask {
    fn name(&self) -> &str {
        "counter"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn tick(&mut self, _handle: &BridgeHandle) -> anyhow::Result<()> {
        self.count += 1;
        info!(count = self.count, "counter tick");
        Ok(())
    }
}
