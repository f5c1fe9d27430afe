//! The bridge scheduler: composes the poll cycle and the background task
//! set into one cooperative run.

use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::lifecycle::{Lifecycle, Phase};
use crate::metrics::{BridgeMetrics, MetricsSnapshot};
use crate::poll::run_poll_cycle;
use crate::queue::{self, WorkQueue, WorkSender};
use crate::task::{run_task_loop, BackgroundTask};
use crate::ui::UiSurface;
use crate::work::{Completion, WorkUnit};

/// Composes UI polling and background tasks into one cooperative run.
///
/// Construct it, register tasks, grab a [`BridgeHandle`] for callback
/// wiring, then call [`start`](Bridge::start). The run consumes the
/// bridge, so the task set is fixed once it begins.
pub struct Bridge {
    config: BridgeConfig,
    ui: Box<dyn UiSurface>,
    tasks: Vec<Box<dyn BackgroundTask>>,
    lifecycle: Arc<Lifecycle>,
    queue: WorkQueue,
    work_tx: WorkSender,
    metrics: Arc<BridgeMetrics>,
}

impl Bridge {
    pub fn new(ui: impl UiSurface + 'static, config: BridgeConfig) -> Self {
        let (work_tx, queue) = queue::channel();
        Self {
            config,
            ui: Box::new(ui),
            tasks: Vec::new(),
            lifecycle: Arc::new(Lifecycle::new()),
            queue,
            work_tx,
            metrics: Arc::new(BridgeMetrics::default()),
        }
    }

    /// Register a background task. Tasks run in registration order only
    /// in the sense of error reporting; their iterations interleave
    /// however the runtime schedules them.
    pub fn register_task(&mut self, task: Box<dyn BackgroundTask>) {
        info!(
            task = %task.name(),
            interval_ms = task.interval().as_millis() as u64,
            "registered background task"
        );
        self.tasks.push(task);
    }

    /// An explicit context for callback wiring and the cooperative units.
    pub fn handle(&self) -> BridgeHandle {
        BridgeHandle {
            lifecycle: self.lifecycle.clone(),
            work_tx: self.work_tx.clone(),
            metrics: self.metrics.clone(),
        }
    }

    /// Run the poll cycle and every registered task to completion.
    ///
    /// Resolves only when all of them have finished. If any unit fails
    /// (or panics), the failure requests a stop so the siblings wind down
    /// cooperatively, and the first failure in unit order (poll cycle,
    /// then registration order) is returned.
    pub async fn start(self) -> Result<(), BridgeError> {
        let Self {
            config,
            ui,
            tasks,
            lifecycle,
            queue,
            work_tx,
            metrics,
        } = self;

        info!(
            tasks = tasks.len(),
            poll_interval_ms = config.poll_interval_ms,
            "bridge starting"
        );

        let mut names = Vec::with_capacity(tasks.len() + 1);
        let mut units = Vec::with_capacity(tasks.len() + 1);

        names.push("poll cycle".to_string());
        units.push(spawn_unit(
            "poll cycle".to_string(),
            lifecycle.clone(),
            run_poll_cycle(
                ui,
                queue,
                lifecycle.watcher(),
                config.clone(),
                metrics.clone(),
            ),
        ));

        for task in tasks {
            let name = task.name().to_string();
            let handle = BridgeHandle {
                lifecycle: lifecycle.clone(),
                work_tx: work_tx.clone(),
                metrics: metrics.clone(),
            };
            names.push(name.clone());
            units.push(spawn_unit(
                name,
                lifecycle.clone(),
                run_task_loop(task, handle, lifecycle.watcher(), metrics.clone()),
            ));
        }

        // The bridge's own sender is no longer needed; user handles keep
        // their clones alive for as long as they want to enqueue.
        drop(work_tx);

        let outcomes = join_all(units).await;
        lifecycle.mark_stopped();

        let mut first_error = None;
        for (name, joined) in names.into_iter().zip(outcomes) {
            let result = joined.unwrap_or_else(|_| Err(BridgeError::UnitPanic { name }));
            if let Err(e) = result {
                first_error.get_or_insert(e);
            }
        }

        let snapshot = metrics.snapshot();
        match first_error {
            Some(e) => {
                warn!(error = %e, "bridge stopped with failure");
                Err(e)
            }
            None => {
                info!(
                    poll_iterations = snapshot.poll_iterations,
                    work_completed = snapshot.work_completed,
                    task_ticks = snapshot.task_ticks,
                    "bridge stopped"
                );
                Ok(())
            }
        }
    }
}

/// Spawn one cooperative unit plus a monitor that converts a panic into
/// a [`BridgeError::UnitPanic`] and requests a stop on any failure, so a
/// broken unit can never leave its siblings running forever.
fn spawn_unit<F>(
    name: String,
    lifecycle: Arc<Lifecycle>,
    unit: F,
) -> JoinHandle<Result<(), BridgeError>>
where
    F: Future<Output = Result<(), BridgeError>> + Send + 'static,
{
    let inner = tokio::spawn(unit);
    tokio::spawn(async move {
        let result = inner
            .await
            .unwrap_or_else(|_| Err(BridgeError::UnitPanic { name: name.clone() }));
        if let Err(ref e) = result {
            error!(unit = %name, error = %e, "cooperative unit failed, winding down siblings");
            lifecycle.request_stop();
        }
        result
    })
}

/// Cloneable context passed to every cooperative unit and handed to UI
/// callback wiring. This is the only way into a running bridge.
#[derive(Debug, Clone)]
pub struct BridgeHandle {
    lifecycle: Arc<Lifecycle>,
    work_tx: WorkSender,
    metrics: Arc<BridgeMetrics>,
}

impl BridgeHandle {
    /// Append a deferred work unit to the queue. Non-blocking and safe to
    /// call from synchronous code, including callbacks fired inside a UI
    /// refresh. The work is not awaited here; the poll cycle drains one
    /// unit per iteration, FIFO.
    ///
    /// The returned [`Completion`] may be awaited for the outcome or just
    /// dropped for fire-and-forget semantics. Once the run is stopping or
    /// stopped the unit is absorbed and resolves as
    /// [`WorkOutcome::Abandoned`](crate::WorkOutcome::Abandoned).
    pub fn enqueue<F>(&self, label: impl Into<String>, work: F) -> Completion
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let label = label.into();
        let (unit, completion) = WorkUnit::new(label.clone(), Box::pin(work));

        if self.lifecycle.phase() != Phase::Running {
            warn!(work = %label, "work enqueued after stop, abandoning");
            self.metrics.record_work_abandoned(1);
            unit.abandon();
            return completion;
        }

        match self.work_tx.push(unit) {
            Ok(()) => debug!(work = %label, "work unit enqueued"),
            Err(rejected) => {
                warn!(work = %label, "work queue closed, abandoning unit");
                self.metrics.record_work_abandoned(1);
                rejected.abandon();
            }
        }
        completion
    }

    /// Request a cooperative stop. Idempotent; does not interrupt an
    /// in-flight refresh or awaited work unit, so termination latency is
    /// bounded by the current iteration plus one poll interval.
    pub fn request_stop(&self) {
        if self.lifecycle.request_stop() {
            info!("stop requested");
        }
    }

    pub fn phase(&self) -> Phase {
        self.lifecycle.phase()
    }

    pub fn is_running(&self) -> bool {
        self.phase() == Phase::Running
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
