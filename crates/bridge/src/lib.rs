//! fenster-bridge — an event-loop bridge between a synchronous,
//! poll-driven UI surface and tokio's cooperative task model.
//!
//! The [`Bridge`] runs one poll cycle that refreshes the UI surface on a
//! fixed cadence and drains at most one deferred work unit per iteration,
//! alongside a fixed set of long-lived [`BackgroundTask`]s. Everything is
//! joined into a single `start()` call that resolves when every unit has
//! wound down.

pub mod bridge;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod metrics;
pub mod task;
pub mod ui;
pub mod work;

mod poll;
mod queue;

pub use bridge::{Bridge, BridgeHandle};
pub use config::BridgeConfig;
pub use error::BridgeError;
pub use lifecycle::Phase;
pub use metrics::MetricsSnapshot;
pub use task::BackgroundTask;
pub use ui::UiSurface;
pub use work::{Completion, WorkOutcome};
