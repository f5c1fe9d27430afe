use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// Configuration for a [`Bridge`](crate::Bridge) run.
///
/// Parsed from a TOML file with per-field defaults, so a partial (or empty)
/// file is valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Milliseconds the poll cycle sleeps between iterations.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Seconds a deferred work unit may run before the poll cycle starts
    /// logging stall warnings. The unit is never timed out, only flagged.
    #[serde(default = "default_stall_warn_secs")]
    pub stall_warn_secs: u64,
}

fn default_poll_interval_ms() -> u64 {
    50
}

fn default_stall_warn_secs() -> u64 {
    30
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            stall_warn_secs: default_stall_warn_secs(),
        }
    }
}

impl BridgeConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BridgeError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Sleep interval between poll cycle iterations.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// How long an awaited work unit may run before stall warnings.
    pub fn stall_warn_after(&self) -> Duration {
        Duration::from_secs(self.stall_warn_secs)
    }
}
