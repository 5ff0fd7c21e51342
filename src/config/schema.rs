//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a run.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Upper bound on cooperating processes (parent included).
pub const MAX_PROCESSES: usize = 256;

/// Root configuration for a summation run.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SumConfig {
    /// Array size and process count.
    pub computation: ComputationConfig,

    /// Completion signal selection.
    pub signal: SignalConfig,

    /// Wait loop tuning.
    pub coordination: CoordinationConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Size of the work and how it is split.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ComputationConfig {
    /// Total cooperating processes: 1 parent + (processes - 1) workers.
    pub processes: usize,

    /// Number of elements in the input array.
    pub array_len: usize,
}

impl Default for ComputationConfig {
    fn default() -> Self {
        Self {
            processes: 4,
            array_len: 4096,
        }
    }
}

impl ComputationConfig {
    /// Number of forked workers.
    pub fn workers(&self) -> usize {
        self.processes.saturating_sub(1)
    }
}

/// Which real-time signal carries partial sums.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SignalConfig {
    /// Offset from SIGRTMIN.
    pub rt_offset: u8,
}

/// Wait loop settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CoordinationConfig {
    /// Sleep between checks of the signal count.
    pub poll_interval_ms: u64,

    /// Grace period after every worker is reaped before missing signals
    /// are reported.
    pub settle_ms: u64,

    /// Overall deadline for the wait (0 = wait indefinitely).
    pub timeout_ms: u64,
}

impl Default for CoordinationConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 10,
            settle_ms: 250,
            timeout_ms: 30_000,
        }
    }
}

impl CoordinationConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default level when `RUST_LOG` is unset.
    pub log_level: String,

    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}
