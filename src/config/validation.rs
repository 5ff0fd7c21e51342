//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (process count, poll interval, signal offset)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SumConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use tracing::Level;

use crate::config::schema::{SumConfig, MAX_PROCESSES};
use crate::sys::signal;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("computation.processes must be at least 1")]
    NoProcesses,

    #[error("computation.processes = {0} exceeds the maximum of {MAX_PROCESSES}")]
    TooManyProcesses(usize),

    #[error("coordination.poll_interval_ms must be greater than 0")]
    ZeroPollInterval,

    #[error("signal.rt_offset = {offset} exceeds SIGRTMAX - SIGRTMIN = {max}")]
    SignalOffset { offset: u8, max: i32 },

    #[error("observability.log_level '{0}' is not a known level")]
    LogLevel(String),
}

/// Check a configuration, collecting every violation.
pub fn validate_config(config: &SumConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let processes = config.computation.processes;
    if processes == 0 {
        errors.push(ValidationError::NoProcesses);
    } else if processes > MAX_PROCESSES {
        errors.push(ValidationError::TooManyProcesses(processes));
    }

    if config.coordination.poll_interval_ms == 0 {
        errors.push(ValidationError::ZeroPollInterval);
    }

    let max = signal::max_rt_offset();
    if i32::from(config.signal.rt_offset) > max {
        errors.push(ValidationError::SignalOffset {
            offset: config.signal.rt_offset,
            max,
        });
    }

    if config.observability.log_level.parse::<Level>().is_err() {
        errors.push(ValidationError::LogLevel(config.observability.log_level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
