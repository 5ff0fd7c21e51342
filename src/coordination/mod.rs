//! Coordination controller.
//!
//! # Data Flow
//! ```text
//! install handler → block signal → fork P-1 workers → unblock
//!     → poll tally until P-1 signals (reaping finished workers)
//!     → reap the rest → add parent partition → Report
//! ```
//!
//! # Design Decisions
//! - Fail fast: any primitive failure aborts the run
//! - Bounded wait: a worker that dies without signalling surfaces as
//!   `MissingSignals`, a stuck one as `Timeout`
//! - Early exits kill and reap outstanding workers and restore the signal
//!   disposition and mask (RAII guards)
//! - One active run per process; the tally is process-global

pub mod controller;
pub mod mask;
pub mod workers;

pub use controller::{Controller, Report};
