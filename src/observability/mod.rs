//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! controller, workers, handler guard
//!     → logging.rs (structured log events on stderr)
//! signal handler
//!     → tally receipts (no logging in signal context)
//!     → controller logs them from the wait loop
//! ```

pub mod logging;
