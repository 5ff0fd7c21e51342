//! Work distribution.
//!
//! # Data Flow
//! ```text
//! input.rs (array [1..=N])
//!     → partition.rs (range per process index)
//!     → worker.rs (child: sum range, sigqueue to parent, _exit)
//!     → controller (parent: sum its own range)
//! ```

pub mod input;
pub mod partition;
pub mod worker;

pub use partition::Partition;
