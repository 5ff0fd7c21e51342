//! Shared aggregate state and the signal handler that writes it.
//!
//! # Data Flow
//! ```text
//! worker: sigqueue(parent, SIGRTMIN+k, partial_sum)
//!     → kernel queues one instance per send
//!     → handler.rs (on_completion, signal context)
//!     → tally.rs (atomic add + count + receipt)
//!     → controller polls received() / total()
//! ```
//!
//! # Design Decisions
//! - The tally is a `static`: each forked child gets its own copy and
//!   never writes the parent's
//! - The handler is the only writer while a run is active

pub mod handler;
pub mod tally;

pub use handler::CompletionHandler;
pub use tally::{Receipt, Tally};
