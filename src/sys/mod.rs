//! Checked system primitives.
//!
//! # Responsibilities
//! - Wrap fork, waitpid, kill and the signal calls
//! - Turn every OS failure into `SumError::Sys` naming the operation
//!
//! # Design Decisions
//! - No retries; the only restarted call is a wait interrupted by `EINTR`
//! - Process calls go through `nix`, real-time signal calls through `libc`
//!   (nix's `Signal` enum does not cover SIGRTMIN..SIGRTMAX)

pub mod process;
pub mod signal;
