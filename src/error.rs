//! Error definitions shared by every subsystem.

use nix::errno::Errno;
use thiserror::Error;

use crate::config::loader::ConfigError;

/// Errors that can abort a summation run.
#[derive(Debug, Error)]
pub enum SumError {
    /// A checked system primitive returned a failure indicator.
    #[error("{op} error: {source}")]
    Sys {
        op: &'static str,
        #[source]
        source: Errno,
    },

    /// A partial sum does not fit the pointer-sized signal payload.
    #[error("partial sum {sum} does not fit in a signal payload")]
    PayloadOverflow { sum: i64 },

    /// The absolute values of the input do not sum within `i64`, so a
    /// partial or final sum could overflow.
    #[error("input of {len} elements can overflow a 64-bit sum")]
    InputOverflow { len: usize },

    /// The requested real-time signal lies past SIGRTMAX.
    #[error("SIGRTMIN+{offset} is out of range (max offset {max})")]
    SignalOutOfRange { offset: u8, max: i32 },

    /// Another run already owns the completion signal in this process.
    #[error("a coordination run is already active in this process")]
    AlreadyRunning,

    /// Every worker terminated but fewer completion signals arrived.
    #[error("all workers terminated but only {received} of {expected} completion signals arrived")]
    MissingSignals { expected: usize, received: usize },

    /// The wait for completion signals exceeded its deadline.
    #[error("received {received} of {expected} completion signals within {waited_ms} ms")]
    Timeout {
        expected: usize,
        received: usize,
        waited_ms: u64,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SumError {
    /// Wrap an errno returned by the named primitive.
    pub fn sys(op: &'static str, source: Errno) -> Self {
        Self::Sys { op, source }
    }
}

pub type Result<T, E = SumError> = std::result::Result<T, E>;
