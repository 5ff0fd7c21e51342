//! Completion signal handler.
//!
//! # Responsibilities
//! - Own the installation of the `SA_SIGINFO` callback
//! - Route each queued payload into the process-wide [`Tally`]
//! - Restore the previous disposition when dropped
//!
//! # Design Decisions
//! - The callback touches atomics only: no I/O, no allocation, no locks
//! - Diagnostics are deferred; the controller reads the receipt log
//! - Signals not produced by `sigqueue` are counted as stray and ignored

use libc::{c_int, c_void, siginfo_t};

use crate::aggregate::tally::Tally;
use crate::error::Result;
use crate::sys::signal::{self, Disposition};

static TALLY: Tally = Tally::new();

/// The parent's aggregate state.
pub fn tally() -> &'static Tally {
    &TALLY
}

extern "C" fn on_completion(_signo: c_int, info: *mut siginfo_t, _context: *mut c_void) {
    // SAFETY: the kernel passes a valid siginfo_t to SA_SIGINFO handlers.
    match unsafe { signal::queued_payload(info) } {
        Some((sender, payload)) => TALLY.record(sender, payload as i64),
        None => TALLY.record_stray(),
    }
}

/// An installed completion handler. Dropping it reinstates whatever
/// disposition the signal had before.
pub struct CompletionHandler {
    signo: c_int,
    previous: Option<Disposition>,
}

impl CompletionHandler {
    /// Install the handler for `signo`.
    pub fn install(signo: c_int) -> Result<Self> {
        let previous = signal::install_info_handler(signo, on_completion)?;
        tracing::debug!(signo, "Completion handler installed");
        Ok(Self {
            signo,
            previous: Some(previous),
        })
    }

    pub fn signo(&self) -> c_int {
        self.signo
    }

    pub fn tally(&self) -> &'static Tally {
        &TALLY
    }

    /// Restore the previous disposition, reporting failure.
    pub fn uninstall(mut self) -> Result<()> {
        self.restore()
    }

    fn restore(&mut self) -> Result<()> {
        match self.previous.take() {
            Some(previous) => signal::restore(self.signo, &previous),
            None => Ok(()),
        }
    }
}

impl Drop for CompletionHandler {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            tracing::error!(signo = self.signo, error = %e, "Failed to restore signal disposition");
        }
    }
}
