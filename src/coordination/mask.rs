//! Blocking window for the completion signal around fork.

use libc::{c_int, sigset_t};

use crate::error::Result;
use crate::sys::signal;

/// Keeps the completion signal blocked until released.
///
/// Signals sent while blocked stay queued. [`SignalBlock::release`]
/// unblocks explicitly; dropping without release (an early error) puts the
/// whole mask back as it was.
pub struct SignalBlock {
    signo: c_int,
    set: sigset_t,
    previous: sigset_t,
    engaged: bool,
}

impl SignalBlock {
    pub fn engage(signo: c_int) -> Result<Self> {
        let set = signal::signal_set(signo)?;
        let previous = signal::block(&set)?;
        tracing::debug!(signo, "Completion signal blocked");
        Ok(Self {
            signo,
            set,
            previous,
            engaged: true,
        })
    }

    /// Unblock the signal so queued instances are delivered.
    pub fn release(mut self) -> Result<()> {
        self.engaged = false;
        signal::unblock(&self.set)?;
        tracing::debug!(signo = self.signo, "Completion signal unblocked");
        Ok(())
    }
}

impl Drop for SignalBlock {
    fn drop(&mut self) {
        if !self.engaged {
            return;
        }
        if let Err(e) = signal::set_mask(&self.previous) {
            tracing::error!(signo = self.signo, error = %e, "Failed to restore signal mask");
        }
    }
}
