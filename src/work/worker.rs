//! Body of a forked worker process.
//!
//! # Responsibilities
//! - Sum the worker's partition of the inherited array copy
//! - Queue exactly one completion signal to the parent
//! - Exit immediately (status 0, or 1 if the signal could not be queued)
//!
//! # Design Decisions
//! - Never returns into the caller's stack; the parent's guards and
//!   destructors must not run in the child
//! - Never touches the aggregate tally (its copy is discarded on exit)
//! - Never logs: the parent may be multi-threaded, so the child sticks to
//!   async-signal-safe calls

use libc::c_int;
use nix::unistd::Pid;

use crate::error::{Result, SumError};
use crate::sys::{process, signal};
use crate::work::partition::Partition;

/// Convert a partial sum into the pointer-sized `sigval` payload.
pub fn encode_payload(sum: i64) -> Result<isize> {
    isize::try_from(sum).map_err(|_| SumError::PayloadOverflow { sum })
}

/// Compute the partition's sum and queue it to `parent`.
///
/// Async-signal-safe: no allocation, no locks.
pub fn report(partition: &Partition, data: &[i64], parent: Pid, signo: c_int) -> Result<i64> {
    let sum = partition.sum(data);
    let payload = encode_payload(sum)?;
    signal::queue(parent, signo, payload)?;
    Ok(sum)
}

/// Entry point of a worker after fork. Never returns.
///
/// Only async-signal-safe work happens here: no logging, no allocation.
/// The parent logs the partition when it forks, and it reports a worker
/// that could not queue its signal (exit status 1) when reaping it.
pub fn run(partition: &Partition, data: &[i64], parent: Pid, signo: c_int) -> ! {
    match report(partition, data, parent, signo) {
        Ok(_) => process::exit_now(0),
        Err(_) => process::exit_now(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_payload() {
        assert_eq!(encode_payload(8_390_656).unwrap(), 8_390_656);
        assert_eq!(encode_payload(-5).unwrap(), -5);
    }

    #[cfg(target_pointer_width = "32")]
    #[test]
    fn test_encode_payload_overflow() {
        assert!(matches!(
            encode_payload(i64::MAX),
            Err(SumError::PayloadOverflow { .. })
        ));
    }
}
