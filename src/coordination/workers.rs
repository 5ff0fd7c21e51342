//! Bookkeeping for forked workers.
//!
//! # Responsibilities
//! - Remember which pid owns which partition
//! - Reap each worker exactly once (non-blocking while waiting for signals,
//!   blocking afterwards)
//! - Kill and reap any worker still alive when the set is dropped early

use nix::unistd::Pid;
use serde::Serialize;

use crate::error::Result;
use crate::sys::process::{self, Termination};
use crate::work::Partition;

/// A forked worker and, once reaped, how it ended.
#[derive(Debug, Clone)]
pub struct WorkerHandle {
    pub partition: Partition,
    pub pid: Pid,
    pub termination: Option<Termination>,
}

/// Serializable view of a reaped worker.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerRecord {
    pub index: usize,
    pub pid: i32,
    pub start: usize,
    pub end: usize,
    pub termination: Option<Termination>,
}

#[derive(Debug, Default)]
pub struct WorkerSet {
    workers: Vec<WorkerHandle>,
}

fn log_termination(handle: &WorkerHandle, termination: &Termination) {
    if termination.is_normal() {
        tracing::info!(
            pid = %handle.pid,
            worker = handle.partition.index,
            "Child process terminated normally"
        );
    } else {
        tracing::warn!(
            pid = %handle.pid,
            worker = handle.partition.index,
            termination = %termination,
            "Child process terminated abnormally"
        );
    }
}

impl WorkerSet {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            workers: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, partition: Partition, pid: Pid) {
        self.workers.push(WorkerHandle {
            partition,
            pid,
            termination: None,
        });
    }

    /// Worker that owns `pid`, if any.
    pub fn find(&self, pid: i32) -> Option<&WorkerHandle> {
        self.workers.iter().find(|w| w.pid.as_raw() == pid)
    }

    pub fn all_reaped(&self) -> bool {
        self.workers.iter().all(|w| w.termination.is_some())
    }

    /// Reap every worker that has already terminated. Returns how many were
    /// reaped by this call.
    pub fn reap_finished(&mut self) -> Result<usize> {
        let mut reaped = 0;
        for handle in self.workers.iter_mut().filter(|w| w.termination.is_none()) {
            if let Some(termination) = process::try_wait(handle.pid)? {
                log_termination(handle, &termination);
                handle.termination = Some(termination);
                reaped += 1;
            }
        }
        Ok(reaped)
    }

    /// Block until every remaining worker has terminated.
    pub fn reap_all(&mut self) -> Result<()> {
        for handle in self.workers.iter_mut().filter(|w| w.termination.is_none()) {
            let termination = process::wait_for(handle.pid)?;
            log_termination(handle, &termination);
            handle.termination = Some(termination);
        }
        Ok(())
    }

    pub fn records(&self) -> Vec<WorkerRecord> {
        self.workers
            .iter()
            .map(|w| WorkerRecord {
                index: w.partition.index,
                pid: w.pid.as_raw(),
                start: w.partition.start,
                end: w.partition.end,
                termination: w.termination,
            })
            .collect()
    }
}

impl Drop for WorkerSet {
    fn drop(&mut self) {
        for handle in self.workers.iter_mut().filter(|w| w.termination.is_none()) {
            tracing::warn!(pid = %handle.pid, worker = handle.partition.index, "Killing unreaped worker");
            let outcome = process::kill(handle.pid).and_then(|()| process::wait_for(handle.pid));
            match outcome {
                Ok(termination) => handle.termination = Some(termination),
                Err(e) => {
                    tracing::error!(pid = %handle.pid, error = %e, "Failed to reap worker");
                }
            }
        }
    }
}
