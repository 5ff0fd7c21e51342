//! Parent-side orchestration of a summation run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

use serde::Serialize;

use crate::aggregate::handler::{self, CompletionHandler};
use crate::aggregate::tally::{Tally, RECEIPT_CAPACITY};
use crate::config::validation::validate_config;
use crate::config::{ConfigError, CoordinationConfig, SumConfig};
use crate::coordination::mask::SignalBlock;
use crate::coordination::workers::{WorkerRecord, WorkerSet};
use crate::error::{Result, SumError};
use crate::sys::process::{self, Forked};
use crate::sys::signal;
use crate::work::partition::fits_i64;
use crate::work::{input, worker, Partition};

static ACTIVE: AtomicBool = AtomicBool::new(false);

/// Marks the process-wide tally as owned by one run.
struct RunGuard;

impl RunGuard {
    fn acquire() -> Result<Self> {
        ACTIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| RunGuard)
            .map_err(|_| SumError::AlreadyRunning)
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        ACTIVE.store(false, Ordering::Release);
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Aggregated sum: every worker's payload plus the parent's partition.
    pub total: i64,
    /// Closed form for the default input, sequential sum otherwise.
    pub expected_total: i64,
    pub processes: usize,
    pub array_len: usize,
    pub signals_received: usize,
    pub stray_signals: usize,
    pub parent: Partition,
    pub parent_sum: i64,
    pub workers: Vec<WorkerRecord>,
}

impl Report {
    pub fn is_consistent(&self) -> bool {
        self.total == self.expected_total
    }
}

/// Runs the fork / signal / reap sequence over one input array.
pub struct Controller {
    processes: usize,
    rt_offset: u8,
    coordination: CoordinationConfig,
    data: Vec<i64>,
    expected_total: i64,
}

impl Controller {
    /// Controller over `[1..=array_len]`.
    pub fn new(config: &SumConfig) -> Result<Self> {
        let len = config.computation.array_len;
        let mut controller = Self::with_data(config, input::initialize(len))?;
        controller.expected_total = input::expected_sum(len);
        Ok(controller)
    }

    /// Controller over caller-supplied data; `computation.array_len` is
    /// ignored.
    ///
    /// Rejects data whose absolute values do not sum within `i64`, so no
    /// partial sum, payload or total can overflow.
    pub fn with_data(config: &SumConfig, data: Vec<i64>) -> Result<Self> {
        validate_config(config).map_err(ConfigError::from)?;
        if !fits_i64(&data) {
            return Err(SumError::InputOverflow { len: data.len() });
        }
        Ok(Self {
            processes: config.computation.processes,
            rt_offset: config.signal.rt_offset,
            coordination: config.coordination.clone(),
            expected_total: data.iter().sum(),
            data,
        })
    }

    /// Fork the workers, aggregate their completion signals, reap them and
    /// add the parent's own partition.
    pub fn run(&self) -> Result<Report> {
        let _active = RunGuard::acquire()?;

        let len = self.data.len();
        let expected = self.processes - 1;
        let signo = signal::realtime(self.rt_offset)?;
        let parent = process::current_pid();

        let tally = handler::tally();
        tally.reset();
        let completion = CompletionHandler::install(signo)?;
        tracing::info!(
            pid = %parent,
            processes = self.processes,
            array_len = len,
            signo = completion.signo(),
            "Parent process installed completion handler"
        );

        let block = SignalBlock::engage(signo)?;
        let mut workers = WorkerSet::with_capacity(expected);
        for index in 0..expected {
            let partition = Partition::for_index(index, len, self.processes);
            // SAFETY: the child only sums its slice, queues one signal and
            // calls _exit.
            let forked = unsafe { process::fork()? };
            match forked {
                Forked::Child => worker::run(&partition, &self.data, parent, signo),
                Forked::Parent { child } => {
                    tracing::info!(
                        pid = %child,
                        worker = index,
                        start = partition.start,
                        end = partition.end,
                        elements = partition.width(),
                        "Forked worker"
                    );
                    workers.push(partition, child);
                }
            }
        }
        block.release()?;

        self.await_completion(tally, &mut workers, expected)?;
        workers.reap_all()?;

        let own = Partition::parent(len, self.processes);
        let parent_sum = own.sum(&self.data);
        tracing::info!(
            pid = %parent,
            start = own.start,
            end = own.end,
            elements = own.width(),
            partial_sum = parent_sum,
            "Parent process added its partition"
        );

        let signals_received = tally.received();
        let stray_signals = tally.stray();
        let total = tally.total() + parent_sum;
        completion.uninstall()?;

        tracing::info!(total, signals_received, "Final sum computed");

        Ok(Report {
            total,
            expected_total: self.expected_total,
            processes: self.processes,
            array_len: len,
            signals_received,
            stray_signals,
            parent: own,
            parent_sum,
            workers: workers.records(),
        })
    }

    /// Poll until `expected` completion signals have been recorded, reaping
    /// finished workers along the way.
    fn await_completion(&self, tally: &Tally, workers: &mut WorkerSet, expected: usize) -> Result<()> {
        let started = Instant::now();
        let timeout = self.coordination.timeout();
        let mut logged = 0;
        let mut settle_deadline = None;

        loop {
            let received = tally.received();
            logged = log_receipts(tally, workers, logged, received);
            if received >= expected {
                tracing::debug!(received, elapsed = ?started.elapsed(), "All completion signals received");
                return Ok(());
            }

            workers.reap_finished()?;

            let now = Instant::now();
            if workers.all_reaped() {
                // A worker's signal is queued before it exits; give delivery
                // a moment before declaring it lost.
                let deadline = *settle_deadline.get_or_insert(now + self.coordination.settle());
                if now >= deadline {
                    return Err(SumError::MissingSignals { expected, received });
                }
            }

            if let Some(timeout) = timeout {
                let waited = now.duration_since(started);
                if waited >= timeout {
                    return Err(SumError::Timeout {
                        expected,
                        received,
                        waited_ms: waited.as_millis() as u64,
                    });
                }
            }

            thread::sleep(self.coordination.poll_interval());
        }
    }
}

/// Log receipts `from..received` that the handler has finished writing.
/// Returns the index of the first receipt not yet logged.
fn log_receipts(tally: &Tally, workers: &WorkerSet, from: usize, received: usize) -> usize {
    let mut next = from;
    while next < received.min(RECEIPT_CAPACITY) {
        let Some(receipt) = tally.receipt(next) else {
            break;
        };
        let worker = workers.find(receipt.sender).map(|w| w.partition.index);
        tracing::info!(
            sender = receipt.sender,
            worker = ?worker,
            partial_sum = receipt.value,
            "Parent caught completion signal"
        );
        next += 1;
    }
    next
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use nix::errno::Errno;
    use nix::sys::wait::waitpid;
    use nix::unistd::Pid;

    use super::*;

    fn config(processes: usize, array_len: usize) -> SumConfig {
        let mut config = SumConfig::default();
        config.computation.processes = processes;
        config.computation.array_len = array_len;
        config.coordination.poll_interval_ms = 1;
        config
    }

    /// Fork a child that runs `body` and then exits without signalling.
    fn spawn(body: impl FnOnce()) -> Pid {
        // SAFETY: the child only sleeps and calls _exit.
        match unsafe { process::fork() }.unwrap() {
            Forked::Child => {
                body();
                process::exit_now(0)
            }
            Forked::Parent { child } => child,
        }
    }

    #[test]
    fn test_worker_exit_without_signal_is_missing() {
        let mut config = config(3, 10);
        config.coordination.settle_ms = 20;
        config.coordination.timeout_ms = 10_000;
        let controller = Controller::new(&config).unwrap();

        let tally = Tally::new();
        let mut workers = WorkerSet::with_capacity(2);
        for index in 0..2 {
            workers.push(Partition::for_index(index, 10, 3), spawn(|| ()));
        }

        let err = controller.await_completion(&tally, &mut workers, 2).unwrap_err();
        assert!(
            matches!(err, SumError::MissingSignals { expected: 2, received: 0 }),
            "unexpected error: {err}"
        );
        assert!(workers.all_reaped());
    }

    #[test]
    fn test_stalled_worker_times_out_and_is_killed_on_drop() {
        let mut config = config(2, 10);
        config.coordination.timeout_ms = 50;
        let controller = Controller::new(&config).unwrap();

        let tally = Tally::new();
        let mut workers = WorkerSet::with_capacity(1);
        let pid = spawn(|| thread::sleep(Duration::from_secs(30)));
        workers.push(Partition::for_index(0, 10, 2), pid);

        let started = Instant::now();
        let err = controller.await_completion(&tally, &mut workers, 1).unwrap_err();
        assert!(
            matches!(err, SumError::Timeout { expected: 1, received: 0, waited_ms } if waited_ms >= 50),
            "unexpected error: {err}"
        );
        assert!(!workers.all_reaped());

        drop(workers);
        assert!(started.elapsed() < Duration::from_secs(30));
        // Already reaped by the drop: no zombie left behind.
        assert_eq!(waitpid(pid, None), Err(Errno::ECHILD));
    }

    #[test]
    fn test_second_run_rejected() {
        let controller = Controller::new(&config(2, 16)).unwrap();
        let guard = RunGuard::acquire().unwrap();
        assert!(matches!(RunGuard::acquire(), Err(SumError::AlreadyRunning)));
        assert!(matches!(controller.run(), Err(SumError::AlreadyRunning)));
        drop(guard);
        assert!(RunGuard::acquire().is_ok());
    }

    #[test]
    fn test_overflowing_input_rejected() {
        let result = Controller::with_data(&config(2, 0), vec![i64::MAX, 1]);
        assert!(matches!(result, Err(SumError::InputOverflow { len: 2 })));
    }

    #[test]
    fn test_expected_total_uses_closed_form() {
        let controller = Controller::new(&config(4, 4096)).unwrap();
        assert_eq!(controller.expected_total, 8_390_656);
    }
}
