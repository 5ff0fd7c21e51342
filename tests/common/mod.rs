//! Shared utilities for integration tests.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use sigsum::SumConfig;

/// Serialize tests that touch the process-wide tally or signal disposition.
pub fn serial() -> MutexGuard<'static, ()> {
    static LOCK: Mutex<()> = Mutex::new(());
    LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Configuration tuned for fast, bounded test runs.
#[allow(dead_code)]
pub fn config(processes: usize, array_len: usize) -> SumConfig {
    let mut config = SumConfig::default();
    config.computation.processes = processes;
    config.computation.array_len = array_len;
    config.coordination.poll_interval_ms = 1;
    config.coordination.timeout_ms = 20_000;
    config
}

/// Poll `cond` until it holds or `limit` elapses.
#[allow(dead_code)]
pub fn wait_until(limit: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + limit;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    cond()
}
