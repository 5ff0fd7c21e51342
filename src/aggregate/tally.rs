//! Process-wide aggregate of completion signals.
//!
//! Written from signal context, so every mutation is a single atomic
//! operation on memory that exists for the whole process lifetime.

use std::sync::atomic::{AtomicI32, AtomicI64, AtomicUsize, Ordering};

/// Number of per-signal receipts kept for deferred logging.
pub const RECEIPT_CAPACITY: usize = 256;

/// One delivered completion signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Receipt {
    pub sender: i32,
    pub value: i64,
}

// sender == 0 marks an unwritten slot; sigqueue never reports pid 0.
struct Slot {
    sender: AtomicI32,
    value: AtomicI64,
}

#[allow(clippy::declare_interior_mutable_const)]
const EMPTY_SLOT: Slot = Slot {
    sender: AtomicI32::new(0),
    value: AtomicI64::new(0),
};

/// Running sum and count of completion signals.
pub struct Tally {
    total: AtomicI64,
    received: AtomicUsize,
    stray: AtomicUsize,
    next_slot: AtomicUsize,
    slots: [Slot; RECEIPT_CAPACITY],
}

impl Tally {
    pub(crate) const fn new() -> Self {
        Self {
            total: AtomicI64::new(0),
            received: AtomicUsize::new(0),
            stray: AtomicUsize::new(0),
            next_slot: AtomicUsize::new(0),
            slots: [EMPTY_SLOT; RECEIPT_CAPACITY],
        }
    }

    /// Account for one completion signal. Async-signal-safe.
    pub fn record(&self, sender: i32, value: i64) {
        let idx = self.next_slot.fetch_add(1, Ordering::Relaxed);
        if let Some(slot) = self.slots.get(idx) {
            slot.value.store(value, Ordering::Relaxed);
            slot.sender.store(sender, Ordering::Release);
        }
        self.total.fetch_add(value, Ordering::Relaxed);
        self.received.fetch_add(1, Ordering::Release);
    }

    /// Account for a completion signal that did not come from `sigqueue`.
    /// Async-signal-safe.
    pub fn record_stray(&self) {
        self.stray.fetch_add(1, Ordering::Relaxed);
    }

    /// Completion signals observed so far.
    pub fn received(&self) -> usize {
        self.received.load(Ordering::Acquire)
    }

    /// Sum of all recorded payloads.
    pub fn total(&self) -> i64 {
        self.total.load(Ordering::Acquire)
    }

    pub fn stray(&self) -> usize {
        self.stray.load(Ordering::Relaxed)
    }

    /// The `idx`-th receipt, or `None` if it is not written (yet) or was
    /// past capacity.
    pub fn receipt(&self, idx: usize) -> Option<Receipt> {
        let slot = self.slots.get(idx)?;
        let sender = slot.sender.load(Ordering::Acquire);
        if sender == 0 {
            return None;
        }
        Some(Receipt {
            sender,
            value: slot.value.load(Ordering::Relaxed),
        })
    }

    /// Zero every counter and slot.
    ///
    /// Only valid while the completion signal has no handler installed.
    pub(crate) fn reset(&self) {
        for slot in &self.slots {
            slot.sender.store(0, Ordering::Relaxed);
            slot.value.store(0, Ordering::Relaxed);
        }
        self.total.store(0, Ordering::Relaxed);
        self.stray.store(0, Ordering::Relaxed);
        self.next_slot.store(0, Ordering::Relaxed);
        self.received.store(0, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_accumulates() {
        let tally = Tally::new();
        tally.record(100, 5);
        tally.record(101, -2);

        assert_eq!(tally.received(), 2);
        assert_eq!(tally.total(), 3);
        assert_eq!(tally.receipt(0), Some(Receipt { sender: 100, value: 5 }));
        assert_eq!(tally.receipt(1), Some(Receipt { sender: 101, value: -2 }));
        assert_eq!(tally.receipt(2), None);
    }

    #[test]
    fn test_overflowing_receipts_still_counted() {
        let tally = Tally::new();
        for i in 0..RECEIPT_CAPACITY + 10 {
            tally.record(1 + i as i32, 1);
        }

        assert_eq!(tally.received(), RECEIPT_CAPACITY + 10);
        assert_eq!(tally.total(), (RECEIPT_CAPACITY + 10) as i64);
        assert!(tally.receipt(RECEIPT_CAPACITY - 1).is_some());
        assert_eq!(tally.receipt(RECEIPT_CAPACITY), None);
    }

    #[test]
    fn test_reset_clears_everything() {
        let tally = Tally::new();
        tally.record(7, 42);
        tally.record_stray();
        tally.reset();

        assert_eq!(tally.received(), 0);
        assert_eq!(tally.total(), 0);
        assert_eq!(tally.stray(), 0);
        assert_eq!(tally.receipt(0), None);
    }

    #[test]
    fn test_concurrent_records() {
        let tally = Tally::new();
        std::thread::scope(|s| {
            for t in 0..8 {
                let tally = &tally;
                s.spawn(move || {
                    for _ in 0..100 {
                        tally.record(1 + t, 2);
                    }
                });
            }
        });

        assert_eq!(tally.received(), 800);
        assert_eq!(tally.total(), 1600);
    }
}
