//! Index ranges owned by each process.
//!
//! Process `i` of `P` owns `[i*N/P, (i+1)*N/P)`. The parent is index `P-1`,
//! so its range ends at `N` and absorbs any remainder.

use std::ops::Range;

use serde::Serialize;

/// A contiguous slice of the input owned by one process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Partition {
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

fn bound(index: usize, len: usize, processes: usize) -> usize {
    (index as u128 * len as u128 / processes as u128) as usize
}

impl Partition {
    /// Range of process `index` out of `processes` over `len` elements.
    ///
    /// # Panics
    /// If `processes == 0` or `index >= processes`.
    pub fn for_index(index: usize, len: usize, processes: usize) -> Self {
        assert!(index < processes, "partition index {index} out of {processes}");
        Self {
            index,
            start: bound(index, len, processes),
            end: bound(index + 1, len, processes),
        }
    }

    /// The range the parent computes itself.
    pub fn parent(len: usize, processes: usize) -> Self {
        Self::for_index(processes - 1, len, processes)
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Number of elements in the range.
    pub fn width(&self) -> usize {
        self.end - self.start
    }

    /// Sum of this partition's elements of `data`.
    ///
    /// Cannot overflow when the absolute values of `data` sum within `i64`;
    /// [`fits_i64`] checks that bound.
    pub fn sum(&self, data: &[i64]) -> i64 {
        data[self.range()].iter().sum()
    }
}

/// Whether every partial sum of `data`, in any grouping, fits `i64`.
pub fn fits_i64(data: &[i64]) -> bool {
    data.iter()
        .try_fold(0i64, |acc, &x| acc.checked_add(x.checked_abs()?))
        .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all(len: usize, processes: usize) -> Vec<Partition> {
        (0..processes)
            .map(|index| Partition::for_index(index, len, processes))
            .collect()
    }

    fn ranges(len: usize, processes: usize) -> Vec<(usize, usize)> {
        all(len, processes)
            .into_iter()
            .map(|p| (p.start, p.end))
            .collect()
    }

    #[test]
    fn test_even_split() {
        assert_eq!(
            ranges(4096, 4),
            vec![(0, 1024), (1024, 2048), (2048, 3072), (3072, 4096)]
        );
        assert_eq!(Partition::parent(4096, 4).range(), 3072..4096);
    }

    #[test]
    fn test_uneven_split_parent_absorbs_remainder() {
        assert_eq!(ranges(10, 3), vec![(0, 3), (3, 6), (6, 10)]);
    }

    #[test]
    fn test_single_process_owns_everything() {
        let parent = Partition::parent(10, 1);
        assert_eq!(parent.range(), 0..10);
        assert_eq!(parent.index, 0);
    }

    #[test]
    fn test_cover_without_gap_or_overlap() {
        for len in 1..=200 {
            for processes in 1..=len.min(64) {
                let parts = all(len, processes);
                assert_eq!(parts.len(), processes);
                assert_eq!(parts[0].start, 0);
                assert_eq!(parts[processes - 1].end, len);
                for pair in parts.windows(2) {
                    assert_eq!(pair[0].end, pair[1].start, "len={len} p={processes}");
                }
                let covered: usize = parts.iter().map(Partition::width).sum();
                assert_eq!(covered, len);
            }
        }
    }

    #[test]
    fn test_recomputation_is_stable() {
        for index in 0..7 {
            assert_eq!(
                Partition::for_index(index, 1000, 7),
                Partition::for_index(index, 1000, 7)
            );
        }
    }

    #[test]
    fn test_more_processes_than_elements() {
        let parts = all(2, 5);
        assert_eq!(parts.iter().filter(|p| p.width() == 0).count(), 3);
        assert_eq!(parts.iter().map(Partition::width).sum::<usize>(), 2);
    }

    #[test]
    fn test_huge_lengths_do_not_overflow() {
        let p = Partition::for_index(1, usize::MAX, 2);
        assert_eq!(p.end, usize::MAX);
    }

    #[test]
    fn test_overflow_bound() {
        assert!(fits_i64(&[i64::MAX]));
        assert!(fits_i64(&[i64::MAX - 1, -1]));
        assert!(!fits_i64(&[i64::MAX, 1]));
        // Sums to 0, but the first two elements alone overflow.
        assert!(!fits_i64(&[i64::MAX, i64::MAX, -i64::MAX, -i64::MAX]));
        assert!(!fits_i64(&[i64::MIN]));
    }

    #[test]
    fn test_sum() {
        let data: Vec<i64> = (1..=10).collect();
        assert_eq!(Partition::for_index(2, 10, 3).sum(&data), 7 + 8 + 9 + 10);
    }
}
