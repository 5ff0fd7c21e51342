//! Input array.

/// `[1, 2, ..., len]`.
pub fn initialize(len: usize) -> Vec<i64> {
    (1..=len as i64).collect()
}

/// Closed-form sum of [`initialize`]`(len)`: `len*(len+1)/2`.
pub fn expected_sum(len: usize) -> i64 {
    let n = len as i128;
    (n * (n + 1) / 2) as i64
}
