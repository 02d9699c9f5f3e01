//! Memory utilities for geometric buffer growth

use crate::error::{CsvError, Result};
use std::mem::size_of;

/// Capacity of every session buffer on first use
pub const INITIAL_CAPACITY: usize = 1;

/// Smallest capacity on the doubling schedule from `current` that holds `needed`
#[inline]
pub fn next_capacity(current: usize, needed: usize) -> usize {
    let mut capacity = current.max(INITIAL_CAPACITY);
    while capacity < needed {
        capacity = capacity.saturating_mul(2);
    }
    capacity
}

/// Reserve room for `capacity` elements in `buf`
///
/// Fails with `OutOfMemory` when the allocator refuses, or when the buffer
/// would exceed `limit` bytes. `buf` is left untouched on failure.
pub fn grow_to<T>(buf: &mut Vec<T>, capacity: usize, limit: Option<usize>) -> Result<()> {
    let requested = capacity.saturating_mul(size_of::<T>());

    if limit.is_some_and(|limit| requested > limit) {
        return Err(CsvError::OutOfMemory { requested });
    }

    let additional = capacity.saturating_sub(buf.len());
    buf.try_reserve_exact(additional)
        .map_err(|_| CsvError::OutOfMemory { requested })
}
