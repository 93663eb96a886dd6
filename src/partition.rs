//! Batch partitioning of large identifier sets

use std::collections::HashSet;
use std::hash::Hash;

use crate::constants::MAX_CHUNK_SIZE;
use crate::deadline::Deadline;
use crate::error::{invalid, Result};

/// Split `items` into contiguous, non-empty chunks of at most
/// `max_chunk_size`. Empty input yields no chunks.
pub fn partition<T>(items: &[T], max_chunk_size: usize) -> Result<std::slice::Chunks<'_, T>> {
    check_chunk_size(max_chunk_size)?;
    Ok(items.chunks(max_chunk_size))
}

pub(crate) fn check_chunk_size(size: usize) -> Result<()> {
    if size == 0 || size > MAX_CHUNK_SIZE {
        return Err(invalid(format!("chunk size must be in 1..={}, got {}", MAX_CHUNK_SIZE, size)));
    }
    Ok(())
}

/// Run `query` once per chunk and union the results.
///
/// The deadline is checked before every chunk; the first failure aborts
/// the whole call and discards what was merged so far.
pub fn union_chunks<T, R, I, F>(
    items: &[T],
    max_chunk_size: usize,
    deadline: &Deadline,
    mut query: F,
) -> Result<HashSet<R>>
where
    R: Eq + Hash,
    I: IntoIterator<Item = R>,
    F: FnMut(&[T]) -> Result<I>,
{
    let mut merged = HashSet::new();
    for (n, chunk) in partition(items, max_chunk_size)?.enumerate() {
        deadline.check()?;
        let before = merged.len();
        merged.extend(query(chunk)?);
        tracing::trace!(chunk = n, size = chunk.len(), kept = merged.len() - before, "chunk resolved");
    }
    Ok(merged)
}
