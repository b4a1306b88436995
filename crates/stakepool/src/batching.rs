//! Batched enumeration: one concurrent batch of fixed width at a time,
//! joining on the first error, results concatenated in index order.

use {futures::future::try_join_all, std::future::Future};

/// Fetches `count` items by index in sequential batches of at most
/// `batch_size` concurrent lookups each. The whole batch completes before
/// the next one starts, so `batch_size` doubles as the concurrency cap.
/// The first failure aborts the enumeration.
pub async fn try_join_batched<T, E, F, Fut>(
    count: u64,
    batch_size: usize,
    fetch: F,
) -> Result<Vec<T>, E>
where
    F: Fn(u64) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    assert!(batch_size > 0, "batch size must be positive");
    // No preallocation from `count`: it is externally supplied and an absurd
    // value must fail in the first batch, not on allocation.
    let mut results = Vec::new();
    for batch_start in (0..count).step_by(batch_size) {
        let batch_end = batch_start.saturating_add(batch_size as u64).min(count);
        let batch = try_join_all((batch_start..batch_end).map(&fetch)).await?;
        results.extend(batch);
    }
    Ok(results)
}
