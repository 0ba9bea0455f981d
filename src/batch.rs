//! Paced concurrent processing shared by the migration and the company import.

use futures::future::join_all;
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::time::Duration;
use tracing::info;

/// Run `f` over `items` in chunks of `size`. Every item of a chunk runs
/// concurrently; the next chunk starts only after the whole chunk settled
/// and `pause` elapsed. Outputs are returned in input order.
pub async fn for_each_in_batches<'a, T, F, Fut, O>(
    items: &'a [T],
    size: usize,
    pause: Duration,
    f: F,
) -> Vec<O>
where
    F: Fn(&'a T) -> Fut,
    Fut: Future<Output = O>,
{
    let size = size.max(1);
    let batch_count = items.len().div_ceil(size);
    let mut outputs = Vec::with_capacity(items.len());

    for (index, chunk) in items.chunks(size).enumerate() {
        info!(
            batch = index + 1,
            batches = batch_count,
            size = chunk.len(),
            "Processing batch"
        );
        outputs.extend(join_all(chunk.iter().map(&f)).await);

        if index + 1 < batch_count {
            tokio::time::sleep(pause).await;
        }
    }

    outputs
}

/// Run `f` over `items` with at most `concurrency` in flight at once, pulling
/// from a single queue. Outputs are returned in input order.
pub async fn for_each_bounded<'a, T, F, Fut, O>(items: &'a [T], concurrency: usize, f: F) -> Vec<O>
where
    F: Fn(&'a T) -> Fut,
    Fut: Future<Output = O>,
{
    stream::iter(items.iter().map(f))
        .buffered(concurrency.max(1))
        .collect()
        .await
}
