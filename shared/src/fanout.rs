//! All-or-nothing concurrent batches
//!
//! Every batch in the service (risk arrays, route profiles, the weighted
//! search pair) goes through [`join_all_ordered`].

use futures::future::try_join_all;
use std::future::Future;

/// Poll every future concurrently and collect the results in input order.
///
/// Resolves once all futures succeed, or with the first error observed. On
/// error the futures still in flight are dropped: siblings are abandoned, not
/// awaited. Nothing is spawned, so dropping them cancels their work.
pub async fn join_all_ordered<I, F, T, E>(futures: I) -> Result<Vec<T>, E>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, E>>,
{
    try_join_all(futures).await
}
