//! Composition of a dependent call onto a resolved value.

use futures_util::StreamExt;
use std::future::Future;
use tracing::debug;

use crate::client::{ClientError, ItemStream};

/// Resolve a dependency, then stream the results of an action on it.
///
/// - `Ok(Some(value))`: `action(value)` runs and every item, error and the
///   completion of its stream are forwarded unchanged.
/// - `Ok(None)`: the composed stream completes without emitting anything.
/// - `Err(e)`: the resolver failure is emitted as the only item.
///
/// Nothing runs until the composed stream is first polled.
pub fn chain<A, B, R, F>(resolve: R, action: F) -> ItemStream<'static, B>
where
    A: Send + 'static,
    B: Send + 'static,
    R: Future<Output = Result<Option<A>, ClientError>> + Send + 'static,
    F: FnOnce(A) -> ItemStream<'static, B> + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let dependency = match resolve.await {
            Ok(Some(value)) => value,
            Ok(None) => {
                debug!("dependency resolved to nothing, completing");
                return;
            }
            Err(e) => {
                debug!(error = %e, "dependency failed to resolve");
                yield Err(e);
                return;
            }
        };

        let mut inner = action(dependency);
        while let Some(item) = inner.next().await {
            yield item;
        }
    })
}
