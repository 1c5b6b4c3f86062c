//! Running item streams to completion from synchronous code.

use futures_util::TryStreamExt;
use std::future::Future;
use tokio::runtime::{Handle, RuntimeFlavor};

use crate::client::{ClientError, ItemStream};

/// Run `future` to completion on the calling thread.
///
/// Outside a runtime a throwaway current-thread runtime is built. Inside a
/// multi-thread runtime the worker is handed off with `block_in_place`.
/// A current-thread runtime cannot be blocked, so that case is an error.
pub fn block_on<F: Future>(future: F) -> Result<F::Output, ClientError> {
    match Handle::try_current() {
        Ok(handle) => match handle.runtime_flavor() {
            RuntimeFlavor::MultiThread => {
                Ok(tokio::task::block_in_place(|| handle.block_on(future)))
            }
            _ => Err(ClientError::Runtime(
                "blocking call made from a current-thread runtime".to_string(),
            )),
        },
        Err(_) => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| ClientError::Runtime(format!("Failed to build runtime: {}", e)))?;
            Ok(runtime.block_on(future))
        }
    }
}

/// Collect every item, stopping at the first error
pub async fn collect_all<T>(stream: ItemStream<'_, T>) -> Result<Vec<T>, ClientError> {
    stream.try_collect().await
}

/// The first item, or `None` if the stream completes empty
pub async fn first<T>(mut stream: ItemStream<'_, T>) -> Result<Option<T>, ClientError> {
    stream.try_next().await
}

/// The last item, or `None` if the stream completes empty
pub async fn last<T>(stream: ItemStream<'_, T>) -> Result<Option<T>, ClientError> {
    stream
        .try_fold(None, |_, item| async move { Ok(Some(item)) })
        .await
}
