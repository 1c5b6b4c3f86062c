//! Push-style consumption of item streams with cancellation.

use futures_util::StreamExt;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::client::{ClientError, ItemStream};

/// Receives the events of one subscribed stream.
///
/// Calls arrive sequentially from a single task: any number of `on_next`,
/// then at most one of `on_error` or `on_complete`.
pub trait Observer<T>: Send + 'static {
    fn on_next(&mut self, item: T);

    fn on_error(&mut self, error: ClientError);

    fn on_complete(&mut self);
}

/// One observed stream event
#[derive(Debug)]
pub enum Event<T> {
    Next(T),
    Error(ClientError),
    Complete,
}

impl<T: Send + 'static> Observer<T> for mpsc::UnboundedSender<Event<T>> {
    fn on_next(&mut self, item: T) {
        let _ = self.send(Event::Next(item));
    }

    fn on_error(&mut self, error: ClientError) {
        let _ = self.send(Event::Error(error));
    }

    fn on_complete(&mut self) {
        let _ = self.send(Event::Complete);
    }
}

/// Observer slot shared between a subscription and its driving task.
///
/// Delivery happens with the slot locked; detaching empties it under the same
/// lock, so once `detach` returns no event can reach the observer.
trait Detach: Send + Sync {
    fn detach(&self);
}

impl<O: Send> Detach for Mutex<Option<O>> {
    fn detach(&self) {
        lock_slot(self).take();
    }
}

fn lock_slot<O>(slot: &Mutex<Option<O>>) -> MutexGuard<'_, Option<O>> {
    // an observer that panicked leaves the slot usable
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle to a running subscription
pub struct Subscription {
    cancelled: Arc<AtomicBool>,
    observer: Arc<dyn Detach>,
    handle: JoinHandle<()>,
}

impl Subscription {
    /// Stop delivery and abandon any in-flight fetch.
    ///
    /// The observer receives no further events, not even `on_complete`, and is
    /// dropped before this returns.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.observer.detach();
        self.handle.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Whether the driving task has stopped
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait until the stream has terminated or been cancelled
    pub async fn join(self) {
        // a JoinError here only means the task was aborted
        let _ = self.handle.await;
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("cancelled", &self.is_cancelled())
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// Drive `stream` on a spawned task, pushing its events into `observer`.
///
/// Must be called from within a tokio runtime.
pub fn subscribe<T, O>(mut stream: ItemStream<'static, T>, observer: O) -> Subscription
where
    T: Send + 'static,
    O: Observer<T>,
{
    let slot = Arc::new(Mutex::new(Some(observer)));
    let task_slot = slot.clone();

    let handle = tokio::spawn(async move {
        while let Some(item) = stream.next().await {
            let mut guard = lock_slot(&task_slot);
            let Some(observer) = guard.as_mut() else {
                return;
            };
            match item {
                Ok(item) => observer.on_next(item),
                Err(e) => {
                    observer.on_error(e);
                    guard.take();
                    return;
                }
            }
        }

        if let Some(mut observer) = lock_slot(&task_slot).take() {
            observer.on_complete();
        }
    });

    Subscription {
        cancelled: Arc::new(AtomicBool::new(false)),
        observer: slot,
        handle,
    }
}
