//! Lazy, cancellable item streams and their consumers.
//!
//! - [`PaginationEngine`]: pull pages on demand until a limit or a short page
//! - [`chain`]: run an action once a dependency resolves
//! - [`subscribe`]: push a stream into an [`Observer`] with a [`Subscription`]
//!   handle for cancellation
//! - [`block_on`], [`collect_all`], [`first`], [`last`]: synchronous draining
//!
//! Every stream is a [`crate::client::ItemStream`]: nothing is fetched until
//! it is polled, and dropping it abandons whatever fetch is pending.

mod blocking;
mod chain;
mod observer;
mod pagination;

pub use blocking::{block_on, collect_all, first, last};
pub use chain::chain;
pub use observer::{subscribe, Event, Observer, Subscription};
pub use pagination::{PageErrorPolicy, PageRequest, PaginationEngine, PAGE_SIZE};
