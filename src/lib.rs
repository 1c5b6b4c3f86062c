//! # feedstream
//!
//! Client-side access to a paged social feed API as lazy, cancellable
//! streams of items.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Feed items, search queries and result envelopes
//! - [`client`]: Transport contracts, the REST implementation and test mocks
//! - [`stream`]: Pagination engine, dependent-call chaining, observers and
//!   blocking adapters
//! - [`facade`]: [`FeedClient`], the surface application code uses
//! - [`config`]: Configuration management
//!
//! ```rust,no_run
//! use feedstream::{FeedClient, config::Config};
//! use feedstream::models::QueryBuilder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = FeedClient::from_config(&Config::default())?;
//!
//! // at most 25 items, fetched ten at a time
//! let _feeds = client.blocking_stream(25)?;
//!
//! let query = QueryBuilder::new()
//!     .set_text_to_search("concert")
//!     .set_owner_living_location_maximum_distance_in_kilometers(5.0)
//!     .build();
//! let _found = client.blocking_search(&query, 0, 10)?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod facade;
pub mod models;
pub mod stream;

// Re-export commonly used types
pub use client::ClientError;
pub use facade::{FeedClient, Session};
pub use models::{Feed, Query, QueryBuilder};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
