//! Transport contracts consumed by the feed facade.
//!
//! The facade never talks to the network directly. It drives three
//! collaborators, each behind a trait so that any backend (the bundled
//! [`RestSession`], an in-memory mock, a recorded fixture) can be plugged in:
//!
//! - [`PageFetcher`]: one page of items for a zero-based page index
//! - [`SearchTransport`]: one search call with flattened query parameters
//! - [`AccountResolver`]: the acting account, if any, which exposes
//!   account-scoped writes through [`Account`]

pub mod mock;
mod rest;

pub use rest::{RestAccount, RestSession};

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::models::{Feed, FeedPost, SearchResults, User};

/// Lazy sequence of items where each step may fail
pub type ItemStream<'a, T> = BoxStream<'a, Result<T, ClientError>>;

/// Fetches one bounded, ordered page of items.
#[async_trait]
pub trait PageFetcher<T>: Send + Sync + std::fmt::Debug {
    /// Fetch page `page` (zero-based) holding at most `size` items
    async fn fetch(&self, page: usize, size: usize) -> Result<Vec<T>, ClientError>;
}

/// Performs a single search call.
#[async_trait]
pub trait SearchTransport: Send + Sync + std::fmt::Debug {
    async fn search(
        &self,
        page: usize,
        size: usize,
        params: &BTreeMap<String, String>,
    ) -> Result<SearchResults, ClientError>;
}

/// Resolves the account the session acts as.
#[async_trait]
pub trait AccountResolver: Send + Sync + std::fmt::Debug {
    /// `Ok(None)` when the session has no current account
    async fn resolve(&self) -> Result<Option<Arc<dyn Account>>, ClientError>;
}

/// A resolved account handle
pub trait Account: Send + Sync + std::fmt::Debug {
    /// The user behind this account
    fn user(&self) -> &User;

    /// Publish a post on this account's wall
    fn send_wall_post(&self, post: FeedPost) -> ItemStream<'static, Feed>;
}

/// Errors that can occur when talking to the remote service
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success status returned by the service
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Blocking call could not obtain an executor
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Other error
    #[error("Error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Parse(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Parse(format!("JSON: {}", err))
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidRequest(format!("URL: {}", err))
    }
}
