//! Feed listing, streaming, search and wall posting.

use futures_util::stream;
use std::sync::Arc;
use tracing::debug;

use crate::client::{Account, ClientError, ItemStream};
use crate::config::Config;
use crate::facade::Session;
use crate::models::{Feed, FeedPost, Query, SearchResultValue};
use crate::stream::{
    block_on, chain, collect_all, first, last, subscribe, Observer, PageErrorPolicy,
    PaginationEngine, Subscription,
};

/// Default page index for listing and search
pub const DEFAULT_PAGE: usize = 0;

/// Default page size for listing and search
pub const DEFAULT_SIZE: usize = 10;

/// Limit that never stops a stream before the data runs out
pub const UNBOUNDED: usize = usize::MAX;

/// Feed operations over a [`Session`]
///
/// Every async operation returns a lazy [`ItemStream`]; the `blocking_*`
/// variants drain it on the calling thread and raise the first failure.
#[derive(Debug, Clone)]
pub struct FeedClient {
    session: Session,
    engine: PaginationEngine<Feed>,
}

impl FeedClient {
    pub fn new(session: Session) -> Self {
        Self::with_page_error_policy(session, PageErrorPolicy::default())
    }

    pub fn with_page_error_policy(session: Session, policy: PageErrorPolicy) -> Self {
        let engine = PaginationEngine::new(session.feeds.clone(), policy);
        Self { session, engine }
    }

    /// REST-backed client using the configured page-error policy
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        Ok(Self::with_page_error_policy(
            Session::from_config(config)?,
            config.paging.on_page_error,
        ))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn page_error_policy(&self) -> PageErrorPolicy {
        self.engine.policy()
    }

    /// A single page, fetched once when first polled
    ///
    /// Fetch failures are always reported, whatever the page-error policy.
    pub fn list(&self, page: usize, size: usize) -> ItemStream<'static, Feed> {
        if size == 0 {
            return Box::pin(stream::empty::<Result<Feed, ClientError>>());
        }

        let fetcher = self.session.feeds.clone();
        Box::pin(async_stream::stream! {
            debug!(page, size, "listing single page");
            match fetcher.fetch(page, size).await {
                Ok(items) => {
                    for item in items {
                        yield Ok(item);
                    }
                }
                Err(e) => {
                    yield Err(e);
                }
            }
        })
    }

    /// Up to `limit` items across as many pages as needed, from page 0
    pub fn stream(&self, limit: usize) -> ItemStream<'static, Feed> {
        self.engine.paginate(limit)
    }

    pub fn blocking_stream(&self, limit: usize) -> Result<Vec<Feed>, ClientError> {
        block_on(collect_all(self.stream(limit)))?
    }

    pub fn blocking_list(&self, page: usize, size: usize) -> Result<Vec<Feed>, ClientError> {
        block_on(collect_all(self.list(page, size)))?
    }

    /// Push up to `limit` items into `observer` from a spawned task
    pub fn subscribe_stream<O: Observer<Feed>>(&self, limit: usize, observer: O) -> Subscription {
        subscribe(self.stream(limit), observer)
    }

    /// One search call for feed items
    ///
    /// A `size` of 0 yields a zero-count result without touching the network.
    pub fn search(
        &self,
        query: &Query,
        page: usize,
        size: usize,
    ) -> ItemStream<'static, SearchResultValue<Feed>> {
        if size == 0 {
            return Box::pin(stream::iter(vec![Ok::<_, ClientError>(
                SearchResultValue::empty(),
            )]));
        }

        let transport = self.session.search.clone();
        let params = query.to_query_params();
        let kind = query.kind();
        Box::pin(stream::once(async move {
            debug!(page, size, kind, "searching");
            transport
                .search(page, size, &params)
                .await
                .map(|results| results.into_feeds())
        }))
    }

    pub fn blocking_search(
        &self,
        query: &Query,
        page: usize,
        size: usize,
    ) -> Result<Option<SearchResultValue<Feed>>, ClientError> {
        block_on(first(self.search(query, page, size)))?
    }

    /// Resolve the current account, then publish `post` on its wall
    ///
    /// Completes without items when the session has no account.
    pub fn send_wall_post(&self, post: FeedPost) -> ItemStream<'static, Feed> {
        let resolver = self.session.account.clone();
        chain(
            async move { resolver.resolve().await },
            move |account: Arc<dyn Account>| account.send_wall_post(post),
        )
    }

    /// The posted item, or `None` when there is no account
    pub fn blocking_send_wall_post(&self, post: FeedPost) -> Result<Option<Feed>, ClientError> {
        block_on(last(self.send_wall_post(post)))?
    }
}

impl From<Session> for FeedClient {
    fn from(session: Session) -> Self {
        Self::new(session)
    }
}
