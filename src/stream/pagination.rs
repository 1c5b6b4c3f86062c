//! Turns a page-oriented fetcher into a lazy, limit-bounded item stream.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::client::{ItemStream, PageFetcher};

/// Items requested per page by the multi-page stream
pub const PAGE_SIZE: usize = 10;

/// What a multi-page stream does when a page fetch fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageErrorPolicy {
    /// Emit the failure as the final item of the stream
    #[default]
    Propagate,
    /// Log the failure and end the stream as if the data ran out
    Exhaust,
}

/// One page request issued by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Zero-based page index
    pub page: usize,
    /// Items asked for, never more than [`PAGE_SIZE`]
    pub size: usize,
}

/// Progress of one in-flight pagination
#[derive(Debug)]
struct StreamSession {
    page: usize,
    remaining: usize,
}

impl StreamSession {
    fn new(start_page: usize, limit: usize) -> Self {
        Self {
            page: start_page,
            remaining: limit,
        }
    }

    /// `None` once the limit is used up
    fn next_request(&self) -> Option<PageRequest> {
        if self.remaining == 0 {
            return None;
        }

        Some(PageRequest {
            page: self.page,
            size: PAGE_SIZE.min(self.remaining),
        })
    }

    fn advance(&mut self) {
        self.page += 1;
        self.remaining = self.remaining.saturating_sub(PAGE_SIZE);
    }
}

/// Drives repeated page fetches for a bounded number of items.
///
/// Page `n + 1` is only requested once every item of page `n` has been
/// consumed, so a stream never has more than one fetch in flight. The stream
/// ends when:
///
/// - the limit is reached,
/// - a page comes back shorter than requested, or
/// - a fetch fails (reported or swallowed per [`PageErrorPolicy`]).
pub struct PaginationEngine<T> {
    fetcher: Arc<dyn PageFetcher<T>>,
    policy: PageErrorPolicy,
}

impl<T: Send + 'static> PaginationEngine<T> {
    pub fn new(fetcher: Arc<dyn PageFetcher<T>>, policy: PageErrorPolicy) -> Self {
        Self { fetcher, policy }
    }

    pub fn policy(&self) -> PageErrorPolicy {
        self.policy
    }

    /// Stream at most `limit` items starting from page 0
    pub fn paginate(&self, limit: usize) -> ItemStream<'static, T> {
        self.paginate_from(0, limit)
    }

    /// Stream at most `limit` items starting from `start_page`
    pub fn paginate_from(&self, start_page: usize, limit: usize) -> ItemStream<'static, T> {
        let fetcher = self.fetcher.clone();
        let policy = self.policy;

        Box::pin(async_stream::stream! {
            let mut session = StreamSession::new(start_page, limit);

            while let Some(request) = session.next_request() {
                debug!(page = request.page, size = request.size, "requesting page");

                let mut items = match fetcher.fetch(request.page, request.size).await {
                    Ok(items) => items,
                    Err(e) => {
                        match policy {
                            PageErrorPolicy::Propagate => {
                                yield Err(e);
                            }
                            PageErrorPolicy::Exhaust => {
                                warn!(page = request.page, error = %e, "page fetch failed, ending stream");
                            }
                        }
                        break;
                    }
                };

                if items.len() > request.size {
                    debug!(
                        page = request.page,
                        received = items.len(),
                        "page larger than requested, truncating"
                    );
                    items.truncate(request.size);
                }

                let short = items.len() < request.size;
                debug!(page = request.page, received = items.len(), short, "page received");

                for item in items {
                    yield Ok(item);
                }

                if short {
                    break;
                }
                session.advance();
            }
        })
    }
}

impl<T> Clone for PaginationEngine<T> {
    fn clone(&self) -> Self {
        Self {
            fetcher: self.fetcher.clone(),
            policy: self.policy,
        }
    }
}

impl<T> std::fmt::Debug for PaginationEngine<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginationEngine")
            .field("fetcher", &self.fetcher)
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::MockFeedFetcher;
    use crate::client::ClientError;
    use crate::models::Feed;
    use futures_util::StreamExt;

    fn engine(fetcher: &Arc<MockFeedFetcher>, policy: PageErrorPolicy) -> PaginationEngine<Feed> {
        PaginationEngine::new(fetcher.clone(), policy)
    }

    async fn drain(stream: ItemStream<'static, Feed>) -> Vec<Result<Feed, ClientError>> {
        stream.collect().await
    }

    #[test]
    fn test_session_requests() {
        let mut session = StreamSession::new(0, 25);
        assert_eq!(session.next_request(), Some(PageRequest { page: 0, size: 10 }));
        session.advance();
        assert_eq!(session.next_request(), Some(PageRequest { page: 1, size: 10 }));
        session.advance();
        assert_eq!(session.next_request(), Some(PageRequest { page: 2, size: 5 }));
        session.advance();
        assert_eq!(session.next_request(), None);
    }

    #[test]
    fn test_session_unbounded_limit() {
        let mut session = StreamSession::new(0, usize::MAX);
        session.advance();
        assert_eq!(session.next_request(), Some(PageRequest { page: 1, size: 10 }));
    }

    #[tokio::test]
    async fn test_zero_limit_fetches_nothing() {
        let fetcher = Arc::new(MockFeedFetcher::with_items(30));
        let items = drain(engine(&fetcher, PageErrorPolicy::Propagate).paginate(0)).await;

        assert!(items.is_empty());
        assert_eq!(fetcher.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_short_final_page() {
        let fetcher = Arc::new(MockFeedFetcher::with_items(25));
        let items = drain(engine(&fetcher, PageErrorPolicy::Propagate).paginate(usize::MAX)).await;

        assert_eq!(items.len(), 25);
        assert_eq!(fetcher.requests(), vec![(0, 10), (1, 10), (2, 10)]);
    }

    #[tokio::test]
    async fn test_limit_stops_before_available_data() {
        let fetcher = Arc::new(MockFeedFetcher::with_items(30));
        let items = drain(engine(&fetcher, PageErrorPolicy::Propagate).paginate(20)).await;

        assert_eq!(items.len(), 20);
        assert_eq!(fetcher.requests(), vec![(0, 10), (1, 10)]);
    }

    #[tokio::test]
    async fn test_limit_not_multiple_of_page_size() {
        let fetcher = Arc::new(MockFeedFetcher::with_items(100));
        let items = drain(engine(&fetcher, PageErrorPolicy::Propagate).paginate(23)).await;

        let ids: Vec<_> = items.into_iter().map(|r| r.unwrap().id).collect();
        assert_eq!(ids.len(), 23);
        assert_eq!(ids[0], "feed-0");
        assert_eq!(ids[22], "feed-22");
        assert_eq!(fetcher.requests(), vec![(0, 10), (1, 10), (2, 3)]);
    }

    #[tokio::test]
    async fn test_start_page_offset() {
        let fetcher = Arc::new(MockFeedFetcher::with_items(100));
        let items = drain(engine(&fetcher, PageErrorPolicy::Propagate).paginate_from(3, 15)).await;

        assert_eq!(items.len(), 15);
        assert_eq!(items[0].as_ref().unwrap().id, "feed-30");
        assert_eq!(fetcher.requests(), vec![(3, 10), (4, 5)]);
    }

    #[tokio::test]
    async fn test_failure_propagates_after_earlier_pages() {
        let fetcher = Arc::new(MockFeedFetcher::with_items(50).fail_at_page(1));
        let items = drain(engine(&fetcher, PageErrorPolicy::Propagate).paginate(50)).await;

        assert_eq!(items.len(), 11);
        assert!(items[..10].iter().all(|r| r.is_ok()));
        assert!(matches!(items[10], Err(ClientError::Network(_))));
        assert_eq!(fetcher.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_failure_exhausts_quietly() {
        let fetcher = Arc::new(MockFeedFetcher::with_items(50).fail_at_page(1));
        let items = drain(engine(&fetcher, PageErrorPolicy::Exhaust).paginate(50)).await;

        assert_eq!(items.len(), 10);
        assert!(items.iter().all(|r| r.is_ok()));
    }

    #[derive(Debug)]
    struct OversizedFetcher;

    #[async_trait::async_trait]
    impl PageFetcher<Feed> for OversizedFetcher {
        async fn fetch(&self, _page: usize, _size: usize) -> Result<Vec<Feed>, ClientError> {
            Ok((0..15).map(crate::client::mock::make_feed).collect())
        }
    }

    #[tokio::test]
    async fn test_oversized_page_is_truncated() {
        let engine = PaginationEngine::new(Arc::new(OversizedFetcher), PageErrorPolicy::Propagate);
        let items = drain(engine.paginate(13)).await;
        assert_eq!(items.len(), 13);
        assert_eq!(items[12].as_ref().unwrap().id, "feed-2");
    }

    #[tokio::test]
    async fn test_nothing_fetched_until_polled() {
        let fetcher = Arc::new(MockFeedFetcher::with_items(30));
        let mut stream = engine(&fetcher, PageErrorPolicy::Propagate).paginate(30);
        assert_eq!(fetcher.fetch_count(), 0);

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.id, "feed-0");
        assert_eq!(fetcher.fetch_count(), 1);

        drop(stream);
        assert_eq!(fetcher.fetch_count(), 1);
    }
}
