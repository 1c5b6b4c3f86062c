//! In-memory collaborators for testing purposes.

use async_trait::async_trait;
use futures_util::stream;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::client::{
    Account, AccountResolver, ClientError, ItemStream, PageFetcher, SearchTransport,
};
use crate::models::{Feed, FeedPost, SearchResults, User};
use crate::stream::PAGE_SIZE;

/// A page fetcher serving slices of a fixed item list.
///
/// Every `(page, size)` request is recorded. Page `n` starts at offset
/// `n * PAGE_SIZE` and holds at most `size` items, like a server with a fixed
/// page stride.
#[derive(Debug)]
pub struct MockFeedFetcher {
    items: Vec<Feed>,
    fail_at_page: Option<usize>,
    requests: Mutex<Vec<(usize, usize)>>,
}

impl MockFeedFetcher {
    /// Serve `count` generated feed items with ids `feed-0`, `feed-1`, ...
    pub fn with_items(count: usize) -> Self {
        Self {
            items: (0..count).map(make_feed).collect(),
            fail_at_page: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fail every request for `page`
    pub fn fail_at_page(mut self, page: usize) -> Self {
        self.fail_at_page = Some(page);
        self
    }

    /// Requests received so far, in order
    pub fn requests(&self) -> Vec<(usize, usize)> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of fetches performed
    pub fn fetch_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl PageFetcher<Feed> for MockFeedFetcher {
    async fn fetch(&self, page: usize, size: usize) -> Result<Vec<Feed>, ClientError> {
        self.requests.lock().unwrap().push((page, size));
        // suspend once, like a network round trip
        tokio::task::yield_now().await;

        if self.fail_at_page == Some(page) {
            return Err(ClientError::Network(format!("page {} unavailable", page)));
        }

        let start = page.saturating_mul(PAGE_SIZE).min(self.items.len());
        let end = start.saturating_add(size).min(self.items.len());
        Ok(self.items[start..end].to_vec())
    }
}

/// A search transport returning a configured response.
#[derive(Debug, Default)]
pub struct MockSearchTransport {
    response: Mutex<Option<SearchResults>>,
    fail: bool,
    calls: Mutex<Vec<BTreeMap<String, String>>>,
}

impl MockSearchTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport whose every call fails
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    /// Set the response to return
    pub fn set_response(&self, response: SearchResults) {
        *self.response.lock().unwrap() = Some(response);
    }

    /// Parameters of every call received so far
    pub fn calls(&self) -> Vec<BTreeMap<String, String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl SearchTransport for MockSearchTransport {
    async fn search(
        &self,
        _page: usize,
        _size: usize,
        params: &BTreeMap<String, String>,
    ) -> Result<SearchResults, ClientError> {
        self.calls.lock().unwrap().push(params.clone());

        if self.fail {
            return Err(ClientError::Api {
                status: 500,
                message: "search unavailable".to_string(),
            });
        }

        Ok(self.response.lock().unwrap().clone().unwrap_or_default())
    }
}

/// Outcome a [`MockAccountResolver`] produces
#[derive(Debug, Clone)]
enum Resolution {
    Account(Arc<MockAccount>),
    Absent,
    Failure,
}

/// An account resolver with a fixed outcome.
#[derive(Debug)]
pub struct MockAccountResolver {
    resolution: Resolution,
}

impl MockAccountResolver {
    /// Resolves to `account`
    pub fn with_account(account: MockAccount) -> Self {
        Self {
            resolution: Resolution::Account(Arc::new(account)),
        }
    }

    /// Resolves to no account
    pub fn absent() -> Self {
        Self {
            resolution: Resolution::Absent,
        }
    }

    /// Fails to resolve
    pub fn failing() -> Self {
        Self {
            resolution: Resolution::Failure,
        }
    }

    /// The account handed out, if any
    pub fn account(&self) -> Option<Arc<MockAccount>> {
        match &self.resolution {
            Resolution::Account(account) => Some(account.clone()),
            _ => None,
        }
    }
}

#[async_trait]
impl AccountResolver for MockAccountResolver {
    async fn resolve(&self) -> Result<Option<Arc<dyn Account>>, ClientError> {
        match &self.resolution {
            Resolution::Account(account) => Ok(Some(account.clone() as Arc<dyn Account>)),
            Resolution::Absent => Ok(None),
            Resolution::Failure => Err(ClientError::Network("session expired".to_string())),
        }
    }
}

/// An account that echoes wall posts back as feed items.
#[derive(Debug)]
pub struct MockAccount {
    user: User,
    reject_posts: bool,
    posts: Mutex<Vec<FeedPost>>,
}

impl MockAccount {
    pub fn new(user: User) -> Self {
        Self {
            user,
            reject_posts: false,
            posts: Mutex::new(Vec::new()),
        }
    }

    /// Account whose wall posts all fail
    pub fn rejecting(user: User) -> Self {
        Self {
            reject_posts: true,
            ..Self::new(user)
        }
    }

    /// Posts received so far
    pub fn posts(&self) -> Vec<FeedPost> {
        self.posts.lock().unwrap().clone()
    }
}

impl Account for MockAccount {
    fn user(&self) -> &User {
        &self.user
    }

    fn send_wall_post(&self, post: FeedPost) -> ItemStream<'static, Feed> {
        if self.reject_posts {
            return Box::pin(stream::once(async {
                Err::<Feed, _>(ClientError::Api {
                    status: 403,
                    message: "wall is closed".to_string(),
                })
            }));
        }

        let mut posts = self.posts.lock().unwrap();
        let feed = Feed::new(format!("post-{}", posts.len()), post.message.clone())
            .owner(self.user.clone());
        posts.push(post);

        Box::pin(stream::iter(vec![Ok::<_, ClientError>(feed)]))
    }
}

/// Helper function to create a mock feed item for testing.
pub fn make_feed(index: usize) -> Feed {
    Feed::new(format!("feed-{}", index), format!("message {}", index))
}
