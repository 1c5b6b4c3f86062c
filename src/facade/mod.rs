//! Public entry points for application code.

mod feed;

pub use feed::{FeedClient, DEFAULT_PAGE, DEFAULT_SIZE, UNBOUNDED};

use std::sync::Arc;

use crate::client::{AccountResolver, ClientError, PageFetcher, RestSession, SearchTransport};
use crate::config::Config;
use crate::models::Feed;

/// The collaborators a facade talks through
#[derive(Debug, Clone)]
pub struct Session {
    pub feeds: Arc<dyn PageFetcher<Feed>>,
    pub search: Arc<dyn SearchTransport>,
    pub account: Arc<dyn AccountResolver>,
}

impl Session {
    pub fn new(
        feeds: Arc<dyn PageFetcher<Feed>>,
        search: Arc<dyn SearchTransport>,
        account: Arc<dyn AccountResolver>,
    ) -> Self {
        Self {
            feeds,
            search,
            account,
        }
    }

    /// All three contracts served by one REST session
    pub fn rest(rest: RestSession) -> Self {
        let rest = Arc::new(rest);
        Self {
            feeds: rest.clone(),
            search: rest.clone(),
            account: rest,
        }
    }

    /// REST session built from configuration
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        Ok(Self::rest(RestSession::new(&config.api)?))
    }
}
