//! REST transport backed by `reqwest`.

use async_trait::async_trait;
use futures_util::stream;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::client::{
    Account, AccountResolver, ClientError, ItemStream, PageFetcher, SearchTransport,
};
use crate::config::ApiConfig;
use crate::models::{Feed, FeedPost, SearchResults, User};

/// HTTP session against the social network API
///
/// Cloning is cheap: the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct RestSession {
    client: Arc<Client>,
    base_url: Url,
    access_token: Option<String>,
}

impl RestSession {
    /// Create a session from API settings
    pub fn new(api: &ApiConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(Duration::from_secs(api.timeout_seconds))
            .connect_timeout(Duration::from_secs(api.connect_timeout_seconds))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| ClientError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Self::from_client(Arc::new(client), &api.base_url, api.access_token.clone())
    }

    /// Create from an existing reqwest Client
    pub fn from_client(
        client: Arc<Client>,
        base_url: &str,
        access_token: Option<String>,
    ) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(base_url)?;
        // Url::join drops the last segment unless the path ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client,
            base_url,
            access_token,
        })
    }

    /// Base URL every endpoint is resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path)?)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    fn paged_url(&self, path: &str, page: usize, size: usize) -> Result<Url, ClientError> {
        let mut url = self.endpoint(path)?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("size", &size.to_string());
        Ok(url)
    }

    async fn post_wall(&self, user_id: &str, post: &FeedPost) -> Result<Feed, ClientError> {
        let url = self.endpoint(&format!("user/{}/wall", user_id))?;
        debug!(user_id, "posting on wall");
        Self::send_json(self.request(Method::POST, url).json(post)).await
    }
}

#[async_trait]
impl PageFetcher<Feed> for RestSession {
    async fn fetch(&self, page: usize, size: usize) -> Result<Vec<Feed>, ClientError> {
        let url = self.paged_url("feed", page, size)?;
        Self::send_json(self.request(Method::GET, url)).await
    }
}

#[async_trait]
impl SearchTransport for RestSession {
    async fn search(
        &self,
        page: usize,
        size: usize,
        params: &BTreeMap<String, String>,
    ) -> Result<SearchResults, ClientError> {
        let mut url = self.paged_url("search", page, size)?;
        url.query_pairs_mut().extend_pairs(params.iter());
        Self::send_json(self.request(Method::GET, url)).await
    }
}

#[async_trait]
impl AccountResolver for RestSession {
    async fn resolve(&self) -> Result<Option<Arc<dyn Account>>, ClientError> {
        let url = self.endpoint("account")?;
        let result: Result<Option<User>, ClientError> =
            Self::send_json(self.request(Method::GET, url)).await;

        match result {
            Ok(Some(user)) => Ok(Some(Arc::new(RestAccount {
                session: self.clone(),
                user,
            }))),
            Ok(None) => Ok(None),
            Err(ClientError::Api { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Account resolved through a [`RestSession`]
#[derive(Debug, Clone)]
pub struct RestAccount {
    session: RestSession,
    user: User,
}

impl Account for RestAccount {
    fn user(&self) -> &User {
        &self.user
    }

    fn send_wall_post(&self, post: FeedPost) -> ItemStream<'static, Feed> {
        let session = self.session.clone();
        let user_id = self.user.id.clone();

        Box::pin(stream::once(async move {
            let user_id = user_id.ok_or_else(|| {
                ClientError::InvalidRequest("account has no user id".to_string())
            })?;
            session.post_wall(&user_id, &post).await
        }))
    }
}
