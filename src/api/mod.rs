//! Remote feed loading
//!
//! Fetches the feed from a remote endpoint. The result is meant to be handed
//! to [`LocalFeedLoader::save`](crate::cache::LocalFeedLoader::save) by
//! whoever coordinates the two; this module knows nothing about the cache.

mod client;
mod mapper;

pub use client::{HttpClient, HttpClientError, HttpResponse, ReqwestHttpClient};
pub use mapper::FeedItemsMapper;

use thiserror::Error;
use url::Url;

use crate::feed::FeedImage;

/// Errors that can occur when loading the remote feed
#[derive(Debug, Error)]
pub enum RemoteFeedError {
    /// The endpoint could not be reached
    #[error("Could not reach the feed endpoint")]
    Connectivity,

    /// A response arrived but is not a valid feed
    #[error("The feed endpoint returned invalid data")]
    InvalidData,
}

/// Loads the feed from a remote URL through an [`HttpClient`]
pub struct RemoteFeedLoader<C> {
    url: Url,
    client: C,
}

impl<C: HttpClient> RemoteFeedLoader<C> {
    pub fn new(url: Url, client: C) -> Self {
        Self { url, client }
    }

    /// Fetches and decodes the feed
    pub async fn load(&self) -> Result<Vec<FeedImage>, RemoteFeedError> {
        let response = self.client.get(&self.url).await.map_err(|e| {
            tracing::warn!(url = %self.url, error = %e, "Remote feed request failed");
            RemoteFeedError::Connectivity
        })?;

        FeedItemsMapper::map(&response.body, response.status).map_err(|e| {
            tracing::warn!(url = %self.url, status = response.status, "Remote feed payload rejected");
            e
        })
    }
}
