//! HTTP client seam for the remote feed loader

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// Errors from the HTTP transport itself (no response received)
#[derive(Debug, Error)]
pub enum HttpClientError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Used by clients that are not backed by reqwest
    #[error("Request failed: {0}")]
    Other(String),
}

/// A received HTTP response, whatever its status
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Fetches the body at a URL
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &Url) -> Result<HttpResponse, HttpClientError>;
}

/// [`HttpClient`] backed by a shared `reqwest::Client`
#[derive(Debug, Clone, Default)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &Url) -> Result<HttpResponse, HttpClientError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        tracing::debug!(url = %url, status = status, bytes = body.len(), "Fetched remote feed");

        Ok(HttpResponse { status, body })
    }
}
