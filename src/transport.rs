//! Raw GET access to the remote restaurant API.
//!
//! Status codes are passed through untouched, the access layer decides what a
//! 404 or a 5xx means for a given resource.

use async_trait::async_trait;
use tracing::debug;

use crate::{config::Config, error::FetchError};

#[derive(Debug, Clone)]
pub struct RawResponse {
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// GET the resource below the API root named by `path` segments, with the given
    /// query parameters. Segments are raw values, the transport encodes them.
    async fn get(&self, path: &[&str], query: &[(&str, &str)]) -> Result<RawResponse, FetchError>;
}

#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: Config,
}

impl HttpTransport {
    pub fn new(config: Config) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::Transport {
                url: config.base_url.clone(),
                message: e.to_string(),
            })?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &[&str], query: &[(&str, &str)]) -> Result<RawResponse, FetchError> {
        let endpoint = self
            .config
            .endpoint(path)
            .map_err(|e| FetchError::Transport {
                url: self.config.base_url.clone(),
                message: e.to_string(),
            })?;
        let url = endpoint.to_string();
        debug!("GET {url} {query:?}");

        let transport_err = |e: reqwest::Error| FetchError::Transport {
            url: url.clone(),
            message: e.to_string(),
        };

        let resp = self
            .client
            .get(endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .query(query)
            .send()
            .await
            .map_err(transport_err)?;

        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(transport_err)?;

        Ok(RawResponse { url, status, body })
    }
}
