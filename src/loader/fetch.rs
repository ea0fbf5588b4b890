//! Fetch capability: retrieve the raw comment document for a source URL.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use thiserror::Error;
use tracing::{debug, info, instrument};
use url::Url;

use crate::http_client::DanmakuClient;

/// Upper bound on a comment document body (32 MiB)
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 32 * 1024 * 1024;

/// Transfer failures
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status { url: Url, status: u16 },

    #[error("document from {url} exceeds {limit} bytes")]
    TooLarge { url: Url, limit: usize },

    #[error("transfer failed: {0}")]
    Transport(String),
}

/// Something that can download a comment document.
///
/// One call is one transfer. The coordinator runs each call on its own task
/// and aborts the task to cancel it, so implementations only need to be
/// cancel-safe at `.await` points.
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    /// Download the full payload at `url`
    async fn fetch(&self, url: &Url) -> Result<Bytes, FetchError>;
}

/// [`Fetcher`] backed by the crate's reqwest client
#[derive(Clone)]
pub struct HttpFetcher {
    client: DanmakuClient,
    max_bytes: usize,
}

impl HttpFetcher {
    /// Create a fetcher around `client`
    #[must_use]
    pub fn new(client: DanmakuClient) -> Self {
        Self {
            client,
            max_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
        }
    }

    /// Set the maximum accepted document size
    #[must_use]
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch(&self, url: &Url) -> Result<Bytes, FetchError> {
        let response = self.client.inner().get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.clone(),
                status: status.as_u16(),
            });
        }

        if let Some(len) = response.content_length() {
            if usize::try_from(len).map_or(true, |len| len > self.max_bytes) {
                return Err(FetchError::TooLarge {
                    url: url.clone(),
                    limit: self.max_bytes,
                });
            }
        }

        let mut body = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if body.len() + chunk.len() > self.max_bytes {
                return Err(FetchError::TooLarge {
                    url: url.clone(),
                    limit: self.max_bytes,
                });
            }
            body.extend_from_slice(&chunk);
            debug!(received = body.len(), "Chunk received");
        }

        info!(bytes = body.len(), "Comment document downloaded");
        Ok(body.freeze())
    }
}
