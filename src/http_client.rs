//! HTTP client used to download comment documents
//!
//! Features:
//! - HTTP/2 when the server negotiates it, HTTP/1.1 otherwise
//! - TLS 1.3 via rustls
//! - Brotli, Zstd, Gzip, Deflate compression (auto-negotiated)
//! - Connection pooling with keep-alive

use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use tracing::debug;

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("danmaku-loader/", env!("CARGO_PKG_VERSION"));

/// Tunables for [`DanmakuClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Time allowed to establish a connection
    pub connect_timeout: Duration,
    /// Total time allowed for one transfer. `None` waits indefinitely;
    /// a newer load cancels a stuck one.
    pub timeout: Option<Duration>,
    /// Maximum redirects followed
    pub max_redirects: usize,
    /// User agent header
    pub user_agent: String,
    /// Honour `HTTP_PROXY`/`HTTPS_PROXY` from the environment
    pub system_proxy: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            timeout: None,
            max_redirects: 10,
            user_agent: USER_AGENT.to_string(),
            system_proxy: true,
        }
    }
}

impl ClientConfig {
    /// Set a total transfer timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Connect directly, ignoring proxy environment variables
    #[must_use]
    pub fn without_proxy(mut self) -> Self {
        self.system_proxy = false;
        self
    }
}

/// Shared reqwest client. Cloning is cheap.
#[derive(Clone)]
pub struct DanmakuClient {
    client: Client,
}

impl DanmakuClient {
    /// Create a client with default settings
    pub fn new() -> Result<Self> {
        Self::with_config(&ClientConfig::default())
    }

    /// Create a client from `config`
    pub fn with_config(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder()
            // ═══════════════════════════════════════════════════════════════
            // CONNECTION
            // ═══════════════════════════════════════════════════════════════
            .http2_adaptive_window(true)
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .tcp_nodelay(true)
            .use_rustls_tls()
            // ═══════════════════════════════════════════════════════════════
            // COMPRESSION (auto-negotiated via Accept-Encoding)
            // ═══════════════════════════════════════════════════════════════
            .brotli(true)
            .zstd(true)
            .gzip(true)
            // Comment servers often answer with raw deflate
            .deflate(true)
            // ═══════════════════════════════════════════════════════════════
            // IDENTITY, TIMEOUTS, REDIRECTS
            // ═══════════════════════════════════════════════════════════════
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.connect_timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects));

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if !config.system_proxy {
            builder = builder.no_proxy();
        }

        debug!(?config, "Building HTTP client");
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Get the underlying reqwest client
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_no_total_timeout() {
        let config = ClientConfig::default();
        assert!(config.timeout.is_none());
        assert!(config.user_agent.starts_with("danmaku-loader/"));
        assert!(config.system_proxy);
    }

    #[test]
    fn test_client_builds_without_proxy() {
        let config = ClientConfig::default().without_proxy();
        assert!(!config.system_proxy);
        assert!(DanmakuClient::with_config(&config).is_ok());
    }

    #[test]
    fn test_client_builds_with_timeout() {
        let config = ClientConfig::default().with_timeout(Duration::from_secs(5));
        assert!(DanmakuClient::with_config(&config).is_ok());
    }
}
