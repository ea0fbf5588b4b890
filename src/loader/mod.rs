//! Overlay acquisition: single-flight fetch, layout resolution and handoff
//! to conversion and rendering.
//!
//! # Features
//!
//! - **Single flight** - at most one document transfer at a time; a new
//!   load cancels the previous one before starting
//! - **Resolution aware** - font size and timings derived from the video
//!   size after fitting it into the current display
//! - **Owned, injected** - every collaborator is passed in; no globals
//!
//! # Example
//!
//! ```rust,no_run
//! use danmaku_loader::display::DisplayBounds;
//! use danmaku_loader::http_client::DanmakuClient;
//! use danmaku_loader::loader::{HttpFetcher, LoadRequest, OverlaySession, RequestCoordinator};
//! use danmaku_loader::overlay::{ChannelSink, XmlCommentConverter};
//! use danmaku_loader::settings::TomlSettingsStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let (sink, mut tracks) = ChannelSink::new();
//!     let (coordinator, completions) = RequestCoordinator::new(
//!         DisplayBounds::new(1920, 1080),
//!         TomlSettingsStore::default_location(),
//!         HttpFetcher::new(DanmakuClient::new()?),
//!         XmlCommentConverter::new(),
//!         sink,
//!     );
//!     let session = OverlaySession::spawn(coordinator, completions);
//!
//!     session.start_load(LoadRequest::parse("https://comment.example.com/1.xml", 1280, 720)?)?;
//!     if let Some(track) = tracks.recv().await {
//!         println!("{} overlay events", track.len());
//!     }
//!     session.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod coordinator;
pub mod fetch;
pub mod layout;
pub mod session;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::overlay::ConvertError;

pub use coordinator::{
    CompletionOutcome, CompletionReceiver, CoordinatorState, FetchCompletion, RequestCoordinator,
};
pub use fetch::{FetchError, Fetcher, HttpFetcher};
pub use layout::{clamp_to_display, resolve_layout, EffectiveLayout, LayoutOverrides};
pub use session::{OverlaySession, SessionClosed, SessionHandle};

/// One overlay load, as issued by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadRequest {
    /// Where to fetch the comment document
    pub source: Url,
    /// Declared video width in pixels, must be > 0
    pub width: u32,
    /// Declared video height in pixels, must be > 0
    pub height: u32,
}

impl LoadRequest {
    /// Create a request
    #[must_use]
    pub fn new(source: Url, width: u32, height: u32) -> Self {
        Self {
            source,
            width,
            height,
        }
    }

    /// Create a request from a URL string
    pub fn parse(source: &str, width: u32, height: u32) -> Result<Self, url::ParseError> {
        Ok(Self::new(Url::parse(source)?, width, height))
    }
}

/// Why a load produced no overlay
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: Url,
        #[source]
        source: FetchError,
    },

    #[error("failed to convert {url}: {source}")]
    Convert {
        url: Url,
        #[source]
        source: ConvertError,
    },
}

impl LoadError {
    /// Source location of the failed load
    #[must_use]
    pub fn url(&self) -> &Url {
        match self {
            Self::Fetch { url, .. } | Self::Convert { url, .. } => url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request() {
        let req = LoadRequest::parse("https://comment.example.com/42.xml", 1280, 720).unwrap();
        assert_eq!(req.source.host_str(), Some("comment.example.com"));
        assert_eq!((req.width, req.height), (1280, 720));
    }

    #[test]
    fn test_parse_request_rejects_bad_url() {
        assert!(LoadRequest::parse("not a url", 1280, 720).is_err());
    }

    #[test]
    fn test_load_error_url() {
        let url = Url::parse("https://comment.example.com/42.xml").unwrap();
        let err = LoadError::Convert {
            url: url.clone(),
            source: ConvertError::Other("boom".into()),
        };
        assert_eq!(err.url(), &url);
        assert!(err.to_string().contains("boom"));
    }
}
