//! Comment document conversion and overlay delivery
//!
//! Turns a raw comment document into timed overlay events sized for an
//! [`EffectiveLayout`], and defines the sink those events are handed to.
//!
//! # Example
//!
//! ```rust
//! use danmaku_loader::overlay::{AssWriter, Converter, XmlCommentConverter};
//! use danmaku_loader::loader::EffectiveLayout;
//!
//! let layout = EffectiveLayout {
//!     width: 1280,
//!     height: 720,
//!     font_family: "sans-serif".to_string(),
//!     font_size: 36,
//!     scroll_duration_secs: 10,
//!     still_duration_secs: 5,
//!     opacity: 0.8,
//! };
//! let doc = br#"<i><d p="1.5,1,25,16777215">hello</d></i>"#;
//! let track = XmlCommentConverter::new().convert(doc, &layout).unwrap();
//! assert_eq!(track.events.len(), 1);
//! assert!(AssWriter::new().render(&track).contains("hello"));
//! ```

pub mod ass;
pub mod canvas;
pub mod comment;
pub mod sink;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::loader::EffectiveLayout;

pub use ass::AssWriter;
pub use canvas::{Canvas, DrawEffect, OverlayEvent};
pub use comment::{parse_document, Comment, CommentMode};
pub use sink::{ChannelSink, OverlaySink};

/// Conversion errors
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("document is not UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("conversion failed: {0}")]
    Other(String),
}

/// Converted overlay events together with the layout they were placed for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayTrack {
    /// Layout the events were placed for
    pub layout: EffectiveLayout,
    /// Events in ascending start time
    pub events: Vec<OverlayEvent>,
}

impl OverlayTrack {
    /// Number of events
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the track has no events
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Converts a raw comment document into overlay events.
///
/// Implementations are synchronous; the raw document is consumed once and
/// not retained.
pub trait Converter: Send + Sync + 'static {
    /// Convert `raw` for `layout`
    fn convert(&self, raw: &[u8], layout: &EffectiveLayout) -> Result<OverlayTrack, ConvertError>;
}

/// Default converter for XML comment documents
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlCommentConverter;

impl XmlCommentConverter {
    /// Create a new converter
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Converter for XmlCommentConverter {
    fn convert(&self, raw: &[u8], layout: &EffectiveLayout) -> Result<OverlayTrack, ConvertError> {
        let comments = parse_document(raw)?;
        let total = comments.len();

        let mut canvas = Canvas::new(layout);
        let mut events: Vec<OverlayEvent> = comments
            .into_iter()
            .filter_map(|c| canvas.draw(c))
            .collect();
        events.sort_by_key(|e| e.start_ms);

        debug!(
            comments = total,
            events = events.len(),
            width = layout.width,
            height = layout.height,
            "Converted comment document"
        );

        Ok(OverlayTrack {
            layout: layout.clone(),
            events,
        })
    }
}

impl<F> Converter for F
where
    F: Fn(&[u8], &EffectiveLayout) -> Result<OverlayTrack, ConvertError> + Send + Sync + 'static,
{
    fn convert(&self, raw: &[u8], layout: &EffectiveLayout) -> Result<OverlayTrack, ConvertError> {
        self(raw, layout)
    }
}
