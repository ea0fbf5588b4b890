//! Comment document parsing.
//!
//! The document is the XML format served by Bilibili-style comment
//! endpoints:
//!
//! ```xml
//! <i>
//!   <d p="12.5,1,25,16777215,1422201084,0,eff68b3b,757060147">text</d>
//! </i>
//! ```
//!
//! `p` holds `time,mode,size,color,...`; trailing fields are ignored.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ConvertError;

/// Nominal font size used by the comment document
pub const NOMINAL_SIZE: u32 = 25;

/// How a comment moves on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommentMode {
    /// Scrolls right to left
    Scroll,
    /// Scrolls left to right
    ReverseScroll,
    /// Fixed at the top
    Top,
    /// Fixed at the bottom
    Bottom,
}

impl CommentMode {
    /// Map the document's numeric mode. Positioned (7) and scripted (8)
    /// comments have no mapping.
    #[must_use]
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1..=3 => Some(Self::Scroll),
            4 => Some(Self::Bottom),
            5 => Some(Self::Top),
            6 => Some(Self::ReverseScroll),
            _ => None,
        }
    }

    /// Whether the comment moves across the screen
    #[must_use]
    pub fn is_scrolling(self) -> bool {
        matches!(self, Self::Scroll | Self::ReverseScroll)
    }
}

/// A single parsed comment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Appearance time in milliseconds from the start of the video
    pub time_ms: u64,
    /// Movement mode
    pub mode: CommentMode,
    /// Size in document units (25 = normal)
    pub size: u32,
    /// Colour as 0xRRGGBB
    pub color: u32,
    /// Comment text
    pub text: String,
}

impl Comment {
    /// Parse the `p` attribute and text of one `<d>` element.
    ///
    /// Returns `None` for unsupported modes and malformed attributes.
    #[must_use]
    pub fn from_attrs(p: &str, text: &str) -> Option<Self> {
        let mut fields = p.split(',').map(str::trim);

        let time: f64 = fields.next()?.parse().ok()?;
        if !time.is_finite() || time < 0.0 {
            return None;
        }
        let mode = CommentMode::from_code(fields.next()?.parse().ok()?)?;
        let size: u32 = fields.next().and_then(|s| s.parse().ok()).unwrap_or(NOMINAL_SIZE);
        let color: u32 = fields
            .next()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0x00FF_FFFF)
            & 0x00FF_FFFF;

        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let time_ms = (time * 1000.0).round() as u64;

        Some(Self {
            time_ms,
            mode,
            size: if size == 0 { NOMINAL_SIZE } else { size },
            color,
            text: text.to_string(),
        })
    }
}

/// Parse a comment document into comments sorted by appearance time.
///
/// Individual malformed or unsupported comments are skipped.
pub fn parse_document(raw: &[u8]) -> Result<Vec<Comment>, ConvertError> {
    let text = std::str::from_utf8(raw)?;
    // roxmltree rejects a leading BOM
    let text = text.trim_start_matches('\u{feff}');
    let doc = roxmltree::Document::parse(text)?;

    let mut comments = Vec::new();
    let mut skipped = 0usize;

    for node in doc.root_element().children().filter(|n| n.has_tag_name("d")) {
        let p = node.attribute("p").unwrap_or_default();
        let body: String = node
            .descendants()
            .filter(roxmltree::Node::is_text)
            .filter_map(|n| n.text())
            .collect();

        match Comment::from_attrs(p, &body) {
            Some(comment) => comments.push(comment),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(skipped, kept = comments.len(), "Skipped unsupported comments");
    }

    comments.sort_by_key(|c| c.time_ms);
    Ok(comments)
}
