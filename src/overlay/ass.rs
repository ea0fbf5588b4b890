//! ASS (Advanced `SubStation` Alpha) rendering of overlay tracks.

use std::fmt::Write as FmtWrite;
use std::path::Path;

use anyhow::Result;
use tokio::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::canvas::{DrawEffect, OverlayEvent};
use super::OverlayTrack;
use crate::loader::EffectiveLayout;

/// Style name every danmaku event refers to
pub const STYLE_NAME: &str = "Danmaku";

/// Format time as ASS timestamp (H:MM:SS.cc)
#[must_use]
pub fn format_ass_time(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let centis = (ms % 1000) / 10;
    format!("{hours}:{minutes:02}:{seconds:02}.{centis:02}")
}

/// ASS alpha byte for an opacity in `[0, 1]` (`00` opaque, `FF` invisible)
#[must_use]
pub fn alpha_byte(opacity: f64) -> u8 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let alpha = ((1.0 - opacity.clamp(0.0, 1.0)) * 255.0).round() as u8;
    alpha
}

/// 0xRRGGBB to ASS `BBGGRR`
fn bgr(color: u32) -> String {
    let r = (color >> 16) & 0xFF;
    let g = (color >> 8) & 0xFF;
    let b = color & 0xFF;
    format!("{b:02X}{g:02X}{r:02X}")
}

/// Escape special characters for ASS dialogue text.
///
/// libass has no escape for the backslash itself; a word joiner after it
/// keeps sequences like `\n` or `\h` from being read as tags.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\u{2060}"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '\n' => out.push_str("\\N"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Font name safe to embed in the comma-separated `Style:` line
fn style_font_name(family: &str) -> String {
    family.replace(',', "").trim().to_string()
}

/// Renders [`OverlayTrack`]s as ASS scripts
#[derive(Debug, Clone)]
pub struct AssWriter {
    /// Script title
    pub title: String,
    /// Outline width around text
    pub outline: f32,
}

impl Default for AssWriter {
    fn default() -> Self {
        Self {
            title: "danmaku".to_string(),
            outline: 1.0,
        }
    }
}

impl AssWriter {
    /// Create a writer with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set script title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    fn style_line(&self, layout: &EffectiveLayout) -> String {
        let alpha = alpha_byte(layout.opacity);
        format!(
            "Style: {STYLE_NAME},{},{},&H{alpha:02X}FFFFFF,&H{alpha:02X}FFFFFF,\
             &H{alpha:02X}000000,&H{alpha:02X}000000,0,0,0,0,100,100,0,0,1,{},0,7,0,0,0,0",
            style_font_name(&layout.font_family),
            layout.font_size,
            self.outline
        )
    }

    fn header(&self, layout: &EffectiveLayout) -> String {
        let mut header = String::new();

        // Writing to a String cannot fail
        let _ = writeln!(header, "[Script Info]");
        let _ = writeln!(header, "Title: {}", self.title);
        let _ = writeln!(header, "ScriptType: v4.00+");
        let _ = writeln!(header, "PlayResX: {}", layout.width);
        let _ = writeln!(header, "PlayResY: {}", layout.height);
        let _ = writeln!(header, "ScaledBorderAndShadow: yes");
        let _ = writeln!(header, "WrapStyle: 2");
        let _ = writeln!(header);

        let _ = writeln!(header, "[V4+ Styles]");
        let _ = writeln!(
            header,
            "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, \
             OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, \
             ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, \
             MarginL, MarginR, MarginV, Encoding"
        );
        let _ = writeln!(header, "{}", self.style_line(layout));
        let _ = writeln!(header);

        let _ = writeln!(header, "[Events]");
        let _ = writeln!(
            header,
            "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text"
        );

        header
    }

    /// Override tags placing and colouring one event
    fn tags(event: &OverlayEvent, layout: &EffectiveLayout) -> String {
        let mut tags = String::from("{");
        match event.effect {
            DrawEffect::Move { from, to } => {
                let _ = write!(tags, "\\move({},{},{},{})", from.0, from.1, to.0, to.1);
            }
            DrawEffect::Fixed { x, y } => {
                let _ = write!(tags, "\\an8\\pos({x},{y})");
            }
        }
        if event.color != 0x00FF_FFFF {
            let _ = write!(tags, "\\c&H{}&", bgr(event.color));
        }
        if event.color == 0 {
            // Black text needs a light outline to stay readable
            let _ = write!(tags, "\\3c&HFFFFFF&");
        }
        if event.font_size != layout.font_size {
            let _ = write!(tags, "\\fs{}", event.font_size);
        }
        tags.push('}');
        tags
    }

    /// Render one dialogue line
    #[must_use]
    pub fn dialogue(event: &OverlayEvent, layout: &EffectiveLayout) -> String {
        format!(
            "Dialogue: 2,{},{},{STYLE_NAME},,0,0,0,,{}{}",
            format_ass_time(event.start_ms),
            format_ass_time(event.end_ms),
            Self::tags(event, layout),
            escape(&event.text)
        )
    }

    /// Render a full ASS script for `track`
    #[must_use]
    pub fn render(&self, track: &OverlayTrack) -> String {
        let mut output = self.header(&track.layout);
        for event in &track.events {
            output.push_str(&Self::dialogue(event, &track.layout));
            output.push('\n');
        }
        output
    }

    /// Write the script for `track` to a file
    pub async fn write_to_file(&self, track: &OverlayTrack, path: &Path) -> Result<()> {
        fs::write(path, self.render(track)).await?;
        Ok(())
    }

    /// Write the script for `track` to an async writer
    pub async fn write_to<W: AsyncWrite + Unpin + Send>(
        &self,
        track: &OverlayTrack,
        writer: &mut W,
    ) -> Result<()> {
        writer.write_all(self.render(track).as_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }
}
