//! Comment placement.
//!
//! Scrolling comments share horizontal lanes; a comment takes the first lane
//! where it neither overlaps the previous comment's tail on entry nor
//! catches up with it before that one leaves the screen. Top and bottom
//! comments hold a lane for their whole display time. Comments larger than
//! the base font size span several adjacent lanes. Comments that find no
//! free lane are dropped.

use serde::{Deserialize, Serialize};

use super::comment::{Comment, CommentMode, NOMINAL_SIZE};
use crate::loader::EffectiveLayout;

/// How an event is drawn. Coordinates are the top-left of the text box for
/// moves, and the top-centre for fixed comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawEffect {
    /// Linear movement over the whole event
    Move { from: (i32, i32), to: (i32, i32) },
    /// Stationary
    Fixed { x: i32, y: i32 },
}

/// One renderable, timed overlay event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayEvent {
    /// Start time in milliseconds
    pub start_ms: u64,
    /// End time in milliseconds
    pub end_ms: u64,
    /// Text to draw
    pub text: String,
    /// Colour as 0xRRGGBB
    pub color: u32,
    /// Font size in pixels
    pub font_size: u32,
    /// Position / movement
    pub effect: DrawEffect,
}

#[derive(Debug, Clone, Copy)]
struct ScrollSlot {
    start_ms: f64,
    width: f64,
    speed: f64,
}

/// Estimated rendered width: full-width glyphs are `font_size` wide,
/// ASCII glyphs half that.
#[must_use]
pub fn text_width(text: &str, font_size: u32) -> u32 {
    let half = font_size.div_ceil(2);
    text.chars()
        .map(|c| if c.is_ascii() { half } else { font_size })
        .fold(0u32, u32::saturating_add)
}

/// First lane index where `span` consecutive lanes are all `free`
fn first_span<T>(lanes: &[T], span: usize, free: impl Fn(&T) -> bool) -> Option<usize> {
    (0..=lanes.len().saturating_sub(span)).find(|&i| lanes[i..i + span].iter().all(&free))
}

fn to_px(v: f64) -> i32 {
    #[allow(clippy::cast_possible_truncation)]
    let px = v.round() as i32;
    px
}

/// Lane allocator for one layout
pub struct Canvas<'a> {
    layout: &'a EffectiveLayout,
    lane_height: u32,
    scroll: Vec<Option<ScrollSlot>>,
    reverse: Vec<Option<ScrollSlot>>,
    top: Vec<u64>,
    bottom: Vec<u64>,
}

impl<'a> Canvas<'a> {
    /// Create an empty canvas sized for `layout`
    #[must_use]
    pub fn new(layout: &'a EffectiveLayout) -> Self {
        let lane_height = layout.font_size.max(1);
        let lanes = (layout.height / lane_height).max(1) as usize;
        Self {
            layout,
            lane_height,
            scroll: vec![None; lanes],
            reverse: vec![None; lanes],
            top: vec![0; lanes],
            bottom: vec![0; lanes],
        }
    }

    /// Number of lanes available to each comment kind
    #[must_use]
    pub fn lanes(&self) -> usize {
        self.scroll.len()
    }

    /// Font size for a comment, scaled from the document's nominal size
    fn font_size_for(&self, comment: &Comment) -> u32 {
        let scaled =
            u64::from(self.layout.font_size) * u64::from(comment.size) / u64::from(NOMINAL_SIZE);
        u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
    }

    /// Number of lanes a comment drawn at `font_size` covers
    fn span_for(&self, font_size: u32) -> usize {
        let span = font_size.div_ceil(self.lane_height).max(1) as usize;
        span.min(self.lanes())
    }

    /// Place `comment`, returning `None` when it cannot be shown.
    ///
    /// Comments must be fed in ascending time order.
    pub fn draw(&mut self, comment: Comment) -> Option<OverlayEvent> {
        let font_size = self.font_size_for(&comment);
        match comment.mode {
            CommentMode::Scroll | CommentMode::ReverseScroll => {
                self.draw_scroll(comment, font_size)
            }
            CommentMode::Top | CommentMode::Bottom => self.draw_still(comment, font_size),
        }
    }

    fn draw_scroll(&mut self, comment: Comment, font_size: u32) -> Option<OverlayEvent> {
        let duration_ms = u64::from(self.layout.scroll_duration_secs) * 1000;
        if duration_ms == 0 {
            return None;
        }

        let screen = f64::from(self.layout.width);
        let width = f64::from(text_width(&comment.text, font_size));
        #[allow(clippy::cast_precision_loss)]
        let (start, duration) = (comment.time_ms as f64, duration_ms as f64);
        let speed = (screen + width) / duration;
        let span = self.span_for(font_size);

        let lanes = if comment.mode == CommentMode::Scroll {
            &mut self.scroll
        } else {
            &mut self.reverse
        };

        let lane = first_span(&lanes[..], span, |slot| match slot {
            None => true,
            Some(prev) => {
                let tail_entered = start >= prev.start_ms + prev.width / prev.speed;
                let never_catches = speed <= prev.speed
                    || start + screen / speed >= prev.start_ms + duration;
                tail_entered && never_catches
            }
        })?;

        lanes[lane..lane + span].fill(Some(ScrollSlot {
            start_ms: start,
            width,
            speed,
        }));

        let y = to_px(f64::from(self.lane_height) * lane as f64);
        let (left, right) = (to_px(-width), to_px(screen));
        let (from, to) = if comment.mode == CommentMode::Scroll {
            ((right, y), (left, y))
        } else {
            ((left, y), (right, y))
        };

        Some(OverlayEvent {
            start_ms: comment.time_ms,
            end_ms: comment.time_ms.saturating_add(duration_ms),
            text: comment.text,
            color: comment.color,
            font_size,
            effect: DrawEffect::Move { from, to },
        })
    }

    fn draw_still(&mut self, comment: Comment, font_size: u32) -> Option<OverlayEvent> {
        // Zero still duration hides top/bottom comments
        let duration_ms = u64::from(self.layout.still_duration_secs) * 1000;
        if duration_ms == 0 {
            return None;
        }

        let span = self.span_for(font_size);
        let end_ms = comment.time_ms.saturating_add(duration_ms);

        let lanes = if comment.mode == CommentMode::Top {
            &mut self.top
        } else {
            &mut self.bottom
        };
        let lane = first_span(&lanes[..], span, |&free_at| comment.time_ms >= free_at)?;
        lanes[lane..lane + span].fill(end_ms);

        let lane_height = i64::from(self.lane_height);
        let lane_px = lane_height * i64::try_from(lane).unwrap_or(i64::MAX);
        let y = if comment.mode == CommentMode::Top {
            lane_px
        } else {
            // Bottom lanes count upwards; the span's top edge is its last lane
            let span_px = lane_height * i64::try_from(span).unwrap_or(i64::MAX);
            i64::from(self.layout.height) - lane_px - span_px
        };

        Some(OverlayEvent {
            start_ms: comment.time_ms,
            end_ms,
            text: comment.text,
            color: comment.color,
            font_size,
            effect: DrawEffect::Fixed {
                x: i32::try_from(self.layout.width / 2).unwrap_or(i32::MAX),
                y: i32::try_from(y.max(0)).unwrap_or(i32::MAX),
            },
        })
    }
}
