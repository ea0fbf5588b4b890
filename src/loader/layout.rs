//! Layout parameter resolution.
//!
//! Turns the declared video size, the current display bounds and the user's
//! overrides into the [`EffectiveLayout`] one overlay load is rendered with.
//! Pure: no I/O, no side effects.

use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

use crate::display::DisplayBounds;

/// User overrides for layout parameters. `None` means "use the default".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutOverrides {
    /// Font family. An empty string is treated as unset.
    pub font_family: Option<String>,
    /// Base font size in pixels
    pub font_size: Option<NonZeroU32>,
    /// Seconds a scrolling comment takes to cross the screen
    pub scroll_duration: Option<NonZeroU32>,
    /// Seconds a top/bottom comment stays on screen. Zero is a real value.
    pub still_duration: Option<u32>,
    /// Text opacity as a percentage, 0-100
    pub opacity_percent: Option<f64>,
}

impl LayoutOverrides {
    /// Set font family
    #[must_use]
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = Some(family.into());
        self
    }

    /// Set font size; zero clears the override
    #[must_use]
    pub fn with_font_size(mut self, size: u32) -> Self {
        self.font_size = NonZeroU32::new(size);
        self
    }

    /// Set scroll duration in seconds; zero clears the override
    #[must_use]
    pub fn with_scroll_duration(mut self, secs: u32) -> Self {
        self.scroll_duration = NonZeroU32::new(secs);
        self
    }

    /// Set still duration in seconds
    #[must_use]
    pub fn with_still_duration(mut self, secs: u32) -> Self {
        self.still_duration = Some(secs);
        self
    }

    /// Set opacity percentage
    #[must_use]
    pub fn with_opacity_percent(mut self, percent: f64) -> Self {
        self.opacity_percent = Some(percent);
        self
    }

    /// Layer `other` on top of `self`: any override set in `other` wins.
    ///
    /// Unset fields of `other` fall through to `self`, so a zero font size
    /// or scroll duration in `other` does not reset a value from `self`.
    #[must_use]
    pub fn merged_with(self, other: LayoutOverrides) -> Self {
        Self {
            font_family: other.font_family.or(self.font_family),
            font_size: other.font_size.or(self.font_size),
            scroll_duration: other.scroll_duration.or(self.scroll_duration),
            still_duration: other.still_duration.or(self.still_duration),
            opacity_percent: other.opacity_percent.or(self.opacity_percent),
        }
    }
}

/// Rendering parameters resolved for a single overlay load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveLayout {
    /// Render width in pixels, never larger than the display
    pub width: u32,
    /// Render height in pixels, never larger than the display
    pub height: u32,
    /// Font family name
    pub font_family: String,
    /// Base font size in pixels
    pub font_size: u32,
    /// Seconds a scrolling comment is visible
    pub scroll_duration_secs: u32,
    /// Seconds a still comment is visible
    pub still_duration_secs: u32,
    /// Text opacity in `[0, 1]`
    pub opacity: f64,
}

/// Scale `value` by `num / den` with truncating integer division.
fn scale(value: u32, num: u32, den: u32) -> u32 {
    let scaled = u64::from(value) * u64::from(num) / u64::from(den.max(1));
    u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
}

/// Fit the requested video size into the display, keeping the aspect ratio.
///
/// The height clamp is tried first. When the width still overflows after
/// it (very wide video), the width is clamped as well.
#[must_use]
pub fn clamp_to_display(width: u32, height: u32, bounds: DisplayBounds) -> (u32, u32) {
    let (mut w, mut h) = (width.max(1), height.max(1));

    if h > bounds.max_height {
        w = scale(w, bounds.max_height, h);
        h = bounds.max_height;
    } else if w > bounds.max_width {
        h = scale(h, bounds.max_width, w);
        w = bounds.max_width;
    }

    if w > bounds.max_width {
        h = scale(h, bounds.max_width, w);
        w = bounds.max_width;
    }

    (w, h)
}

/// Default font size for a render width
#[must_use]
pub fn tiered_font_size(width: u32) -> u32 {
    if width > 960 {
        36
    } else if width > 640 {
        32
    } else {
        28
    }
}

/// Default scroll duration (seconds) for a render width
#[must_use]
pub fn tiered_scroll_duration(width: u32) -> u32 {
    if width > 960 {
        10
    } else if width > 640 {
        8
    } else {
        6
    }
}

/// Resolve the layout for one load.
///
/// `default_font` is the environment's fallback family, used when the
/// overrides carry none.
#[must_use]
pub fn resolve_layout(
    requested_width: u32,
    requested_height: u32,
    bounds: DisplayBounds,
    overrides: &LayoutOverrides,
    default_font: &str,
) -> EffectiveLayout {
    let (width, height) = clamp_to_display(requested_width, requested_height, bounds);

    let font_family = overrides
        .font_family
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .unwrap_or(default_font)
        .to_string();

    let font_size = overrides
        .font_size
        .map_or_else(|| tiered_font_size(width), NonZeroU32::get);

    let scroll_duration_secs = overrides
        .scroll_duration
        .map_or_else(|| tiered_scroll_duration(width), NonZeroU32::get);

    let still_duration_secs = overrides.still_duration.unwrap_or(0);

    let opacity = overrides
        .opacity_percent
        .filter(|p| p.is_finite())
        .map_or(0.0, |p| p.clamp(0.0, 100.0) / 100.0);

    EffectiveLayout {
        width,
        height,
        font_family,
        font_size,
        scroll_duration_secs,
        still_duration_secs,
        opacity,
    }
}
