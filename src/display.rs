//! Display geometry queried at the start of every overlay load.
//!
//! The active display may change between loads (window moved to another
//! monitor, resolution switch), so providers are asked for fresh bounds on
//! each request instead of having them cached.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest area an overlay may be laid out for, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayBounds {
    /// Maximum usable width.
    pub max_width: u32,
    /// Maximum usable height.
    pub max_height: u32,
}

impl DisplayBounds {
    /// Create bounds for a `max_width` x `max_height` display
    #[must_use]
    pub fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width,
            max_height,
        }
    }
}

impl Default for DisplayBounds {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}

impl fmt::Display for DisplayBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.max_width, self.max_height)
    }
}

/// Error returned when parsing a `WIDTHxHEIGHT` string fails
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid display size '{0}', expected WIDTHxHEIGHT with both dimensions > 0")]
pub struct ParseBoundsError(String);

impl FromStr for DisplayBounds {
    type Err = ParseBoundsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseBoundsError(s.to_string());
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(err)?;
        let max_width: u32 = w.trim().parse().map_err(|_| err())?;
        let max_height: u32 = h.trim().parse().map_err(|_| err())?;
        if max_width == 0 || max_height == 0 {
            return Err(err());
        }
        Ok(Self::new(max_width, max_height))
    }
}

/// Source of the current display bounds.
///
/// Queried synchronously once per load. Implementations must not block.
pub trait DisplayBoundsProvider: Send + Sync {
    /// Bounds of the display the video is currently shown on
    fn current_bounds(&self) -> DisplayBounds;
}

impl DisplayBoundsProvider for DisplayBounds {
    fn current_bounds(&self) -> DisplayBounds {
        *self
    }
}

impl<F> DisplayBoundsProvider for F
where
    F: Fn() -> DisplayBounds + Send + Sync,
{
    fn current_bounds(&self) -> DisplayBounds {
        self()
    }
}
