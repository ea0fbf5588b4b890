//! `danmaku-loader` - danmaku overlays for video playback
//!
//! # Features
//!
//! - **Single-flight loading**: one comment-document transfer at a time,
//!   a new load cancels the previous one
//! - **Resolution-aware layout**: video size fitted to the display, font
//!   size and timings tiered by width, user overrides from a TOML file
//! - **Conversion**: XML comment documents placed into scroll/top/bottom
//!   lanes and rendered as ASS
//!
//! # Example
//!
//! ```rust
//! use danmaku_loader::display::DisplayBounds;
//! use danmaku_loader::loader::{resolve_layout, LayoutOverrides};
//!
//! let layout = resolve_layout(
//!     1920,
//!     1200,
//!     DisplayBounds::new(1920, 1080),
//!     &LayoutOverrides::default(),
//!     "sans-serif",
//! );
//! assert_eq!((layout.width, layout.height), (1728, 1080));
//! assert_eq!(layout.font_size, 36);
//! ```

pub mod display;
pub mod http_client;
pub mod loader;
pub mod overlay;
pub mod platform;
pub mod settings;

pub use display::{DisplayBounds, DisplayBoundsProvider};
pub use http_client::{ClientConfig, DanmakuClient};
pub use loader::{
    EffectiveLayout, HttpFetcher, LayoutOverrides, LoadError, LoadRequest, OverlaySession,
    RequestCoordinator, SessionHandle,
};
pub use overlay::{AssWriter, ChannelSink, Converter, OverlaySink, OverlayTrack, XmlCommentConverter};
pub use settings::{SettingsStore, TomlSettingsStore};

/// Version of danmaku-loader
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
