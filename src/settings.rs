//! User settings loaded from `~/.config/danmaku-loader/settings.toml`.
//!
//! ```toml
//! [danmaku]
//! font = "Noto Sans CJK SC"
//! font_size = 0     # 0 = pick by video width
//! dm = 0            # scroll duration, 0 = pick by video width
//! ds = 5            # still-comment duration, 0 hides them
//! alpha = 80        # text opacity in percent
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

use crate::loader::LayoutOverrides;

/// The `[danmaku]` table. Zero and empty values mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DanmakuSettings {
    /// Font family
    #[serde(default)]
    pub font: Option<String>,
    /// Font size in pixels
    #[serde(default)]
    pub font_size: u32,
    /// Scroll duration in seconds
    #[serde(default)]
    pub dm: u32,
    /// Still-comment duration in seconds
    #[serde(default)]
    pub ds: u32,
    /// Text opacity in percent
    #[serde(default)]
    pub alpha: Option<f64>,
}

impl DanmakuSettings {
    /// Convert to explicit overrides
    #[must_use]
    pub fn to_overrides(&self) -> LayoutOverrides {
        let mut overrides = LayoutOverrides::default()
            .with_font_size(self.font_size)
            .with_scroll_duration(self.dm)
            .with_still_duration(self.ds);
        overrides.font_family = self.font.clone().filter(|f| !f.trim().is_empty());
        overrides.opacity_percent = self.alpha;
        overrides
    }
}

/// Top-level settings file.
#[derive(Debug, Clone, Deserialize, Default)]
struct SettingsFile {
    #[serde(default)]
    danmaku: DanmakuSettings,
}

/// Parse settings from TOML text.
pub fn parse_settings(content: &str) -> Result<DanmakuSettings> {
    let file: SettingsFile = toml::from_str(content)?;
    Ok(file.danmaku)
}

/// Load settings from `path`.
///
/// Returns defaults if the file doesn't exist (settings are optional).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_settings(path: &Path) -> Result<DanmakuSettings> {
    if !path.exists() {
        return Ok(DanmakuSettings::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    parse_settings(&content).with_context(|| format!("invalid TOML in {}", path.display()))
}

/// Return the path to the default settings file.
#[must_use]
pub fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("danmaku-loader")
        .join("settings.toml")
}

/// Read-only source of layout overrides, queried once per load.
pub trait SettingsStore: Send + Sync {
    /// Current overrides
    fn overrides(&self) -> LayoutOverrides;
}

impl SettingsStore for LayoutOverrides {
    fn overrides(&self) -> LayoutOverrides {
        self.clone()
    }
}

/// Settings backed by a TOML file, re-read on every query so edits apply
/// to the next load.
#[derive(Debug, Clone)]
pub struct TomlSettingsStore {
    path: PathBuf,
    extra: LayoutOverrides,
}

impl TomlSettingsStore {
    /// Store reading `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            extra: LayoutOverrides::default(),
        }
    }

    /// Store reading the default settings path
    #[must_use]
    pub fn default_location() -> Self {
        Self::new(default_settings_path())
    }

    /// Overrides applied on top of whatever the file says
    #[must_use]
    pub fn with_overrides(mut self, extra: LayoutOverrides) -> Self {
        self.extra = extra;
        self
    }

    /// Path this store reads
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for TomlSettingsStore {
    fn overrides(&self) -> LayoutOverrides {
        let from_file = match load_settings(&self.path) {
            Ok(settings) => settings.to_overrides(),
            Err(e) => {
                warn!("Ignoring settings: {e:#}");
                LayoutOverrides::default()
            }
        };
        from_file.merged_with(self.extra.clone())
    }
}
