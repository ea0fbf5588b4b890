//! Platform defaults supplied by the environment.

/// Font family used when the user has not chosen one
#[must_use]
pub fn default_font_family() -> &'static str {
    #[cfg(target_os = "macos")]
    {
        "PingFang SC"
    }
    #[cfg(not(target_os = "macos"))]
    {
        "sans-serif"
    }
}
