pub mod convert;
pub mod layout;
pub mod load;
pub mod output;

use danmaku_loader::loader::{resolve_layout, EffectiveLayout};
use danmaku_loader::platform::default_font_family;
use danmaku_loader::settings::{SettingsStore, TomlSettingsStore};

use crate::LayoutArgs;

/// Settings file plus command-line overrides on top
pub fn settings_store(args: &LayoutArgs) -> TomlSettingsStore {
    let store = match &args.settings {
        Some(path) => TomlSettingsStore::new(path),
        None => TomlSettingsStore::default_location(),
    };
    store.with_overrides(args.overrides())
}

/// Resolve the layout the way a load would
pub fn resolve(args: &LayoutArgs) -> EffectiveLayout {
    let overrides = settings_store(args).overrides();
    resolve_layout(
        args.width,
        args.height,
        args.display,
        &overrides,
        default_font_family(),
    )
}
