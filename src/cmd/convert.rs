use std::path::Path;

use anyhow::{Context, Result};
use danmaku_loader::overlay::{Converter, XmlCommentConverter};

use crate::LayoutArgs;

pub async fn cmd_convert(input: &Path, args: &LayoutArgs, output: Option<&Path>) -> Result<()> {
    let raw = tokio::fs::read(input)
        .await
        .with_context(|| format!("failed to read {}", input.display()))?;

    let layout = super::resolve(args);
    eprintln!(
        "🎬 Converting {} for {}x{} (font {} {}px)",
        input.display(),
        layout.width,
        layout.height,
        layout.font_family,
        layout.font_size
    );

    let track = XmlCommentConverter::new()
        .convert(&raw, &layout)
        .with_context(|| format!("failed to convert {}", input.display()))?;

    super::output::write_track(&track, output).await
}
