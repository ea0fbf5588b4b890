use std::path::Path;

use anyhow::{Context, Result};
use danmaku_loader::overlay::{AssWriter, OverlayTrack};

/// Write `track` as ASS to `output`, or stdout when no path is given
pub async fn write_track(track: &OverlayTrack, output: Option<&Path>) -> Result<()> {
    let writer = AssWriter::new();
    match output {
        Some(path) => {
            writer
                .write_to_file(track, path)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("💾 Saved {} events to {}", track.len(), path.display());
        }
        None => {
            let mut stdout = tokio::io::stdout();
            writer.write_to(track, &mut stdout).await?;
        }
    }
    Ok(())
}
