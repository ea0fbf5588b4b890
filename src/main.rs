//! `danmaku-loader` CLI - fetch and convert danmaku overlays

mod cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use danmaku_loader::display::DisplayBounds;
use danmaku_loader::loader::LayoutOverrides;

#[derive(Parser)]
#[command(name = "danmaku-loader")]
#[command(about = "Fetch danmaku comment documents and convert them to ASS overlays")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download a comment document and convert it to ASS
    Load {
        /// URL of the comment document
        url: String,

        #[command(flatten)]
        layout: LayoutArgs,

        /// Write the ASS script here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Give up on the transfer after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Convert a local comment document to ASS
    Convert {
        /// Path to the XML comment document
        input: PathBuf,

        #[command(flatten)]
        layout: LayoutArgs,

        /// Write the ASS script here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the layout that would be used, as JSON
    Layout {
        #[command(flatten)]
        layout: LayoutArgs,
    },
}

/// Video size, display size and layout overrides shared by all commands
#[derive(Args, Debug, Clone)]
pub struct LayoutArgs {
    /// Declared video width in pixels
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    width: u32,

    /// Declared video height in pixels
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    height: u32,

    /// Display size as WIDTHxHEIGHT
    #[arg(long, default_value_t = DisplayBounds::default())]
    display: DisplayBounds,

    /// Settings file (default: ~/.config/danmaku-loader/settings.toml)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Font family
    #[arg(long)]
    font: Option<String>,

    /// Font size in pixels (0 = no override; settings file, then video width)
    #[arg(long)]
    font_size: Option<u32>,

    /// Scroll duration in seconds (0 = no override; settings file, then video width)
    #[arg(long)]
    scroll_duration: Option<u32>,

    /// Top/bottom comment duration in seconds (0 hides them)
    #[arg(long)]
    still_duration: Option<u32>,

    /// Text opacity in percent
    #[arg(long)]
    opacity: Option<f64>,
}

impl LayoutArgs {
    /// Overrides given on the command line
    fn overrides(&self) -> LayoutOverrides {
        let mut overrides = LayoutOverrides::default();
        if let Some(font) = &self.font {
            overrides = overrides.with_font_family(font.clone());
        }
        if let Some(size) = self.font_size {
            overrides = overrides.with_font_size(size);
        }
        if let Some(secs) = self.scroll_duration {
            overrides = overrides.with_scroll_duration(secs);
        }
        if let Some(secs) = self.still_duration {
            overrides = overrides.with_still_duration(secs);
        }
        if let Some(percent) = self.opacity {
            overrides = overrides.with_opacity_percent(percent);
        }
        overrides
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so ASS output on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Load {
            url,
            layout,
            output,
            timeout,
        } => {
            cmd::load::cmd_load(&url, &layout, output.as_deref(), timeout).await?;
        }
        Commands::Convert {
            input,
            layout,
            output,
        } => {
            cmd::convert::cmd_convert(&input, &layout, output.as_deref()).await?;
        }
        Commands::Layout { layout } => {
            cmd::layout::cmd_layout(&layout)?;
        }
    }

    Ok(())
}
