use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use tokio::sync::mpsc;

use danmaku_loader::http_client::{ClientConfig, DanmakuClient};
use danmaku_loader::loader::{HttpFetcher, LoadRequest, OverlaySession, RequestCoordinator};
use danmaku_loader::overlay::{ChannelSink, XmlCommentConverter};

use crate::LayoutArgs;

pub async fn cmd_load(
    url: &str,
    args: &LayoutArgs,
    output: Option<&Path>,
    timeout_secs: Option<u64>,
) -> Result<()> {
    let request = LoadRequest::parse(url, args.width, args.height)
        .with_context(|| format!("invalid URL: {url}"))?;

    let mut config = ClientConfig::default();
    if let Some(secs) = timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    let fetcher = HttpFetcher::new(DanmakuClient::with_config(&config)?);

    let (sink, mut tracks) = ChannelSink::new();
    let (err_tx, mut errors) = mpsc::unbounded_channel();
    let (coordinator, completions) = RequestCoordinator::new(
        args.display,
        super::settings_store(args),
        fetcher,
        XmlCommentConverter::new(),
        sink,
    );
    let session = OverlaySession::spawn(coordinator.with_error_channel(err_tx), completions);

    eprintln!("🌐 Loading: {url}");
    let start = Instant::now();
    session.start_load(request)?;

    let result = tokio::select! {
        track = tracks.recv() => track.context("overlay session stopped unexpectedly"),
        err = errors.recv() => match err {
            Some(e) => Err(e.into()),
            None => Err(anyhow!("overlay session stopped unexpectedly")),
        },
    };
    session.shutdown().await;

    let track = result?;
    eprintln!(
        "✅ {} events for {}x{} in {:.2}s",
        track.len(),
        track.layout.width,
        track.layout.height,
        start.elapsed().as_secs_f64()
    );

    super::output::write_track(&track, output).await
}
