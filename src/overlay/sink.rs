//! Rendering sinks: where finished overlay tracks are delivered.

use tokio::sync::mpsc;
use tracing::debug;

use super::OverlayTrack;

/// Receiver of converted overlay tracks.
///
/// Called from the task that owns the coordinator; implementations take
/// ownership of the track and must not block.
pub trait OverlaySink: Send + Sync + 'static {
    /// Hand over a finished track
    fn deliver(&self, track: OverlayTrack);
}

/// Sink forwarding tracks into a tokio channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<OverlayTrack>,
}

impl ChannelSink {
    /// Create a sink and the receiver its tracks arrive on
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<OverlayTrack>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl OverlaySink for ChannelSink {
    fn deliver(&self, track: OverlayTrack) {
        if self.tx.send(track).is_err() {
            debug!("Overlay receiver dropped, discarding track");
        }
    }
}

impl<F> OverlaySink for F
where
    F: Fn(OverlayTrack) + Send + Sync + 'static,
{
    fn deliver(&self, track: OverlayTrack) {
        self(track);
    }
}
