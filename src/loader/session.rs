//! Playback-session owner of a [`RequestCoordinator`].
//!
//! The coordinator lives on one task together with its completion
//! receiver. Callers talk to it through a cloneable [`SessionHandle`];
//! load requests and fetch completions are handled one at a time on that
//! task, so the coordinator needs no locking.

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::coordinator::{CompletionReceiver, RequestCoordinator};
use super::LoadRequest;

/// The session task has stopped
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("overlay session is closed")]
pub struct SessionClosed;

#[derive(Debug)]
enum SessionCommand {
    Load(LoadRequest),
    Cancel,
    Shutdown,
}

/// Caller-side handle to a running overlay session
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    /// Ask the session to load `request`, superseding any load in progress
    pub fn start_load(&self, request: LoadRequest) -> Result<(), SessionClosed> {
        self.commands
            .send(SessionCommand::Load(request))
            .map_err(|_| SessionClosed)
    }

    /// Cancel the load in progress, if any
    pub fn cancel(&self) -> Result<(), SessionClosed> {
        self.commands
            .send(SessionCommand::Cancel)
            .map_err(|_| SessionClosed)
    }

    /// Whether the session task is still accepting commands
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.commands.is_closed()
    }
}

/// A running session: the handle plus the task driving the coordinator
pub struct OverlaySession {
    handle: SessionHandle,
    task: JoinHandle<()>,
}

impl OverlaySession {
    /// Spawn the session task. Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn(coordinator: RequestCoordinator, completions: CompletionReceiver) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(coordinator, completions, rx));
        Self {
            handle: SessionHandle { commands: tx },
            task,
        }
    }

    /// A handle for issuing commands from elsewhere
    #[must_use]
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// See [`SessionHandle::start_load`]
    pub fn start_load(&self, request: LoadRequest) -> Result<(), SessionClosed> {
        self.handle.start_load(request)
    }

    /// See [`SessionHandle::cancel`]
    pub fn cancel(&self) -> Result<(), SessionClosed> {
        self.handle.cancel()
    }

    /// Cancel any outstanding load and wait for the task to finish
    pub async fn shutdown(self) {
        let _ = self.handle.commands.send(SessionCommand::Shutdown);
        if let Err(e) = self.task.await {
            debug!("Overlay session task ended abnormally: {e}");
        }
    }
}

async fn run(
    mut coordinator: RequestCoordinator,
    mut completions: CompletionReceiver,
    mut commands: mpsc::UnboundedReceiver<SessionCommand>,
) {
    debug!("Overlay session started");
    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(SessionCommand::Load(request)) => coordinator.start_load(request),
                Some(SessionCommand::Cancel) => {
                    coordinator.cancel();
                }
                Some(SessionCommand::Shutdown) | None => break,
            },
            Some(completion) = completions.recv() => {
                let outcome = coordinator.handle_completion(completion);
                debug!(?outcome, "Fetch completion handled");
            }
        }
    }
    coordinator.cancel();
    info!("Overlay session stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DisplayBounds;
    use crate::loader::{FetchError, Fetcher, LayoutOverrides};
    use crate::overlay::{ChannelSink, XmlCommentConverter};
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::time::Duration;
    use url::Url;

    /// Serves a fixed document after a per-URL delay encoded in the path
    struct SlowFetcher;

    #[async_trait]
    impl Fetcher for SlowFetcher {
        async fn fetch(&self, url: &Url) -> Result<Bytes, FetchError> {
            if url.path().contains("slow") {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            if url.path().contains("missing") {
                return Err(FetchError::Status {
                    url: url.clone(),
                    status: 404,
                });
            }
            Ok(Bytes::from(format!(
                r#"<i><d p="1,1,25,16777215">{}</d></i>"#,
                url.path().trim_start_matches('/')
            )))
        }
    }

    fn session() -> (OverlaySession, mpsc::UnboundedReceiver<crate::overlay::OverlayTrack>) {
        let (sink, tracks) = ChannelSink::new();
        let (coordinator, completions) = RequestCoordinator::new(
            DisplayBounds::new(1920, 1080),
            LayoutOverrides::default(),
            SlowFetcher,
            XmlCommentConverter::new(),
            sink,
        );
        (OverlaySession::spawn(coordinator, completions), tracks)
    }

    fn request(path: &str) -> LoadRequest {
        LoadRequest::parse(&format!("https://comment.example.com/{path}"), 1280, 720).unwrap()
    }

    #[tokio::test]
    async fn test_session_delivers_track() {
        let (session, mut tracks) = session();
        session.start_load(request("fast.xml")).unwrap();

        let track = tokio::time::timeout(Duration::from_secs(5), tracks.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(track.events.len(), 1);
        assert_eq!(track.events[0].text, "fast.xml");

        session.shutdown().await;
    }

    #[tokio::test]
    async fn test_new_load_replaces_stuck_load() {
        let (session, mut tracks) = session();
        session.start_load(request("slow.xml")).unwrap();
        session.start_load(request("fast.xml")).unwrap();

        let track = tokio::time::timeout(Duration::from_secs(5), tracks.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(track.events[0].text, "fast.xml");

        session.shutdown().await;
        assert!(tracks.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_failed_load_delivers_nothing() {
        let (session, mut tracks) = session();
        session.start_load(request("missing.xml")).unwrap();
        // Let the failing transfer complete before the next load
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(tracks.try_recv().is_err());
        session.start_load(request("after.xml")).unwrap();

        let track = tokio::time::timeout(Duration::from_secs(5), tracks.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(track.events[0].text, "after.xml");
        session.shutdown().await;
    }

    #[tokio::test]
    async fn test_handle_reports_closed_after_shutdown() {
        let (session, _tracks) = session();
        let handle = session.handle();
        assert!(handle.is_open());

        session.shutdown().await;
        assert!(!handle.is_open());
        assert_eq!(handle.start_load(request("late.xml")), Err(SessionClosed));
    }
}
