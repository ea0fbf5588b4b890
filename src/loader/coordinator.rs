//! Request coordinator: owns the single in-flight fetch and drives
//! fetch -> convert -> deliver.
//!
//! Each fetch runs on its own task and reports back through a channel as a
//! [`FetchCompletion`] tagged with the generation it was issued under. The
//! owner of the coordinator feeds completions back into
//! [`RequestCoordinator::handle_completion`]; only the completion matching
//! the current generation is acted on. Starting a new load forgets the old
//! generation and aborts its task before the new fetch is spawned, so a
//! superseded fetch can never reach the converter or the sink.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::fetch::{FetchError, Fetcher};
use super::layout::{resolve_layout, EffectiveLayout};
use super::{LoadError, LoadRequest};
use crate::display::DisplayBoundsProvider;
use crate::overlay::{ConvertError, Converter, OverlaySink};
use crate::platform::default_font_family;
use crate::settings::SettingsStore;

/// Result of one transfer, sent from the fetch task to the coordinator's owner
#[derive(Debug)]
pub struct FetchCompletion {
    generation: u64,
    outcome: Result<Bytes, FetchError>,
}

impl FetchCompletion {
    /// Generation of the fetch this completion belongs to
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Receiving end for [`FetchCompletion`]s
pub type CompletionReceiver = mpsc::UnboundedReceiver<FetchCompletion>;

/// Coordinator state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    /// No transfer outstanding
    Idle,
    /// One transfer outstanding
    Fetching,
}

/// What [`RequestCoordinator::handle_completion`] did with a completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Converted and handed to the sink, with this many events
    Delivered(usize),
    /// Transfer or conversion failed; nothing delivered
    Failed,
    /// Belonged to a cancelled fetch; ignored
    Stale,
}

/// The one outstanding fetch
struct InFlightFetch {
    generation: u64,
    request: LoadRequest,
    layout: EffectiveLayout,
    task: JoinHandle<()>,
}

/// Single-flight overlay load coordinator
pub struct RequestCoordinator {
    display: Arc<dyn DisplayBoundsProvider>,
    settings: Arc<dyn SettingsStore>,
    fetcher: Arc<dyn Fetcher>,
    converter: Arc<dyn Converter>,
    sink: Arc<dyn OverlaySink>,
    default_font: String,
    completions: mpsc::UnboundedSender<FetchCompletion>,
    errors: Option<mpsc::UnboundedSender<LoadError>>,
    in_flight: Option<InFlightFetch>,
    next_generation: u64,
}

impl RequestCoordinator {
    /// Create an idle coordinator and the receiver its fetch completions
    /// arrive on.
    ///
    /// Every collaborator is required up front, so a coordinator without a
    /// display or fetch capability cannot be built.
    pub fn new(
        display: impl DisplayBoundsProvider + 'static,
        settings: impl SettingsStore + 'static,
        fetcher: impl Fetcher,
        converter: impl Converter,
        sink: impl OverlaySink,
    ) -> (Self, CompletionReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let coordinator = Self {
            display: Arc::new(display),
            settings: Arc::new(settings),
            fetcher: Arc::new(fetcher),
            converter: Arc::new(converter),
            sink: Arc::new(sink),
            default_font: default_font_family().to_string(),
            completions: tx,
            errors: None,
            in_flight: None,
            next_generation: 0,
        };
        (coordinator, rx)
    }

    /// Report failed loads on `errors`. Without a channel, failures are
    /// only logged.
    #[must_use]
    pub fn with_error_channel(mut self, errors: mpsc::UnboundedSender<LoadError>) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Use `family` instead of the platform default font
    #[must_use]
    pub fn with_default_font(mut self, family: impl Into<String>) -> Self {
        self.default_font = family.into();
        self
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> CoordinatorState {
        if self.in_flight.is_some() {
            CoordinatorState::Fetching
        } else {
            CoordinatorState::Idle
        }
    }

    /// Layout of the outstanding fetch, if any
    #[must_use]
    pub fn pending_layout(&self) -> Option<&EffectiveLayout> {
        self.in_flight.as_ref().map(|f| &f.layout)
    }

    /// Start loading `request`, cancelling any outstanding load first.
    ///
    /// Must be called from within a tokio runtime. Returns immediately; the
    /// result arrives later as a [`FetchCompletion`].
    pub fn start_load(&mut self, request: LoadRequest) {
        let bounds = self.display.current_bounds();
        let overrides = self.settings.overrides();
        let layout = resolve_layout(
            request.width,
            request.height,
            bounds,
            &overrides,
            &self.default_font,
        );

        // Must finish before the new fetch exists
        self.cancel();

        self.next_generation += 1;
        let generation = self.next_generation;

        info!(
            url = %request.source,
            generation,
            requested = %format_args!("{}x{}", request.width, request.height),
            display = %bounds,
            effective = %format_args!("{}x{}", layout.width, layout.height),
            font_size = layout.font_size,
            "Loading overlay"
        );

        let fetcher = Arc::clone(&self.fetcher);
        let completions = self.completions.clone();
        let url = request.source.clone();
        let task = tokio::spawn(async move {
            let outcome = fetcher.fetch(&url).await;
            // Receiver gone means the session is shutting down
            let _ = completions.send(FetchCompletion {
                generation,
                outcome,
            });
        });

        self.in_flight = Some(InFlightFetch {
            generation,
            request,
            layout,
            task,
        });
    }

    /// Cancel the outstanding fetch, if any. Returns whether one existed.
    ///
    /// Silent: no error is reported and received bytes are discarded.
    pub fn cancel(&mut self) -> bool {
        let Some(fetch) = self.in_flight.take() else {
            return false;
        };
        fetch.task.abort();
        debug!(
            url = %fetch.request.source,
            generation = fetch.generation,
            "Cancelled in-flight fetch"
        );
        true
    }

    /// Act on a fetch completion.
    ///
    /// A completion for the current fetch is converted with the layout
    /// resolved when the load started and delivered to the sink; the
    /// coordinator is idle afterwards whatever the outcome. Completions of
    /// cancelled fetches are dropped.
    pub fn handle_completion(&mut self, completion: FetchCompletion) -> CompletionOutcome {
        let is_current = self
            .in_flight
            .as_ref()
            .is_some_and(|f| f.generation == completion.generation);
        if !is_current {
            debug!(
                generation = completion.generation,
                "Discarding completion of superseded fetch"
            );
            return CompletionOutcome::Stale;
        }
        let Some(fetch) = self.in_flight.take() else {
            return CompletionOutcome::Stale;
        };

        let raw = match completion.outcome {
            Ok(raw) => raw,
            Err(source) => {
                warn!(url = %fetch.request.source, "Overlay fetch failed: {source}");
                self.report(LoadError::Fetch {
                    url: fetch.request.source,
                    source,
                });
                return CompletionOutcome::Failed;
            }
        };

        let converter = Arc::clone(&self.converter);
        let converted = catch_unwind(AssertUnwindSafe(|| converter.convert(&raw, &fetch.layout)))
            .unwrap_or_else(|_| Err(ConvertError::Other("converter panicked".to_string())));
        drop(raw);

        match converted {
            Ok(track) => {
                let count = track.len();
                info!(
                    url = %fetch.request.source,
                    events = count,
                    "Delivering overlay"
                );
                self.sink.deliver(track);
                CompletionOutcome::Delivered(count)
            }
            Err(source) => {
                warn!(url = %fetch.request.source, "Overlay conversion failed: {source}");
                self.report(LoadError::Convert {
                    url: fetch.request.source,
                    source,
                });
                CompletionOutcome::Failed
            }
        }
    }

    fn report(&self, error: LoadError) {
        if let Some(errors) = &self.errors {
            let _ = errors.send(error);
        }
    }
}

impl Drop for RequestCoordinator {
    fn drop(&mut self) {
        self.cancel();
    }
}
