//! Session pump
//!
//! One session owns one dispatcher and one event stream. Frames are decoded
//! and appended in arrival order; consumers read from [`RtmSession::events`].

use crate::dispatch::{DispatchStats, Dispatcher};
use crate::events::EventRegistry;
use crate::protocol::RawFrame;
use crate::source::FrameSource;
use crate::stream::EventStream;
use rtm_common::{ConfigError, MalformedFramePolicy, RtmConfig};
use rtm_core::{EventKind, FrameError, RtmError, StreamError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

/// Why a single frame was not delivered
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Malformed frame: {0}")]
    MalformedFrame(#[from] FrameError),

    #[error(transparent)]
    Stream(#[from] StreamError),
}

impl From<IngestError> for RtmError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::MalformedFrame(e) => Self::MalformedFrame(e),
            IngestError::Stream(e) => Self::Stream(e),
        }
    }
}

/// Why a session stopped pumping frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The frame source ran dry
    SourceEnded,
    /// The session was cancelled
    Cancelled,
    /// The event stream was closed from outside
    StreamClosed,
    /// A malformed frame arrived under the terminate policy
    MalformedFrame,
}

/// Totals for a finished session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub frames_received: u64,
    pub events_delivered: u64,
    pub malformed_frames: u64,
    /// Events dropped because an append timed out
    pub timed_out: u64,
    pub dispatch: DispatchStats,
    pub end_reason: EndReason,
}

/// Closes the stream when the pump ends, including when its future is dropped
struct CloseOnDrop<'a>(&'a EventStream);

impl Drop for CloseOnDrop<'_> {
    fn drop(&mut self) {
        if self.0.close() {
            tracing::debug!("Event stream closed by session shutdown");
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    frames_received: AtomicU64,
    events_delivered: AtomicU64,
    malformed_frames: AtomicU64,
    timed_out: AtomicU64,
}

/// An ingestion session
#[derive(Debug)]
pub struct RtmSession {
    session_id: Uuid,
    config: RtmConfig,
    dispatcher: Dispatcher,
    stream: EventStream,
    cancel: CancellationToken,
    counters: Counters,
}

impl RtmSession {
    /// Create a session with the built-in decoders
    pub fn new(config: RtmConfig) -> Self {
        Self::with_registry(config, EventRegistry::with_defaults())
    }

    /// Create a session with a custom registry
    pub fn with_registry(config: RtmConfig, registry: EventRegistry) -> Self {
        let dispatcher =
            Dispatcher::new(registry).with_unknown_event_logging(config.unknown_event_logging);
        let stream = EventStream::new(config.stream_config());

        Self {
            session_id: Uuid::new_v4(),
            config,
            dispatcher,
            stream,
            cancel: CancellationToken::new(),
            counters: Counters::default(),
        }
    }

    /// Create a session configured from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(RtmConfig::from_env()?))
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn config(&self) -> &RtmConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Handle to the session's event stream
    pub fn events(&self) -> EventStream {
        self.stream.clone()
    }

    /// Token that fires when the session is cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Stop the session
    ///
    /// The pump stops taking frames and the stream closes; events already
    /// buffered remain readable.
    pub fn cancel(&self) {
        self.cancel.cancel();
        if self.stream.close() {
            tracing::info!(session_id = %self.session_id, "RTM session cancelled");
        }
    }

    /// Decode one frame and append the resulting event
    ///
    /// # Errors
    /// [`IngestError::MalformedFrame`] if the frame has no usable envelope,
    /// [`IngestError::Stream`] if the event could not be appended.
    pub async fn ingest(&self, frame: RawFrame) -> Result<EventKind, IngestError> {
        self.counters.frames_received.fetch_add(1, Ordering::Relaxed);

        let event = match self.dispatcher.decode_frame(&frame) {
            Ok(event) => event,
            Err(e) => {
                self.counters.malformed_frames.fetch_add(1, Ordering::Relaxed);
                return Err(e.into());
            }
        };
        let kind = event.kind();

        let appended = tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(StreamError::Cancelled),
            result = self.stream.append(event) => result,
        };

        match appended {
            Ok(()) => {
                self.counters.events_delivered.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(kind = %kind, "Event delivered");
                Ok(kind)
            }
            Err(e) => {
                if matches!(e, StreamError::Timeout(_)) {
                    self.counters.timed_out.fetch_add(1, Ordering::Relaxed);
                }
                Err(e.into())
            }
        }
    }

    /// Pump frames from `source` until it ends, the session is cancelled,
    /// or the stream closes
    ///
    /// The event stream is closed when this returns.
    pub async fn run<S: FrameSource>(&self, mut source: S) -> SessionSummary {
        let span = tracing::info_span!("rtm_session", session_id = %self.session_id);
        self.pump(&mut source).instrument(span).await
    }

    /// Run the session on its own task
    pub fn spawn<S>(self: &Arc<Self>, source: S) -> JoinHandle<SessionSummary>
    where
        S: FrameSource + 'static,
    {
        let session = Arc::clone(self);
        tokio::spawn(async move { session.run(source).await })
    }

    async fn pump<S: FrameSource>(&self, source: &mut S) -> SessionSummary {
        let close_guard = CloseOnDrop(&self.stream);
        tracing::info!(
            capacity = self.stream.capacity(),
            policy = %self.config.backpressure_policy,
            "RTM session started"
        );

        let end_reason = loop {
            let frame = tokio::select! {
                biased;
                () = self.cancel.cancelled() => break EndReason::Cancelled,
                frame = source.next_frame() => frame,
            };

            let Some(frame) = frame else {
                break EndReason::SourceEnded;
            };

            match self.ingest(frame).await {
                Ok(_) => {}
                Err(IngestError::MalformedFrame(e)) => match self.config.malformed_frame_policy {
                    MalformedFramePolicy::Skip => {
                        tracing::warn!(error = %e, "Skipping malformed frame");
                    }
                    MalformedFramePolicy::Terminate => {
                        tracing::error!(error = %e, "Malformed frame, terminating session");
                        break EndReason::MalformedFrame;
                    }
                },
                Err(IngestError::Stream(StreamError::Timeout(limit))) => {
                    tracing::warn!(timeout = ?limit, "Event stream append timed out, event dropped");
                }
                Err(IngestError::Stream(StreamError::Cancelled)) => break EndReason::Cancelled,
                Err(IngestError::Stream(StreamError::Closed)) => {
                    break if self.cancel.is_cancelled() {
                        EndReason::Cancelled
                    } else {
                        EndReason::StreamClosed
                    };
                }
            }
        };

        drop(close_guard);

        let summary = self.summary(end_reason);
        tracing::info!(
            frames = summary.frames_received,
            delivered = summary.events_delivered,
            malformed = summary.malformed_frames,
            timed_out = summary.timed_out,
            unknown = summary.dispatch.unregistered + summary.dispatch.decode_failures,
            reason = ?summary.end_reason,
            "RTM session ended"
        );
        summary
    }

    fn summary(&self, end_reason: EndReason) -> SessionSummary {
        SessionSummary {
            session_id: self.session_id,
            frames_received: self.counters.frames_received.load(Ordering::Relaxed),
            events_delivered: self.counters.events_delivered.load(Ordering::Relaxed),
            malformed_frames: self.counters.malformed_frames.load(Ordering::Relaxed),
            timed_out: self.counters.timed_out.load(Ordering::Relaxed),
            dispatch: self.dispatcher.stats(),
            end_reason,
        }
    }
}
