//! Test helpers for integration tests
//!
//! Builds sessions, feeds them frames and collects what comes out.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use futures::StreamExt;
use rtm_common::{try_init_tracing_with_config, RtmConfig, TracingConfig};
use rtm_core::EventVariant;
use rtm_gateway::{EventStream, RawFrame, RtmSession, SessionSummary};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Install a test subscriber once; later calls are no-ops
pub fn init_test_tracing() {
    let _ = try_init_tracing_with_config(TracingConfig::development());
}

/// Config used by tests unless they need something specific
pub fn test_config() -> RtmConfig {
    RtmConfig::default().with_buffer_capacity(16)
}

/// A running session fed through a channel
pub struct TestSession {
    pub session: Arc<RtmSession>,
    pub frames: mpsc::Sender<RawFrame>,
    handle: JoinHandle<SessionSummary>,
}

impl TestSession {
    /// Start a session with the test config
    pub fn start() -> Self {
        Self::start_with_config(test_config())
    }

    /// Start a session with a custom config
    pub fn start_with_config(config: RtmConfig) -> Self {
        Self::start_with_session(RtmSession::new(config))
    }

    /// Start an already-built session
    pub fn start_with_session(session: RtmSession) -> Self {
        init_test_tracing();

        let session = Arc::new(session);
        let (frames, rx) = mpsc::channel(64);
        let handle = session.spawn(rx);

        Self {
            session,
            frames,
            handle,
        }
    }

    pub fn events(&self) -> EventStream {
        self.session.events()
    }

    /// Send a frame to the session
    pub async fn send(&self, frame: impl Into<RawFrame>) -> Result<()> {
        self.frames
            .send(frame.into())
            .await
            .context("session stopped reading frames")
    }

    /// Close the frame source and wait for the session to finish
    pub async fn finish(self) -> Result<SessionSummary> {
        drop(self.frames);
        wait(self.handle).await
    }

    /// Cancel the session and wait for it to finish
    pub async fn cancel(self) -> Result<SessionSummary> {
        self.session.cancel();
        wait(self.handle).await
    }
}

async fn wait(handle: JoinHandle<SessionSummary>) -> Result<SessionSummary> {
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .context("session did not stop in time")?
        .context("session task panicked")
}

/// Take the next event, failing instead of hanging
pub async fn next_event(stream: &EventStream) -> Result<EventVariant> {
    let event = tokio::time::timeout(Duration::from_secs(5), stream.next())
        .await
        .context("timed out waiting for an event")??;
    Ok(event)
}

/// Drain a stream until it is closed and empty
pub async fn collect_events(stream: &EventStream) -> Result<Vec<EventVariant>> {
    tokio::time::timeout(Duration::from_secs(5), stream.events().collect::<Vec<_>>())
        .await
        .context("stream was never closed")
}
