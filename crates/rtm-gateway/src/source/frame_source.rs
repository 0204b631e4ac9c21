//! Frame source trait and adapters
//!
//! A session pulls frames one at a time; `None` ends the session.

use crate::protocol::RawFrame;
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;

/// Producer of raw frames for a session
///
/// Returning `None` means the transport is gone and no more frames will arrive.
#[async_trait]
pub trait FrameSource: Send {
    async fn next_frame(&mut self) -> Option<RawFrame>;
}

#[async_trait]
impl FrameSource for mpsc::Receiver<RawFrame> {
    async fn next_frame(&mut self) -> Option<RawFrame> {
        self.recv().await
    }
}

#[async_trait]
impl FrameSource for mpsc::UnboundedReceiver<RawFrame> {
    async fn next_frame(&mut self) -> Option<RawFrame> {
        self.recv().await
    }
}

/// Adapts any [`Stream`] of frames into a [`FrameSource`]
#[derive(Debug)]
pub struct StreamSource<S> {
    inner: S,
}

impl<S> StreamSource<S>
where
    S: Stream<Item = RawFrame> + Unpin + Send,
{
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

#[async_trait]
impl<S> FrameSource for StreamSource<S>
where
    S: Stream<Item = RawFrame> + Unpin + Send,
{
    async fn next_frame(&mut self) -> Option<RawFrame> {
        self.inner.next().await
    }
}
