//! RTM errors - per-frame, per-event and stream-level failures

use std::time::Duration;
use thiserror::Error;

/// Why a raw frame could not be turned into an envelope.
///
/// Surfaced to the frame producer; never closes the event stream.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("Frame is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Frame is not a JSON object")]
    NotAnObject,

    #[error("Frame has no \"type\" field")]
    MissingDiscriminant,

    #[error("Frame \"type\" field is not a string")]
    InvalidDiscriminant,
}

/// Schema mismatch inside a recognized event kind.
///
/// The dispatcher turns this into an unknown event; it never reaches a consumer.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Payload does not match event schema: {0}")]
    Schema(#[from] serde_json::Error),

    #[error("Payload rejected: {0}")]
    Custom(String),
}

impl DecodeError {
    /// Create a custom decode error
    #[must_use]
    pub fn custom(msg: impl std::fmt::Display) -> Self {
        Self::Custom(msg.to_string())
    }
}

/// Event stream errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StreamError {
    #[error("Event stream closed")]
    Closed,

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Timed out after {0:?} waiting for buffer space")]
    Timeout(Duration),
}

/// Umbrella error for the RTM ingestion pipeline
#[derive(Debug, Error)]
pub enum RtmError {
    #[error("Malformed frame: {0}")]
    MalformedFrame(#[from] FrameError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Stream(#[from] StreamError),
}

impl RtmError {
    /// Get a stable error code string for logs and callers
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedFrame(_) => "MALFORMED_FRAME",
            Self::Decode(_) => "DECODE_FAILED",
            Self::Stream(StreamError::Closed) => "STREAM_CLOSED",
            Self::Stream(StreamError::Cancelled) => "CANCELLED",
            Self::Stream(StreamError::Timeout(_)) => "APPEND_TIMEOUT",
        }
    }

    /// Check if this error only concerns a single frame
    pub fn is_per_frame(&self) -> bool {
        matches!(self, Self::MalformedFrame(_) | Self::Decode(_))
    }

    /// Check if the stream has been closed
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Stream(StreamError::Closed))
    }

    /// Check if a cancellation signal interrupted the operation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Stream(StreamError::Cancelled))
    }
}

/// Result type alias for RTM operations
pub type RtmResult<T> = Result<T, RtmError>;
