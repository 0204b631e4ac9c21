//! Error types for the RTM domain

mod rtm_error;

pub use rtm_error::{DecodeError, FrameError, RtmError, RtmResult, StreamError};
