//! Frame sources
//!
//! Where raw frames come from: a channel fed by a transport, or any stream.

mod frame_source;

pub use frame_source::{FrameSource, StreamSource};
