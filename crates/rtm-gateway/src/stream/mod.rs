//! Event delivery
//!
//! Bounded FIFO stream between the dispatcher and event consumers.

mod event_stream;

pub use event_stream::{EventStream, StreamState};
