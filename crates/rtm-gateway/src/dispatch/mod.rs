//! Typed event dispatch
//!
//! Turns envelopes into event variants through the event registry.

mod dispatcher;

pub use dispatcher::{DispatchStats, Dispatcher};
