//! # rtm-gateway
//!
//! Real-time messaging event ingestion: raw frames are decoded into
//! envelopes, dispatched through an event registry into typed variants, and
//! delivered in order through a bounded event stream.

pub mod dispatch;
pub mod events;
pub mod protocol;
pub mod session;
pub mod source;
pub mod stream;

pub use dispatch::{DispatchStats, Dispatcher};
pub use events::{DecodeFn, EventRegistry};
pub use protocol::{Envelope, RawFrame};
pub use session::{EndReason, IngestError, RtmSession, SessionSummary};
pub use source::{FrameSource, StreamSource};
pub use stream::{EventStream, StreamState};
