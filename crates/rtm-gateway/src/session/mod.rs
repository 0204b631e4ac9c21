//! RTM session
//!
//! Pumps frames from a source through the dispatcher into the event stream.

mod session;

pub use session::{EndReason, IngestError, RtmSession, SessionSummary};
