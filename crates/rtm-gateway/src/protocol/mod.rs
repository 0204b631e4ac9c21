//! RTM wire protocol
//!
//! Raw frames as handed over by the transport, and the envelope decoded from them.

mod envelope;
mod frame;

pub use envelope::Envelope;
pub use frame::RawFrame;
