//! Event type registry
//!
//! Maps discriminants to the decoders that turn a payload into an event variant.

mod registry;

pub use registry::{DecodeFn, EventRegistry};
