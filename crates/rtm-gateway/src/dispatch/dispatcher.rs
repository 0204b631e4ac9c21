//! Event dispatcher
//!
//! Resolves an envelope's discriminant in the registry and decodes its
//! payload. Every failure degrades to an unknown event so one bad frame
//! never stops the stream.

use crate::events::EventRegistry;
use crate::protocol::{Envelope, RawFrame};
use rtm_core::{DecodeError, EventVariant, FrameError, UnknownEvent};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

/// Counters describing what the dispatcher has produced so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Envelopes dispatched
    pub dispatched: u64,
    /// Envelopes whose discriminant had no decoder
    pub unregistered: u64,
    /// Envelopes whose decoder rejected the payload
    pub decode_failures: u64,
}

#[derive(Debug, Default)]
struct Counters {
    dispatched: AtomicU64,
    unregistered: AtomicU64,
    decode_failures: AtomicU64,
}

/// Typed event dispatcher
#[derive(Debug)]
pub struct Dispatcher {
    /// Read-only once the dispatcher is built
    registry: Arc<EventRegistry>,
    /// Whether decode misses are logged
    log_unknown: bool,
    counters: Counters,
}

impl Dispatcher {
    /// Create a dispatcher over a registry
    pub fn new(registry: EventRegistry) -> Self {
        Self::from_shared(Arc::new(registry))
    }

    /// Create a dispatcher over a registry shared with other dispatchers
    pub fn from_shared(registry: Arc<EventRegistry>) -> Self {
        Self {
            registry,
            log_unknown: true,
            counters: Counters::default(),
        }
    }

    /// Create a dispatcher with the built-in decoders
    pub fn with_defaults() -> Self {
        Self::new(EventRegistry::with_defaults())
    }

    /// Enable or disable logging of unknown events
    #[must_use]
    pub fn with_unknown_event_logging(mut self, enabled: bool) -> Self {
        self.log_unknown = enabled;
        self
    }

    /// The registry this dispatcher resolves against
    pub fn registry(&self) -> &EventRegistry {
        &self.registry
    }

    /// Dispatch an envelope into an event variant
    ///
    /// Never fails: unregistered discriminants and payloads the decoder
    /// rejects both come back as [`EventVariant::Unknown`].
    pub fn dispatch(&self, envelope: Envelope) -> EventVariant {
        self.counters.dispatched.fetch_add(1, Ordering::Relaxed);

        let Some(decode) = self.registry.resolve(&envelope.discriminant) else {
            self.counters.unregistered.fetch_add(1, Ordering::Relaxed);
            if self.log_unknown {
                tracing::debug!(
                    discriminant = %envelope.discriminant,
                    "No decoder registered, delivering as unknown event"
                );
            }
            return EventVariant::Unknown(UnknownEvent::unregistered(
                envelope.discriminant,
                envelope.payload,
            ));
        };

        let decoded = panic::catch_unwind(AssertUnwindSafe(|| decode(&envelope.payload)))
            .unwrap_or_else(|payload| {
                Err(DecodeError::custom(format_args!(
                    "decoder panicked: {}",
                    panic_message(payload.as_ref())
                )))
            });

        match decoded {
            Ok(event) => {
                tracing::trace!(
                    discriminant = %envelope.discriminant,
                    channel = ?envelope.channel,
                    user = ?envelope.user,
                    "Dispatched event"
                );
                event
            }
            Err(e) => {
                self.counters.decode_failures.fetch_add(1, Ordering::Relaxed);
                if self.log_unknown {
                    tracing::warn!(
                        discriminant = %envelope.discriminant,
                        subtype = ?envelope.subtype,
                        error = %e,
                        "Failed to decode event payload, delivering as unknown event"
                    );
                }
                EventVariant::Unknown(UnknownEvent::decode_failed(
                    envelope.discriminant,
                    envelope.payload,
                    e,
                ))
            }
        }
    }

    /// Decode a raw frame and dispatch it
    ///
    /// # Errors
    /// Only envelope decoding can fail; see [`Envelope::decode`].
    pub fn decode_frame(&self, frame: &RawFrame) -> Result<EventVariant, FrameError> {
        let envelope = Envelope::decode(frame)?;
        Ok(self.dispatch(envelope))
    }

    /// Snapshot of the dispatch counters
    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            dispatched: self.counters.dispatched.load(Ordering::Relaxed),
            unregistered: self.counters.unregistered.load(Ordering::Relaxed),
            decode_failures: self.counters.decode_failures.load(Ordering::Relaxed),
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::with_defaults()
    }
}
