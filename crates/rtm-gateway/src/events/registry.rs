//! Discriminant to decoder registry

use rtm_core::{DecodeError, EventKind, EventVariant};
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Decoder for one event kind
pub type DecodeFn = Arc<dyn Fn(&RawValue) -> Result<EventVariant, DecodeError> + Send + Sync>;

/// Registry of event decoders keyed by exact `type` string
///
/// Built once before a stream starts and shared read-only with the
/// dispatcher afterwards.
#[derive(Clone, Default)]
pub struct EventRegistry {
    decoders: HashMap<String, DecodeFn>,
}

impl EventRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with a decoder for every [`EventKind::KNOWN`] kind
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for kind in EventKind::KNOWN {
            registry.register_kind(kind);
        }
        registry
    }

    /// Register the built-in decoder for a known kind
    pub fn register_kind(&mut self, kind: EventKind) -> &mut Self {
        let name = kind.as_str();
        match kind {
            EventKind::ConnectionEstablished => {
                self.register_typed(name, EventVariant::ConnectionEstablished)
            }
            EventKind::Message => self.register_typed(name, EventVariant::Message),
            EventKind::PresenceChange => self.register_typed(name, EventVariant::PresenceChange),
            EventKind::UserTyping => self.register_typed(name, EventVariant::UserTyping),
            EventKind::ChannelJoined => self.register_typed(name, EventVariant::ChannelJoined),
            EventKind::ChannelLeft => self.register_typed(name, EventVariant::ChannelLeft),
            EventKind::ReactionAdded => self.register_typed(name, EventVariant::ReactionAdded),
            EventKind::ReactionRemoved => self.register_typed(name, EventVariant::ReactionRemoved),
            EventKind::Unknown => self,
        }
    }

    /// Register a decoder, replacing any previous one for the discriminant
    pub fn register<F>(&mut self, discriminant: impl Into<String>, decode: F) -> &mut Self
    where
        F: Fn(&RawValue) -> Result<EventVariant, DecodeError> + Send + Sync + 'static,
    {
        let discriminant = discriminant.into();
        if self
            .decoders
            .insert(discriminant.clone(), Arc::new(decode))
            .is_some()
        {
            tracing::debug!(discriminant = %discriminant, "Replaced event decoder");
        }
        self
    }

    /// Register a decoder that deserializes the payload into `T` and wraps it
    pub fn register_typed<T, F>(&mut self, discriminant: impl Into<String>, wrap: F) -> &mut Self
    where
        T: DeserializeOwned,
        F: Fn(T) -> EventVariant + Send + Sync + 'static,
    {
        self.register(discriminant, move |raw: &RawValue| {
            let payload = serde_json::from_str::<T>(raw.get())?;
            Ok(wrap(payload))
        })
    }

    /// Builder-style [`register`](Self::register)
    #[must_use]
    pub fn with<F>(mut self, discriminant: impl Into<String>, decode: F) -> Self
    where
        F: Fn(&RawValue) -> Result<EventVariant, DecodeError> + Send + Sync + 'static,
    {
        self.register(discriminant, decode);
        self
    }

    /// Look up the decoder for a discriminant (exact, case-sensitive)
    pub fn resolve(&self, discriminant: &str) -> Option<&DecodeFn> {
        self.decoders.get(discriminant)
    }

    pub fn contains(&self, discriminant: &str) -> bool {
        self.decoders.contains_key(discriminant)
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Registered discriminants, sorted
    pub fn discriminants(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.decoders.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRegistry")
            .field("discriminants", &self.discriminants())
            .finish()
    }
}
