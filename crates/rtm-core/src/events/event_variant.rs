//! Event variants - the uniform tagged value handed to stream consumers

use super::{
    ChannelJoinedEvent, ChannelLeftEvent, EventKind, HelloEvent, MessageEvent,
    PresenceChangeEvent, ReactionEvent, UserTypingEvent,
};
use serde_json::value::RawValue;
use serde_json::Value;
use std::fmt;

/// A decoded RTM event
///
/// Each variant owns its data; nothing points back at the frame it came from.
#[derive(Debug, Clone)]
pub enum EventVariant {
    ConnectionEstablished(HelloEvent),
    Message(MessageEvent),
    PresenceChange(PresenceChangeEvent),
    UserTyping(UserTypingEvent),
    ChannelJoined(ChannelJoinedEvent),
    ChannelLeft(ChannelLeftEvent),
    ReactionAdded(ReactionEvent),
    ReactionRemoved(ReactionEvent),
    /// Unrecognized kind, or a recognized kind whose payload didn't decode
    Unknown(UnknownEvent),
}

impl EventVariant {
    /// The kind of this event; decode misses are always [`EventKind::Unknown`]
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::ConnectionEstablished(_) => EventKind::ConnectionEstablished,
            Self::Message(_) => EventKind::Message,
            Self::PresenceChange(_) => EventKind::PresenceChange,
            Self::UserTyping(_) => EventKind::UserTyping,
            Self::ChannelJoined(_) => EventKind::ChannelJoined,
            Self::ChannelLeft(_) => EventKind::ChannelLeft,
            Self::ReactionAdded(_) => EventKind::ReactionAdded,
            Self::ReactionRemoved(_) => EventKind::ReactionRemoved,
            Self::Unknown(_) => EventKind::Unknown,
        }
    }

    /// The wire name of this event's kind
    ///
    /// Unknown events report the frame's own `type` string. A known variant
    /// always reports its kind's name, even when a custom registration
    /// produced it from another discriminant.
    #[must_use]
    pub fn discriminant(&self) -> &str {
        match self {
            Self::Unknown(unknown) => &unknown.discriminant,
            known => known.kind().as_str(),
        }
    }

    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }

    #[must_use]
    pub fn as_message(&self) -> Option<&MessageEvent> {
        match self {
            Self::Message(msg) => Some(msg),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_unknown(&self) -> Option<&UnknownEvent> {
        match self {
            Self::Unknown(unknown) => Some(unknown),
            _ => None,
        }
    }
}

impl fmt::Display for EventVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(unknown) => write!(f, "Event(unknown, type={})", unknown.discriminant),
            known => write!(f, "Event({})", known.kind()),
        }
    }
}

/// Why a frame ended up as an unknown event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnknownReason {
    /// No decoder registered for the discriminant
    Unregistered,
    /// A decoder exists but rejected the payload
    DecodeFailed(String),
}

/// Catch-all event carrying the original payload untouched
#[derive(Debug, Clone)]
pub struct UnknownEvent {
    pub discriminant: String,
    pub payload: Box<RawValue>,
    pub reason: UnknownReason,
}

impl UnknownEvent {
    /// Unknown event for a discriminant with no registered decoder
    #[must_use]
    pub fn unregistered(discriminant: impl Into<String>, payload: Box<RawValue>) -> Self {
        Self {
            discriminant: discriminant.into(),
            payload,
            reason: UnknownReason::Unregistered,
        }
    }

    /// Unknown event for a payload its decoder rejected
    #[must_use]
    pub fn decode_failed(
        discriminant: impl Into<String>,
        payload: Box<RawValue>,
        error: impl fmt::Display,
    ) -> Self {
        Self {
            discriminant: discriminant.into(),
            payload,
            reason: UnknownReason::DecodeFailed(error.to_string()),
        }
    }

    /// The raw JSON text exactly as received
    #[must_use]
    pub fn raw_json(&self) -> &str {
        self.payload.get()
    }

    /// Parse the raw payload into a generic JSON value
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(self.payload.get())
    }
}
