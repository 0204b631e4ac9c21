//! Event kinds
//!
//! The discriminant strings the client knows how to decode.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Known RTM event kinds
///
/// These are the values of the `type` field of server-pushed frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    // Connection events
    /// Greeting sent once the socket is established
    #[serde(rename = "hello")]
    ConnectionEstablished,

    // Message events
    /// Message posted, edited, or deleted (see subtype)
    Message,

    // Presence events
    /// User went active or away
    PresenceChange,
    /// User is typing in a channel
    UserTyping,

    // Channel events
    /// Current user joined a channel
    ChannelJoined,
    /// Current user left a channel
    ChannelLeft,

    // Reaction events
    /// Reaction added to an item
    ReactionAdded,
    /// Reaction removed from an item
    ReactionRemoved,

    /// Anything the registry could not turn into one of the above
    Unknown,
}

impl EventKind {
    /// Every kind with a decoder, in registration order
    pub const KNOWN: [Self; 8] = [
        Self::ConnectionEstablished,
        Self::Message,
        Self::PresenceChange,
        Self::UserTyping,
        Self::ChannelJoined,
        Self::ChannelLeft,
        Self::ReactionAdded,
        Self::ReactionRemoved,
    ];

    /// Get the discriminant string of the event kind
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConnectionEstablished => "hello",
            Self::Message => "message",
            Self::PresenceChange => "presence_change",
            Self::UserTyping => "user_typing",
            Self::ChannelJoined => "channel_joined",
            Self::ChannelLeft => "channel_left",
            Self::ReactionAdded => "reaction_added",
            Self::ReactionRemoved => "reaction_removed",
            Self::Unknown => "unknown",
        }
    }

    /// Parse a known event kind from a discriminant (exact, case-sensitive)
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "hello" => Some(Self::ConnectionEstablished),
            "message" => Some(Self::Message),
            "presence_change" => Some(Self::PresenceChange),
            "user_typing" => Some(Self::UserTyping),
            "channel_joined" => Some(Self::ChannelJoined),
            "channel_left" => Some(Self::ChannelLeft),
            "reaction_added" => Some(Self::ReactionAdded),
            "reaction_removed" => Some(Self::ReactionRemoved),
            _ => None,
        }
    }

    /// Check if this is the catch-all kind
    #[must_use]
    pub const fn is_unknown(self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        kind.as_str().to_string()
    }
}
