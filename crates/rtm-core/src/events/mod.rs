//! RTM events - the typed shapes a frame decodes into

mod event_kind;
mod event_variant;
mod payloads;

pub use event_kind::EventKind;
pub use event_variant::{EventVariant, UnknownEvent, UnknownReason};
pub use payloads::{
    ChannelInfo, ChannelJoinedEvent, ChannelLeftEvent, Comment, Edited, HelloEvent, Icon,
    ItemReaction, MessageEvent, PresenceChangeEvent, ReactionEvent, ReactionItem, TopicInfo,
    UserTypingEvent,
};
