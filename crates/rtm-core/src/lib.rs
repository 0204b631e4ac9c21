//! # rtm-core
//!
//! Domain layer for the real-time messaging (RTM) client: the closed set of
//! event variants a frame can decode into, their payloads, value objects, and
//! the error taxonomy shared by the ingestion pipeline.
//! This crate has no async runtime or I/O dependencies.

pub mod error;
pub mod events;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use error::{DecodeError, FrameError, RtmError, RtmResult, StreamError};
pub use events::{
    ChannelInfo, ChannelJoinedEvent, ChannelLeftEvent, Comment, Edited, EventKind, EventVariant,
    HelloEvent, Icon, ItemReaction, MessageEvent, PresenceChangeEvent, ReactionEvent,
    ReactionItem, TopicInfo, UnknownEvent, UnknownReason, UserTypingEvent,
};
pub use value_objects::{EpochTime, MessageTs, MessageTsParseError, Presence};
