//! Event payload definitions
//!
//! Defines the data structures for each RTM event kind. Frames are flat JSON
//! objects, so every payload is decoded from the whole frame; the `type`
//! field and any field not declared here are ignored.

use crate::value_objects::{EpochTime, MessageTs, Presence};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Treat an explicit `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// === Connection Events ===

/// `hello` event payload
///
/// Sent by the server once the socket is ready to stream events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloEvent {}

// === Message Events ===

/// `message` event payload
///
/// Covers plain messages and every subtype (`bot_message`, `message_changed`,
/// `message_deleted`, `channel_join`, ...); subtype-specific fields are
/// absent when they don't apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEvent {
    pub channel: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<MessageTs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited: Option<Edited>,

    // Hidden subtypes: message_changed, message_deleted, unpinned_item
    #[serde(default, deserialize_with = "null_as_default")]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_ts: Option<MessageTs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_ts: Option<MessageTs>,

    // bot_message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icons: Option<Icon>,

    // channel_join, group_join
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inviter: Option<String>,

    // channel_topic, channel_purpose, channel_name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_name: Option<String>,

    // channel_archive, group_archive
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,

    // file_share, file_comment
    #[serde(default, deserialize_with = "null_as_default")]
    pub upload: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<Comment>,

    // pinned_item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,

    /// Set when the message acknowledges one the client sent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,

    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub reactions: Vec<ItemReaction>,
    /// Attachments are passed through undecoded
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_starred: bool,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub pinned_to: Vec<String>,
}

impl MessageEvent {
    /// Create a plain message
    #[must_use]
    pub fn new(channel: impl Into<String>, user: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            user: Some(user.into()),
            text: text.into(),
            ts: None,
            subtype: None,
            edited: None,
            hidden: false,
            deleted_ts: None,
            event_ts: None,
            bot_id: None,
            username: None,
            icons: None,
            inviter: None,
            topic: None,
            purpose: None,
            name: None,
            old_name: None,
            members: Vec::new(),
            upload: false,
            comment: None,
            item_type: None,
            reply_to: None,
            team: None,
            reactions: Vec::new(),
            attachments: Vec::new(),
            is_starred: false,
            pinned_to: Vec::new(),
        }
    }

    /// Check if the message was posted by a bot integration
    #[must_use]
    pub fn is_bot_message(&self) -> bool {
        self.subtype.as_deref() == Some("bot_message") || self.bot_id.is_some()
    }

    /// Check if the message was edited
    #[must_use]
    pub fn is_edited(&self) -> bool {
        self.edited.is_some()
    }
}

/// Edit marker on a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edited {
    pub user: String,
    pub ts: MessageTs,
}

/// Bot icon overrides
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icon {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_emoji: Option<String>,
}

/// File comment attached to a `file_comment` message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<EpochTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<EpochTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Aggregated reaction on a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemReaction {
    pub name: String,
    #[serde(default)]
    pub count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub users: Vec<String>,
}

// === Presence Events ===

/// `presence_change` event payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceChangeEvent {
    pub user: String,
    pub presence: Presence,
}

/// `user_typing` event payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTypingEvent {
    pub channel: String,
    pub user: String,
}

// === Channel Events ===

/// Topic or purpose of a channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_set: Option<EpochTime>,
}

/// Channel data included in channel events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<EpochTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_channel: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_member: bool,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<TopicInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<TopicInfo>,
}

/// `channel_joined` event payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelJoinedEvent {
    pub channel: ChannelInfo,
}

/// `channel_left` event payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelLeftEvent {
    /// Channel id
    pub channel: String,
}

// === Reaction Events ===

/// The item a reaction was added to or removed from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionItem {
    /// `message`, `file`, or `file_comment`
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<MessageTs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_comment: Option<String>,
}

/// `reaction_added` / `reaction_removed` event payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionEvent {
    pub user: String,
    pub reaction: String,
    pub item: ReactionItem,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_ts: Option<MessageTs>,
}
