//! Test fixtures
//!
//! Sample frames as a server would send them.

use rtm_gateway::RawFrame;
use serde::Serialize;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

pub const HELLO: &str = r#"{"type":"hello"}"#;

pub const PRESENCE_ACTIVE: &str = r#"{"type":"presence_change","user":"U1","presence":"active"}"#;

pub const MESSAGE_HI: &str = r#"{"type":"message","channel":"C1","text":"hi","user":"U2"}"#;

pub const FUTURE_FEATURE: &str = r#"{"type":"future_feature_xyz","foo":"bar"}"#;

pub const NO_DISCRIMINANT: &str = r#"{"user":"U1","presence":"away"}"#;

/// A reply to a client-sent message; carries no `type`
pub const REPLY_ACK: &str = r#"{"ok":true,"reply_to":1,"ts":"1355517523.000005","text":"hi"}"#;

pub const REACTION_ADDED: &str = r#"{"type":"reaction_added","user":"U1","reaction":"thumbsup",
    "item_user":"U2","item":{"type":"message","channel":"C1","ts":"1360782400.498405"},
    "event_ts":"1360782804.083113"}"#;

pub const CHANNEL_JOINED: &str =
    r#"{"type":"channel_joined","channel":{"id":"C024BE91L","name":"fun","created":1360782804,"creator":"U024BE7LH","is_member":true}}"#;

/// Message frame missing its required `channel`
pub const MESSAGE_WITHOUT_CHANNEL: &str = r#"{"type":"message","user":"U2","text":"lost"}"#;

/// Message with a fresh channel and text
#[derive(Debug, Serialize)]
pub struct MessageFrame {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub channel: String,
    pub user: String,
    pub text: String,
    pub ts: String,
}

impl MessageFrame {
    pub fn unique() -> Self {
        let suffix = unique_suffix();
        Self {
            kind: "message",
            channel: format!("C{suffix:06}"),
            user: format!("U{suffix:06}"),
            text: format!("message {suffix}"),
            ts: format!("1355517523.{suffix:06}"),
        }
    }

    pub fn to_frame(&self) -> RawFrame {
        RawFrame::from(serde_json::to_vec(self).unwrap_or_default())
    }
}

/// Numbered `user_typing` frames, in order
pub fn typing_frames(count: usize) -> Vec<RawFrame> {
    (0..count)
        .map(|i| {
            let frame = json!({"type": "user_typing", "channel": format!("C{i}"), "user": "U1"});
            RawFrame::from(frame.to_string())
        })
        .collect()
}
