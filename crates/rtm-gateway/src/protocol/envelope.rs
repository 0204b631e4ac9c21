//! Frame envelope
//!
//! Captures the `type` discriminant and a few routing fields of a frame,
//! leaving the payload undecoded for the typed dispatcher.

use super::RawFrame;
use rtm_core::{EventKind, FrameError, MessageTs};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::value::RawValue;

/// Decoded frame header plus the untouched payload
///
/// Frames are flat JSON objects, so `payload` is the whole frame; typed
/// decoders read their fields from it and ignore the rest.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// Value of the `type` field
    pub discriminant: String,
    /// Value of the `subtype` field, if a string
    pub subtype: Option<String>,
    /// Value of the `ts` field, if a string
    pub ts: Option<MessageTs>,
    /// Value of the `event_ts` field, if a string
    pub event_ts: Option<MessageTs>,
    /// Value of the `user` field, if a string (some events carry an object)
    pub user: Option<String>,
    /// Value of the `channel` field, if a string (some events carry an object)
    pub channel: Option<String>,
    /// Value of the `reply_to` field, if an integer
    pub reply_to: Option<u64>,
    /// The complete frame, verbatim
    pub payload: Box<RawValue>,
}

/// Borrowed view of the fields the envelope cares about.
///
/// Every field is raw so an unexpected JSON type never fails the whole frame.
#[derive(Deserialize)]
struct EnvelopeHead<'a> {
    #[serde(rename = "type", borrow, default)]
    discriminant: Option<&'a RawValue>,
    #[serde(borrow, default)]
    subtype: Option<&'a RawValue>,
    #[serde(borrow, default)]
    ts: Option<&'a RawValue>,
    #[serde(borrow, default)]
    event_ts: Option<&'a RawValue>,
    #[serde(borrow, default)]
    user: Option<&'a RawValue>,
    #[serde(borrow, default)]
    channel: Option<&'a RawValue>,
    #[serde(borrow, default)]
    reply_to: Option<&'a RawValue>,
}

fn lenient<T: DeserializeOwned>(raw: Option<&RawValue>) -> Option<T> {
    raw.and_then(|r| serde_json::from_str(r.get()).ok())
}

impl Envelope {
    /// Decode a raw frame into an envelope
    ///
    /// # Errors
    /// Returns a [`FrameError`] if the frame isn't a JSON object or has no
    /// string `type` field.
    pub fn decode(frame: &RawFrame) -> Result<Self, FrameError> {
        let payload: Box<RawValue> = serde_json::from_slice(frame.as_bytes())?;
        Self::from_payload(payload)
    }

    /// Decode a frame given as text
    pub fn decode_str(frame: &str) -> Result<Self, FrameError> {
        let payload: Box<RawValue> = serde_json::from_str(frame)?;
        Self::from_payload(payload)
    }

    fn from_payload(payload: Box<RawValue>) -> Result<Self, FrameError> {
        if !payload.get().starts_with('{') {
            return Err(FrameError::NotAnObject);
        }

        let head: EnvelopeHead<'_> = serde_json::from_str(payload.get())?;

        let discriminant = match head.discriminant {
            None => return Err(FrameError::MissingDiscriminant),
            Some(raw) => serde_json::from_str::<String>(raw.get())
                .map_err(|_| FrameError::InvalidDiscriminant)?,
        };

        let subtype = lenient(head.subtype);
        let ts = lenient(head.ts);
        let event_ts = lenient(head.event_ts);
        let user = lenient(head.user);
        let channel = lenient(head.channel);
        let reply_to = lenient(head.reply_to);

        Ok(Self {
            discriminant,
            subtype,
            ts,
            event_ts,
            user,
            channel,
            reply_to,
            payload,
        })
    }

    /// Build an envelope around an already-parsed payload
    ///
    /// Only the discriminant is set; useful for feeding a dispatcher directly.
    pub fn from_parts(discriminant: impl Into<String>, payload: Box<RawValue>) -> Self {
        Self {
            discriminant: discriminant.into(),
            subtype: None,
            ts: None,
            event_ts: None,
            user: None,
            channel: None,
            reply_to: None,
            payload,
        }
    }

    /// The known event kind of this envelope, if any
    pub fn kind(&self) -> Option<EventKind> {
        EventKind::from_str(&self.discriminant)
    }

    /// The payload as JSON text
    pub fn payload_str(&self) -> &str {
        self.payload.get()
    }
}
