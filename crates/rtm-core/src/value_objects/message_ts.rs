//! Message timestamp - the `"<seconds>.<micros>"` string the server uses as
//! a per-channel message identifier.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Message timestamp, kept verbatim because it doubles as a message id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageTs(String);

/// Error when a message timestamp is not `<seconds>[.<fraction>]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MessageTsParseError {
    #[error("invalid message timestamp format")]
    InvalidFormat,
}

impl MessageTs {
    /// Wrap a raw timestamp string
    pub fn new(ts: impl Into<String>) -> Self {
        Self(ts.into())
    }

    /// The raw string as received
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into whole seconds and microseconds.
    ///
    /// Fractions longer than six digits are truncated, shorter ones are
    /// right-padded, so `"1.5"` is 1 second 500000 micros.
    pub fn parts(&self) -> Result<(i64, u32), MessageTsParseError> {
        let (secs, frac) = match self.0.split_once('.') {
            Some((s, f)) => (s, f),
            None => (self.0.as_str(), ""),
        };

        let secs = secs
            .parse::<i64>()
            .map_err(|_| MessageTsParseError::InvalidFormat)?;

        if !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(MessageTsParseError::InvalidFormat);
        }

        let digits: String = frac.chars().chain(std::iter::repeat('0')).take(6).collect();
        let micros = digits
            .parse::<u32>()
            .map_err(|_| MessageTsParseError::InvalidFormat)?;

        Ok((secs, micros))
    }

    /// Convert to a UTC datetime
    pub fn to_datetime(&self) -> Result<DateTime<Utc>, MessageTsParseError> {
        let (secs, micros) = self.parts()?;
        DateTime::from_timestamp(secs, micros * 1_000).ok_or(MessageTsParseError::InvalidFormat)
    }
}

/// Chronological order; unparseable timestamps sort after valid ones, by text
impl Ord for MessageTs {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.parts(), other.parts()) {
            (Ok(a), Ok(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for MessageTs {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<&str> for MessageTs {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for MessageTs {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for MessageTs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
