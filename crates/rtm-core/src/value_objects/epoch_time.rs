//! Epoch time - whole seconds since the Unix epoch, as used by creation
//! and comment timestamps on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Seconds since 1970-01-01 00:00:00 UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpochTime(i64);

impl EpochTime {
    /// Create from raw seconds
    #[inline]
    pub const fn new(secs: i64) -> Self {
        Self(secs)
    }

    /// Get the raw seconds value
    #[inline]
    pub const fn as_secs(self) -> i64 {
        self.0
    }

    /// Convert to a UTC datetime, `None` if out of chrono's range
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.0, 0)
    }
}

impl From<i64> for EpochTime {
    fn from(secs: i64) -> Self {
        Self(secs)
    }
}

impl From<DateTime<Utc>> for EpochTime {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp())
    }
}

impl fmt::Display for EpochTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
