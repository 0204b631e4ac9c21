//! User presence

use serde::{Deserialize, Serialize};
use std::fmt;

/// Presence value carried by `presence_change` events.
///
/// Values the client doesn't know yet are kept as [`Presence::Other`] so a
/// new server-side state never fails the decode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Presence {
    Active,
    Away,
    Other(String),
}

impl Presence {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::Away => "away",
            Self::Other(s) => s,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl From<String> for Presence {
    fn from(s: String) -> Self {
        match s.as_str() {
            "active" => Self::Active,
            "away" => Self::Away,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for Presence {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<Presence> for String {
    fn from(p: Presence) -> Self {
        match p {
            Presence::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
