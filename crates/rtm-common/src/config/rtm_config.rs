//! RTM client configuration
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use serde::Deserialize;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// RTM ingestion configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RtmConfig {
    /// Events buffered before backpressure applies
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
    /// What the producer does when the buffer is full
    #[serde(default)]
    pub backpressure_policy: BackpressurePolicy,
    /// Upper bound on a blocked append (blocking policy only)
    #[serde(default)]
    pub append_timeout_ms: Option<u64>,
    /// Log unknown and undecodable events
    #[serde(default = "default_unknown_event_logging")]
    pub unknown_event_logging: bool,
    /// What the session does with frames that fail envelope decoding
    #[serde(default)]
    pub malformed_frame_policy: MalformedFramePolicy,
}

/// Producer behavior when the event buffer is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackpressurePolicy {
    /// Suspend the producer until space frees or the stream closes
    #[default]
    Blocking,
    /// Discard the oldest buffered event to make room
    DropOldest,
}

/// Session behavior on a frame that can't be decoded into an envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedFramePolicy {
    /// Log the frame and keep reading
    #[default]
    Skip,
    /// End the session and close the stream
    Terminate,
}

/// Event stream settings derived from [`RtmConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    pub capacity: usize,
    pub policy: BackpressurePolicy,
    pub append_timeout: Option<Duration>,
}

impl StreamConfig {
    /// Bounded blocking stream with no append timeout
    #[must_use]
    pub fn blocking(capacity: usize) -> Self {
        Self {
            capacity,
            policy: BackpressurePolicy::Blocking,
            append_timeout: None,
        }
    }

    /// Bounded stream that evicts the oldest event when full
    #[must_use]
    pub fn drop_oldest(capacity: usize) -> Self {
        Self {
            capacity,
            policy: BackpressurePolicy::DropOldest,
            append_timeout: None,
        }
    }

    /// Set the append timeout
    #[must_use]
    pub fn with_append_timeout(mut self, timeout: Duration) -> Self {
        self.append_timeout = Some(timeout);
        self
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self::blocking(default_buffer_capacity())
    }
}

impl BackpressurePolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blocking => "blocking",
            Self::DropOldest => "drop_oldest",
        }
    }
}

impl FromStr for BackpressurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "blocking" => Ok(Self::Blocking),
            "drop_oldest" | "drop-oldest" => Ok(Self::DropOldest),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for BackpressurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MalformedFramePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "terminate" => Ok(Self::Terminate),
            other => Err(other.to_string()),
        }
    }
}

// Default value functions
fn default_buffer_capacity() -> usize {
    64
}

fn default_unknown_event_logging() -> bool {
    true
}

impl Default for RtmConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: default_buffer_capacity(),
            backpressure_policy: BackpressurePolicy::default(),
            append_timeout_ms: None,
            unknown_event_logging: default_unknown_event_logging(),
            malformed_frame_policy: MalformedFramePolicy::default(),
        }
    }
}

impl RtmConfig {
    /// Load configuration from environment variables
    ///
    /// Recognized variables: `RTM_BUFFER_CAPACITY`, `RTM_BACKPRESSURE_POLICY`,
    /// `RTM_APPEND_TIMEOUT_MS`, `RTM_UNKNOWN_EVENT_LOGGING`,
    /// `RTM_MALFORMED_FRAME_POLICY`. Unset variables fall back to defaults.
    ///
    /// # Errors
    /// Returns an error if a variable is set to an unparseable value
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            buffer_capacity: parse_var(&lookup, "RTM_BUFFER_CAPACITY", str::parse::<usize>)?
                .unwrap_or_else(default_buffer_capacity),
            backpressure_policy: parse_var(&lookup, "RTM_BACKPRESSURE_POLICY", str::parse::<BackpressurePolicy>)?
                .unwrap_or_default(),
            append_timeout_ms: parse_var(&lookup, "RTM_APPEND_TIMEOUT_MS", str::parse::<u64>)?,
            unknown_event_logging: parse_var(&lookup, "RTM_UNKNOWN_EVENT_LOGGING", parse_bool)?
                .unwrap_or_else(default_unknown_event_logging),
            malformed_frame_policy: parse_var(&lookup, "RTM_MALFORMED_FRAME_POLICY", str::parse::<MalformedFramePolicy>)?
                .unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde defaults can't express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_capacity == 0 {
            return Err(ConfigError::InvalidValue(
                "RTM_BUFFER_CAPACITY",
                "must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Settings for the event stream
    #[must_use]
    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig {
            capacity: self.buffer_capacity,
            policy: self.backpressure_policy,
            append_timeout: self.append_timeout_ms.map(Duration::from_millis),
        }
    }

    /// Set the buffer capacity
    #[must_use]
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Set the backpressure policy
    #[must_use]
    pub fn with_backpressure_policy(mut self, policy: BackpressurePolicy) -> Self {
        self.backpressure_policy = policy;
        self
    }

    /// Set the append timeout
    #[must_use]
    pub fn with_append_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.append_timeout_ms = Some(timeout_ms);
        self
    }

    /// Enable or disable unknown event logging
    #[must_use]
    pub fn with_unknown_event_logging(mut self, enabled: bool) -> Self {
        self.unknown_event_logging = enabled;
        self
    }

    /// Set the malformed frame policy
    #[must_use]
    pub fn with_malformed_frame_policy(mut self, policy: MalformedFramePolicy) -> Self {
        self.malformed_frame_policy = policy;
        self
    }
}

fn parse_var<F, T, E>(
    lookup: &F,
    key: &'static str,
    parse: impl Fn(&str) -> Result<T, E>,
) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    E: fmt::Display,
{
    match lookup(key) {
        Some(raw) => parse(raw.trim())
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue(key, format!("{raw:?}: {e}"))),
        None => Ok(None),
    }
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("expected a boolean, got {other}")),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = RtmConfig::default();
        assert_eq!(config.buffer_capacity, 64);
        assert_eq!(config.backpressure_policy, BackpressurePolicy::Blocking);
        assert_eq!(config.append_timeout_ms, None);
        assert!(config.unknown_event_logging);
        assert_eq!(config.malformed_frame_policy, MalformedFramePolicy::Skip);
    }

    #[test]
    fn test_from_lookup_empty_uses_defaults() {
        let config = RtmConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, RtmConfig::default());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = RtmConfig::from_lookup(lookup(&[
            ("RTM_BUFFER_CAPACITY", "8"),
            ("RTM_BACKPRESSURE_POLICY", "drop_oldest"),
            ("RTM_APPEND_TIMEOUT_MS", "250"),
            ("RTM_UNKNOWN_EVENT_LOGGING", "false"),
            ("RTM_MALFORMED_FRAME_POLICY", "terminate"),
        ]))
        .unwrap();

        assert_eq!(config.buffer_capacity, 8);
        assert_eq!(config.backpressure_policy, BackpressurePolicy::DropOldest);
        assert_eq!(config.append_timeout_ms, Some(250));
        assert!(!config.unknown_event_logging);
        assert_eq!(config.malformed_frame_policy, MalformedFramePolicy::Terminate);
    }

    #[test]
    fn test_from_lookup_invalid_value() {
        let err = RtmConfig::from_lookup(lookup(&[("RTM_BACKPRESSURE_POLICY", "lifo")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("RTM_BACKPRESSURE_POLICY", _)));

        let err = RtmConfig::from_lookup(lookup(&[("RTM_BUFFER_CAPACITY", "lots")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("RTM_BUFFER_CAPACITY", _)));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = RtmConfig::from_lookup(lookup(&[("RTM_BUFFER_CAPACITY", "0")])).unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn test_stream_config() {
        let stream = RtmConfig::default()
            .with_buffer_capacity(4)
            .with_append_timeout_ms(100)
            .stream_config();

        assert_eq!(stream.capacity, 4);
        assert_eq!(stream.policy, BackpressurePolicy::Blocking);
        assert_eq!(stream.append_timeout, Some(Duration::from_millis(100)));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: RtmConfig =
            serde_json::from_str(r#"{"backpressure_policy": "drop_oldest"}"#).unwrap();
        assert_eq!(config.backpressure_policy, BackpressurePolicy::DropOldest);
        assert_eq!(config.buffer_capacity, 64);
        assert!(config.unknown_event_logging);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("Blocking".parse::<BackpressurePolicy>(), Ok(BackpressurePolicy::Blocking));
        assert_eq!("drop-oldest".parse::<BackpressurePolicy>(), Ok(BackpressurePolicy::DropOldest));
        assert!("skip".parse::<BackpressurePolicy>().is_err());
        assert_eq!(BackpressurePolicy::DropOldest.to_string(), "drop_oldest");
    }
}
