//! Configuration structs

mod rtm_config;

pub use rtm_config::{BackpressurePolicy, ConfigError, MalformedFramePolicy, RtmConfig, StreamConfig};
