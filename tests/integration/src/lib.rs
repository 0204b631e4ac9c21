//! Integration test utilities for the RTM ingestion pipeline
//!
//! This crate provides sample frames and helpers for driving sessions
//! end to end.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
