//! Slack read-marker sweeper library
//!
//! This library provides the pieces of a small maintenance tool that:
//! - Lists the private channels visible to the configured Slack identity
//! - Scans each channel's recent history for statuspage-bot messages
//! - Advances the channel read marker past a leading run of bot messages

pub mod config;
pub mod error;
pub mod marker;
pub mod slack;

// Re-export common types
pub use config::Config;
pub use error::{Error, Result};
pub use marker::{advance_marker, boundary_before, decide, Advancement};
pub use slack::{Channel, Message, SlackClient};

// Commands module uses re-exported types, so it must be declared after the re-exports
pub mod commands;
