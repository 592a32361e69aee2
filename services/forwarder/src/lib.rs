//! The forwarder operational binary (SPEC_FULL.md §6): CLI surface,
//! ambient config, and the three entity-variant `ProcessingStrategy`
//! implementations (§4.5) wired onto the shared batching harness.

pub mod classify;
pub mod cli;
pub mod config;
pub mod consumer_split;
pub mod error;
pub mod strategy;

pub use classify::Entity;
pub use cli::{Args, DEFAULT_TOPIC};
pub use config::{Config, ConfigError};
pub use error::ForwarderError;
pub use strategy::ForwarderStrategy;
