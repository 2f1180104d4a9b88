//! Top-level wiring for the Herald campaign delivery engine.

pub mod config;

pub use config::{Config, ConfigError};
