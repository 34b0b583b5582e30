//! Configuration management module
//!
//! This module handles loading and validating application configuration
//! from environment variables and .env files.

pub mod keys;
pub mod settings;

pub use keys::{collect_keys, parse_key_list, ConfigurationError};
pub use settings::{Environment, GeminiSettings, LogFormat, Settings};
