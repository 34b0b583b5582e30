//! Application settings and configuration
//!
//! This module provides configuration management for the application,
//! loading settings from environment variables with sensible defaults.

use crate::config::keys::collect_keys;
use crate::services::sanitizer::SanitizerMode;
use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;

/// Default multipart body limit (25 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Application environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[value(alias = "dev")]
    Development,
    #[value(alias = "stage")]
    Staging,
    #[value(alias = "prod")]
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Development
    }
}

impl std::str::FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" | "stage" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => anyhow::bail!("Invalid environment: {}. Expected: development, staging, or production", s),
        }
    }
}

/// Console log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            _ => anyhow::bail!("Invalid log format: {}. Expected: json or pretty", s),
        }
    }
}

/// Gemini backend settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeminiSettings {
    /// Ordered credential list
    #[serde(skip_serializing)]
    pub api_keys: Vec<String>,
    pub keys_file: Option<PathBuf>,
    pub model: String,
    pub base_url: Option<String>,
    /// 0 disables the per-call timeout
    pub timeout_seconds: u64,
    /// Refuse to start without at least one key
    pub require_api_keys: bool,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_keys: Vec::new(),
            keys_file: None,
            model: "gemini-1.5-flash".to_string(),
            base_url: None,
            timeout_seconds: 0,
            require_api_keys: false,
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    // App settings
    pub app_name: String,
    pub app_version: String,
    pub environment: Environment,
    pub log_level: String,
    pub log_format: LogFormat,

    // Server settings
    pub host: String,
    pub port: u16,

    // Generation
    pub gemini: GeminiSettings,
    pub sanitizer_mode: SanitizerMode,

    // Uploads
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Settings {
    /// Load settings from environment variables with defaults
    pub fn load() -> Result<Self> {
        // Load .env file if it exists (ignored in production typically)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let keys_file = lookup("GEMINI_KEYS_FILE")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);
        let api_keys = collect_keys(lookup("GEMINI_API_KEYS").as_deref(), keys_file.as_deref())
            .context("Failed to load Gemini API keys")?;

        let settings = Self {
            // App settings
            app_name: or_default("APP_NAME", "smartstudy"),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            environment: or_default("ENVIRONMENT", "development")
                .parse()
                .unwrap_or_default(),
            log_level: or_default("LOG_LEVEL", "info"),
            log_format: or_default("LOG_FORMAT", "json")
                .parse()
                .context("Invalid LOG_FORMAT value")?,

            // Server settings
            host: or_default("HOST", "0.0.0.0"),
            port: or_default("PORT", "3001")
                .parse()
                .context("Invalid PORT value")?,

            // Generation
            gemini: GeminiSettings {
                api_keys,
                keys_file,
                model: or_default("GEMINI_MODEL", "gemini-1.5-flash"),
                base_url: lookup("GEMINI_BASE_URL").filter(|u| !u.trim().is_empty()),
                timeout_seconds: or_default("GEMINI_TIMEOUT_SECONDS", "0")
                    .parse()
                    .context("Invalid GEMINI_TIMEOUT_SECONDS value")?,
                require_api_keys: or_default("REQUIRE_API_KEYS", "false")
                    .parse()
                    .unwrap_or(false),
            },
            sanitizer_mode: or_default("SANITIZER_MODE", "full")
                .parse()
                .context("Invalid SANITIZER_MODE value")?,

            // Uploads
            upload_dir: lookup("UPLOAD_DIR")
                .filter(|d| !d.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir),
            max_upload_bytes: lookup("MAX_UPLOAD_BYTES")
                .map(|v| v.parse())
                .transpose()
                .context("Invalid MAX_UPLOAD_BYTES value")?
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        };

        // Validate settings
        settings.validate()?;

        Ok(settings)
    }

    /// Validate settings
    pub fn validate(&self) -> Result<()> {
        // Validate port range
        if self.port == 0 {
            anyhow::bail!("Port cannot be 0");
        }

        if self.max_upload_bytes == 0 {
            anyhow::bail!("MAX_UPLOAD_BYTES must be > 0");
        }

        if self.gemini.model.trim().is_empty() {
            anyhow::bail!("GEMINI_MODEL cannot be empty");
        }

        if self.gemini.api_keys.is_empty() && self.gemini.require_api_keys {
            anyhow::bail!("No Gemini API keys configured. Set GEMINI_API_KEYS or GEMINI_KEYS_FILE.");
        }

        Ok(())
    }

    /// Check if running in production mode
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Get the server address string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "smartstudy".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            environment: Environment::Development,
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
            host: "0.0.0.0".to_string(),
            port: 3001,
            gemini: GeminiSettings::default(),
            sanitizer_mode: SanitizerMode::Full,
            upload_dir: env::temp_dir(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(vars: &[(&str, &str)]) -> Result<Settings> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.app_name, "smartstudy");
        assert_eq!(settings.port, 3001);
        assert_eq!(settings.gemini.model, "gemini-1.5-flash");
        assert!(!settings.gemini.require_api_keys);
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!("development".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!("production".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Production);
    }

    #[test]
    fn test_server_addr() {
        let settings = Settings::default();
        assert_eq!(settings.server_addr(), "0.0.0.0:3001");
    }

    #[test]
    fn test_from_lookup_defaults() {
        let settings = settings_from(&[]).unwrap();

        assert_eq!(settings.port, 3001);
        assert_eq!(settings.log_format, LogFormat::Json);
        assert_eq!(settings.sanitizer_mode, SanitizerMode::Full);
        assert!(settings.gemini.api_keys.is_empty());
        assert_eq!(settings.gemini.timeout_seconds, 0);
        assert_eq!(settings.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn test_from_lookup_overrides() {
        let settings = settings_from(&[
            ("PORT", "8080"),
            ("LOG_FORMAT", "pretty"),
            ("GEMINI_API_KEYS", "k1, k2"),
            ("GEMINI_MODEL", "gemini-2.0-flash"),
            ("GEMINI_TIMEOUT_SECONDS", "45"),
            ("SANITIZER_MODE", "minimal"),
            ("UPLOAD_DIR", "/var/tmp/uploads"),
            ("MAX_UPLOAD_BYTES", "1024"),
            ("ENVIRONMENT", "prod"),
        ])
        .unwrap();

        assert_eq!(settings.port, 8080);
        assert_eq!(settings.log_format, LogFormat::Pretty);
        assert_eq!(settings.gemini.api_keys, vec!["k1", "k2"]);
        assert_eq!(settings.gemini.model, "gemini-2.0-flash");
        assert_eq!(settings.gemini.timeout_seconds, 45);
        assert_eq!(settings.sanitizer_mode, SanitizerMode::Minimal);
        assert_eq!(settings.upload_dir, PathBuf::from("/var/tmp/uploads"));
        assert_eq!(settings.max_upload_bytes, 1024);
        assert!(settings.is_production());
    }

    #[test]
    fn test_required_keys_missing_fails() {
        let err = settings_from(&[("REQUIRE_API_KEYS", "true")]).unwrap_err();

        assert!(err.to_string().contains("No Gemini API keys configured"));
    }

    #[test]
    fn test_invalid_values_fail() {
        assert!(settings_from(&[("PORT", "abc")]).is_err());
        assert!(settings_from(&[("PORT", "0")]).is_err());
        assert!(settings_from(&[("SANITIZER_MODE", "aggressive")]).is_err());
        assert!(settings_from(&[("GEMINI_KEYS_FILE", "/nonexistent/keys.json")]).is_err());
    }
}
