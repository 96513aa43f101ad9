//! Configuration management for the screening service

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// What a model failure means for the vote
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum VotePolicy {
    /// Any model failure fails the whole request (all-or-nothing)
    Strict,
    /// Failed models are skipped; strictly more than half of the loaded
    /// models must still vote
    #[default]
    Quorum,
}

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub models: ModelsConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
}

/// Model bundle configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    /// Path to the serialized bundle; `<path>.gz` is tried as a fallback
    pub bundle_path: String,
    /// Failure policy for the ensemble vote
    #[serde(default)]
    pub vote_policy: VotePolicy,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from the default path (overridable via the
    /// `SCREENER_CONFIG` environment variable), falling back to
    /// compiled-in defaults when no file exists.
    pub fn load() -> Result<Self> {
        let path =
            std::env::var("SCREENER_CONFIG").unwrap_or_else(|_| "config/config.toml".to_string());

        if Path::new(&path).exists() {
            Self::load_from_path(&path)
        } else {
            info!(path = %path, "No config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            models: ModelsConfig {
                bundle_path: "models/ensemble.json".to_string(),
                vote_policy: VotePolicy::Quorum,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.models.bundle_path, "models/ensemble.json");
        assert_eq!(config.models.vote_policy, VotePolicy::Quorum);
    }

    #[test]
    fn test_load_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [models]
            bundle_path = "bundles/demo.json"
            vote_policy = "strict"

            [logging]
            level = "debug"
            format = "json"
            "#,
        )
        .unwrap();

        let config = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.models.vote_policy, VotePolicy::Strict);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_vote_policy_defaults_to_quorum() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
            [server]
            host = "0.0.0.0"
            port = 8000

            [models]
            bundle_path = "models/ensemble.json"

            [logging]
            level = "info"
            format = "pretty"
            "#,
        )
        .unwrap();

        let config = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(config.models.vote_policy, VotePolicy::Quorum);
    }
}
