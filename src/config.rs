// src/config.rs

//! Loads and validates the configuration of a sessioned client.

use crate::core::errors::TransportError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::fs;

/// Settings for one sessioned client.
///
/// ```toml
/// name = "registry"
/// session_duration = "20m"
///
/// [metrics]
/// prefix = "discovery_transport"
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Identifies the client in logs and in the exported gauge's `client` label.
    #[serde(default = "default_name")]
    pub name: String,

    /// How long one underlying client is reused before it is replaced.
    /// Zero replaces the client on every request.
    #[serde(with = "humantime_serde", default = "default_session_duration")]
    pub session_duration: Duration,

    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,

    /// Prefix of the session duration gauge name.
    #[serde(default = "default_metrics_prefix")]
    pub prefix: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
            prefix: default_metrics_prefix(),
        }
    }
}

fn default_name() -> String {
    "default".to_string()
}

fn default_session_duration() -> Duration {
    Duration::from_secs(20 * 60)
}

fn default_metrics_enabled() -> bool {
    true
}

fn default_metrics_prefix() -> String {
    "sessioned_client".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            session_duration: default_session_duration(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Reads, parses and validates a TOML configuration file.
    pub async fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read session config file: {path}"))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to load session config from: {path}"))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SessionConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the values that would otherwise only fail later, at metrics registration.
    pub fn validate(&self) -> std::result::Result<(), TransportError> {
        if self.name.trim().is_empty() {
            return Err(TransportError::Config("name cannot be empty".into()));
        }
        if self.metrics.enabled && !is_valid_metric_prefix(&self.metrics.prefix) {
            return Err(TransportError::Config(format!(
                "invalid metrics prefix '{}': expected [a-zA-Z_:][a-zA-Z0-9_:]*",
                self.metrics.prefix
            )));
        }
        Ok(())
    }
}

fn is_valid_metric_prefix(prefix: &str) -> bool {
    let mut chars = prefix.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}
