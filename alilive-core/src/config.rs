use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::service::expiry::DEFAULT_TTL_SECS;
use crate::service::snowflake::{SnowflakeNode, MAX_NODE};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub live: LiveConfig,
    pub snowflake: SnowflakeConfig,
    pub logging: LoggingConfig,
}

/// Signing context for one live application
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveConfig {
    /// Application name, the first path segment of every URL
    pub app_name: String,
    /// Push authentication key (console: domain management > access control > URL auth)
    pub push_key: String,
    /// Play authentication key
    pub play_key: String,
    /// Ingest domain, `host[:port]`
    pub push_domain: String,
    /// Playback domain, `host[:port]`
    pub play_domain: String,
    /// Request the time-shifted stream on play URLs
    pub delay: bool,
    /// User id shown in cleartext in URLs, for troubleshooting
    pub uid: String,
    /// Lifetime of generated URLs in seconds
    pub ttl_seconds: i64,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            app_name: "live".to_string(),
            push_key: String::new(),
            play_key: String::new(),
            push_domain: String::new(),
            play_domain: String::new(),
            delay: false,
            uid: String::new(),
            ttl_seconds: DEFAULT_TTL_SECS,
        }
    }
}

impl std::fmt::Debug for LiveConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveConfig")
            .field("app_name", &self.app_name)
            .field("push_key", &"[REDACTED]")
            .field("play_key", &"[REDACTED]")
            .field("push_domain", &self.push_domain)
            .field("play_domain", &self.play_domain)
            .field("delay", &self.delay)
            .field("uid", &self.uid)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

/// Stream-name generator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnowflakeConfig {
    pub enabled: bool,
    /// Explicit node id, takes precedence over `machine_ip`
    pub node_id: Option<i64>,
    /// IPv4 address whose last segment becomes the node id
    pub machine_ip: Option<String>,
}

impl Default for SnowflakeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            node_id: None,
            machine_ip: None,
        }
    }
}

impl SnowflakeConfig {
    /// Build the configured generator
    ///
    /// Returns `None` when disabled or when neither a node id nor a machine ip is set.
    pub fn build_node(&self) -> crate::Result<Option<SnowflakeNode>> {
        if !self.enabled {
            return Ok(None);
        }
        match (self.node_id, self.machine_ip.as_deref()) {
            (Some(node), _) => SnowflakeNode::new(node).map(Some),
            (None, Some(ip)) => SnowflakeNode::from_machine_ip(ip).map(Some),
            (None, None) => Ok(None),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
    pub file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_path: None,
        }
    }
}

impl Config {
    /// Load configuration from multiple sources with priority:
    /// 1. Environment variables (highest priority)
    /// 2. Config file (if provided)
    /// 3. Defaults (lowest priority)
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_file {
            if Path::new(path).exists() {
                builder = builder.add_source(File::with_name(path));
            }
        }

        // ALILIVE_LIVE__PUSH_DOMAIN, ALILIVE_SNOWFLAKE__MACHINE_IP, ...
        // Values stay strings so keys and uids like "007" keep their text;
        // typed fields are converted during deserialization.
        builder = builder.add_source(
            Environment::with_prefix("ALILIVE")
                .prefix_separator("_")
                .separator("__"),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load from environment variables only
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Load from file path
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Self::load(Some(path))
    }

    /// Check the configuration, reporting every problem at once
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let required = [
            ("live.app_name", &self.live.app_name),
            ("live.push_key", &self.live.push_key),
            ("live.play_key", &self.live.play_key),
            ("live.push_domain", &self.live.push_domain),
            ("live.play_domain", &self.live.play_domain),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                errors.push(format!("{name} must not be empty"));
            }
        }

        for (name, domain) in [
            ("live.push_domain", &self.live.push_domain),
            ("live.play_domain", &self.live.play_domain),
        ] {
            if domain.contains("://") || domain.contains('/') {
                errors.push(format!(
                    "{name} must be a bare host[:port], got '{domain}'"
                ));
            }
        }

        if self.live.ttl_seconds <= 0 {
            errors.push(format!(
                "live.ttl_seconds must be positive, got {}",
                self.live.ttl_seconds
            ));
        }

        if let Some(node) = self.snowflake.node_id {
            if !(0..=MAX_NODE).contains(&node) {
                errors.push(format!(
                    "snowflake.node_id must be between 0 and {MAX_NODE}, got {node}"
                ));
            }
        }

        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            errors.push(format!(
                "logging.format must be 'json' or 'pretty', got '{}'",
                self.logging.format
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
