// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! YAML configuration for the client and its datastreams.
//!
//! ```yaml
//! cosm:
//!   server: "http://api.cosm.com"
//!   api_key: "your-api-key"
//!   timeout_ms: 30000
//! streams:
//!   - feed_id: 12345
//!     stream_id: "temperature"
//!     queue_size: 20
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

use crate::datastream::DEFAULT_QUEUE_SIZE;
use crate::queue::{MAX_CAPACITY, MIN_CAPACITY};

/// Default service root.
pub const DEFAULT_SERVER: &str = "http://api.cosm.com";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Service root, e.g. `http://api.cosm.com`.
    #[serde(default = "default_server")]
    pub server: String,

    /// Sent as `X-ApiKey` on every request.
    pub api_key: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_server() -> String {
    DEFAULT_SERVER.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_queue_size() -> usize {
    DEFAULT_QUEUE_SIZE
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            server: default_server(),
            api_key: api_key.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = server.into();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Invalid("api_key must not be empty".into()));
        }
        if self.server.trim().is_empty() {
            return Err(ConfigError::Invalid("server must not be empty".into()));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeout_ms must be positive".into()));
        }
        Ok(())
    }
}

/// One datastream to write to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConfig {
    pub feed_id: u64,
    pub stream_id: String,
    /// Points buffered before a flush.
    #[serde(default = "default_queue_size")]
    pub queue_size: usize,
}

/// Top-level configuration of `cosm-push`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushConfig {
    pub cosm: ClientConfig,
    #[serde(default)]
    pub streams: Vec<StreamConfig>,
}

impl PushConfig {
    /// Parse and validate configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: PushConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cosm.validate()?;

        if self.streams.is_empty() {
            return Err(ConfigError::Invalid("No streams configured".into()));
        }

        let mut seen = HashSet::new();
        for (i, stream) in self.streams.iter().enumerate() {
            if stream.stream_id.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "Stream {} has an empty stream_id",
                    i
                )));
            }
            if !(MIN_CAPACITY..=MAX_CAPACITY).contains(&stream.queue_size) {
                return Err(ConfigError::Invalid(format!(
                    "Stream {} queue_size {} is outside {}..={}",
                    i, stream.queue_size, MIN_CAPACITY, MAX_CAPACITY
                )));
            }
            if !seen.insert((stream.feed_id, stream.stream_id.as_str())) {
                return Err(ConfigError::Invalid(format!(
                    "Stream {} duplicates feed {} / stream {}",
                    i, stream.feed_id, stream.stream_id
                )));
            }
        }
        Ok(())
    }

    /// Sample configuration written by `cosm-push gen-config`.
    pub fn example() -> Self {
        Self {
            cosm: ClientConfig::new("YOUR_API_KEY"),
            streams: vec![
                StreamConfig {
                    feed_id: 12345,
                    stream_id: "temperature".into(),
                    queue_size: 20,
                },
                StreamConfig {
                    feed_id: 12345,
                    stream_id: "humidity".into(),
                    queue_size: 1,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL_YAML: &str = r#"
cosm:
  api_key: "test-key"
streams:
  - feed_id: 12345
    stream_id: "1"
"#;

    const FULL_YAML: &str = r#"
cosm:
  server: "http://localhost:8080"
  api_key: "test-key"
  timeout_ms: 5000
streams:
  - feed_id: 12345
    stream_id: "temperature"
    queue_size: 20
  - feed_id: 7021
    stream_id: "humidity"
    queue_size: 500
"#;

    #[test]
    fn test_config_parse_minimal() {
        let config = PushConfig::from_yaml(MINIMAL_YAML).expect("parse minimal yaml");

        assert_eq!(config.cosm.server, "http://api.cosm.com");
        assert_eq!(config.cosm.api_key, "test-key");
        assert_eq!(config.cosm.timeout_ms, 30_000);
        assert_eq!(config.streams.len(), 1);
        assert_eq!(config.streams[0].feed_id, 12345);
        assert_eq!(config.streams[0].stream_id, "1");
        assert_eq!(config.streams[0].queue_size, 1);
    }

    #[test]
    fn test_config_parse_all_fields() {
        let config = PushConfig::from_yaml(FULL_YAML).expect("parse full yaml");

        assert_eq!(config.cosm.server, "http://localhost:8080");
        assert_eq!(config.cosm.timeout_ms, 5000);
        assert_eq!(config.streams.len(), 2);
        assert_eq!(config.streams[0].queue_size, 20);
        assert_eq!(config.streams[1].feed_id, 7021);
        assert_eq!(config.streams[1].queue_size, 500);
    }

    #[test]
    fn test_config_rejects_bad_queue_size() {
        let yaml = MINIMAL_YAML.replace("stream_id: \"1\"", "stream_id: \"1\"\n    queue_size: 501");
        match PushConfig::from_yaml(&yaml) {
            Err(ConfigError::Invalid(msg)) => assert!(msg.contains("queue_size 501")),
            other => panic!("expected Invalid, got: {:?}", other),
        }
    }

    #[test]
    fn test_config_rejects_empty_api_key() {
        let yaml = MINIMAL_YAML.replace("test-key", "");
        assert!(matches!(
            PushConfig::from_yaml(&yaml),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_config_rejects_duplicate_streams() {
        let yaml = r#"
cosm:
  api_key: "k"
streams:
  - feed_id: 1
    stream_id: "a"
  - feed_id: 1
    stream_id: "a"
"#;
        match PushConfig::from_yaml(yaml) {
            Err(ConfigError::Invalid(msg)) => assert!(msg.contains("duplicates")),
            other => panic!("expected Invalid, got: {:?}", other),
        }
    }

    #[test]
    fn test_config_rejects_missing_api_key() {
        let yaml = "cosm:\n  server: \"http://x\"\nstreams: []\n";
        assert!(matches!(
            PushConfig::from_yaml(yaml),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn test_example_round_trips_through_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let yaml = PushConfig::example().to_yaml().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = PushConfig::from_file(file.path()).unwrap();
        assert_eq!(config, PushConfig::example());
    }

    #[test]
    fn test_config_missing_file() {
        assert!(matches!(
            PushConfig::from_file("/nonexistent/cosm.yaml"),
            Err(ConfigError::Io(_))
        ));
    }
}
