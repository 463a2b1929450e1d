//! Stager configuration: YAML parsing and validation.
//!
//! Validates structural constraints:
//! - callback URL must be present and absolute
//! - file server URL, when given, must be absolute
//! - every stack must map to a non-empty compiler path

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Read-only configuration for recipe building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagerConfig {
    /// Where the engine posts task completions.
    pub callback_url: String,

    /// Fixed file server for static discovery. When unset, a discovery
    /// service must supply one.
    #[serde(default)]
    pub file_server_url: Option<String>,

    #[serde(default = "default_min_memory_mb")]
    pub min_memory_mb: u64,

    #[serde(default = "default_min_disk_mb")]
    pub min_disk_mb: u64,

    #[serde(default = "default_min_file_descriptors")]
    pub min_file_descriptors: u64,

    /// Stack → compiler location (absolute http(s) URL or file-server path).
    #[serde(default)]
    pub compilers: IndexMap<String, String>,
}

fn default_min_memory_mb() -> u64 {
    1024
}

fn default_min_disk_mb() -> u64 {
    2048
}

fn default_min_file_descriptors() -> u64 {
    256
}

/// Failure to load a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error")]
    Parse {
        #[source]
        source: serde_yaml_ng::Error,
    },
}

/// A structural problem found in a parsed config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub message: String,
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Parse a config file from disk.
pub fn parse_config_file(path: &Path) -> Result<StagerConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

/// Parse a config from a YAML string.
pub fn parse_config(yaml: &str) -> Result<StagerConfig, ConfigError> {
    serde_yaml_ng::from_str(yaml).map_err(|source| ConfigError::Parse { source })
}

/// Validate a parsed config. Returns a list of issues (empty = valid).
pub fn validate_config(config: &StagerConfig) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();

    if config.callback_url.is_empty() {
        issues.push(ConfigIssue {
            message: "callback_url must not be empty".to_string(),
        });
    } else if let Err(e) = Url::parse(&config.callback_url) {
        issues.push(ConfigIssue {
            message: format!("callback_url '{}' is invalid: {}", config.callback_url, e),
        });
    }

    if let Some(ref file_server) = config.file_server_url {
        if let Err(e) = Url::parse(file_server) {
            issues.push(ConfigIssue {
                message: format!("file_server_url '{}' is invalid: {}", file_server, e),
            });
        }
    }

    if config.compilers.is_empty() {
        issues.push(ConfigIssue {
            message: "no compilers configured".to_string(),
        });
    }

    for (stack, path) in &config.compilers {
        if path.trim().is_empty() {
            issues.push(ConfigIssue {
                message: format!("stack '{}' has an empty compiler path", stack),
            });
        }
    }

    issues
}
