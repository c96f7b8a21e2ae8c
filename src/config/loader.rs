// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::config::consts::DEFAULT_LOG_FILTER;
use crate::config::validation::validate_config;
use crate::engine::ExecutionOptions;
use crate::errors::ConfigError;
use crate::observability::messages::validation::ConfigValidationFailed;
use crate::observability::messages::StructuredLog;

/// Engine-wide configuration.
///
/// `global_options` become the chain-global options of every top-level
/// execution started with them; per-node options still override them.
/// `logging` drives [`crate::observability::init_tracing`].
///
/// # Fields
/// * `global_options` - Default `ExecutionOptions` (all fields optional)
/// * `logging` - Subscriber filter and output format (optional)
///
/// # Example
/// ```yaml
/// global_options:
///   continue_on_failure: true
///   degree_of_parallelism: 8
/// logging:
///   filter: "the_canopy=debug"
///   format: compact
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub global_options: ExecutionOptions,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

/// Logging section of the configuration.
///
/// # Fields
/// * `filter` - `EnvFilter` directive string, used when `RUST_LOG` is unset
/// * `format` - `full` or `compact` fmt output
/// * `with_target` - Include the event target (module path) in each line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
    pub format: LogFormat,
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            format: LogFormat::default(),
            with_target: true,
        }
    }
}

/// Output format of the fmt subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
}

/// Load a config from a YAML or TOML file.
///
/// Files ending in `.toml` are parsed as TOML; anything else as YAML.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => Config::from_toml_str(&content),
        _ => Config::from_yaml_str(&content),
    }
}

/// Load a config file and validate its options.
///
/// Every validation problem is reported at once in [`ConfigError::Invalid`].
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let cfg = load_config(path)?;

    if let Err(validation_errors) = validate_config(&cfg) {
        ConfigValidationFailed {
            path: &path.display().to_string(),
            error_count: validation_errors.len(),
        }
        .log();
        return Err(ConfigError::Invalid(validation_errors));
    }

    Ok(cfg)
}
