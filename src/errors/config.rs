// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Problems found while validating execution options.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A degree of parallelism of zero would never start a subject.
    #[error("degree_of_parallelism must be at least 1 (got {value})")]
    ZeroParallelism { value: usize },

    /// The configured degree of parallelism exceeds the supported maximum.
    #[error("degree_of_parallelism {value} exceeds the maximum of {maximum}")]
    ParallelismTooHigh { value: usize, maximum: usize },

    /// The logging filter could not be parsed.
    #[error("invalid logging filter '{filter}': {reason}")]
    InvalidLogFilter { filter: String, reason: String },
}

/// Errors from loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("configuration validation failed:\n{}", join_lines(.0))]
    Invalid(Vec<ValidationError>),
}

fn join_lines(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
