// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for configuration validation warnings and errors.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Both failure switches are on; `throw_on_error` wins for unhandled errors.
///
/// # Log Level
/// `warn!` - Legal but probably not intended
///
/// # Example
/// ```
/// use the_canopy::observability::messages::validation::ConflictingFailureOptions;
///
/// let msg = ConflictingFailureOptions { source: "global_options" };
/// tracing::warn!("{}", msg);
/// ```
pub struct ConflictingFailureOptions<'a> {
    pub source: &'a str,
}

impl Display for ConflictingFailureOptions<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}: continue_on_failure and throw_on_error are both set; unhandled errors will still escalate",
            self.source
        )
    }
}

impl StructuredLog for ConflictingFailureOptions<'_> {
    fn log(&self) {
        tracing::warn!(source = self.source, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("conflicting_options", span_name = name, source = self.source)
    }
}

/// Configuration failed validation.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ConfigValidationFailed<'a> {
    pub path: &'a str,
    pub error_count: usize,
}

impl Display for ConfigValidationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Configuration '{}' failed validation with {} error(s)",
            self.path, self.error_count
        )
    }
}

impl StructuredLog for ConfigValidationFailed<'_> {
    fn log(&self) {
        tracing::error!(path = self.path, error_count = self.error_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "config_validation_failed",
            span_name = name,
            path = self.path,
            error_count = self.error_count,
        )
    }
}
