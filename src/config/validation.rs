//! Validation of engine configuration.
//!
//! Checks run in a fixed order and every problem is collected, so one pass
//! reports everything wrong with a file:
//!
//! 1. **Degree of parallelism**: when present it must be at least 1 and no
//!    more than [`MAX_DEGREE_OF_PARALLELISM`]
//! 2. **Failure switches**: `continue_on_failure` together with
//!    `throw_on_error` is legal and only logged as a warning
//! 3. **Log filter**: must parse as a `tracing_subscriber::EnvFilter`
//!
//! # Examples
//!
//! ```rust
//! use the_canopy::config::{validate_options, Config};
//! use the_canopy::engine::ExecutionOptions;
//! use the_canopy::errors::ValidationError;
//!
//! let options = ExecutionOptions::new().degree_of_parallelism(0);
//! let errors = validate_options(&options, "global_options");
//! assert_eq!(errors, vec![ValidationError::ZeroParallelism { value: 0 }]);
//!
//! let config = Config::from_yaml_str("global_options:\n  degree_of_parallelism: 4\n").unwrap();
//! assert!(the_canopy::config::validate_config(&config).is_ok());
//! ```

use tracing_subscriber::EnvFilter;

use crate::config::consts::MAX_DEGREE_OF_PARALLELISM;
use crate::config::Config;
use crate::engine::ExecutionOptions;
use crate::errors::ValidationError;
use crate::observability::messages::validation::ConflictingFailureOptions;
use crate::observability::messages::StructuredLog;

/// Validate a whole configuration, returning every problem found.
pub fn validate_config(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = validate_options(&config.global_options, "global_options");

    if let Err(e) = EnvFilter::try_new(&config.logging.filter) {
        errors.push(ValidationError::InvalidLogFilter {
            filter: config.logging.filter.clone(),
            reason: e.to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate one set of execution options.
///
/// `source` names where the options came from and is only used for logging.
/// Usable on per-node options as well as the global ones.
pub fn validate_options(options: &ExecutionOptions, source: &str) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    match options.degree_of_parallelism {
        Some(0) => errors.push(ValidationError::ZeroParallelism { value: 0 }),
        Some(value) if value > MAX_DEGREE_OF_PARALLELISM => {
            errors.push(ValidationError::ParallelismTooHigh {
                value,
                maximum: MAX_DEGREE_OF_PARALLELISM,
            })
        }
        _ => {}
    }

    if options.continue_on_failure && options.throw_on_error {
        ConflictingFailureOptions { source }.log();
    }

    errors
}
