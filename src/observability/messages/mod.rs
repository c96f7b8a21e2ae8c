// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! * `node` - node lifecycle events (start, skip, completion, fault)
//! * `engine` - composite orchestration, transitions and batch execution
//! * `validation` - configuration validation warnings and errors
//!
//! # Usage Pattern
//!
//! ```rust
//! use the_canopy::observability::messages::engine::BatchStarted;
//!
//! let msg = BatchStarted {
//!     node_id: "order_pipeline",
//!     mode: "concurrent",
//!     subject_count: 12,
//!     degree_of_parallelism: Some(4),
//! };
//!
//! tracing::info!("{}", msg);
//! ```

use tracing::Span;

pub mod engine;
pub mod node;
pub mod validation;

/// A message that knows its own log level and structured fields.
pub trait StructuredLog {
    /// Emit the message as an event at its level.
    fn log(&self);

    /// Build a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
