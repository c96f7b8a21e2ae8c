// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for composite orchestration, transitions and batch execution.
//!
//! This module contains message types for logging events related to:
//! * Pipeline short-circuits and cancellation
//! * First-match selection and group fan-in failures
//! * Transition failure propagation
//! * Batch execution lifecycle (start, completion, failure)

use crate::engine::result::NodeResultStatus;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Composite stopped launching children after a failed child.
///
/// # Log Level
/// `info!` - Expected when `continue_on_failure` is off
///
/// # Example
/// ```
/// use the_canopy::observability::messages::engine::CompositeShortCircuited;
///
/// let msg = CompositeShortCircuited {
///     node_id: "checkout",
///     failed_child: "charge_card",
///     skipped_children: 2,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct CompositeShortCircuited<'a> {
    pub node_id: &'a str,
    pub failed_child: &'a str,
    pub skipped_children: usize,
}

impl Display for CompositeShortCircuited<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Composite '{}' short-circuited after '{}' failed: {} children not started",
            self.node_id, self.failed_child, self.skipped_children
        )
    }
}

impl StructuredLog for CompositeShortCircuited<'_> {
    fn log(&self) {
        tracing::info!(
            node_id = self.node_id,
            failed_child = self.failed_child,
            skipped_children = self.skipped_children,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "short_circuit",
            span_name = name,
            node_id = self.node_id,
            failed_child = self.failed_child,
        )
    }
}

/// Composite observed the shared cancellation flag and stopped.
///
/// # Log Level
/// `info!` - Cancellation is requested deliberately by a node
pub struct ProcessingCancelled<'a> {
    pub node_id: &'a str,
    pub skipped_children: usize,
}

impl Display for ProcessingCancelled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Composite '{}' stopped: processing cancelled, {} children not started",
            self.node_id, self.skipped_children
        )
    }
}

impl StructuredLog for ProcessingCancelled<'_> {
    fn log(&self) {
        tracing::info!(
            node_id = self.node_id,
            skipped_children = self.skipped_children,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "processing_cancelled",
            span_name = name,
            node_id = self.node_id,
        )
    }
}

/// First-match composite found a child that ran.
///
/// # Log Level
/// `debug!`
pub struct FirstMatchSelected<'a> {
    pub node_id: &'a str,
    pub child_id: &'a str,
    pub status: NodeResultStatus,
}

impl Display for FirstMatchSelected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "First-match '{}' selected '{}' ({})",
            self.node_id, self.child_id, self.status
        )
    }
}

/// A group child's task did not complete.
///
/// # Log Level
/// `error!` - The child panicked or was aborted
pub struct GroupTaskFailed<'a> {
    pub node_id: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for GroupTaskFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Group '{}' child task failed: {}", self.node_id, self.error)
    }
}

impl StructuredLog for GroupTaskFailed<'_> {
    fn log(&self) {
        tracing::error!(
            node_id = self.node_id,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "group_task_failed",
            span_name = name,
            node_id = self.node_id,
            error = %self.error,
        )
    }
}

/// Transition copied failure-path errors from its destination subtree.
///
/// # Log Level
/// `warn!` - The bridged subtree failed
pub struct TransitionFailureSurfaced<'a> {
    pub node_id: &'a str,
    pub error_count: usize,
}

impl Display for TransitionFailureSurfaced<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Transition '{}' surfaced {} error(s) from its destination subtree",
            self.node_id, self.error_count
        )
    }
}

impl StructuredLog for TransitionFailureSurfaced<'_> {
    fn log(&self) {
        tracing::warn!(
            node_id = self.node_id,
            error_count = self.error_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "transition_failure",
            span_name = name,
            node_id = self.node_id,
            error_count = self.error_count,
        )
    }
}

/// Batch execution started.
///
/// # Log Level
/// `info!` - Important operational event
pub struct BatchStarted<'a> {
    pub node_id: &'a str,
    pub mode: &'a str,
    pub subject_count: usize,
    pub degree_of_parallelism: Option<usize>,
}

impl Display for BatchStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.degree_of_parallelism {
            Some(limit) => write!(
                f,
                "Starting {} batch of '{}': {} subjects, degree_of_parallelism={}",
                self.mode, self.node_id, self.subject_count, limit
            ),
            None => write!(
                f,
                "Starting {} batch of '{}': {} subjects",
                self.mode, self.node_id, self.subject_count
            ),
        }
    }
}

impl StructuredLog for BatchStarted<'_> {
    fn log(&self) {
        tracing::info!(
            node_id = self.node_id,
            mode = self.mode,
            subject_count = self.subject_count,
            degree_of_parallelism = self.degree_of_parallelism,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "batch",
            span_name = name,
            node_id = self.node_id,
            mode = self.mode,
            subject_count = self.subject_count,
        )
    }
}

/// Batch execution finished and produced an aggregated result.
///
/// # Log Level
/// `info!` - Important operational event
pub struct BatchCompleted<'a> {
    pub node_id: &'a str,
    pub subject_count: usize,
    pub succeeded: usize,
    pub status: NodeResultStatus,
    pub duration: std::time::Duration,
}

impl Display for BatchCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Batch of '{}' completed: {}/{} subjects succeeded, status {} in {:?}",
            self.node_id, self.succeeded, self.subject_count, self.status, self.duration
        )
    }
}

impl StructuredLog for BatchCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            node_id = self.node_id,
            subject_count = self.subject_count,
            succeeded = self.succeeded,
            status = %self.status,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "batch_completed",
            span_name = name,
            node_id = self.node_id,
            status = %self.status,
        )
    }
}

/// Batch execution raised to its caller.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct BatchFailed<'a> {
    pub node_id: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for BatchFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Batch of '{}' failed: {}", self.node_id, self.error)
    }
}

impl StructuredLog for BatchFailed<'_> {
    fn log(&self) {
        tracing::error!(
            node_id = self.node_id,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "batch_failed",
            span_name = name,
            node_id = self.node_id,
            error = %self.error,
        )
    }
}
