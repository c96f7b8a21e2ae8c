// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the node lifecycle.

use crate::engine::result::NodeResultStatus;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Node passed its predicate and is about to run its work.
///
/// # Log Level
/// `debug!` - Emitted for every node in every execution
pub struct NodeExecutionStarted<'a> {
    pub node_id: &'a str,
    pub flow_id: Option<&'a str>,
}

impl Display for NodeExecutionStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Node '{}' execution started", self.node_id)
    }
}

impl StructuredLog for NodeExecutionStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            node_id = self.node_id,
            flow_id = self.flow_id,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "node",
            span_name = name,
            node_id = self.node_id,
            flow_id = self.flow_id,
        )
    }
}

/// Node's predicate declined execution.
///
/// # Log Level
/// `debug!` - Skips are routine, never errors
///
/// # Example
/// ```
/// use the_canopy::observability::messages::node::NodeSkipped;
///
/// let msg = NodeSkipped {
///     node_id: "apply_discount",
///     flow_id: None,
/// };
///
/// assert_eq!(msg.to_string(), "Node 'apply_discount' skipped: predicate declined execution");
/// ```
pub struct NodeSkipped<'a> {
    pub node_id: &'a str,
    pub flow_id: Option<&'a str>,
}

impl Display for NodeSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' skipped: predicate declined execution",
            self.node_id
        )
    }
}

impl StructuredLog for NodeSkipped<'_> {
    fn log(&self) {
        tracing::debug!(
            node_id = self.node_id,
            flow_id = self.flow_id,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "node_skipped",
            span_name = name,
            node_id = self.node_id,
        )
    }
}

/// Node's work returned a status.
///
/// # Log Level
/// `debug!` - Emitted for every node that ran
pub struct NodeExecutionCompleted<'a> {
    pub node_id: &'a str,
    pub status: NodeResultStatus,
    pub duration: std::time::Duration,
}

impl Display for NodeExecutionCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' completed with status {} in {:?}",
            self.node_id, self.status, self.duration
        )
    }
}

impl StructuredLog for NodeExecutionCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            node_id = self.node_id,
            status = %self.status,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "node_completed",
            span_name = name,
            node_id = self.node_id,
            status = %self.status,
        )
    }
}

/// Node's work raised an unhandled error.
///
/// # Log Level
/// `error!` when the error escalates to the caller, `warn!` when it is
/// captured into the node's result
pub struct NodeExecutionFaulted<'a> {
    pub node_id: &'a str,
    pub error: &'a dyn std::error::Error,
    pub escalated: bool,
}

impl Display for NodeExecutionFaulted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let disposition = if self.escalated { "escalating" } else { "captured" };
        write!(
            f,
            "Node '{}' faulted ({}): {}",
            self.node_id, disposition, self.error
        )
    }
}

impl StructuredLog for NodeExecutionFaulted<'_> {
    fn log(&self) {
        if self.escalated {
            tracing::error!(
                node_id = self.node_id,
                error = %self.error,
                "{}", self
            );
        } else {
            tracing::warn!(
                node_id = self.node_id,
                error = %self.error,
                "{}", self
            );
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "node_faulted",
            span_name = name,
            node_id = self.node_id,
            error = %self.error,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_completed_message() {
        let msg = NodeExecutionCompleted {
            node_id: "ship",
            status: NodeResultStatus::SucceededWithErrors,
            duration: Duration::from_millis(5),
        };
        assert_eq!(
            msg.to_string(),
            "Node 'ship' completed with status succeeded_with_errors in 5ms"
        );
    }

    #[test]
    fn test_faulted_message_disposition() {
        let error = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let captured = NodeExecutionFaulted {
            node_id: "archive",
            error: &error,
            escalated: false,
        };
        assert_eq!(captured.to_string(), "Node 'archive' faulted (captured): disk full");
    }
}
