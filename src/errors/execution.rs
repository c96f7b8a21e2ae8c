// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while executing a node tree.
//!
//! A node's own work reports through `anyhow::Result`; the engine converts
//! whatever it raised into an [`ExecutionError`] before attaching it to the
//! node's result or escalating it to the caller.

use std::sync::Arc;
use thiserror::Error;

/// Error captured in a `NodeResult` or returned from an execute call.
///
/// Cheap to clone: the same error value is attached to the result of the node
/// that raised it and to every ancestor it unwinds through.
#[derive(Debug, Clone, Error)]
pub enum ExecutionError {
    /// A node's work raised instead of returning a status.
    #[error("node '{node_id}' raised an unhandled error: {error:#}")]
    Unhandled {
        node_id: String,
        error: Arc<anyhow::Error>,
    },

    /// Several errors surfaced together.
    #[error("{} errors occurred: [{}]", .0.len(), join_messages(.0))]
    Aggregate(Vec<ExecutionError>),

    /// A spawned child task panicked or was aborted.
    #[error("task for node '{node_id}' did not complete: {message}")]
    TaskJoin { node_id: String, message: String },

    /// A batch entry point was handed no subjects.
    #[error("batch execution requires at least one subject")]
    EmptyBatch,

    /// A value could not be moved in or out of the shared state bag.
    #[error("state entry '{key}' could not be converted: {message}")]
    State { key: String, message: String },
}

impl ExecutionError {
    /// Convert an error raised by a node's work.
    ///
    /// Errors that are already `ExecutionError`s (escalated from a descendant)
    /// pass through unchanged so the caller sees the original failure.
    pub fn from_node_error(node_id: &str, error: anyhow::Error) -> Self {
        match error.downcast::<ExecutionError>() {
            Ok(execution_error) => execution_error,
            Err(other) => ExecutionError::Unhandled {
                node_id: node_id.to_string(),
                error: Arc::new(other),
            },
        }
    }

    /// Collapse a list of errors: one error stays itself, several become an aggregate.
    pub fn collect(mut errors: Vec<ExecutionError>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(ExecutionError::Aggregate(errors)),
        }
    }

    /// Id of the node the error originated from, when known.
    pub fn node_id(&self) -> Option<&str> {
        match self {
            ExecutionError::Unhandled { node_id, .. } | ExecutionError::TaskJoin { node_id, .. } => {
                Some(node_id)
            }
            _ => None,
        }
    }
}

fn join_messages(errors: &[ExecutionError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
