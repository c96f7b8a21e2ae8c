// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Result tree produced by one execution.
//!
//! Every node that is attempted (including nodes skipped by their predicate)
//! contributes one [`NodeResult`], attached to the result of the composite
//! that launched it, so the result tree mirrors the attempted node tree.

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::errors::ExecutionError;

/// Outcome of one node invocation.
///
/// Not ordered by severity; composites reduce these with
/// [`aggregate`](crate::engine::aggregator::aggregate).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeResultStatus {
    /// The node's predicate declined it, or nothing under it ran.
    #[default]
    NotRun,
    /// Some children failed but the composite was allowed to carry on.
    SucceededWithErrors,
    Succeeded,
    Failed,
}

impl fmt::Display for NodeResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NodeResultStatus::NotRun => "not_run",
            NodeResultStatus::SucceededWithErrors => "succeeded_with_errors",
            NodeResultStatus::Succeeded => "succeeded",
            NodeResultStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

struct ResultInner<T> {
    id: String,
    flow_id: Option<String>,
    subject: RwLock<T>,
    status: RwLock<NodeResultStatus>,
    exception: RwLock<Option<ExecutionError>>,
    children: Mutex<Vec<NodeResult<T>>>,
}

/// Outcome of one node invocation plus the outcomes of the children it attempted.
///
/// A handle: clones share the same underlying result. Only the engine mutates a
/// result, and only while the owning node is running; child results are
/// appended as each child starts and the collection is safe for concurrent
/// appends from a group's children.
pub struct NodeResult<T> {
    inner: Arc<ResultInner<T>>,
}

impl<T> Clone for NodeResult<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone> NodeResult<T> {
    pub(crate) fn new(subject: T, id: impl Into<String>, flow_id: Option<String>) -> Self {
        Self {
            inner: Arc::new(ResultInner {
                id: id.into(),
                flow_id,
                subject: RwLock::new(subject),
                status: RwLock::new(NodeResultStatus::NotRun),
                exception: RwLock::new(None),
                children: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Subject as it stood when the node finished (or when it was skipped).
    pub fn subject(&self) -> T {
        self.inner.subject.read().clone()
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn flow_id(&self) -> Option<&str> {
        self.inner.flow_id.as_deref()
    }

    pub fn status(&self) -> NodeResultStatus {
        *self.inner.status.read()
    }

    /// Unhandled error captured for this node, if any.
    pub fn exception(&self) -> Option<ExecutionError> {
        self.inner.exception.read().clone()
    }

    /// Snapshot of the child results in the order they were attached.
    pub fn child_results(&self) -> Vec<NodeResult<T>> {
        self.inner.children.lock().clone()
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self.status(),
            NodeResultStatus::Succeeded | NodeResultStatus::SucceededWithErrors
        )
    }

    /// Errors relevant to this result's failure path.
    ///
    /// Walks only through results whose status is `Failed`, so an error
    /// captured under a child that did not itself fail is left out.
    pub fn fail_exceptions(&self) -> Vec<ExecutionError> {
        let mut collected = Vec::new();
        self.collect_fail_exceptions(&mut collected);
        collected
    }

    fn collect_fail_exceptions(&self, collected: &mut Vec<ExecutionError>) {
        if self.status() != NodeResultStatus::Failed {
            return;
        }
        if let Some(exception) = self.exception() {
            collected.push(exception);
        }
        for child in self.child_results() {
            child.collect_fail_exceptions(collected);
        }
    }

    pub(crate) fn set_subject(&self, subject: T) {
        *self.inner.subject.write() = subject;
    }

    pub(crate) fn set_status(&self, status: NodeResultStatus) {
        *self.inner.status.write() = status;
    }

    pub(crate) fn set_exception(&self, exception: ExecutionError) {
        *self.inner.exception.write() = Some(exception);
    }

    pub(crate) fn add_child(&self, child: NodeResult<T>) {
        self.inner.children.lock().push(child);
    }

    /// True when both handles point at the same result.
    pub fn ptr_eq(&self, other: &NodeResult<T>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for NodeResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeResult")
            .field("id", &self.id())
            .field("flow_id", &self.flow_id())
            .field("status", &self.status())
            .field("subject", &self.subject())
            .field("exception", &self.exception())
            .field("child_count", &self.inner.children.lock().len())
            .finish()
    }
}
