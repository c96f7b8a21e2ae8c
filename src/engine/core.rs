// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::engine::context::{ExecutionContext, Subject};
use crate::engine::options::ExecutionOptions;
use crate::traits::ShouldExecuteBlock;

/// Lifecycle of a node instance, independent of any one outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRunStatus {
    #[default]
    NotRun,
    Running,
    Completed,
    Faulted,
}

impl fmt::Display for NodeRunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NodeRunStatus::NotRun => "not_run",
            NodeRunStatus::Running => "running",
            NodeRunStatus::Completed => "completed",
            NodeRunStatus::Faulted => "faulted",
        };
        f.write_str(label)
    }
}

/// Predicate function deciding whether a node runs for the current context.
pub type ShouldExecuteFn<T> = Arc<dyn Fn(&ExecutionContext<T>) -> bool + Send + Sync>;

/// State every node carries: identity, options, predicates, metadata and run status.
///
/// `status` is per instance. When one instance is executed for several
/// subjects at once it only reflects whichever invocation wrote last; the
/// concurrent batch runner avoids this by executing a [`fork`](Self::fork)
/// per subject wherever the node supports it.
pub struct NodeCore<T> {
    id: String,
    flow_id: Option<String>,
    local_options: Option<ExecutionOptions>,
    custom_data: Option<Value>,
    should_execute_func: Option<ShouldExecuteFn<T>>,
    should_execute_block: Option<Arc<dyn ShouldExecuteBlock<T>>>,
    status: RwLock<NodeRunStatus>,
}

impl<T: Subject> NodeCore<T> {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            flow_id: None,
            local_options: None,
            custom_data: None,
            should_execute_func: None,
            should_execute_block: None,
            status: RwLock::new(NodeRunStatus::NotRun),
        }
    }

    /// Core whose id is the short name of `N`.
    pub fn for_type<N: ?Sized>() -> Self {
        Self::new(short_type_name::<N>())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn flow_id(&self) -> Option<&str> {
        self.flow_id.as_deref()
    }

    pub fn set_flow_id(&mut self, flow_id: impl Into<String>) {
        self.flow_id = Some(flow_id.into());
    }

    pub fn local_options(&self) -> Option<&ExecutionOptions> {
        self.local_options.as_ref()
    }

    pub fn set_local_options(&mut self, options: ExecutionOptions) {
        self.local_options = Some(options);
    }

    pub fn custom_data(&self) -> Option<&Value> {
        self.custom_data.as_ref()
    }

    pub fn set_custom_data(&mut self, data: Value) {
        self.custom_data = Some(data);
    }

    pub fn should_execute_func(&self) -> Option<&ShouldExecuteFn<T>> {
        self.should_execute_func.as_ref()
    }

    pub fn set_should_execute_func(&mut self, predicate: ShouldExecuteFn<T>) {
        self.should_execute_func = Some(predicate);
    }

    pub fn should_execute_block(&self) -> Option<&Arc<dyn ShouldExecuteBlock<T>>> {
        self.should_execute_block.as_ref()
    }

    pub fn set_should_execute_block(&mut self, block: Arc<dyn ShouldExecuteBlock<T>>) {
        self.should_execute_block = Some(block);
    }

    pub fn status(&self) -> NodeRunStatus {
        *self.status.read()
    }

    pub(crate) fn set_status(&self, status: NodeRunStatus) {
        *self.status.write() = status;
    }

    /// Copy of this core with the same configuration and a fresh `NotRun` status.
    pub fn fork(&self) -> Self {
        Self {
            id: self.id.clone(),
            flow_id: self.flow_id.clone(),
            local_options: self.local_options.clone(),
            custom_data: self.custom_data.clone(),
            should_execute_func: self.should_execute_func.clone(),
            should_execute_block: self.should_execute_block.clone(),
            status: RwLock::new(NodeRunStatus::NotRun),
        }
    }
}

impl<T> fmt::Debug for NodeCore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeCore")
            .field("id", &self.id)
            .field("flow_id", &self.flow_id)
            .field("local_options", &self.local_options)
            .field("has_should_execute_func", &self.should_execute_func.is_some())
            .field("has_should_execute_block", &self.should_execute_block.is_some())
            .field("status", &*self.status.read())
            .finish()
    }
}

fn short_type_name<N: ?Sized>() -> String {
    let full = std::any::type_name::<N>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}
