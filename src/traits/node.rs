// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::engine::context::{ExecutionContext, Subject};
use crate::engine::core::{NodeCore, NodeRunStatus};
use crate::engine::lifecycle;
use crate::engine::options::ExecutionOptions;
use crate::engine::result::{NodeResult, NodeResultStatus};
use crate::errors::ExecutionError;
use crate::traits::ShouldExecuteBlock;

/// A unit of work in a node tree, leaf or composite.
///
/// Implementors supply [`core`](Node::core) and the node's own work in
/// [`perform_execute`](Node::perform_execute). The provided `execute*`
/// methods wrap that work in the node lifecycle: result creation, predicate
/// evaluation, run-status transitions and error capture. They are not meant
/// to be overridden.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use the_canopy::engine::{ExecutionContext, NodeCore, NodeResultStatus};
/// use the_canopy::traits::Node;
///
/// struct RejectEmpty {
///     core: NodeCore<String>,
/// }
///
/// #[async_trait]
/// impl Node<String> for RejectEmpty {
///     fn core(&self) -> &NodeCore<String> {
///         &self.core
///     }
///
///     fn core_mut(&mut self) -> &mut NodeCore<String> {
///         &mut self.core
///     }
///
///     async fn perform_execute(
///         &self,
///         context: &ExecutionContext<String>,
///     ) -> anyhow::Result<NodeResultStatus> {
///         Ok(if context.with_subject(|s| s.is_empty()) {
///             NodeResultStatus::Failed
///         } else {
///             NodeResultStatus::Succeeded
///         })
///     }
/// }
///
/// # #[tokio::main]
/// # async fn main() {
/// let node = RejectEmpty { core: NodeCore::new("reject_empty") };
/// let result = node.execute(String::new()).await.unwrap();
/// assert_eq!(result.status(), NodeResultStatus::Failed);
/// # }
/// ```
#[async_trait]
pub trait Node<T: Subject>: Send + Sync {
    fn core(&self) -> &NodeCore<T>;

    fn core_mut(&mut self) -> &mut NodeCore<T>;

    /// The node's own work. Errors are captured into the node's result.
    async fn perform_execute(&self, context: &ExecutionContext<T>) -> anyhow::Result<NodeResultStatus>;

    /// Fallback predicate used when no predicate function or block is configured.
    async fn should_execute(&self, _context: &ExecutionContext<T>) -> bool {
        true
    }

    /// Reset descendants. Composites override this; leaves have none.
    fn reset_children(&self) {}

    /// Fresh copy of this node (and its subtree) with independent run status.
    ///
    /// `None` means the node cannot be copied and must be shared.
    fn fork(&self) -> Option<Arc<dyn Node<T>>> {
        None
    }

    /// Execute against `subject` with default options.
    async fn execute(&self, subject: T) -> Result<NodeResult<T>, ExecutionError> {
        self.execute_with_options(subject, ExecutionOptions::default())
            .await
    }

    /// Execute against `subject` with the given chain-global options.
    async fn execute_with_options(
        &self,
        subject: T,
        options: ExecutionOptions,
    ) -> Result<NodeResult<T>, ExecutionError> {
        let context = ExecutionContext::new(subject, options);
        self.execute_with_context(&context).await
    }

    /// Execute beneath an existing context, attaching the result to its parent result.
    async fn execute_with_context(
        &self,
        context: &ExecutionContext<T>,
    ) -> Result<NodeResult<T>, ExecutionError> {
        lifecycle::run(self, context).await
    }

    /// Return this node and every descendant to `NotRun`.
    fn reset(&self) {
        self.core().set_status(NodeRunStatus::NotRun);
        self.reset_children();
    }

    fn status(&self) -> NodeRunStatus {
        self.core().status()
    }

    fn id(&self) -> &str {
        self.core().id()
    }

    fn flow_id(&self) -> Option<&str> {
        self.core().flow_id()
    }

    fn custom_data(&self) -> Option<&Value> {
        self.core().custom_data()
    }
}

/// Builder-style configuration available on every node.
pub trait NodeConfig<T: Subject>: Node<T> + Sized {
    fn with_id(mut self, id: impl Into<String>) -> Self {
        self.core_mut().set_id(id);
        self
    }

    fn with_flow_id(mut self, flow_id: impl Into<String>) -> Self {
        self.core_mut().set_flow_id(flow_id);
        self
    }

    /// Local options that replace the chain-global options for this node.
    fn with_options(mut self, options: ExecutionOptions) -> Self {
        self.core_mut().set_local_options(options);
        self
    }

    fn with_custom_data(mut self, data: Value) -> Self {
        self.core_mut().set_custom_data(data);
        self
    }

    /// Predicate function; takes priority over a predicate block.
    fn with_should_execute<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ExecutionContext<T>) -> bool + Send + Sync + 'static,
    {
        self.core_mut().set_should_execute_func(Arc::new(predicate));
        self
    }

    /// Reusable predicate object.
    fn with_should_execute_block(mut self, block: Arc<dyn ShouldExecuteBlock<T>>) -> Self {
        self.core_mut().set_should_execute_block(block);
        self
    }
}

impl<T: Subject, N: Node<T>> NodeConfig<T> for N {}
