// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Nodes that bridge a tree over one subject type to a child over another.
//!
//! A transition node:
//! 1. reports `NotRun` when it has no child,
//! 2. derives a destination subject from the source context,
//! 3. runs the child beneath a fresh destination context that inherits only
//!    the global options,
//! 4. copies the child's failure-path errors onto its own result,
//! 5. maps the child's result back to a source subject and changes the source
//!    subject when the mapped value differs,
//! 6. reports the child's status as its own.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

use crate::engine::context::{ExecutionContext, Subject};
use crate::engine::core::NodeCore;
use crate::engine::result::{NodeResult, NodeResultStatus};
use crate::errors::ExecutionError;
use crate::observability::messages::engine::TransitionFailureSurfaced;
use crate::observability::messages::StructuredLog;
use crate::traits::Node;

/// Hooks converting between the source subject `S` and destination subject `D`.
#[async_trait]
pub trait Transition<S: Subject, D: Subject + Default>: Send + Sync {
    /// Destination subject to run the child with. Defaults to `D::default()`.
    async fn transition_source(&self, _context: &ExecutionContext<S>) -> anyhow::Result<D> {
        Ok(D::default())
    }

    /// Source subject after the child ran. Defaults to the current source subject.
    async fn transition_result(
        &self,
        context: &ExecutionContext<S>,
        _result: &NodeResult<D>,
    ) -> anyhow::Result<S> {
        Ok(context.subject())
    }
}

/// Node over `S` that runs a child over `D`, using hooks `H` to convert subjects.
pub struct TransitionNode<S: Subject, D: Subject, H> {
    core: NodeCore<S>,
    child: RwLock<Option<Arc<dyn Node<D>>>>,
    hooks: Arc<H>,
}

impl<S, D, H> TransitionNode<S, D, H>
where
    S: Subject + PartialEq,
    D: Subject + Default,
    H: Transition<S, D> + 'static,
{
    pub fn new(hooks: H) -> Self {
        Self {
            core: NodeCore::new("TransitionNode"),
            child: RwLock::new(None),
            hooks: Arc::new(hooks),
        }
    }

    pub fn with_child<N: Node<D> + 'static>(self, child: N) -> Self {
        self.set_child(Arc::new(child));
        self
    }

    pub fn set_child(&self, child: Arc<dyn Node<D>>) {
        *self.child.write() = Some(child);
    }

    pub fn clear_child(&self) -> Option<Arc<dyn Node<D>>> {
        self.child.write().take()
    }

    pub fn child(&self) -> Option<Arc<dyn Node<D>>> {
        self.child.read().clone()
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }
}

#[async_trait]
impl<S, D, H> Node<S> for TransitionNode<S, D, H>
where
    S: Subject + PartialEq,
    D: Subject + Default,
    H: Transition<S, D> + 'static,
{
    fn core(&self) -> &NodeCore<S> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut NodeCore<S> {
        &mut self.core
    }

    async fn perform_execute(&self, context: &ExecutionContext<S>) -> anyhow::Result<NodeResultStatus> {
        let Some(child) = self.child() else {
            return Ok(NodeResultStatus::NotRun);
        };

        let destination = self.hooks.transition_source(context).await?;
        let destination_context = ExecutionContext::new(destination, context.global_options().clone());
        let destination_result = child.execute_with_context(&destination_context).await?;

        let failures = destination_result.fail_exceptions();
        let failure_count = failures.len();
        if let Some(error) = ExecutionError::collect(failures) {
            TransitionFailureSurfaced {
                node_id: self.core.id(),
                error_count: failure_count,
            }
            .log();
            if let Some(own_result) = context.parent_result() {
                own_result.set_exception(error);
            }
        }

        let original = context.subject();
        let updated = self
            .hooks
            .transition_result(context, &destination_result)
            .await?;
        if updated != original {
            context.change_subject(updated);
        }

        Ok(destination_result.status())
    }

    fn reset_children(&self) {
        if let Some(child) = self.child.read().as_ref() {
            child.reset();
        }
    }

    fn fork(&self) -> Option<Arc<dyn Node<S>>> {
        let child = self
            .child
            .read()
            .as_ref()
            .map(|child| child.fork().unwrap_or_else(|| Arc::clone(child)));

        Some(Arc::new(Self {
            core: self.core.fork(),
            child: RwLock::new(child),
            hooks: Arc::clone(&self.hooks),
        }))
    }
}

impl<S: Subject, D: Subject, H> fmt::Debug for TransitionNode<S, D, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionNode")
            .field("core", &self.core)
            .field("child", &self.child.read().as_ref().map(|c| c.id().to_string()))
            .finish()
    }
}

type SourceFn<S, D> = Arc<dyn Fn(&ExecutionContext<S>) -> anyhow::Result<D> + Send + Sync>;
type ResultFn<S, D> = Arc<dyn Fn(&ExecutionContext<S>, &NodeResult<D>) -> anyhow::Result<S> + Send + Sync>;

/// Transition hooks supplied as closures. An unset hook uses the default behavior.
pub struct FuncTransition<S, D> {
    source: Option<SourceFn<S, D>>,
    result: Option<ResultFn<S, D>>,
}

impl<S, D> Clone for FuncTransition<S, D> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            result: self.result.clone(),
        }
    }
}

impl<S, D> Default for FuncTransition<S, D> {
    fn default() -> Self {
        Self {
            source: None,
            result: None,
        }
    }
}

#[async_trait]
impl<S, D> Transition<S, D> for FuncTransition<S, D>
where
    S: Subject,
    D: Subject + Default,
{
    async fn transition_source(&self, context: &ExecutionContext<S>) -> anyhow::Result<D> {
        match &self.source {
            Some(source) => source(context),
            None => Ok(D::default()),
        }
    }

    async fn transition_result(
        &self,
        context: &ExecutionContext<S>,
        result: &NodeResult<D>,
    ) -> anyhow::Result<S> {
        match &self.result {
            Some(map_back) => map_back(context, result),
            None => Ok(context.subject()),
        }
    }
}

/// Transition node whose hooks are closures rather than a `Transition` impl.
///
/// # Example
/// ```
/// use the_canopy::engine::{ExecutionContext, FuncTransitionNode, NodeResultStatus};
/// use the_canopy::nodes::FuncNode;
/// use the_canopy::traits::Node;
///
/// # #[tokio::main]
/// # async fn main() {
/// let measure = FuncTransitionNode::<String, usize>::from_functions()
///     .with_transition_source(|ctx| Ok(ctx.subject().len()))
///     .with_transition_result(|ctx, result| Ok(format!("{}:{}", ctx.subject(), result.subject())))
///     .with_child(FuncNode::from_sync(|ctx: &ExecutionContext<usize>| {
///         ctx.change_subject(ctx.subject() * 10);
///         Ok(NodeResultStatus::Succeeded)
///     }));
///
/// let result = measure.execute("abc".to_string()).await.unwrap();
/// assert_eq!(result.subject(), "abc:30");
/// # }
/// ```
pub type FuncTransitionNode<S, D> = TransitionNode<S, D, FuncTransition<S, D>>;

impl<S, D> TransitionNode<S, D, FuncTransition<S, D>>
where
    S: Subject + PartialEq,
    D: Subject + Default,
{
    pub fn from_functions() -> Self {
        Self::new(FuncTransition::default())
    }

    pub fn with_transition_source<F>(mut self, source: F) -> Self
    where
        F: Fn(&ExecutionContext<S>) -> anyhow::Result<D> + Send + Sync + 'static,
    {
        let mut hooks = (*self.hooks).clone();
        hooks.source = Some(Arc::new(source));
        self.hooks = Arc::new(hooks);
        self
    }

    pub fn with_transition_result<F>(mut self, map_back: F) -> Self
    where
        F: Fn(&ExecutionContext<S>, &NodeResult<D>) -> anyhow::Result<S> + Send + Sync + 'static,
    {
        let mut hooks = (*self.hooks).clone();
        hooks.result = Some(Arc::new(map_back));
        self.hooks = Arc::new(hooks);
        self
    }
}
