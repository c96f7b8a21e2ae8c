// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

use crate::engine::context::{ExecutionContext, Subject};
use crate::engine::core::NodeCore;
use crate::engine::result::NodeResultStatus;
use crate::traits::Node;

/// How a composite runs its children and reduces their results.
///
/// The composite's own status is whatever `run_children` returns. Strategies
/// run each child through the full node contract
/// ([`Node::execute_with_context`]) with the composite's context, so child
/// results land under the composite's result.
#[async_trait]
pub trait ChildStrategy: Clone + Default + Send + Sync + 'static {
    /// Default node id for composites using this strategy.
    const KIND: &'static str;

    async fn run_children<T: Subject>(
        &self,
        node_id: &str,
        children: Vec<Arc<dyn Node<T>>>,
        context: &ExecutionContext<T>,
    ) -> anyhow::Result<NodeResultStatus>;
}

/// A node holding an ordered list of child nodes.
///
/// Has no work of its own; execution is delegated to the strategy `S`.
/// See [`PipelineNode`](crate::engine::PipelineNode),
/// [`GroupNode`](crate::engine::GroupNode) and
/// [`FirstMatchNode`](crate::engine::FirstMatchNode).
pub struct MultiNode<T: Subject, S> {
    core: NodeCore<T>,
    children: RwLock<Vec<Arc<dyn Node<T>>>>,
    strategy: S,
}

impl<T: Subject, S: ChildStrategy> MultiNode<T, S> {
    pub fn new() -> Self {
        Self {
            core: NodeCore::new(S::KIND),
            children: RwLock::new(Vec::new()),
            strategy: S::default(),
        }
    }

    /// Builder form of [`add_child`](Self::add_child).
    pub fn with_child<N: Node<T> + 'static>(self, child: N) -> Self {
        self.add_child(Arc::new(child));
        self
    }

    pub fn add_child(&self, child: Arc<dyn Node<T>>) {
        self.children.write().push(child);
    }

    pub fn add_children<I>(&self, children: I)
    where
        I: IntoIterator<Item = Arc<dyn Node<T>>>,
    {
        self.children.write().extend(children);
    }

    /// Remove `child` (matched by identity). Returns whether it was present.
    pub fn remove_child(&self, child: &Arc<dyn Node<T>>) -> bool {
        let mut children = self.children.write();
        let target = Arc::as_ptr(child) as *const ();
        match children
            .iter()
            .position(|existing| Arc::as_ptr(existing) as *const () == target)
        {
            Some(index) => {
                children.remove(index);
                true
            }
            None => false,
        }
    }

    /// Snapshot of the children in declaration order.
    pub fn children(&self) -> Vec<Arc<dyn Node<T>>> {
        self.children.read().clone()
    }

    pub fn child_count(&self) -> usize {
        self.children.read().len()
    }
}

impl<T: Subject, S: ChildStrategy> Default for MultiNode<T, S> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Subject, S: ChildStrategy> Node<T> for MultiNode<T, S> {
    fn core(&self) -> &NodeCore<T> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut NodeCore<T> {
        &mut self.core
    }

    async fn perform_execute(&self, context: &ExecutionContext<T>) -> anyhow::Result<NodeResultStatus> {
        let children = self.children();
        self.strategy
            .run_children(self.core.id(), children, context)
            .await
    }

    fn reset_children(&self) {
        for child in self.children.read().iter() {
            child.reset();
        }
    }

    /// Children that cannot fork are shared with the copy.
    fn fork(&self) -> Option<Arc<dyn Node<T>>> {
        let children = self
            .children
            .read()
            .iter()
            .map(|child| child.fork().unwrap_or_else(|| Arc::clone(child)))
            .collect();

        Some(Arc::new(Self {
            core: self.core.fork(),
            children: RwLock::new(children),
            strategy: self.strategy.clone(),
        }))
    }
}

impl<T: Subject, S> fmt::Debug for MultiNode<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiNode")
            .field("core", &self.core)
            .field(
                "children",
                &self
                    .children
                    .read()
                    .iter()
                    .map(|child| child.id().to_string())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
