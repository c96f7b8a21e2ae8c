// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;
use std::sync::Arc;

use crate::engine::context::{ExecutionContext, Subject};
use crate::engine::core::NodeCore;
use crate::engine::result::NodeResultStatus;
use crate::traits::Node;

type NodeFn<T> =
    Arc<dyn Fn(ExecutionContext<T>) -> BoxFuture<'static, anyhow::Result<NodeResultStatus>> + Send + Sync>;

/// Leaf node whose work is a closure.
///
/// The closure receives an owned handle to the node's context; it shares the
/// subject, state and cancellation flag with the rest of the execution.
///
/// # Example
/// ```
/// use the_canopy::engine::{ExecutionContext, NodeResultStatus};
/// use the_canopy::nodes::FuncNode;
/// use the_canopy::traits::{Node, NodeConfig};
///
/// # #[tokio::main]
/// # async fn main() {
/// let double = FuncNode::new(|ctx: ExecutionContext<u64>| async move {
///     ctx.change_subject(ctx.subject() * 2);
///     Ok(NodeResultStatus::Succeeded)
/// })
/// .with_id("double");
///
/// let result = double.execute(21).await.unwrap();
/// assert_eq!(result.subject(), 42);
/// # }
/// ```
pub struct FuncNode<T: Subject> {
    core: NodeCore<T>,
    work: NodeFn<T>,
}

impl<T: Subject> FuncNode<T> {
    pub fn new<F, Fut>(work: F) -> Self
    where
        F: Fn(ExecutionContext<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<NodeResultStatus>> + Send + 'static,
    {
        Self {
            core: NodeCore::for_type::<Self>(),
            work: Arc::new(move |context| work(context).boxed()),
        }
    }

    /// Node from a synchronous closure.
    pub fn from_sync<F>(work: F) -> Self
    where
        F: Fn(&ExecutionContext<T>) -> anyhow::Result<NodeResultStatus> + Send + Sync + 'static,
    {
        Self::new(move |context| {
            let outcome = work(&context);
            async move { outcome }
        })
    }
}

#[async_trait]
impl<T: Subject> Node<T> for FuncNode<T> {
    fn core(&self) -> &NodeCore<T> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut NodeCore<T> {
        &mut self.core
    }

    async fn perform_execute(&self, context: &ExecutionContext<T>) -> anyhow::Result<NodeResultStatus> {
        (self.work)(context.clone()).await
    }

    fn fork(&self) -> Option<Arc<dyn Node<T>>> {
        Some(Arc::new(Self {
            core: self.core.fork(),
            work: Arc::clone(&self.work),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::core::NodeRunStatus;
    use crate::engine::options::ExecutionOptions;
    use crate::errors::ExecutionError;
    use crate::traits::{NodeConfig, StateEquals};
    use serde_json::json;

    #[tokio::test]
    async fn test_successful_run() {
        let node = FuncNode::from_sync(|_: &ExecutionContext<u32>| Ok(NodeResultStatus::Succeeded))
            .with_id("ok")
            .with_flow_id("orders");

        let result = node.execute(3).await.unwrap();

        assert_eq!(result.status(), NodeResultStatus::Succeeded);
        assert_eq!(result.id(), "ok");
        assert_eq!(result.flow_id(), Some("orders"));
        assert_eq!(node.status(), NodeRunStatus::Completed);
    }

    #[tokio::test]
    async fn test_expected_failure_is_not_a_fault() {
        let node = FuncNode::from_sync(|_: &ExecutionContext<u32>| Ok(NodeResultStatus::Failed));

        let result = node.execute(3).await.unwrap();

        assert_eq!(result.status(), NodeResultStatus::Failed);
        assert!(result.exception().is_none());
        assert_eq!(node.status(), NodeRunStatus::Completed);
    }

    #[tokio::test]
    async fn test_unhandled_error_captured_by_default() {
        let node = FuncNode::from_sync(|_: &ExecutionContext<u32>| anyhow::bail!("ledger offline"))
            .with_id("post_ledger");

        let result = node.execute(3).await.unwrap();

        assert_eq!(result.status(), NodeResultStatus::Failed);
        assert_eq!(node.status(), NodeRunStatus::Faulted);
        let exception = result.exception().unwrap();
        assert_eq!(exception.node_id(), Some("post_ledger"));
        assert!(exception.to_string().contains("ledger offline"));
    }

    #[tokio::test]
    async fn test_unhandled_error_escalates_with_throw_on_error() {
        let node = FuncNode::from_sync(|_: &ExecutionContext<u32>| anyhow::bail!("ledger offline"));

        let outcome = node
            .execute_with_options(3, ExecutionOptions::new().throw_on_error(true))
            .await;

        assert!(matches!(outcome, Err(ExecutionError::Unhandled { .. })));
        assert_eq!(node.status(), NodeRunStatus::Faulted);
    }

    #[tokio::test]
    async fn test_local_options_override_global() {
        let node = FuncNode::from_sync(|_: &ExecutionContext<u32>| anyhow::bail!("boom"))
            .with_options(ExecutionOptions::new());

        let result = node
            .execute_with_options(3, ExecutionOptions::new().throw_on_error(true))
            .await
            .unwrap();

        assert_eq!(result.status(), NodeResultStatus::Failed);
    }

    #[tokio::test]
    async fn test_predicate_function_skips() {
        let node = FuncNode::from_sync(|_: &ExecutionContext<u32>| Ok(NodeResultStatus::Succeeded))
            .with_should_execute(|ctx| ctx.subject() > 10);

        let result = node.execute(3).await.unwrap();

        assert_eq!(result.status(), NodeResultStatus::NotRun);
        assert_eq!(node.status(), NodeRunStatus::NotRun);
        assert_eq!(result.subject(), 3);
    }

    #[tokio::test]
    async fn test_predicate_function_wins_over_block() {
        let node = FuncNode::from_sync(|_: &ExecutionContext<u32>| Ok(NodeResultStatus::Succeeded))
            .with_should_execute_block(Arc::new(StateEquals::new("missing", true)))
            .with_should_execute(|_| true);

        let result = node.execute(3).await.unwrap();
        assert_eq!(result.status(), NodeResultStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_predicate_block_skips() {
        let node = FuncNode::from_sync(|_: &ExecutionContext<u32>| Ok(NodeResultStatus::Succeeded))
            .with_should_execute_block(Arc::new(StateEquals::new("approved", true)));

        let result = node.execute(3).await.unwrap();
        assert_eq!(result.status(), NodeResultStatus::NotRun);
    }

    #[tokio::test]
    async fn test_reused_instance_behaves_like_fresh() {
        let node = FuncNode::from_sync(|ctx: &ExecutionContext<u32>| {
            if ctx.subject() % 2 == 0 {
                Ok(NodeResultStatus::Succeeded)
            } else {
                anyhow::bail!("odd subject")
            }
        });

        let first = node.execute(1).await.unwrap();
        assert_eq!(node.status(), NodeRunStatus::Faulted);
        assert_eq!(first.status(), NodeResultStatus::Failed);

        node.reset();
        node.reset();
        assert_eq!(node.status(), NodeRunStatus::NotRun);

        let second = node.execute(2).await.unwrap();
        assert_eq!(second.status(), NodeResultStatus::Succeeded);
        assert!(second.exception().is_none());
        assert_eq!(node.status(), NodeRunStatus::Completed);
    }

    #[tokio::test]
    async fn test_custom_data() {
        let node = FuncNode::from_sync(|_: &ExecutionContext<u32>| Ok(NodeResultStatus::Succeeded))
            .with_custom_data(json!({"team": "payments"}));

        assert_eq!(node.custom_data(), Some(&json!({"team": "payments"})));
    }
}
