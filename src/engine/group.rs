// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::engine::aggregator::aggregate;
use crate::engine::context::{ExecutionContext, Subject};
use crate::engine::multi_node::{ChildStrategy, MultiNode};
use crate::engine::result::NodeResultStatus;
use crate::errors::ExecutionError;
use crate::observability::messages::engine::GroupTaskFailed;
use crate::observability::messages::StructuredLog;
use crate::traits::Node;

/// Runs all children concurrently against the same context.
///
/// Every child is spawned on its own tokio task before any is awaited, so
/// there is nothing left to short-circuit; the group waits for all of them.
/// Child results attach to the group's result in the order the children
/// start. A child error escalated under `throw_on_error`, or a child task
/// that panics, fails the group once every task has finished.
#[derive(Debug, Clone, Copy, Default)]
pub struct Concurrent;

/// Composite that runs its children in parallel.
pub type GroupNode<T> = MultiNode<T, Concurrent>;

#[async_trait]
impl ChildStrategy for Concurrent {
    const KIND: &'static str = "GroupNode";

    async fn run_children<T: Subject>(
        &self,
        node_id: &str,
        children: Vec<Arc<dyn Node<T>>>,
        context: &ExecutionContext<T>,
    ) -> anyhow::Result<NodeResultStatus> {
        let mut tasks = JoinSet::new();
        for child in children {
            let child_context = context.clone();
            tasks.spawn(async move { child.execute_with_context(&child_context).await });
        }

        let mut results = Vec::new();
        let mut escalated = None;
        let mut join_failure = None;

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(result)) => results.push(result),
                Ok(Err(error)) => {
                    escalated.get_or_insert(error);
                }
                Err(join_error) => {
                    let error = ExecutionError::TaskJoin {
                        node_id: node_id.to_string(),
                        message: join_error.to_string(),
                    };
                    GroupTaskFailed {
                        node_id,
                        error: &error,
                    }
                    .log();
                    join_failure.get_or_insert(error);
                }
            }
        }

        if let Some(error) = escalated.or(join_failure) {
            return Err(error.into());
        }

        Ok(aggregate(&results, context.effective_options()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::core::NodeRunStatus;
    use crate::engine::options::ExecutionOptions;
    use crate::nodes::{FaultingNode, FuncNode, StubNode};
    use crate::traits::NodeConfig;
    use std::time::{Duration, Instant};

    #[tokio::test]
    async fn test_runs_all_children_despite_failure() {
        let group = GroupNode::<u32>::new()
            .with_child(StubNode::<u32>::failing())
            .with_child(StubNode::<u32>::succeeding())
            .with_child(StubNode::<u32>::succeeding());

        let result = group.execute(1).await.unwrap();

        assert_eq!(result.child_results().len(), 3);
        assert_eq!(result.status(), NodeResultStatus::Failed);
        assert!(group
            .children()
            .iter()
            .all(|child| child.status() == NodeRunStatus::Completed));
    }

    #[tokio::test]
    async fn test_partial_failure_with_continue() {
        let group = GroupNode::<u32>::new()
            .with_child(StubNode::<u32>::failing())
            .with_child(StubNode::<u32>::succeeding());

        let result = group
            .execute_with_options(1, ExecutionOptions::new().continue_on_failure(true))
            .await
            .unwrap();

        assert_eq!(result.status(), NodeResultStatus::SucceededWithErrors);
    }

    #[tokio::test]
    async fn test_children_run_concurrently() {
        let group = GroupNode::<u32>::new()
            .with_child(StubNode::<u32>::succeeding().with_delay(Duration::from_millis(200)))
            .with_child(StubNode::<u32>::succeeding().with_delay(Duration::from_millis(200)))
            .with_child(StubNode::<u32>::succeeding().with_delay(Duration::from_millis(200)));

        let started = Instant::now();
        let result = group.execute(1).await.unwrap();

        assert_eq!(result.status(), NodeResultStatus::Succeeded);
        assert!(started.elapsed() < Duration::from_millis(550));
    }

    #[tokio::test]
    async fn test_state_shared_between_children() {
        let group = GroupNode::<u32>::new()
            .with_child(FuncNode::from_sync(|ctx: &ExecutionContext<u32>| {
                ctx.state().insert("inventory_checked", true)?;
                Ok(NodeResultStatus::Succeeded)
            }))
            .with_child(FuncNode::from_sync(|ctx: &ExecutionContext<u32>| {
                ctx.state().insert("fraud_checked", true)?;
                Ok(NodeResultStatus::Succeeded)
            }));

        let context = ExecutionContext::new(1, ExecutionOptions::default());
        let result = group.execute_with_context(&context).await.unwrap();

        assert_eq!(result.status(), NodeResultStatus::Succeeded);
        assert_eq!(context.state().get::<bool>("inventory_checked"), Some(true));
        assert_eq!(context.state().get::<bool>("fraud_checked"), Some(true));
    }

    #[tokio::test]
    async fn test_escalated_child_error_fails_group_after_all_finish() {
        let slow: Arc<dyn Node<u32>> =
            Arc::new(StubNode::<u32>::succeeding().with_delay(Duration::from_millis(50)));
        let group = GroupNode::<u32>::new().with_child(FaultingNode::<u32>::new("boom").with_id("faulty"));
        group.add_child(Arc::clone(&slow));

        let outcome = group
            .execute_with_options(1, ExecutionOptions::new().throw_on_error(true))
            .await;

        let error = outcome.unwrap_err();
        assert_eq!(error.node_id(), Some("faulty"));
        assert_eq!(slow.status(), NodeRunStatus::Completed);
    }

    #[tokio::test]
    async fn test_panicking_child_surfaces_as_task_join() {
        let group = GroupNode::<u32>::new()
            .with_id("group")
            .with_child(FuncNode::from_sync(|_: &ExecutionContext<u32>| -> anyhow::Result<NodeResultStatus> {
                panic!("child blew up")
            }))
            .with_child(StubNode::<u32>::succeeding());

        let result = group.execute(1).await.unwrap();

        assert_eq!(result.status(), NodeResultStatus::Failed);
        assert!(matches!(result.exception(), Some(ExecutionError::TaskJoin { .. })));
    }
}
