// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;

use crate::engine::aggregator::aggregate;
use crate::engine::context::{ExecutionContext, Subject};
use crate::engine::multi_node::{ChildStrategy, MultiNode};
use crate::engine::result::NodeResultStatus;
use crate::observability::messages::engine::{CompositeShortCircuited, ProcessingCancelled};
use crate::observability::messages::StructuredLog;
use crate::traits::Node;

/// Runs children one after another in declaration order.
///
/// Stops after a `Failed` child unless `continue_on_failure` is set, and
/// after any child once processing has been cancelled. The composite's status
/// is the aggregate of the children that ran.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sequential;

/// Composite that runs its children sequentially.
pub type PipelineNode<T> = MultiNode<T, Sequential>;

#[async_trait]
impl ChildStrategy for Sequential {
    const KIND: &'static str = "PipelineNode";

    async fn run_children<T: Subject>(
        &self,
        node_id: &str,
        children: Vec<Arc<dyn Node<T>>>,
        context: &ExecutionContext<T>,
    ) -> anyhow::Result<NodeResultStatus> {
        let mut results = Vec::with_capacity(children.len());

        for (index, child) in children.iter().enumerate() {
            let result = child.execute_with_context(context).await?;
            let failed = result.status() == NodeResultStatus::Failed;
            results.push(result);

            let remaining = children.len() - index - 1;
            if context.is_processing_cancelled() {
                ProcessingCancelled {
                    node_id,
                    skipped_children: remaining,
                }
                .log();
                break;
            }

            if failed && !context.effective_options().continue_on_failure {
                CompositeShortCircuited {
                    node_id,
                    failed_child: child.id(),
                    skipped_children: remaining,
                }
                .log();
                break;
            }
        }

        Ok(aggregate(&results, context.effective_options()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::core::NodeRunStatus;
    use crate::engine::options::ExecutionOptions;
    use crate::errors::ExecutionError;
    use crate::nodes::{FaultingNode, FuncNode, StubNode};
    use crate::traits::NodeConfig;

    #[tokio::test]
    async fn test_short_circuits_on_failure() {
        let second: Arc<dyn Node<u32>> = Arc::new(StubNode::<u32>::succeeding());
        let pipeline = PipelineNode::<u32>::new().with_child(StubNode::<u32>::failing());
        pipeline.add_child(Arc::clone(&second));

        let result = pipeline.execute(1).await.unwrap();

        assert_eq!(result.status(), NodeResultStatus::Failed);
        assert_eq!(result.child_results().len(), 1);
        assert_eq!(second.status(), NodeRunStatus::NotRun);
    }

    #[tokio::test]
    async fn test_continue_on_failure_runs_everything() {
        let second: Arc<dyn Node<u32>> = Arc::new(StubNode::<u32>::succeeding());
        let pipeline = PipelineNode::<u32>::new().with_child(StubNode::<u32>::failing());
        pipeline.add_child(Arc::clone(&second));

        let result = pipeline
            .execute_with_options(1, ExecutionOptions::new().continue_on_failure(true))
            .await
            .unwrap();

        assert_eq!(result.status(), NodeResultStatus::SucceededWithErrors);
        assert_eq!(result.child_results().len(), 2);
        assert_eq!(second.status(), NodeRunStatus::Completed);
    }

    #[tokio::test]
    async fn test_local_continue_on_failure() {
        let pipeline = PipelineNode::<u32>::new()
            .with_options(ExecutionOptions::new().continue_on_failure(true))
            .with_child(StubNode::<u32>::failing())
            .with_child(StubNode::<u32>::succeeding());

        let result = pipeline.execute(1).await.unwrap();
        assert_eq!(result.status(), NodeResultStatus::SucceededWithErrors);
    }

    #[tokio::test]
    async fn test_skipped_children_still_produce_results() {
        let pipeline = PipelineNode::<u32>::new()
            .with_child(StubNode::<u32>::succeeding().with_should_execute(|_| false))
            .with_child(StubNode::<u32>::succeeding().with_should_execute(|_| false));

        let result = pipeline.execute(1).await.unwrap();

        assert_eq!(result.status(), NodeResultStatus::NotRun);
        let children = result.child_results();
        assert_eq!(children.len(), 2);
        assert!(children.iter().all(|c| c.status() == NodeResultStatus::NotRun));
        // The composite itself ran even though nothing under it did.
        assert_eq!(pipeline.status(), NodeRunStatus::Completed);
    }

    #[tokio::test]
    async fn test_change_subject_seen_by_later_siblings() {
        let pipeline = PipelineNode::<String>::new()
            .with_child(
                FuncNode::from_sync(|ctx: &ExecutionContext<String>| {
                    ctx.change_subject(format!("{}-validated", ctx.subject()));
                    Ok(NodeResultStatus::Succeeded)
                })
                .with_id("rename"),
            )
            .with_child(
                FuncNode::from_sync(|ctx: &ExecutionContext<String>| {
                    Ok(if ctx.subject().ends_with("-validated") {
                        NodeResultStatus::Succeeded
                    } else {
                        NodeResultStatus::Failed
                    })
                })
                .with_id("check"),
            );

        let result = pipeline.execute("order".to_string()).await.unwrap();

        assert_eq!(result.status(), NodeResultStatus::Succeeded);
        assert_eq!(result.subject(), "order-validated");
        let children = result.child_results();
        assert_eq!(children[0].subject(), "order-validated");
        assert_eq!(children[1].subject(), "order-validated");
    }

    #[tokio::test]
    async fn test_child_error_escalates_through_pipeline() {
        let pipeline = PipelineNode::<u32>::new()
            .with_id("outer")
            .with_child(FaultingNode::<u32>::new("card declined").with_id("charge"))
            .with_child(StubNode::<u32>::succeeding());

        let outcome = pipeline
            .execute_with_options(1, ExecutionOptions::new().throw_on_error(true))
            .await;

        match outcome {
            Err(error) => assert_eq!(error.node_id(), Some("charge")),
            Ok(result) => panic!("expected escalation, got {:?}", result.status()),
        }
        assert_eq!(pipeline.status(), NodeRunStatus::Faulted);
    }

    #[tokio::test]
    async fn test_child_error_captured_without_throw() {
        let pipeline = PipelineNode::<u32>::new()
            .with_child(FaultingNode::<u32>::new("card declined"))
            .with_child(StubNode::<u32>::succeeding());

        let result = pipeline.execute(1).await.unwrap();

        assert_eq!(result.status(), NodeResultStatus::Failed);
        assert!(result.exception().is_none());
        let exceptions = result.fail_exceptions();
        assert_eq!(exceptions.len(), 1);
        assert!(matches!(exceptions[0], ExecutionError::Unhandled { .. }));
    }
}
