use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::engine::{
    BatchExt, ExecutionContext, ExecutionOptions, FirstMatchNode, FuncTransitionNode, GroupNode,
    NodeResult, NodeResultStatus, NodeRunStatus, PipelineNode,
};
use crate::nodes::{FaultingNode, FuncNode, StubNode};
use crate::traits::{Node, NodeConfig, ShouldExecuteBlock, StateEquals};

/// Whole-tree scenarios mixing composites, transitions and batches
#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Ticket {
        title: String,
        priority: u8,
        tags: Vec<String>,
    }

    fn ticket(title: &str) -> Ticket {
        Ticket {
            title: title.to_string(),
            ..Ticket::default()
        }
    }

    fn tag(name: &'static str) -> FuncNode<Ticket> {
        FuncNode::from_sync(move |ctx: &ExecutionContext<Ticket>| {
            let mut updated = ctx.subject();
            updated.tags.push(name.to_string());
            ctx.change_subject(updated);
            Ok(NodeResultStatus::Succeeded)
        })
        .with_id(name)
    }

    fn canceller() -> FuncNode<Ticket> {
        FuncNode::from_sync(|ctx: &ExecutionContext<Ticket>| {
            ctx.cancel_processing();
            Ok(NodeResultStatus::Succeeded)
        })
        .with_id("canceller")
    }

    #[tokio::test]
    async fn test_nested_cancellation_skips_enclosing_siblings() {
        let inner_sibling: Arc<dyn Node<Ticket>> = Arc::new(tag("inner_sibling"));
        let outer_sibling: Arc<dyn Node<Ticket>> = Arc::new(tag("outer_sibling"));

        let innermost = PipelineNode::<Ticket>::new().with_id("innermost").with_child(canceller());
        innermost.add_child(Arc::clone(&inner_sibling));

        let middle = PipelineNode::<Ticket>::new().with_id("middle").with_child(innermost);
        let root = PipelineNode::<Ticket>::new()
            .with_id("root")
            .with_child(tag("first"))
            .with_child(middle);
        root.add_child(Arc::clone(&outer_sibling));

        let result = root.execute(ticket("cancel me")).await.unwrap();

        assert_eq!(result.status(), NodeResultStatus::Succeeded);
        assert_eq!(result.child_results().len(), 2);
        assert_eq!(inner_sibling.status(), NodeRunStatus::NotRun);
        assert_eq!(outer_sibling.status(), NodeRunStatus::NotRun);
        assert_eq!(result.subject().tags, vec!["first".to_string()]);
    }

    #[tokio::test]
    async fn test_subject_propagation_through_nested_composites() {
        let root = PipelineNode::<Ticket>::new()
            .with_child(tag("triaged"))
            .with_child(PipelineNode::<Ticket>::new().with_child(tag("assigned")))
            .with_child(FuncNode::from_sync(|ctx: &ExecutionContext<Ticket>| {
                Ok(if ctx.subject().tags == ["triaged", "assigned"] {
                    NodeResultStatus::Succeeded
                } else {
                    NodeResultStatus::Failed
                })
            }));

        let result = root.execute(ticket("propagate")).await.unwrap();

        assert_eq!(result.status(), NodeResultStatus::Succeeded);
        assert_eq!(result.subject().tags, vec!["triaged", "assigned"]);

        let children = result.child_results();
        assert_eq!(children[0].subject().tags, vec!["triaged"]);
        assert_eq!(children[2].subject().tags, vec!["triaged", "assigned"]);
    }

    #[tokio::test]
    async fn test_state_written_by_one_sibling_is_read_by_the_next() {
        let root = PipelineNode::<Ticket>::new()
            .with_child(FuncNode::from_sync(|ctx: &ExecutionContext<Ticket>| {
                ctx.state().insert("owner", "ops-team")?;
                Ok(NodeResultStatus::Succeeded)
            }))
            .with_child(
                tag("routed_to_ops").with_should_execute_block(Arc::new(StateEquals::new("owner", "ops-team"))),
            )
            .with_child(
                tag("routed_to_dev").with_should_execute_block(Arc::new(StateEquals::new("owner", "dev-team"))),
            );

        let result = root.execute(ticket("state")).await.unwrap();

        assert_eq!(result.status(), NodeResultStatus::Succeeded);
        assert_eq!(result.subject().tags, vec!["routed_to_ops"]);
        assert_eq!(result.child_results()[2].status(), NodeResultStatus::NotRun);
    }

    #[tokio::test]
    async fn test_group_children_share_state() {
        let writer = |key: &'static str| {
            FuncNode::new(move |ctx: ExecutionContext<Ticket>| async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                ctx.state().insert(key, true)?;
                Ok::<_, anyhow::Error>(NodeResultStatus::Succeeded)
            })
        };

        let context = ExecutionContext::new(ticket("group"), ExecutionOptions::default());
        let group = GroupNode::<Ticket>::new()
            .with_child(writer("a"))
            .with_child(writer("b"))
            .with_child(writer("c"));

        let result = group.execute_with_context(&context).await.unwrap();

        assert_eq!(result.status(), NodeResultStatus::Succeeded);
        let mut keys = context.state().keys();
        keys.sort();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    struct HighPriority;

    #[async_trait]
    impl ShouldExecuteBlock<Ticket> for HighPriority {
        async fn should_execute(&self, context: &ExecutionContext<Ticket>) -> bool {
            context.with_subject(|t| t.priority >= 3)
        }
    }

    #[tokio::test]
    async fn test_first_match_routes_by_predicate() {
        let router = FirstMatchNode::<Ticket>::new()
            .with_child(tag("escalated").with_should_execute_block(Arc::new(HighPriority)))
            .with_child(tag("backlog"));

        let mut urgent = ticket("urgent");
        urgent.priority = 5;

        let urgent_result = router.execute(urgent).await.unwrap();
        assert_eq!(urgent_result.subject().tags, vec!["escalated"]);

        let routine_result = router.execute(ticket("routine")).await.unwrap();
        assert_eq!(routine_result.subject().tags, vec!["backlog"]);
        assert_eq!(routine_result.child_results()[0].status(), NodeResultStatus::NotRun);
    }

    #[tokio::test]
    async fn test_transition_inside_pipeline() {
        let word_count = FuncTransitionNode::<Ticket, Vec<String>>::from_functions()
            .with_id("word_count")
            .with_transition_source(|ctx| {
                Ok(ctx.with_subject(|t| t.title.split_whitespace().map(str::to_string).collect()))
            })
            .with_transition_result(|ctx, result| {
                let mut updated = ctx.subject();
                updated.priority = result.subject().len() as u8;
                Ok(updated)
            })
            .with_child(FuncNode::from_sync(|ctx: &ExecutionContext<Vec<String>>| {
                let words: Vec<String> = ctx.subject().into_iter().filter(|w| w.len() > 3).collect();
                ctx.change_subject(words);
                Ok(NodeResultStatus::Succeeded)
            }));

        let root = PipelineNode::<Ticket>::new()
            .with_child(tag("received"))
            .with_child(word_count)
            .with_child(tag("sized"));

        let result = root.execute(ticket("the build is broken on main")).await.unwrap();

        assert_eq!(result.status(), NodeResultStatus::Succeeded);
        assert_eq!(result.subject().priority, 3);
        assert_eq!(result.subject().tags, vec!["received", "sized"]);
    }

    #[tokio::test]
    async fn test_mixed_tree_partial_failure() {
        let root = PipelineNode::<Ticket>::new()
            .with_options(ExecutionOptions::new().continue_on_failure(true))
            .with_custom_data(json!({ "owner": "support" }))
            .with_child(tag("received"))
            .with_child(
                GroupNode::<Ticket>::new()
                    .with_id("notify")
                    .with_child(StubNode::<Ticket>::succeeding().with_id("email"))
                    .with_child(FaultingNode::<Ticket>::new("pager offline").with_id("pager")),
            )
            .with_child(tag("closed"));

        let result = root.execute(ticket("mixed")).await.unwrap();

        assert_eq!(result.status(), NodeResultStatus::SucceededWithErrors);
        assert_eq!(result.subject().tags, vec!["received", "closed"]);
        assert_eq!(root.custom_data(), Some(&json!({ "owner": "support" })));

        let notify = &result.child_results()[1];
        assert_eq!(notify.status(), NodeResultStatus::Failed);
        let errors = notify.fail_exceptions();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].node_id(), Some("pager"));
    }

    #[tokio::test]
    async fn test_throw_on_error_unwinds_whole_tree() {
        let root = PipelineNode::<Ticket>::new().with_child(
            GroupNode::<Ticket>::new()
                .with_child(StubNode::<Ticket>::succeeding())
                .with_child(FaultingNode::<Ticket>::new("disk full").with_id("writer")),
        );

        let error = root
            .execute_with_options(ticket("strict"), ExecutionOptions::new().throw_on_error(true))
            .await
            .unwrap_err();

        assert_eq!(error.node_id(), Some("writer"));
        assert_eq!(root.status(), NodeRunStatus::Faulted);
    }

    #[tokio::test]
    async fn test_reset_and_rerun_matches_fresh_run() {
        let root = PipelineNode::<Ticket>::new()
            .with_child(tag("one"))
            .with_child(StubNode::<Ticket>::failing())
            .with_child(tag("two"));

        let first = root.execute(ticket("rerun")).await.unwrap();
        root.reset();
        root.reset();
        assert_eq!(root.status(), NodeRunStatus::NotRun);

        let second = root.execute(ticket("rerun")).await.unwrap();

        assert_eq!(first.status(), second.status());
        assert_eq!(first.subject(), second.subject());
        assert_eq!(first.child_results().len(), second.child_results().len());
    }

    #[tokio::test]
    async fn test_batch_over_pipeline() {
        let root: Arc<dyn Node<Ticket>> = Arc::new(
            PipelineNode::<Ticket>::new()
                .with_flow_id("intake")
                .with_child(tag("received"))
                .with_child(tag("triaged")),
        );

        let tickets = vec![ticket("a"), ticket("b"), ticket("c")];
        let concurrent = root
            .execute_many(tickets.clone(), Some(ExecutionOptions::new().degree_of_parallelism(2)))
            .await
            .unwrap();
        let serial = root.execute_many_serially(tickets, None).await.unwrap();

        for batch in [&concurrent, &serial] {
            assert_eq!(batch.status(), NodeResultStatus::Succeeded);
            assert_eq!(batch.flow_id(), Some("intake"));
            assert_eq!(batch.child_results().len(), 3);
            for result in batch.child_results() {
                assert_eq!(result.subject().tags, vec!["received", "triaged"]);
                assert_eq!(result.flow_id(), Some("intake"));
            }
        }
        assert_eq!(serial.subject().title, "c");
    }
}
