// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The node lifecycle shared by every node type.
//!
//! 1. Reset the node (and its subtree) if a previous run left it non-`NotRun`.
//! 2. Create the node's result and attach it under the caller's result.
//! 3. Evaluate the predicate; a declined node keeps its `NotRun` result.
//! 4. Run the node's work and record the returned status.
//! 5. On an unhandled error mark the node `Faulted`, the result `Failed`,
//!    attach the error, and escalate only under `throw_on_error`.

use std::time::Instant;
use tracing::Instrument;

use crate::engine::context::{ExecutionContext, Subject};
use crate::engine::core::NodeRunStatus;
use crate::engine::result::{NodeResult, NodeResultStatus};
use crate::errors::ExecutionError;
use crate::observability::messages::node::{
    NodeExecutionCompleted, NodeExecutionFaulted, NodeExecutionStarted, NodeSkipped,
};
use crate::observability::messages::StructuredLog;
use crate::traits::Node;

pub(crate) async fn run<T, N>(
    node: &N,
    context: &ExecutionContext<T>,
) -> Result<NodeResult<T>, ExecutionError>
where
    T: Subject,
    N: Node<T> + ?Sized,
{
    let core = node.core();
    if core.status() != NodeRunStatus::NotRun {
        node.reset();
    }

    let flow_id = core.flow_id().map(str::to_string).or_else(|| {
        context
            .parent_result()
            .and_then(|parent| parent.flow_id().map(str::to_string))
    });
    let result = NodeResult::new(context.subject(), core.id(), flow_id);
    let node_context = context.derive(result.clone(), core.local_options());

    let started = NodeExecutionStarted {
        node_id: core.id(),
        flow_id: result.flow_id(),
    };
    let span = started.span("execute");

    async {
        if !evaluate_predicate(node, &node_context).await {
            NodeSkipped {
                node_id: core.id(),
                flow_id: result.flow_id(),
            }
            .log();
            return Ok(result.clone());
        }

        core.set_status(NodeRunStatus::Running);
        started.log();
        let clock = Instant::now();

        match node.perform_execute(&node_context).await {
            Ok(status) => {
                result.set_status(status);
                result.set_subject(node_context.subject());
                core.set_status(NodeRunStatus::Completed);
                NodeExecutionCompleted {
                    node_id: core.id(),
                    status,
                    duration: clock.elapsed(),
                }
                .log();
            }
            Err(raised) => {
                let error = ExecutionError::from_node_error(core.id(), raised);
                let escalate = node_context.effective_options().throw_on_error;

                core.set_status(NodeRunStatus::Faulted);
                result.set_status(NodeResultStatus::Failed);
                result.set_subject(node_context.subject());
                result.set_exception(error.clone());
                NodeExecutionFaulted {
                    node_id: core.id(),
                    error: &error,
                    escalated: escalate,
                }
                .log();

                if escalate {
                    return Err(error);
                }
            }
        }

        Ok(result.clone())
    }
    .instrument(span)
    .await
}

/// Function predicate first, then predicate block, then the node's own default.
async fn evaluate_predicate<T, N>(node: &N, context: &ExecutionContext<T>) -> bool
where
    T: Subject,
    N: Node<T> + ?Sized,
{
    let core = node.core();
    if let Some(predicate) = core.should_execute_func() {
        return predicate(context);
    }
    if let Some(block) = core.should_execute_block() {
        return block.should_execute(context).await;
    }
    node.should_execute(context).await
}
