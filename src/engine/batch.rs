// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Running one node over many subjects.
//!
//! Each subject gets its own context (fresh subject cell, state bag and
//! cancellation flag) built from the batch options. The batch result carries
//! the node's id and flow id, the last processed subject, and one child result
//! per subject; its status is the aggregate of the per-subject statuses.
//!
//! ## Concurrency Control
//! - The concurrent form spawns one tokio task per subject
//! - `degree_of_parallelism` gates the tasks with a `tokio::sync::Semaphore`
//! - Each task runs a `fork()` of the node so per-subject run status is never
//!   shared; nodes that cannot fork are shared and their status is
//!   last-writer-wins
//!
//! ## Error Handling
//! - Under `throw_on_error` the concurrent form raises every collected error
//!   as one `ExecutionError::Aggregate`, the serial form raises the first error
//!   as-is
//! - Otherwise errors are captured in the batch result's exception slot and
//!   the batch reports `Failed`

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::engine::aggregator::aggregate;
use crate::engine::context::{ExecutionContext, Subject};
use crate::engine::core::NodeRunStatus;
use crate::engine::options::ExecutionOptions;
use crate::engine::result::{NodeResult, NodeResultStatus};
use crate::errors::ExecutionError;
use crate::observability::messages::engine::{BatchCompleted, BatchFailed, BatchStarted};
use crate::observability::messages::StructuredLog;
use crate::traits::Node;

/// Batch entry points for a shared node.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use the_canopy::engine::{BatchExt, ExecutionContext, NodeResultStatus};
/// use the_canopy::nodes::FuncNode;
/// use the_canopy::traits::Node;
///
/// # #[tokio::main]
/// # async fn main() {
/// let node: Arc<dyn Node<u32>> = Arc::new(FuncNode::from_sync(|ctx: &ExecutionContext<u32>| {
///     ctx.change_subject(ctx.subject() + 1);
///     Ok(NodeResultStatus::Succeeded)
/// }));
///
/// let result = node.execute_many(vec![1, 2, 3], None).await.unwrap();
/// assert_eq!(result.status(), NodeResultStatus::Succeeded);
/// assert_eq!(result.child_results().len(), 3);
/// # }
/// ```
#[async_trait]
pub trait BatchExt<T: Subject> {
    /// Run every subject concurrently, up to `degree_of_parallelism` at a time.
    async fn execute_many(
        &self,
        subjects: Vec<T>,
        options: Option<ExecutionOptions>,
    ) -> Result<NodeResult<T>, ExecutionError>;

    /// Run every subject one after another in input order.
    async fn execute_many_serially(
        &self,
        subjects: Vec<T>,
        options: Option<ExecutionOptions>,
    ) -> Result<NodeResult<T>, ExecutionError>;
}

#[async_trait]
impl<T: Subject> BatchExt<T> for Arc<dyn Node<T>> {
    async fn execute_many(
        &self,
        subjects: Vec<T>,
        options: Option<ExecutionOptions>,
    ) -> Result<NodeResult<T>, ExecutionError> {
        if subjects.is_empty() {
            return Err(ExecutionError::EmptyBatch);
        }

        let options = options.unwrap_or_default();
        let subject_count = subjects.len();
        BatchStarted {
            node_id: self.id(),
            mode: "concurrent",
            subject_count,
            degree_of_parallelism: options.degree_of_parallelism,
        }
        .log();
        let clock = Instant::now();

        // More permits than subjects never limits anything; this also keeps
        // the count under `Semaphore::MAX_PERMITS`.
        let limiter = options
            .degree_of_parallelism
            .map(|limit| Arc::new(Semaphore::new(limit.clamp(1, subject_count))));

        let fallback = subjects[subject_count - 1].clone();
        let mut tasks = JoinSet::new();
        for subject in subjects {
            let worker = self.fork().unwrap_or_else(|| Arc::clone(self));
            let limiter = limiter.clone();
            let context = ExecutionContext::new(subject, options.clone());

            tasks.spawn(async move {
                let _permit = match limiter {
                    Some(semaphore) => Some(semaphore.acquire_owned().await.map_err(|e| {
                        ExecutionError::TaskJoin {
                            node_id: worker.id().to_string(),
                            message: format!("failed to acquire batch permit: {}", e),
                        }
                    })?),
                    None => None,
                };
                worker.execute_with_context(&context).await
            });
        }

        let mut results = Vec::with_capacity(subject_count);
        let mut errors = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(result)) => results.push(result),
                Ok(Err(error)) => errors.push(error),
                Err(join_error) => errors.push(ExecutionError::TaskJoin {
                    node_id: self.id().to_string(),
                    message: join_error.to_string(),
                }),
            }
        }

        self.core().set_status(if errors.is_empty() {
            NodeRunStatus::Completed
        } else {
            NodeRunStatus::Faulted
        });

        if options.throw_on_error && !errors.is_empty() {
            let error = ExecutionError::Aggregate(errors);
            BatchFailed {
                node_id: self.id(),
                error: &error,
            }
            .log();
            return Err(error);
        }

        let batch = batch_result(&**self, results, fallback, &options, ExecutionError::collect(errors));
        BatchCompleted {
            node_id: self.id(),
            subject_count,
            succeeded: succeeded_count(&batch),
            status: batch.status(),
            duration: clock.elapsed(),
        }
        .log();
        Ok(batch)
    }

    async fn execute_many_serially(
        &self,
        subjects: Vec<T>,
        options: Option<ExecutionOptions>,
    ) -> Result<NodeResult<T>, ExecutionError> {
        if subjects.is_empty() {
            return Err(ExecutionError::EmptyBatch);
        }

        let options = options.unwrap_or_default();
        let subject_count = subjects.len();
        BatchStarted {
            node_id: self.id(),
            mode: "serial",
            subject_count,
            degree_of_parallelism: None,
        }
        .log();
        let clock = Instant::now();

        let fallback = subjects[subject_count - 1].clone();
        let mut results = Vec::with_capacity(subject_count);
        let mut errors = Vec::new();
        for subject in subjects {
            let context = ExecutionContext::new(subject, options.clone());
            match self.execute_with_context(&context).await {
                Ok(result) => results.push(result),
                Err(error) if options.throw_on_error => {
                    BatchFailed {
                        node_id: self.id(),
                        error: &error,
                    }
                    .log();
                    return Err(error);
                }
                Err(error) => errors.push(error),
            }
        }

        let batch = batch_result(&**self, results, fallback, &options, ExecutionError::collect(errors));
        BatchCompleted {
            node_id: self.id(),
            subject_count,
            succeeded: succeeded_count(&batch),
            status: batch.status(),
            duration: clock.elapsed(),
        }
        .log();
        Ok(batch)
    }
}

/// Fold per-subject results into the batch result.
///
/// `fallback` is the subject reported when no per-subject result came back.
/// Under `continue_on_failure`, errors captured inside the per-subject results
/// are also collected onto the batch result, which then reports `Failed`.
fn batch_result<T: Subject>(
    node: &dyn Node<T>,
    results: Vec<NodeResult<T>>,
    fallback: T,
    options: &ExecutionOptions,
    captured: Option<ExecutionError>,
) -> NodeResult<T> {
    let subject = results.last().map(NodeResult::subject).unwrap_or(fallback);
    let batch = NodeResult::new(subject, node.id(), node.flow_id().map(str::to_string));

    let captured = captured.or_else(|| {
        if options.continue_on_failure {
            ExecutionError::collect(results.iter().flat_map(NodeResult::fail_exceptions).collect())
        } else {
            None
        }
    });

    match captured {
        Some(error) => {
            batch.set_status(NodeResultStatus::Failed);
            batch.set_exception(error);
        }
        None => batch.set_status(aggregate(&results, options)),
    }
    for result in results {
        batch.add_child(result);
    }
    batch
}

fn succeeded_count<T: Subject>(batch: &NodeResult<T>) -> usize {
    batch
        .child_results()
        .iter()
        .filter(|result| result.is_success())
        .count()
}
