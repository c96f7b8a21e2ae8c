// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;

use crate::engine::context::{ExecutionContext, Subject};
use crate::engine::multi_node::{ChildStrategy, MultiNode};
use crate::engine::result::NodeResultStatus;
use crate::observability::messages::engine::{FirstMatchSelected, ProcessingCancelled};
use crate::observability::messages::StructuredLog;
use crate::traits::Node;

/// Runs children in order until one actually runs.
///
/// A child "runs" when its result is anything but `NotRun`. That child's
/// status becomes the composite's status verbatim; when no child runs the
/// composite reports `NotRun`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstMatch;

/// Composite that selects the first child whose predicate lets it run.
pub type FirstMatchNode<T> = MultiNode<T, FirstMatch>;

#[async_trait]
impl ChildStrategy for FirstMatch {
    const KIND: &'static str = "FirstMatchNode";

    async fn run_children<T: Subject>(
        &self,
        node_id: &str,
        children: Vec<Arc<dyn Node<T>>>,
        context: &ExecutionContext<T>,
    ) -> anyhow::Result<NodeResultStatus> {
        for (index, child) in children.iter().enumerate() {
            let result = child.execute_with_context(context).await?;
            let status = result.status();

            if status != NodeResultStatus::NotRun {
                tracing::debug!(
                    "{}",
                    FirstMatchSelected {
                        node_id,
                        child_id: child.id(),
                        status,
                    }
                );
                return Ok(status);
            }

            if context.is_processing_cancelled() {
                ProcessingCancelled {
                    node_id,
                    skipped_children: children.len() - index - 1,
                }
                .log();
                break;
            }
        }

        Ok(NodeResultStatus::NotRun)
    }
}
