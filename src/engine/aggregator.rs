// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Reduction of child outcomes into a composite's outcome.
//!
//! One pass over the children tracks three flags. A child counts toward at
//! most one flag, tested in the order `SucceededWithErrors`, `Failed`,
//! `Succeeded`; `NotRun` children count toward none. Seeing both a success
//! and a failure marks the set as mixed and ends the scan early.
//!
//! | mixed | failure | success | continue_on_failure | outcome               |
//! |-------|---------|---------|---------------------|-----------------------|
//! | yes   | yes     | -       | false               | `Failed`              |
//! | yes   | -       | -       | otherwise           | `SucceededWithErrors` |
//! | no    | -       | yes     | -                   | `Succeeded`           |
//! | no    | yes     | no      | -                   | `Failed`              |
//! | no    | no      | no      | -                   | `NotRun`              |

use crate::engine::options::ExecutionOptions;
use crate::engine::result::{NodeResult, NodeResultStatus};

/// Aggregate the statuses of `results` under `options`.
pub fn aggregate<T: Clone>(results: &[NodeResult<T>], options: &ExecutionOptions) -> NodeResultStatus {
    aggregate_statuses(results.iter().map(NodeResult::status), options)
}

/// Status-level form of [`aggregate`].
pub fn aggregate_statuses<I>(statuses: I, options: &ExecutionOptions) -> NodeResultStatus
where
    I: IntoIterator<Item = NodeResultStatus>,
{
    let mut has_failure = false;
    let mut has_success = false;
    let mut has_success_with_errors = false;

    for status in statuses {
        match status {
            NodeResultStatus::SucceededWithErrors => has_success_with_errors = true,
            NodeResultStatus::Failed => has_failure = true,
            NodeResultStatus::Succeeded => has_success = true,
            NodeResultStatus::NotRun => {}
        }

        if has_success && has_failure {
            has_success_with_errors = true;
            break;
        }
    }

    if has_success_with_errors {
        if has_failure && !options.continue_on_failure {
            NodeResultStatus::Failed
        } else {
            NodeResultStatus::SucceededWithErrors
        }
    } else if has_success {
        NodeResultStatus::Succeeded
    } else if has_failure {
        NodeResultStatus::Failed
    } else {
        NodeResultStatus::NotRun
    }
}
