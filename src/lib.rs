// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod config;     // engine options + logging config
pub mod engine;     // context, results, composites, batch runner
pub mod errors;     // error handling
pub mod nodes;      // ready-made leaf nodes
pub mod observability;
pub mod traits;     // node contract + predicates

pub use engine::{BatchExt, ExecutionContext, ExecutionOptions, NodeResult, NodeResultStatus};
pub use errors::ExecutionError;
pub use traits::{Node, NodeConfig};
