pub mod aggregator;
pub mod batch;
pub mod context;
pub mod core;
pub mod first_match;
pub mod group;
pub(crate) mod lifecycle;
pub mod multi_node;
pub mod options;
pub mod pipeline;
pub mod result;
pub mod transition;
#[cfg(test)]
pub mod integration_tests;

pub use aggregator::{aggregate, aggregate_statuses};
pub use batch::BatchExt;
pub use context::{ExecutionContext, StateBag, Subject};
pub use self::core::{NodeCore, NodeRunStatus, ShouldExecuteFn};
pub use first_match::{FirstMatch, FirstMatchNode};
pub use group::{Concurrent, GroupNode};
pub use multi_node::{ChildStrategy, MultiNode};
pub use options::ExecutionOptions;
pub use pipeline::{PipelineNode, Sequential};
pub use result::{NodeResult, NodeResultStatus};
pub use transition::{FuncTransition, FuncTransitionNode, Transition, TransitionNode};
