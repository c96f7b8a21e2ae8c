pub mod node;
pub mod predicate;

pub use node::{Node, NodeConfig};
pub use predicate::{ShouldExecuteBlock, StateEquals};
