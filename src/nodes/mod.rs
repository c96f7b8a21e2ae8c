// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Ready-made leaf nodes.

mod func;
mod stub;

pub use func::FuncNode;
pub use stub::{FaultingNode, StubNode};
