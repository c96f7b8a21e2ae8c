// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;

use crate::engine::context::ExecutionContext;

/// Reusable predicate deciding whether a node runs.
#[async_trait]
pub trait ShouldExecuteBlock<T>: Send + Sync {
    async fn should_execute(&self, context: &ExecutionContext<T>) -> bool;
}

/// Runs the node only when a state bag entry equals an expected value.
#[derive(Debug, Clone)]
pub struct StateEquals {
    pub key: String,
    pub expected: Value,
}

impl StateEquals {
    pub fn new(key: impl Into<String>, expected: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            expected: expected.into(),
        }
    }
}

#[async_trait]
impl<T: Clone + Send + Sync + 'static> ShouldExecuteBlock<T> for StateEquals {
    async fn should_execute(&self, context: &ExecutionContext<T>) -> bool {
        context.state().get_value(&self.key).as_ref() == Some(&self.expected)
    }
}
