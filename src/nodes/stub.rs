// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::engine::context::{ExecutionContext, Subject};
use crate::engine::core::NodeCore;
use crate::engine::result::NodeResultStatus;
use crate::traits::Node;

/// A node that reports a fixed status, optionally after a delay.
pub struct StubNode<T: Subject> {
    core: NodeCore<T>,
    status: NodeResultStatus,
    delay: Option<Duration>,
}

impl<T: Subject> StubNode<T> {
    pub fn new(status: NodeResultStatus) -> Self {
        Self {
            core: NodeCore::for_type::<Self>(),
            status,
            delay: None,
        }
    }

    pub fn succeeding() -> Self {
        Self::new(NodeResultStatus::Succeeded)
    }

    pub fn failing() -> Self {
        Self::new(NodeResultStatus::Failed)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl<T: Subject> Node<T> for StubNode<T> {
    fn core(&self) -> &NodeCore<T> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut NodeCore<T> {
        &mut self.core
    }

    async fn perform_execute(&self, _context: &ExecutionContext<T>) -> anyhow::Result<NodeResultStatus> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.status)
    }

    fn fork(&self) -> Option<Arc<dyn Node<T>>> {
        Some(Arc::new(Self {
            core: self.core.fork(),
            status: self.status,
            delay: self.delay,
        }))
    }
}

/// A node whose work always raises an unhandled error.
pub struct FaultingNode<T: Subject> {
    core: NodeCore<T>,
    message: String,
}

impl<T: Subject> FaultingNode<T> {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            core: NodeCore::for_type::<Self>(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl<T: Subject> Node<T> for FaultingNode<T> {
    fn core(&self) -> &NodeCore<T> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut NodeCore<T> {
        &mut self.core
    }

    async fn perform_execute(&self, _context: &ExecutionContext<T>) -> anyhow::Result<NodeResultStatus> {
        Err(anyhow::anyhow!("{}", self.message))
    }

    fn fork(&self) -> Option<Arc<dyn Node<T>>> {
        Some(Arc::new(Self {
            core: self.core.fork(),
            message: self.message.clone(),
        }))
    }
}
