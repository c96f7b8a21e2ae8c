// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Propagation context shared down a node tree for one top-level call.
//!
//! The root context owns four pieces of shared storage: the subject cell, the
//! [`StateBag`], the global options and the cancellation token. Every context
//! derived for a descendant holds references to those same four, plus its own
//! effective options and its own parent result.

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::engine::options::ExecutionOptions;
use crate::engine::result::NodeResult;
use crate::errors::ExecutionError;

/// Marker for types that can flow through a node tree.
pub trait Subject: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Subject for T {}

/// Untyped key-value side channel shared by every node in one execution.
///
/// Values are stored as `serde_json::Value`; typed access goes through serde.
/// Nothing checks that two nodes agree on the type stored under a key.
#[derive(Debug, Default)]
pub struct StateBag {
    entries: RwLock<HashMap<String, Value>>,
}

impl StateBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize `value` and store it under `key`, replacing any previous entry.
    pub fn insert<V: Serialize>(&self, key: impl Into<String>, value: V) -> Result<(), ExecutionError> {
        let key = key.into();
        let value = serde_json::to_value(value).map_err(|e| ExecutionError::State {
            key: key.clone(),
            message: e.to_string(),
        })?;
        self.entries.write().insert(key, value);
        Ok(())
    }

    pub fn insert_value(&self, key: impl Into<String>, value: Value) {
        self.entries.write().insert(key.into(), value);
    }

    /// Typed read. `None` when the key is absent or holds a different shape.
    pub fn get<V: DeserializeOwned>(&self, key: &str) -> Option<V> {
        let value = self.entries.read().get(key).cloned()?;
        serde_json::from_value(value).ok()
    }

    /// Typed read that reports a shape mismatch instead of hiding it.
    pub fn try_get<V: DeserializeOwned>(&self, key: &str) -> Result<Option<V>, ExecutionError> {
        let Some(value) = self.entries.read().get(key).cloned() else {
            return Ok(None);
        };
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| ExecutionError::State {
                key: key.to_string(),
                message: e.to_string(),
            })
    }

    pub fn get_value(&self, key: &str) -> Option<Value> {
        self.entries.read().get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.entries.write().remove(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// Per-node view of one execution.
///
/// Cloning is cheap and yields a context that shares everything, including
/// the parent result.
pub struct ExecutionContext<T> {
    subject: Arc<RwLock<T>>,
    state: Arc<StateBag>,
    global_options: Arc<ExecutionOptions>,
    effective_options: ExecutionOptions,
    parent_result: Option<NodeResult<T>>,
    cancellation: CancellationToken,
}

impl<T> Clone for ExecutionContext<T> {
    fn clone(&self) -> Self {
        Self {
            subject: Arc::clone(&self.subject),
            state: Arc::clone(&self.state),
            global_options: Arc::clone(&self.global_options),
            effective_options: self.effective_options.clone(),
            parent_result: self.parent_result.clone(),
            cancellation: self.cancellation.clone(),
        }
    }
}

impl<T: Subject> ExecutionContext<T> {
    /// Root context for a top-level call.
    pub fn new(subject: T, global_options: ExecutionOptions) -> Self {
        Self::with_state(subject, global_options, Arc::new(StateBag::new()))
    }

    /// Root context seeded with a caller-owned state bag.
    pub fn with_state(subject: T, global_options: ExecutionOptions, state: Arc<StateBag>) -> Self {
        Self {
            subject: Arc::new(RwLock::new(subject)),
            state,
            effective_options: global_options.clone(),
            global_options: Arc::new(global_options),
            parent_result: None,
            cancellation: CancellationToken::new(),
        }
    }

    /// Context for a node about to run beneath this one.
    ///
    /// Attaches `result` to this context's parent result (when there is one)
    /// and makes it the parent result of the derived context. Subject, state,
    /// global options and cancellation are shared, not copied.
    pub(crate) fn derive(&self, result: NodeResult<T>, local_options: Option<&ExecutionOptions>) -> Self {
        if let Some(parent) = &self.parent_result {
            parent.add_child(result.clone());
        }

        Self {
            subject: Arc::clone(&self.subject),
            state: Arc::clone(&self.state),
            global_options: Arc::clone(&self.global_options),
            effective_options: ExecutionOptions::resolve(local_options, &self.global_options),
            parent_result: Some(result),
            cancellation: self.cancellation.clone(),
        }
    }

    /// Current subject.
    pub fn subject(&self) -> T {
        self.subject.read().clone()
    }

    /// Borrow the current subject without cloning it.
    pub fn with_subject<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.subject.read())
    }

    /// Replace the subject for every context sharing this execution.
    pub fn change_subject(&self, subject: T) {
        *self.subject.write() = subject;
    }

    pub fn state(&self) -> &Arc<StateBag> {
        &self.state
    }

    pub fn global_options(&self) -> &ExecutionOptions {
        &self.global_options
    }

    /// Options in effect for the node this context was derived for.
    pub fn effective_options(&self) -> &ExecutionOptions {
        &self.effective_options
    }

    /// Result of the node currently running; children attach beneath it.
    pub fn parent_result(&self) -> Option<&NodeResult<T>> {
        self.parent_result.as_ref()
    }

    /// Stop every composite in this execution from launching further children.
    ///
    /// Children already in flight run to completion.
    pub fn cancel_processing(&self) {
        self.cancellation.cancel();
    }

    pub fn is_processing_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}
