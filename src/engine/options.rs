// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

/// Options steering how a node tree reacts to failure and how wide a batch fans out.
///
/// A node may carry its own local options; when present they replace the
/// chain-global options wholesale for that node (local if present, else global).
///
/// # Example
/// ```yaml
/// continue_on_failure: true
/// throw_on_error: false
/// degree_of_parallelism: 8
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOptions {
    /// Keep running a composite's remaining children after one fails.
    #[serde(default)]
    pub continue_on_failure: bool,
    /// Re-raise a node's unhandled error to the caller instead of capturing it.
    #[serde(default)]
    pub throw_on_error: bool,
    /// Cap on concurrently executing subjects in a batch. `None` means unbounded.
    #[serde(default)]
    pub degree_of_parallelism: Option<usize>,
}

impl ExecutionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn continue_on_failure(mut self, value: bool) -> Self {
        self.continue_on_failure = value;
        self
    }

    pub fn throw_on_error(mut self, value: bool) -> Self {
        self.throw_on_error = value;
        self
    }

    pub fn degree_of_parallelism(mut self, value: usize) -> Self {
        self.degree_of_parallelism = Some(value);
        self
    }

    /// Resolve the options in effect for a node: its local options if set, else the global ones.
    pub fn resolve(local: Option<&ExecutionOptions>, global: &ExecutionOptions) -> ExecutionOptions {
        local.unwrap_or(global).clone()
    }
}
