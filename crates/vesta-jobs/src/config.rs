// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Configuration for the job system.

use std::num::NonZeroUsize;
use std::thread;

/// Configuration for a [`JobSystem`](crate::JobSystem).
#[derive(Debug, Clone)]
pub struct JobSystemConfig {
    /// Number of worker threads in the pool. Fixed at construction;
    /// must be at least 1.
    pub workers: usize,
    /// Prefix for worker and daemon thread names, visible in debuggers
    /// and panic backtraces.
    pub thread_name_prefix: String,
}

impl Default for JobSystemConfig {
    fn default() -> Self {
        Self {
            workers: thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(4),
            thread_name_prefix: "vesta-jobs".to_string(),
        }
    }
}

impl JobSystemConfig {
    /// Convenience for the common case of overriding only the pool size.
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers,
            ..Self::default()
        }
    }
}
