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

//! Error types for constructing and driving the job system.

use thiserror::Error;

/// Errors reported by the [`JobSystem`](crate::JobSystem).
///
/// Individual job failures are *not* represented here: they are captured on
/// the job itself (see [`vesta_core::JobError`]) and never surface through
/// the scheduler's API.
#[derive(Debug, Error)]
pub enum JobSystemError {
    /// The configuration requested a pool of zero workers.
    #[error("job system requires at least one worker thread")]
    NoWorkers,

    /// The operating system refused to spawn a thread.
    #[error("failed to spawn {role} thread")]
    Spawn {
        /// Which kind of thread failed to start ("worker" or "daemon").
        role: &'static str,
        /// The underlying spawn failure.
        #[source]
        source: std::io::Error,
    },

    /// The system has been stopped; it no longer accepts jobs or daemons.
    #[error("job system has been stopped")]
    Stopped,
}
