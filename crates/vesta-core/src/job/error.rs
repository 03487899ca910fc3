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

//! Defines the failure captured at the job boundary.

use std::fmt;

/// A failure raised inside a job's workload.
///
/// Failures never cross the worker-thread boundary: they are caught when the
/// job runs and stored on the job for the producer to inspect after the job
/// reports finished.
#[derive(Debug)]
pub enum JobError {
    /// The workload returned an error.
    Failed(anyhow::Error),
    /// The workload panicked; the payload is rendered as a message.
    Panicked(String),
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobError::Failed(source) => write!(f, "Job execution failed: {source}"),
            JobError::Panicked(message) => write!(f, "Job panicked: {message}"),
        }
    }
}

impl std::error::Error for JobError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            JobError::Failed(source) => {
                let source: &(dyn std::error::Error + 'static) = source.as_ref();
                Some(source)
            }
            JobError::Panicked(_) => None,
        }
    }
}
