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

//! The capability contract implemented by anything a [`Job`](super::Job) can run.

use anyhow::Result;

/// A unit of executable work.
///
/// The scheduler knows nothing about what a workload does; it only invokes
/// [`execute`](Workload::execute) and records the outcome on the owning job.
/// Workloads are moved onto worker threads, so they must be [`Send`].
pub trait Workload: Send {
    /// Performs the work.
    ///
    /// Returning an error marks the owning job as failed; the error is
    /// stored on the job rather than propagated to the worker thread.
    fn execute(&mut self) -> Result<()>;
}

/// Any sendable closure is a workload. This is the lightweight variant used
/// for one-off callbacks wired up by producers.
impl<F> Workload for F
where
    F: FnMut() -> Result<()> + Send,
{
    fn execute(&mut self) -> Result<()> {
        self()
    }
}
