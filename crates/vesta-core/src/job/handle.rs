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

//! The shared job handle tracked by the scheduler.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::{JobError, Workload};

/// A schedulable unit of work with optional dependencies and a
/// finished/error state.
///
/// Jobs are always handled through [`Arc`] so that the scheduler, daemon
/// threads, and dependent jobs can all observe completion without owning the
/// job. Constructors therefore return `Arc<Job>` directly.
///
/// A job becomes *executable* once every dependency has finished. Finishing
/// is unconditional: [`run`](Job::run) flips the finished flag whether or not
/// the workload succeeded, so dependents never block forever behind a failed
/// dependency. The producer learns about failure by polling
/// [`error`](Job::error) after the job reports finished.
pub struct Job {
    label: Option<String>,
    workload: Mutex<Box<dyn Workload>>,
    dependencies: Mutex<Vec<Arc<Job>>>,
    finished: AtomicBool,
    error: Mutex<Option<Arc<JobError>>>,
}

impl Job {
    /// Creates an unlabeled job around the given workload.
    pub fn new<W>(workload: W) -> Arc<Self>
    where
        W: Workload + 'static,
    {
        Self::build(None, workload)
    }

    /// Creates a labeled job. The label only feeds log output and
    /// diagnostics; it carries no scheduling meaning.
    pub fn labeled<W>(label: impl Into<String>, workload: W) -> Arc<Self>
    where
        W: Workload + 'static,
    {
        Self::build(Some(label.into()), workload)
    }

    fn build<W>(label: Option<String>, workload: W) -> Arc<Self>
    where
        W: Workload + 'static,
    {
        Arc::new(Self {
            label,
            workload: Mutex::new(Box::new(workload)),
            dependencies: Mutex::new(Vec::new()),
            finished: AtomicBool::new(false),
            error: Mutex::new(None),
        })
    }

    /// Returns the producer-supplied label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Appends a dependency.
    ///
    /// Must be wired up before the job is scheduled; appending after
    /// scheduling has undefined ordering effects relative to the worker
    /// that may already be evaluating this job.
    pub fn add_dependency(&self, dependency: &Arc<Job>) {
        self.dependencies.lock().unwrap().push(Arc::clone(dependency));
    }

    /// Replaces the stored workload.
    ///
    /// Pending (not yet executed) work is simply swapped out. Replacing
    /// concurrently with an in-progress execution is serialized by the
    /// workload lock, but which of the two workloads the execution observes
    /// is unspecified.
    pub fn set_workload<W>(&self, workload: W)
    where
        W: Workload + 'static,
    {
        *self.workload.lock().unwrap() = Box::new(workload);
    }

    /// True iff every dependency has finished.
    ///
    /// O(number of dependencies); the scheduler evaluates this while holding
    /// its queue lock, so the answer is stable for the duration of a scan.
    pub fn is_executable(&self) -> bool {
        self.dependencies
            .lock()
            .unwrap()
            .iter()
            .all(|dependency| dependency.is_finished())
    }

    /// True once [`run`](Job::run) has been attempted, regardless of outcome.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Returns the captured failure of the most recent run, if any.
    pub fn error(&self) -> Option<Arc<JobError>> {
        self.error.lock().unwrap().clone()
    }

    /// Executes the workload and records the outcome.
    ///
    /// Any failure — an error return or a panic — is caught here and stored
    /// on the job; nothing propagates to the calling thread. The finished
    /// flag is set after the attempt no matter what. There is no retry: a
    /// producer wanting one must schedule a new job.
    pub fn run(&self) {
        let outcome = {
            let mut workload = self.workload.lock().unwrap();
            panic::catch_unwind(AssertUnwindSafe(|| workload.execute()))
        };

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(source)) => {
                log::warn!(
                    "Job '{}' failed: {source}",
                    self.label().unwrap_or("<unlabeled>")
                );
                *self.error.lock().unwrap() = Some(Arc::new(JobError::Failed(source)));
            }
            Err(payload) => {
                let message = panic_message(payload);
                log::warn!(
                    "Job '{}' panicked: {message}",
                    self.label().unwrap_or("<unlabeled>")
                );
                *self.error.lock().unwrap() = Some(Arc::new(JobError::Panicked(message)));
            }
        }

        self.finished.store(true, Ordering::Release);
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("label", &self.label)
            .field("finished", &self.is_finished())
            .field("dependencies", &self.dependencies.lock().unwrap().len())
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "opaque panic payload".to_string()
    }
}
