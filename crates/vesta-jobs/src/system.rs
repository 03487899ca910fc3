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

//! The worker pool that drives job execution.
//!
//! ## Locking discipline
//!
//! The pending queue, the pending-job count, and the all-complete flag form
//! one unit of shared state guarded by a single mutex, paired with two
//! condition variables: `work_available` (new work arrived, or a completion
//! may have unblocked a queued dependent) and `all_complete` (the pending
//! count reached zero). Workers hold the mutex for an entire scan over the
//! queue, which serializes dequeue attempts across the pool; jobs execute
//! outside the lock.
//!
//! The stop flag is a separate atomic, stored while the state mutex is held
//! so that a waiting worker cannot miss the shutdown wakeup, and read
//! relaxed inside the worker and daemon loops.
//!
//! ## Ordering and stalls
//!
//! A dependent job is only selected once every dependency has flipped its
//! finished flag. Selection is FIFO among currently-executable jobs; a job
//! that fails the executability check is pushed to the back of the queue,
//! so ordering degrades to round-robin under contention. A job whose
//! dependency is never scheduled is rotated through the queue forever: it
//! never runs, never finishes, and never reports an error. That stall is
//! part of the contract — the scheduler performs no cycle or liveness
//! detection.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use vesta_core::Job;

use crate::config::JobSystemConfig;
use crate::error::JobSystemError;

/// Queue state shared between producers and the worker pool.
///
/// Invariant: `pending` equals the number of queued jobs plus the number of
/// jobs currently executing on a worker, and `idle` is true iff `pending`
/// is zero.
#[derive(Debug)]
struct QueueState {
    queue: VecDeque<Arc<Job>>,
    pending: usize,
    idle: bool,
}

impl QueueState {
    /// Pops the first executable job, rotating non-executable jobs to the
    /// back. One full rotation without a hit restores the original order
    /// and yields `None`.
    fn take_first_executable(&mut self) -> Option<Arc<Job>> {
        for _ in 0..self.queue.len() {
            match self.queue.pop_front() {
                Some(job) if job.is_executable() => return Some(job),
                Some(job) => self.queue.push_back(job),
                None => break,
            }
        }
        None
    }
}

#[derive(Debug)]
struct Shared {
    state: Mutex<QueueState>,
    work_available: Condvar,
    all_complete: Condvar,
    stop: AtomicBool,
}

/// A fixed pool of worker threads executing dependency-constrained jobs,
/// plus an optional set of daemon threads bound to one job each.
///
/// Shutdown is explicit via [`stop`](JobSystem::stop) and also runs on drop,
/// so an abandoned system cannot leak its threads.
#[derive(Debug)]
pub struct JobSystem {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
    daemons: Vec<JoinHandle<()>>,
    thread_name_prefix: String,
}

impl JobSystem {
    /// Starts a pool of `config.workers` worker threads.
    ///
    /// No daemon threads are started here; see
    /// [`register_daemon`](JobSystem::register_daemon).
    ///
    /// ## Errors
    /// [`JobSystemError::NoWorkers`] if the configured pool size is zero,
    /// [`JobSystemError::Spawn`] if the OS refuses a thread. Workers spawned
    /// before a failure are joined again on drop.
    pub fn new(config: JobSystemConfig) -> Result<Self, JobSystemError> {
        if config.workers == 0 {
            return Err(JobSystemError::NoWorkers);
        }

        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                queue: VecDeque::new(),
                pending: 0,
                idle: true,
            }),
            work_available: Condvar::new(),
            all_complete: Condvar::new(),
            stop: AtomicBool::new(false),
        });

        let mut system = Self {
            shared,
            workers: Vec::with_capacity(config.workers),
            daemons: Vec::new(),
            thread_name_prefix: config.thread_name_prefix,
        };

        for index in 0..config.workers {
            let shared = Arc::clone(&system.shared);
            let handle = thread::Builder::new()
                .name(format!("{}-worker-{index}", system.thread_name_prefix))
                .spawn(move || worker_loop(&shared, index))
                .map_err(|source| JobSystemError::Spawn {
                    role: "worker",
                    source,
                })?;
            system.workers.push(handle);
        }

        log::info!("Job system started with {} workers.", system.workers.len());
        Ok(system)
    }

    /// Inserts `job` at the back of the pending queue and wakes one worker.
    ///
    /// Never blocks on job execution. Dependencies are not validated: a job
    /// whose dependency is never itself scheduled simply stalls forever
    /// (see the module docs).
    ///
    /// ## Errors
    /// [`JobSystemError::Stopped`] once [`stop`](JobSystem::stop) has run.
    pub fn schedule(&self, job: Arc<Job>) -> Result<(), JobSystemError> {
        if self.shared.stop.load(Ordering::SeqCst) {
            return Err(JobSystemError::Stopped);
        }

        {
            let mut state = self.shared.state.lock().unwrap();
            log::trace!(
                "Scheduling job '{}'.",
                job.label().unwrap_or("<unlabeled>")
            );
            state.queue.push_back(job);
            state.pending += 1;
            state.idle = false;
        }
        self.shared.work_available.notify_one();
        Ok(())
    }

    /// Binds `job` to a dedicated thread that runs it in a loop until the
    /// system stops. The stop flag is checked only between iterations, so
    /// an in-progress execution is never interrupted.
    ///
    /// Daemon jobs bypass the pending queue entirely: they do not count
    /// toward [`wait_idle`](JobSystem::wait_idle).
    ///
    /// ## Errors
    /// [`JobSystemError::Stopped`] once [`stop`](JobSystem::stop) has run,
    /// [`JobSystemError::Spawn`] if the OS refuses the thread.
    pub fn register_daemon(&mut self, job: Arc<Job>) -> Result<(), JobSystemError> {
        if self.shared.stop.load(Ordering::SeqCst) {
            return Err(JobSystemError::Stopped);
        }

        let index = self.daemons.len();
        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name(format!("{}-daemon-{index}", self.thread_name_prefix))
            .spawn(move || {
                log::debug!("Daemon thread {index} started.");
                while !shared.stop.load(Ordering::Relaxed) {
                    job.run();
                }
                log::debug!("Daemon thread {index} exiting.");
            })
            .map_err(|source| JobSystemError::Spawn {
                role: "daemon",
                source,
            })?;
        self.daemons.push(handle);
        Ok(())
    }

    /// Blocks until the pending count reaches zero.
    ///
    /// Returns immediately if nothing is queued or executing. A stalled job
    /// keeps the count above zero indefinitely, and this call blocks with
    /// it.
    pub fn wait_idle(&self) {
        let state = self.shared.state.lock().unwrap();
        let _state = self
            .shared
            .all_complete
            .wait_while(state, |state| !state.idle)
            .unwrap();
    }

    /// Stops the system: wakes every worker, then blocks until all worker
    /// and daemon threads have exited.
    ///
    /// Workers finish their current job first and drain whatever queued
    /// work is still executable; jobs that never become executable are
    /// abandoned unrun and stay unfinished. Subsequent calls are no-ops.
    pub fn stop(&mut self) {
        {
            // Storing under the state lock closes the gap between a
            // worker's stop check and its condvar wait.
            let _state = self.shared.state.lock().unwrap();
            if self.shared.stop.swap(true, Ordering::SeqCst) {
                return;
            }
        }

        self.shared.work_available.notify_all();
        self.shared.all_complete.notify_all();

        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
        for handle in self.daemons.drain(..) {
            let _ = handle.join();
        }

        log::info!("Job system stopped.");
    }
}

impl Drop for JobSystem {
    fn drop(&mut self) {
        self.stop();
    }
}

fn worker_loop(shared: &Shared, index: usize) {
    log::debug!("Job worker {index} started.");

    loop {
        let job = {
            let mut state = shared.state.lock().unwrap();
            loop {
                if let Some(job) = state.take_first_executable() {
                    break Some(job);
                }
                if shared.stop.load(Ordering::Relaxed) {
                    break None;
                }
                state = shared.work_available.wait(state).unwrap();
            }
        };

        let Some(job) = job else {
            break;
        };

        job.run();

        let mut state = shared.state.lock().unwrap();
        state.pending -= 1;
        if state.pending == 0 {
            state.idle = true;
            shared.all_complete.notify_all();
        }
        drop(state);

        // This completion may have made queued dependents executable.
        shared.work_available.notify_all();
    }

    log::debug!("Job worker {index} exiting.");
}
