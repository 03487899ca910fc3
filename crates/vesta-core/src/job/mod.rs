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

//! Defines the schedulable unit of work and its capability contract.
//!
//! A [`Job`] pairs a [`Workload`] (the one-shot capability that performs the
//! actual work) with the bookkeeping the scheduler needs: an ordered list of
//! dependencies, a monotonic finished flag, and a captured failure slot.
//!
//! Jobs are deliberately decoupled from the scheduler that runs them. Higher
//! level crates own the worker pool; this module only guarantees that a job
//! can be run once, observed for completion, and inspected for failure.

mod error;
mod handle;
mod workload;

pub use self::error::JobError;
pub use self::handle::Job;
pub use self::workload::Workload;
