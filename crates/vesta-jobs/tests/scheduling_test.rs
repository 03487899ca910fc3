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

use anyhow::anyhow;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use vesta_core::Job;
use vesta_jobs::{JobSystem, JobSystemConfig};

const WORKER_COUNTS: [usize; 3] = [1, 2, 8];

fn system_with(workers: usize) -> JobSystem {
    JobSystem::new(JobSystemConfig::with_workers(workers)).expect("job system should start")
}

/// Builds a job that appends `name` to the shared completion log.
fn logging_job(name: &'static str, log: &Arc<Mutex<Vec<&'static str>>>) -> Arc<Job> {
    let log = Arc::clone(log);
    Job::labeled(name, move || {
        log.lock().unwrap().push(name);
        Ok(())
    })
}

#[test]
fn independent_jobs_all_finish() {
    for workers in WORKER_COUNTS {
        let mut system = system_with(workers);
        let counter = Arc::new(AtomicUsize::new(0));

        let jobs: Vec<Arc<Job>> = (0..32)
            .map(|_| {
                let counter = Arc::clone(&counter);
                Job::new(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
            })
            .collect();

        for job in &jobs {
            system.schedule(Arc::clone(job)).expect("schedule");
        }
        system.wait_idle();

        assert_eq!(counter.load(Ordering::SeqCst), 32);
        for job in &jobs {
            assert!(job.is_finished());
            assert!(job.error().is_none());
        }
        system.stop();
    }
}

#[test]
fn dependent_never_runs_before_its_dependency() {
    for workers in WORKER_COUNTS {
        let mut system = system_with(workers);
        let order = Arc::new(Mutex::new(Vec::new()));

        let slow_log = Arc::clone(&order);
        let dependency = Job::labeled("dependency", move || {
            // Give the dependent every chance to be scanned first.
            thread::sleep(Duration::from_millis(10));
            slow_log.lock().unwrap().push("dependency");
            Ok(())
        });

        let observed_finished = Arc::new(AtomicBool::new(false));
        let dependent = {
            let order = Arc::clone(&order);
            let observed = Arc::clone(&observed_finished);
            let dependency = Arc::clone(&dependency);
            Job::labeled("dependent", move || {
                observed.store(dependency.is_finished(), Ordering::SeqCst);
                order.lock().unwrap().push("dependent");
                Ok(())
            })
        };
        dependent.add_dependency(&dependency);

        // Dependent first, so workers must skip and requeue it.
        system.schedule(Arc::clone(&dependent)).expect("schedule");
        system.schedule(Arc::clone(&dependency)).expect("schedule");
        system.wait_idle();

        assert_eq!(*order.lock().unwrap(), vec!["dependency", "dependent"]);
        assert!(
            observed_finished.load(Ordering::SeqCst),
            "dependent ran before its dependency finished"
        );
        system.stop();
    }
}

#[test]
fn diamond_graph_preserves_ordering_for_any_schedule_order() {
    let schedule_orders: [[&str; 4]; 4] = [
        ["a", "b", "c", "d"],
        ["d", "c", "b", "a"],
        ["b", "d", "a", "c"],
        ["c", "a", "d", "b"],
    ];

    for workers in WORKER_COUNTS {
        for schedule_order in schedule_orders {
            let mut system = system_with(workers);
            let completion = Arc::new(Mutex::new(Vec::new()));

            let a = logging_job("a", &completion);
            let b = logging_job("b", &completion);
            let c = logging_job("c", &completion);
            let d = logging_job("d", &completion);
            b.add_dependency(&a);
            c.add_dependency(&a);
            d.add_dependency(&b);
            d.add_dependency(&c);

            let by_name: HashMap<&str, &Arc<Job>> =
                HashMap::from([("a", &a), ("b", &b), ("c", &c), ("d", &d)]);
            for name in schedule_order {
                system.schedule(Arc::clone(by_name[name])).expect("schedule");
            }
            system.wait_idle();

            let completed = completion.lock().unwrap().clone();
            assert_eq!(
                completed.len(),
                4,
                "all four jobs should run (workers={workers}, order={schedule_order:?})"
            );
            assert_eq!(completed[0], "a", "a must finish before everything else");
            assert_eq!(completed[3], "d", "d must finish last");
            system.stop();
        }
    }
}

#[test]
fn failing_job_finishes_and_unblocks_dependents() {
    let mut system = system_with(2);

    let failing = Job::labeled("failing", || Err(anyhow!("synthetic failure")));
    let ran_after = Arc::new(AtomicBool::new(false));
    let dependent = {
        let ran = Arc::clone(&ran_after);
        Job::labeled("dependent", move || {
            ran.store(true, Ordering::SeqCst);
            Ok(())
        })
    };
    dependent.add_dependency(&failing);

    system.schedule(Arc::clone(&dependent)).expect("schedule");
    system.schedule(Arc::clone(&failing)).expect("schedule");
    system.wait_idle();

    assert!(failing.is_finished());
    let error = failing.error().expect("failure should be recorded");
    assert_eq!(
        format!("{error}"),
        "Job execution failed: synthetic failure"
    );

    assert!(dependent.is_finished());
    assert!(dependent.error().is_none());
    assert!(ran_after.load(Ordering::SeqCst));

    system.stop();
}

#[test]
fn unscheduled_dependency_stalls_without_error() {
    let mut system = system_with(2);

    let never_scheduled = Job::labeled("never-scheduled", || Ok(()));
    let ran = Arc::new(AtomicBool::new(false));
    let stalled = {
        let ran = Arc::clone(&ran);
        Job::labeled("stalled", move || {
            ran.store(true, Ordering::SeqCst);
            Ok(())
        })
    };
    stalled.add_dependency(&never_scheduled);

    system.schedule(Arc::clone(&stalled)).expect("schedule");
    thread::sleep(Duration::from_millis(100));

    // Expected stall: the job must not falsely report finished, and must
    // not manufacture an error either.
    assert!(!stalled.is_finished());
    assert!(stalled.error().is_none());
    assert!(!ran.load(Ordering::SeqCst));

    // Shutdown still terminates; the stalled job is abandoned unrun.
    system.stop();
    assert!(!stalled.is_finished());
}

#[test]
fn idle_system_waits_and_stops_promptly() {
    let mut system = system_with(4);

    // Nothing scheduled: the all-complete signal is already up.
    system.wait_idle();

    let started = Instant::now();
    system.stop();
    assert!(
        started.elapsed() < Duration::from_secs(1),
        "stop on an idle, daemon-free system should not hang"
    );
}
