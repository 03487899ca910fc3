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

// Vesta sandbox
// Drives a frame-preparation job graph and a heartbeat daemon.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use vesta_core::Job;
use vesta_jobs::{JobSystem, JobSystemConfig};

fn main() -> Result<()> {
    env_logger::init();

    let mut system = JobSystem::new(JobSystemConfig::default())?;

    // A small frame-preparation graph: meshes and textures load in
    // parallel once the manifest is read, and the upload waits on both.
    let manifest = Job::labeled("read-manifest", || {
        log::info!("Reading asset manifest.");
        Ok(())
    });
    let meshes = Job::labeled("load-meshes", || {
        log::info!("Decoding mesh data.");
        thread::sleep(Duration::from_millis(20));
        Ok(())
    });
    let textures = Job::labeled("load-textures", || {
        log::info!("Decoding texture data.");
        thread::sleep(Duration::from_millis(20));
        Ok(())
    });
    let upload = Job::labeled("gpu-upload", || {
        log::info!("Uploading frame resources.");
        Ok(())
    });
    meshes.add_dependency(&manifest);
    textures.add_dependency(&manifest);
    upload.add_dependency(&meshes);
    upload.add_dependency(&textures);

    // Schedule in reverse to show that ordering comes from the
    // dependency graph, not from submission order.
    for job in [&upload, &textures, &meshes, &manifest] {
        system.schedule(Arc::clone(job))?;
    }
    system.wait_idle();

    for job in [&manifest, &meshes, &textures, &upload] {
        if let Some(error) = job.error() {
            log::error!("{}: {error}", job.label().unwrap_or("<unlabeled>"));
        }
    }
    log::info!("Frame preparation complete.");

    // A daemon re-runs its job until shutdown.
    let beats = Arc::new(AtomicUsize::new(0));
    let heartbeat = {
        let beats = Arc::clone(&beats);
        Job::labeled("heartbeat", move || {
            beats.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(10));
            Ok(())
        })
    };
    system.register_daemon(heartbeat)?;
    thread::sleep(Duration::from_millis(50));

    system.stop();
    log::info!("Heartbeat ran {} times.", beats.load(Ordering::SeqCst));

    Ok(())
}
