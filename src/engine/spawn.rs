//! Reference baseline: spawns `p` OS threads on every call, each executing
//! a strided slice of the task indices (`t, t+p, t+2p, ...`), then joins
//! them before returning. No persistent pool, no dependency tracking
//! between launches.

use std::{sync::Arc, thread};

use super::TaskSystem;
use crate::{group::TaskGroupId, runnable::Runnable};

/// Spawns `num_threads` OS threads per [`TaskSystem::run`] call, each
/// executing task indices `t, t + p, t + 2p, ...`, and joins them all
/// before returning. No thread pool, no dependency tracking between
/// launches, every `run_async_with_deps` call blocks until its own
/// threads finish, so `sync` has nothing left to wait for.
pub struct AlwaysSpawnTaskSystem {
    num_threads: usize,
}

impl AlwaysSpawnTaskSystem {
    pub fn new(num_threads: usize) -> Self {
        assert!(
            num_threads > 0,
            "AlwaysSpawnTaskSystem requires a positive thread count"
        );
        Self { num_threads }
    }
}

impl TaskSystem for AlwaysSpawnTaskSystem {
    fn name(&self) -> &'static str {
        "Parallel + Always Spawn"
    }

    fn run(&self, runnable: Arc<dyn Runnable>, num_total_tasks: usize) {
        if num_total_tasks == 0 {
            return;
        }
        let num_threads = self.num_threads.min(num_total_tasks);
        thread::scope(|scope| {
            for t in 0..num_threads {
                let runnable = runnable.clone();
                let stride = num_threads;
                scope.spawn(move || {
                    let mut i = t;
                    while i < num_total_tasks {
                        runnable.run_task(i, num_total_tasks);
                        i += stride;
                    }
                });
            }
        });
    }

    fn run_async_with_deps(
        &self,
        runnable: Arc<dyn Runnable>,
        num_total_tasks: usize,
        _deps: &[TaskGroupId],
    ) -> TaskGroupId {
        // No cross-launch dependency tracking: every launch runs (and
        // joins) to completion before this call returns, so deps are
        // trivially satisfied by sequencing calls on the caller's thread.
        self.run(runnable, num_total_tasks);
        TaskGroupId(0)
    }

    fn sync(&self) {}
}
