//! Reference baseline: runs every task index in order on the calling
//! thread, with no worker pool and no dependency tracking of its own.

use std::sync::Arc;

use super::TaskSystem;
use crate::{group::TaskGroupId, runnable::Runnable};

/// Executes every task index of every group on the calling thread, in
/// submission order. `run_async_with_deps` degrades to synchronous
/// execution and returns a sentinel id; `sync` is a no-op, since nothing is
/// ever outstanding by the time a call returns.
#[derive(Debug, Default)]
pub struct SerialTaskSystem;

impl SerialTaskSystem {
    pub fn new() -> Self {
        Self
    }
}

impl TaskSystem for SerialTaskSystem {
    fn name(&self) -> &'static str {
        "Serial"
    }

    fn run(&self, runnable: Arc<dyn Runnable>, num_total_tasks: usize) {
        for i in 0..num_total_tasks {
            runnable.run_task(i, num_total_tasks);
        }
    }

    fn run_async_with_deps(
        &self,
        runnable: Arc<dyn Runnable>,
        num_total_tasks: usize,
        _deps: &[TaskGroupId],
    ) -> TaskGroupId {
        for i in 0..num_total_tasks {
            runnable.run_task(i, num_total_tasks);
        }
        TaskGroupId(0)
    }

    fn sync(&self) {}
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;

    #[test]
    fn runs_every_task_exactly_once() {
        let engine = SerialTaskSystem::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count2 = count.clone();
        engine.run(
            Arc::new(move |_i: usize, _n: usize| {
                count2.fetch_add(1, Ordering::Relaxed);
            }),
            10,
        );
        assert_eq!(count.load(Ordering::Relaxed), 10);
    }

    #[test]
    fn zero_tasks_is_a_no_op() {
        let engine = SerialTaskSystem::new();
        engine.run(Arc::new(|_: usize, _: usize| panic!("should never run")), 0);
    }
}
