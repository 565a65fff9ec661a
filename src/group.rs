use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use crate::runnable::Runnable;

/// Dense identifier for a submitted task group, assigned by an atomic
/// counter at submission time and never reused for the lifetime of an
/// engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskGroupId(pub(crate) u64);

impl TaskGroupId {
    /// Returns the raw, dense index backing this id.
    #[inline]
    pub fn index(self) -> u64 {
        self.0
    }
}

/// One logical bulk launch: a runnable, a task count, and the completion
/// bookkeeping the scheduler needs.
///
/// `dependents` is deliberately not a field here: every mutation of an
/// edge list happens while the engine's single mutex is held, so it lives
/// in that locked state instead (see `engine::sleeping::Inner`), avoiding a
/// second lock per group.
pub struct TaskGroup {
    id: TaskGroupId,
    runnable: Arc<dyn Runnable>,
    num_total_tasks: usize,
    completed_tasks: AtomicUsize,
    deps_left: AtomicUsize,
}

impl TaskGroup {
    pub(crate) fn new(
        id: TaskGroupId,
        runnable: Arc<dyn Runnable>,
        num_total_tasks: usize,
        deps_left: usize,
    ) -> Self {
        Self {
            id,
            runnable,
            num_total_tasks,
            completed_tasks: AtomicUsize::new(0),
            deps_left: AtomicUsize::new(deps_left),
        }
    }

    #[inline]
    pub fn id(&self) -> TaskGroupId {
        self.id
    }

    #[inline]
    pub fn num_total_tasks(&self) -> usize {
        self.num_total_tasks
    }

    /// Runs task `task_index` and reports whether this was the group's
    /// final outstanding task.
    pub(crate) fn run_and_complete_one(&self, task_index: usize) -> bool {
        self.runnable.run_task(task_index, self.num_total_tasks);
        let prev = self.completed_tasks.fetch_add(1, Ordering::AcqRel);
        prev + 1 == self.num_total_tasks
    }

    /// Decrements the dependency counter, returning `true` if this group
    /// just became ready (the caller holds the engine mutex already).
    pub(crate) fn release_one_dependency(&self) -> bool {
        self.deps_left.fetch_sub(1, Ordering::AcqRel) == 1
    }
}

/// A single work unit: one task index belonging to one group, as required
/// by the fine-grained dispatch granularity (the only conforming one).
pub(crate) struct WorkUnit {
    pub(crate) group: Arc<TaskGroup>,
    pub(crate) task_index: usize,
}
