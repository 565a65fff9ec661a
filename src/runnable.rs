/// A caller-supplied unit of work, invoked once per task index of a bulk
/// launch.
///
/// The engine treats a `Runnable` as opaque: it is invoked and otherwise
/// never inspected. Implementations must be `Send + Sync` because a single
/// `Runnable` is shared (via `Arc`) across every worker that may execute one
/// of its task indices, possibly concurrently.
pub trait Runnable: Send + Sync {
    /// Performs the work for task `task_index` out of `num_total_tasks`,
    /// where `0 <= task_index < num_total_tasks`.
    fn run_task(&self, task_index: usize, num_total_tasks: usize);
}

impl<F> Runnable for F
where
    F: Fn(usize, usize) + Send + Sync,
{
    fn run_task(&self, task_index: usize, num_total_tasks: usize) {
        self(task_index, num_total_tasks)
    }
}
