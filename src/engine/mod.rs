//! The public façade: one trait implemented by the sleeping thread-pool
//! scheduler (the core of this crate) and by three simpler reference
//! variants that share its contract.

use std::sync::Arc;

use crate::{group::TaskGroupId, runnable::Runnable};

pub mod serial;
pub mod sleeping;
pub mod spawn;
pub mod spinning;

pub use serial::SerialTaskSystem;
pub use sleeping::SleepingThreadPool;
pub use spawn::AlwaysSpawnTaskSystem;
pub use spinning::SpinningThreadPool;

/// The operations every task-execution engine variant in this crate
/// provides.
pub trait TaskSystem: Send + Sync {
    /// A human-readable label identifying the engine variant, for
    /// diagnostics only.
    fn name(&self) -> &'static str;

    /// Blocking bulk launch: equivalent to
    /// `run_async_with_deps(runnable, num_total_tasks, &[])` followed by
    /// `sync()`.
    fn run(&self, runnable: Arc<dyn Runnable>, num_total_tasks: usize) {
        self.run_async_with_deps(runnable, num_total_tasks, &[]);
        self.sync();
    }

    /// Submits a group. Returns immediately with a fresh id strictly
    /// greater than any previously returned id. The group's tasks will not
    /// begin until every listed dependency has finished.
    fn run_async_with_deps(
        &self,
        runnable: Arc<dyn Runnable>,
        num_total_tasks: usize,
        deps: &[TaskGroupId],
    ) -> TaskGroupId;

    /// Blocks until every group submitted before this call has finished.
    fn sync(&self);
}
