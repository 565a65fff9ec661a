//! The sleeping thread-pool scheduler (the core of this crate).
//!
//! One mutex (`Shared::inner`) guards the task-group registry, the
//! dependents edge map, the ready queue, and the shutdown flag. Two
//! condition variables share that mutex: `worker_cv` wakes workers when
//! there is new work (or on shutdown), `sync_cv` wakes a caller blocked in
//! [`TaskSystem::sync`] when the active-group count reaches zero. Per-group
//! `completed_tasks`/`deps_left` counters are atomics, touched by workers
//! without holding the mutex while a task is running (see
//! [`TaskGroup::run_and_complete_one`]).

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Arc, Condvar, Mutex,
        atomic::{AtomicU64, Ordering},
    },
    thread,
};

use tracing::{debug, trace};

use super::TaskSystem;
use crate::{
    group::{TaskGroup, TaskGroupId, WorkUnit},
    runnable::Runnable,
};

struct Inner {
    registry: HashMap<TaskGroupId, Arc<TaskGroup>>,
    /// Outgoing dependency edges, keyed by the predecessor's id. An entry
    /// is removed the moment its predecessor finishes.
    dependents: HashMap<TaskGroupId, Vec<TaskGroupId>>,
    ready_queue: VecDeque<WorkUnit>,
    active_groups: usize,
    shutdown: bool,
}

struct Shared {
    inner: Mutex<Inner>,
    worker_cv: Condvar,
    sync_cv: Condvar,
    next_group_id: AtomicU64,
    name: String,
}

/// A parallel task-execution engine backed by a fixed pool of worker
/// threads that sleep (via a condition variable) when there is no ready
/// work, rather than busy-polling.
pub struct SleepingThreadPool {
    shared: Arc<Shared>,
    workers: Vec<thread::JoinHandle<()>>,
}

impl SleepingThreadPool {
    /// Starts a pool of `num_threads` worker threads. `num_threads` must be
    /// positive; a non-positive count is a programmer error.
    pub fn new(num_threads: usize) -> Self {
        Self::with_name("pulz_tasksys::sleeping", num_threads)
    }

    /// Like [`Self::new`], but tags the pool (and the `tracing` spans its
    /// workers run in) with `name` for easier debugging when an app hosts
    /// more than one pool.
    pub fn with_name(name: impl Into<String>, num_threads: usize) -> Self {
        assert!(
            num_threads > 0,
            "SleepingThreadPool requires a positive thread count"
        );
        let name = name.into();
        let shared = Arc::new(Shared {
            inner: Mutex::new(Inner {
                registry: HashMap::new(),
                dependents: HashMap::new(),
                ready_queue: VecDeque::new(),
                active_groups: 0,
                shutdown: false,
            }),
            worker_cv: Condvar::new(),
            sync_cv: Condvar::new(),
            next_group_id: AtomicU64::new(0),
            name: name.clone(),
        });

        let workers = (0..num_threads)
            .map(|i| {
                let shared = shared.clone();
                thread::Builder::new()
                    .name(format!("{name}-{i}"))
                    .spawn(move || worker_loop(shared))
                    .expect("failed to spawn worker thread")
            })
            .collect();

        Self { shared, workers }
    }
}

fn worker_loop(shared: Arc<Shared>) {
    let span = tracing::span!(tracing::Level::TRACE, "worker", pool = %shared.name);
    let _enter = span.enter();
    trace!("worker started");
    loop {
        let unit = {
            let inner = shared.inner.lock().unwrap();
            let mut inner = shared
                .worker_cv
                .wait_while(inner, |inner| inner.ready_queue.is_empty() && !inner.shutdown)
                .unwrap();
            match inner.ready_queue.pop_front() {
                Some(unit) => unit,
                None => {
                    debug_assert!(inner.shutdown);
                    break;
                }
            }
        };

        let group_id = unit.group.id();
        let task_index = unit.task_index;
        trace!(group = group_id.index(), task_index, "executing task");
        let finished = unit.group.run_and_complete_one(task_index);
        if finished {
            finish_group(&shared, group_id);
        }
    }
    trace!("worker exiting");
}

/// Handles everything that must happen once a group's last task index
/// returns: releasing dependents (recursively, to cover a zero-task group
/// that becomes ready as a dependent of another group), removing finished
/// groups from the registry, and waking up `sync()` once the engine goes
/// quiescent.
fn finish_group(shared: &Shared, id: TaskGroupId) {
    let mut inner = shared.inner.lock().unwrap();
    let mut should_wake_workers = false;
    let mut worklist = vec![id];

    while let Some(gid) = worklist.pop() {
        debug!(group = gid.index(), "group finished");
        if let Some(dependent_ids) = inner.dependents.remove(&gid) {
            for dep_id in dependent_ids {
                let Some(dep_group) = inner.registry.get(&dep_id).cloned() else {
                    // Can only happen if `dep_id` was already removed, which
                    // never happens while it still has an outstanding
                    // dependency edge pointing at it.
                    continue;
                };
                if dep_group.release_one_dependency() {
                    if dep_group.num_total_tasks() == 0 {
                        // Nothing will ever dequeue a work unit for this
                        // group, so it must be finished here instead.
                        worklist.push(dep_id);
                    } else {
                        for task_index in 0..dep_group.num_total_tasks() {
                            inner.ready_queue.push_back(WorkUnit {
                                group: dep_group.clone(),
                                task_index,
                            });
                        }
                        should_wake_workers = true;
                    }
                }
            }
        }
        inner.registry.remove(&gid);
        inner.active_groups -= 1;
    }

    let quiescent = inner.active_groups == 0;
    drop(inner);
    if should_wake_workers {
        shared.worker_cv.notify_all();
    }
    if quiescent {
        shared.sync_cv.notify_all();
    }
}

impl TaskSystem for SleepingThreadPool {
    fn name(&self) -> &'static str {
        "Parallel + Thread Pool + Sleep"
    }

    fn run_async_with_deps(
        &self,
        runnable: Arc<dyn Runnable>,
        num_total_tasks: usize,
        deps: &[TaskGroupId],
    ) -> TaskGroupId {
        let id = TaskGroupId(self.shared.next_group_id.fetch_add(1, Ordering::Relaxed));

        let mut inner = self.shared.inner.lock().unwrap();
        let mut unresolved = 0usize;
        for &dep in deps {
            assert!(
                dep.0 < id.0,
                "dependency {dep:?} was never issued by this engine"
            );
            if inner.registry.contains_key(&dep) {
                inner.dependents.entry(dep).or_default().push(id);
                unresolved += 1;
            }
            // else: `dep` has already finished and left the registry,
            // treated as already satisfied, not an error.
        }

        let group = Arc::new(TaskGroup::new(id, runnable, num_total_tasks, unresolved));
        inner.registry.insert(id, group.clone());
        inner.active_groups += 1;
        debug!(
            group = id.index(),
            num_total_tasks, unresolved, "group submitted"
        );

        let ready_now = unresolved == 0;
        if ready_now && num_total_tasks > 0 {
            for task_index in 0..num_total_tasks {
                inner.ready_queue.push_back(WorkUnit {
                    group: group.clone(),
                    task_index,
                });
            }
        }
        drop(inner);

        if ready_now {
            if num_total_tasks > 0 {
                self.shared.worker_cv.notify_all();
            } else {
                finish_group(&self.shared, id);
            }
        }
        id
    }

    fn sync(&self) {
        let inner = self.shared.inner.lock().unwrap();
        let _inner = self
            .shared
            .sync_cv
            .wait_while(inner, |inner| inner.active_groups != 0)
            .unwrap();
    }
}

impl Drop for SleepingThreadPool {
    fn drop(&mut self) {
        {
            let mut inner = self.shared.inner.lock().unwrap();
            inner.shutdown = true;
        }
        self.shared.worker_cv.notify_all();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}
