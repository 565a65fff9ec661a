//! Reference baseline: identical protocol to [`super::sleeping`], except
//! workers busy-poll the ready queue instead of waiting on a condition
//! variable. Suitable only when the queue is expected to stay
//! continuously non-empty.

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    thread,
};

use super::TaskSystem;
use crate::{
    group::{TaskGroup, TaskGroupId, WorkUnit},
    runnable::Runnable,
};

struct Inner {
    registry: HashMap<TaskGroupId, Arc<TaskGroup>>,
    dependents: HashMap<TaskGroupId, Vec<TaskGroupId>>,
    ready_queue: VecDeque<WorkUnit>,
    active_groups: usize,
}

struct Shared {
    inner: Mutex<Inner>,
    shutdown: AtomicBool,
    next_group_id: AtomicU64,
}

/// A parallel task-execution engine backed by a fixed pool of worker
/// threads that spin-poll the ready queue rather than sleeping.
pub struct SpinningThreadPool {
    shared: Arc<Shared>,
    workers: Vec<thread::JoinHandle<()>>,
}

impl SpinningThreadPool {
    pub fn new(num_threads: usize) -> Self {
        assert!(
            num_threads > 0,
            "SpinningThreadPool requires a positive thread count"
        );
        let shared = Arc::new(Shared {
            inner: Mutex::new(Inner {
                registry: HashMap::new(),
                dependents: HashMap::new(),
                ready_queue: VecDeque::new(),
                active_groups: 0,
            }),
            shutdown: AtomicBool::new(false),
            next_group_id: AtomicU64::new(0),
        });
        let workers = (0..num_threads)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || worker_loop(shared))
            })
            .collect();
        Self { shared, workers }
    }
}

fn worker_loop(shared: Arc<Shared>) {
    loop {
        let unit = {
            let mut inner = shared.inner.lock().unwrap();
            inner.ready_queue.pop_front()
        };
        let Some(unit) = unit else {
            if shared.shutdown.load(Ordering::Acquire) {
                break;
            }
            thread::yield_now();
            continue;
        };
        let group_id = unit.group.id();
        let finished = unit.group.run_and_complete_one(unit.task_index);
        if finished {
            finish_group(&shared, group_id);
        }
    }
}

fn finish_group(shared: &Shared, id: TaskGroupId) {
    let mut inner = shared.inner.lock().unwrap();
    let mut worklist = vec![id];
    while let Some(gid) = worklist.pop() {
        if let Some(dependent_ids) = inner.dependents.remove(&gid) {
            for dep_id in dependent_ids {
                let Some(dep_group) = inner.registry.get(&dep_id).cloned() else {
                    continue;
                };
                if dep_group.release_one_dependency() {
                    if dep_group.num_total_tasks() == 0 {
                        worklist.push(dep_id);
                    } else {
                        for task_index in 0..dep_group.num_total_tasks() {
                            inner.ready_queue.push_back(WorkUnit {
                                group: dep_group.clone(),
                                task_index,
                            });
                        }
                    }
                }
            }
        }
        inner.registry.remove(&gid);
        inner.active_groups -= 1;
    }
}

impl TaskSystem for SpinningThreadPool {
    fn name(&self) -> &'static str {
        "Parallel + Thread Pool + Spin"
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
        }

        let group = Arc::new(TaskGroup::new(id, runnable, num_total_tasks, unresolved));
        inner.registry.insert(id, group.clone());
        inner.active_groups += 1;

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

        if ready_now && num_total_tasks == 0 {
            finish_group(&self.shared, id);
        }
        id
    }

    fn sync(&self) {
        loop {
            let active = self.shared.inner.lock().unwrap().active_groups;
            if active == 0 {
                break;
            }
            thread::yield_now();
        }
    }
}

impl Drop for SpinningThreadPool {
    fn drop(&mut self) {
        self.shared.shutdown.store(true, Ordering::Release);
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;

    #[test]
    fn linear_chain_completes() {
        let pool = SpinningThreadPool::new(4);
        let count = Arc::new(AtomicUsize::new(0));
        let mk = {
            let count = count.clone();
            move || {
                let count = count.clone();
                Arc::new(move |_i: usize, _n: usize| {
                    count.fetch_add(1, Ordering::Relaxed);
                }) as Arc<dyn Runnable>
            }
        };
        let a = pool.run_async_with_deps(mk(), 4, &[]);
        let b = pool.run_async_with_deps(mk(), 4, &[a]);
        let _c = pool.run_async_with_deps(mk(), 4, &[b]);
        pool.sync();
        assert_eq!(count.load(Ordering::Relaxed), 12);
    }

    #[test]
    fn zero_task_group_unblocks_dependents() {
        let pool = SpinningThreadPool::new(2);
        let count = Arc::new(AtomicUsize::new(0));
        let count2 = count.clone();
        let a = pool.run_async_with_deps(Arc::new(|_: usize, _: usize| {}), 0, &[]);
        pool.run_async_with_deps(
            Arc::new(move |_: usize, _: usize| {
                count2.fetch_add(1, Ordering::Relaxed);
            }),
            4,
            &[a],
        );
        pool.sync();
        assert_eq!(count.load(Ordering::Relaxed), 4);
    }
}
