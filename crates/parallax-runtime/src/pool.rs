//! Worker pool with FIFO strands
//!
//! A strand is runnable when it has queued tasks and no worker is
//! currently executing one of them. Runnable strands sit in a shared
//! run queue; each worker pops a strand, executes exactly one task, and
//! re-enqueues the strand if more tasks are waiting. A strand is in the
//! run queue at most once, which is what serializes its tasks.

use crate::strand::StrandId;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Default number of worker threads
pub const DEFAULT_WORKER_THREADS: usize = 8;

type Task = Box<dyn FnOnce() + Send + 'static>;
type DoneCallback = Box<dyn FnOnce() + Send + 'static>;

/// Pool lifecycle state
///
/// Transitions are one-way: `Accepting -> Draining -> Done`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoolState {
    /// Posts allowed
    Accepting,
    /// `async_wait` was called; posting is a fatal misuse
    Draining,
    /// All posted work has completed and the drain callback has fired
    Done,
}

struct StrandQueue {
    tasks: VecDeque<Task>,
    /// True while the strand is in the run queue or a worker is
    /// executing one of its tasks. Guarantees single-worker access.
    scheduled: bool,
}

struct Shared {
    strands: Vec<StrandQueue>,
    run_queue: VecDeque<usize>,
    state: PoolState,
    /// Tasks posted but not yet completed, across all strands
    outstanding: usize,
    on_done: Option<DoneCallback>,
    shutdown: bool,
}

struct Inner {
    shared: Mutex<Shared>,
    work_ready: Condvar,
}

/// Fixed-size worker pool with FIFO strands.
///
/// Dropping the pool finishes all queued work and joins the workers.
pub struct WorkerPool {
    inner: Arc<Inner>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Create a pool with the default worker count
    pub fn new() -> Self {
        Self::with_threads(DEFAULT_WORKER_THREADS)
    }

    /// Create a pool with `threads` workers (at least one)
    pub fn with_threads(threads: usize) -> Self {
        let threads = threads.max(1);
        let inner = Arc::new(Inner {
            shared: Mutex::new(Shared {
                strands: Vec::new(),
                run_queue: VecDeque::new(),
                state: PoolState::Accepting,
                outstanding: 0,
                on_done: None,
                shutdown: false,
            }),
            work_ready: Condvar::new(),
        });

        let workers = (0..threads)
            .map(|i| {
                let inner = Arc::clone(&inner);
                thread::Builder::new()
                    .name(format!("parallax-worker-{i}"))
                    .spawn(move || worker_loop(inner))
                    .expect("failed to spawn worker thread")
            })
            .collect();

        tracing::debug!(threads, "worker pool started");
        Self { inner, workers }
    }

    /// Allocate a new FIFO execution lane.
    ///
    /// Panics if called after [`async_wait`](Self::async_wait); the
    /// pool never returns to the accepting state.
    pub fn create_strand(&self) -> StrandId {
        let mut shared = self.inner.shared.lock();
        assert_eq!(
            shared.state,
            PoolState::Accepting,
            "create_strand called after async_wait"
        );
        shared.strands.push(StrandQueue {
            tasks: VecDeque::new(),
            scheduled: false,
        });
        StrandId((shared.strands.len() - 1) as u32)
    }

    /// Enqueue `task` on `strand`.
    ///
    /// Tasks on the same strand execute in posting order and never
    /// concurrently with each other. Panics if the pool is draining:
    /// silently dropping a posted task would lose a transaction, which
    /// is worse than crashing loudly.
    pub fn post(&self, strand: StrandId, task: impl FnOnce() + Send + 'static) {
        let mut shared = self.inner.shared.lock();
        assert_eq!(
            shared.state,
            PoolState::Accepting,
            "post called after async_wait"
        );
        let idx = strand.0 as usize;
        assert!(idx < shared.strands.len(), "post on unknown strand");

        shared.outstanding += 1;
        let queue = &mut shared.strands[idx];
        queue.tasks.push_back(Box::new(task));
        if !queue.scheduled {
            queue.scheduled = true;
            shared.run_queue.push_back(idx);
            self.inner.work_ready.notify_one();
        }
    }

    /// One-shot drain barrier: no further posts are accepted, and
    /// `on_done` fires exactly once after every previously posted task
    /// (across all strands) has completed.
    ///
    /// If nothing is outstanding the callback fires on the calling
    /// thread before this returns. Panics on a second call.
    pub fn async_wait(&self, on_done: impl FnOnce() + Send + 'static) {
        let fire_now = {
            let mut shared = self.inner.shared.lock();
            assert_eq!(
                shared.state,
                PoolState::Accepting,
                "async_wait called twice"
            );
            if shared.outstanding == 0 {
                shared.state = PoolState::Done;
                shared.shutdown = true;
                self.inner.work_ready.notify_all();
                true
            } else {
                shared.state = PoolState::Draining;
                shared.on_done = Some(Box::new(on_done));
                return;
            }
        };
        if fire_now {
            tracing::debug!("pool drained with no outstanding work");
            on_done();
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> PoolState {
        self.inner.shared.lock().state
    }

    /// Number of tasks posted but not yet completed
    pub fn outstanding(&self) -> usize {
        self.inner.shared.lock().outstanding
    }

    /// Number of strands created so far
    pub fn strand_count(&self) -> usize {
        self.inner.shared.lock().strands.len()
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        {
            let mut shared = self.inner.shared.lock();
            shared.shutdown = true;
            self.inner.work_ready.notify_all();
        }
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

fn worker_loop(inner: Arc<Inner>) {
    let mut shared = inner.shared.lock();
    loop {
        if let Some(idx) = shared.run_queue.pop_front() {
            let task = shared.strands[idx]
                .tasks
                .pop_front()
                .expect("runnable strand with empty queue");

            drop(shared);
            task();
            shared = inner.shared.lock();

            shared.outstanding -= 1;
            if shared.strands[idx].tasks.is_empty() {
                shared.strands[idx].scheduled = false;
            } else {
                shared.run_queue.push_back(idx);
                inner.work_ready.notify_one();
            }

            if shared.state == PoolState::Draining && shared.outstanding == 0 {
                shared.state = PoolState::Done;
                shared.shutdown = true;
                let on_done = shared.on_done.take();
                inner.work_ready.notify_all();
                drop(shared);
                tracing::debug!("pool drained");
                if let Some(on_done) = on_done {
                    on_done();
                }
                shared = inner.shared.lock();
            }
        } else if shared.shutdown {
            break;
        } else {
            inner.work_ready.wait(&mut shared);
        }
    }
}
