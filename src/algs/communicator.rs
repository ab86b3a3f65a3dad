//! Task scheduler façade: submit work to a named owner, wait at a barrier.
//!
//! Work is a boxed closure ([`Task`]) queued on the worker that owns the data
//! it touches. Nothing here ever blocks on a pending value: a consumer of a
//! [`Future`] registers a continuation through [`World::when_ready`] and that
//! continuation is queued as a fresh task once the value arrives.
//!
//! Two backends implement [`Scheduler`]:
//! - [`SerialWorld`] keeps one queue per logical worker and drains them on
//!   the thread that calls [`World::fence`]. Deterministic; used by tests.
//! - [`ThreadWorld`] runs one OS thread per worker.
//!
//! [`World`] is the cloneable handle passed explicitly to every operation
//! that needs ownership lookups or submission.

use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::thread::JoinHandle;

use parking_lot::{Condvar, Mutex};

use crate::algs::future::Future;
use crate::mra_error::MraError;
use crate::topology::ownership::Rank;

/// A unit of work.
pub type Task = Box<dyn FnOnce() -> Result<(), MraError> + Send + 'static>;

/// Scheduling hint. Never affects results.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Priority {
    #[default]
    Normal,
    High,
}

/// Task scheduler backend.
pub trait Scheduler: Send + Sync + 'static {
    /// Number of workers.
    fn size(&self) -> usize;

    /// Queue `task` on worker `owner`.
    fn submit(&self, owner: Rank, priority: Priority, task: Task) -> Result<(), MraError>;

    /// Block until every submitted task (and everything it spawned) has run.
    ///
    /// Returns the first failure recorded since the previous fence.
    fn fence(&self) -> Result<(), MraError>;

    /// Record a failure to be surfaced by the next fence.
    fn report(&self, err: MraError);

    /// Total number of tasks executed so far.
    fn tasks_executed(&self) -> u64;
}

#[derive(Default)]
struct WorkerQueue {
    high: VecDeque<Task>,
    normal: VecDeque<Task>,
}

impl WorkerQueue {
    fn push(&mut self, priority: Priority, task: Task) {
        match priority {
            Priority::High => self.high.push_back(task),
            Priority::Normal => self.normal.push_back(task),
        }
    }

    fn pop(&mut self) -> Option<Task> {
        self.high.pop_front().or_else(|| self.normal.pop_front())
    }

    fn has_high(&self) -> bool {
        !self.high.is_empty()
    }
}

/// First-error-wins failure slot shared by both backends.
#[derive(Default)]
struct FailureSlot(Mutex<Option<MraError>>);

impl FailureSlot {
    fn record(&self, err: MraError) {
        log::warn!("task failed: {err}");
        let mut slot = self.0.lock();
        if slot.is_none() {
            *slot = Some(err);
        }
    }

    fn take(&self) -> Result<(), MraError> {
        match self.0.lock().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn run_task(worker: Rank, task: Task, failures: &FailureSlot) {
    match catch_unwind(AssertUnwindSafe(task)) {
        Ok(Ok(())) => {}
        Ok(Err(err)) => failures.record(err),
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".into());
            failures.record(MraError::TaskPanicked { worker, message });
        }
    }
}

// --- SerialWorld: N logical workers, drained by the fencing thread ---

/// Single-threaded scheduler with `size` logical workers.
pub struct SerialWorld {
    queues: Mutex<Vec<WorkerQueue>>,
    cursor: AtomicUsize,
    failures: FailureSlot,
    executed: AtomicU64,
}

impl SerialWorld {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            queues: Mutex::new((0..size).map(|_| WorkerQueue::default()).collect()),
            cursor: AtomicUsize::new(0),
            failures: FailureSlot::default(),
            executed: AtomicU64::new(0),
        }
    }

    // Round-robin over workers, high-priority queues first.
    fn next_task(&self) -> Option<(Rank, Task)> {
        let mut queues = self.queues.lock();
        let n = queues.len();
        let start = self.cursor.load(Ordering::Relaxed);
        let pick = (0..n)
            .map(|i| (start + i) % n)
            .find(|&r| queues[r].has_high())
            .or_else(|| {
                (0..n)
                    .map(|i| (start + i) % n)
                    .find(|&r| !queues[r].normal.is_empty())
            })?;
        self.cursor.store((pick + 1) % n, Ordering::Relaxed);
        queues[pick].pop().map(|t| (pick, t))
    }
}

impl Scheduler for SerialWorld {
    fn size(&self) -> usize {
        self.queues.lock().len()
    }

    fn submit(&self, owner: Rank, priority: Priority, task: Task) -> Result<(), MraError> {
        let mut queues = self.queues.lock();
        let size = queues.len();
        let queue = queues
            .get_mut(owner)
            .ok_or(MraError::InvalidWorker { worker: owner, size })?;
        queue.push(priority, task);
        Ok(())
    }

    fn fence(&self) -> Result<(), MraError> {
        while let Some((rank, task)) = self.next_task() {
            run_task(rank, task, &self.failures);
            self.executed.fetch_add(1, Ordering::Relaxed);
        }
        log::debug!(
            "serial fence: {} tasks executed in total",
            self.executed.load(Ordering::Relaxed)
        );
        self.failures.take()
    }

    fn report(&self, err: MraError) {
        self.failures.record(err);
    }

    fn tasks_executed(&self) -> u64 {
        self.executed.load(Ordering::Relaxed)
    }
}

// --- ThreadWorld: one OS thread per worker ---

struct WorkerSlot {
    queue: Mutex<WorkerQueue>,
    ready: Condvar,
}

struct Shared {
    workers: Vec<WorkerSlot>,
    outstanding: Mutex<usize>,
    idle: Condvar,
    failures: FailureSlot,
    shutdown: AtomicBool,
    executed: AtomicU64,
}

impl Shared {
    fn worker_loop(&self, rank: Rank) {
        let slot = &self.workers[rank];
        loop {
            let task = {
                let mut queue = slot.queue.lock();
                loop {
                    if let Some(task) = queue.pop() {
                        break task;
                    }
                    if self.shutdown.load(Ordering::Acquire) {
                        return;
                    }
                    slot.ready.wait(&mut queue);
                }
            };
            run_task(rank, task, &self.failures);
            self.executed.fetch_add(1, Ordering::Relaxed);
            let mut outstanding = self.outstanding.lock();
            *outstanding -= 1;
            if *outstanding == 0 {
                self.idle.notify_all();
            }
        }
    }
}

/// Multi-threaded scheduler: worker `r` is a dedicated thread.
pub struct ThreadWorld {
    shared: Arc<Shared>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl ThreadWorld {
    pub fn new(size: usize) -> Result<Self, MraError> {
        let size = size.max(1);
        let shared = Arc::new(Shared {
            workers: (0..size)
                .map(|_| WorkerSlot {
                    queue: Mutex::new(WorkerQueue::default()),
                    ready: Condvar::new(),
                })
                .collect(),
            outstanding: Mutex::new(0),
            idle: Condvar::new(),
            failures: FailureSlot::default(),
            shutdown: AtomicBool::new(false),
            executed: AtomicU64::new(0),
        });
        let world = Self {
            shared: Arc::clone(&shared),
            handles: Mutex::new(Vec::with_capacity(size)),
        };
        for rank in 0..size {
            let shared = Arc::clone(&shared);
            let handle = std::thread::Builder::new()
                .name(format!("mra-worker-{rank}"))
                .spawn(move || shared.worker_loop(rank))
                .map_err(|e| MraError::Spawn {
                    worker: rank,
                    message: e.to_string(),
                })?;
            world.handles.lock().push(handle);
        }
        Ok(world)
    }
}

impl Scheduler for ThreadWorld {
    fn size(&self) -> usize {
        self.shared.workers.len()
    }

    fn submit(&self, owner: Rank, priority: Priority, task: Task) -> Result<(), MraError> {
        if self.shared.shutdown.load(Ordering::Acquire) {
            return Err(MraError::ShutDown);
        }
        let slot = self.shared.workers.get(owner).ok_or(MraError::InvalidWorker {
            worker: owner,
            size: self.shared.workers.len(),
        })?;
        *self.shared.outstanding.lock() += 1;
        slot.queue.lock().push(priority, task);
        slot.ready.notify_one();
        Ok(())
    }

    fn fence(&self) -> Result<(), MraError> {
        {
            let mut outstanding = self.shared.outstanding.lock();
            while *outstanding > 0 {
                self.shared.idle.wait(&mut outstanding);
            }
        }
        log::debug!(
            "thread fence: {} tasks executed in total",
            self.shared.executed.load(Ordering::Relaxed)
        );
        self.shared.failures.take()
    }

    fn report(&self, err: MraError) {
        self.shared.failures.record(err);
    }

    fn tasks_executed(&self) -> u64 {
        self.shared.executed.load(Ordering::Relaxed)
    }
}

impl Drop for ThreadWorld {
    fn drop(&mut self) {
        self.shared.shutdown.store(true, Ordering::Release);
        for slot in &self.shared.workers {
            let _guard = slot.queue.lock();
            slot.ready.notify_all();
        }
        // The last handle may be released by a task on one of our own workers.
        let me = std::thread::current().id();
        for handle in self.handles.lock().drain(..) {
            if handle.thread().id() != me {
                let _ = handle.join();
            }
        }
    }
}

// --- World: explicit runtime handle ---

/// Cloneable handle to a scheduler.
#[derive(Clone)]
pub struct World {
    sched: Arc<dyn Scheduler>,
}

impl World {
    pub fn new(sched: Arc<dyn Scheduler>) -> Self {
        Self { sched }
    }

    /// Deterministic single-threaded world with `size` logical workers.
    pub fn serial(size: usize) -> Self {
        Self::new(Arc::new(SerialWorld::new(size)))
    }

    /// One thread per worker.
    pub fn threaded(size: usize) -> Result<Self, MraError> {
        Ok(Self::new(Arc::new(ThreadWorld::new(size)?)))
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.sched.size()
    }

    /// Queue `f` on worker `owner`.
    pub fn submit<F>(&self, owner: Rank, priority: Priority, f: F) -> Result<(), MraError>
    where
        F: FnOnce() -> Result<(), MraError> + Send + 'static,
    {
        self.sched.submit(owner, priority, Box::new(f))
    }

    // Submission from inside a continuation has nobody to return an error
    // to, so it is recorded for the next fence instead.
    fn submit_or_report(&self, owner: Rank, priority: Priority, task: Task) {
        if let Err(err) = self.sched.submit(owner, priority, task) {
            self.sched.report(err);
        }
    }

    /// Collective barrier; see [`Scheduler::fence`].
    pub fn fence(&self) -> Result<(), MraError> {
        self.sched.fence()
    }

    /// Record a failure to be surfaced by the next fence.
    pub fn report(&self, err: MraError) {
        self.sched.report(err);
    }

    pub fn tasks_executed(&self) -> u64 {
        self.sched.tasks_executed()
    }

    /// Queue `f(value)` on `owner` once `fut` resolves.
    pub fn when_ready<T, F>(&self, owner: Rank, priority: Priority, fut: &Future<T>, f: F)
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> Result<(), MraError> + Send + 'static,
    {
        let world = self.clone();
        fut.on_ready(move |v| {
            let v = v.clone();
            world.submit_or_report(owner, priority, Box::new(move || f(v)));
        });
    }

    /// Queue `f(a, b)` on `owner` once both inputs resolve, in either order.
    pub fn when_both<A, B, F>(
        &self,
        owner: Rank,
        priority: Priority,
        a: &Future<A>,
        b: &Future<B>,
        f: F,
    ) where
        A: Clone + Send + Sync + 'static,
        B: Clone + Send + Sync + 'static,
        F: FnOnce(A, B) -> Result<(), MraError> + Send + 'static,
    {
        let world = self.clone();
        let b = b.clone();
        a.on_ready(move |av| {
            let av = av.clone();
            b.on_ready(move |bv| {
                let bv = bv.clone();
                world.submit_or_report(owner, priority, Box::new(move || f(av, bv)));
            });
        });
    }

    /// Queue `f(values)` on `owner` once every input resolves.
    ///
    /// Values are passed in input order.
    pub fn when_all<T, F>(&self, owner: Rank, priority: Priority, futs: Vec<Future<T>>, f: F)
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce(Vec<T>) -> Result<(), MraError> + Send + 'static,
    {
        if futs.is_empty() {
            self.submit_or_report(owner, priority, Box::new(move || f(Vec::new())));
            return;
        }
        let remaining = Arc::new(AtomicUsize::new(futs.len()));
        let futs = Arc::new(futs);
        let f = Arc::new(Mutex::new(Some(f)));
        for fut in futs.iter() {
            let remaining = Arc::clone(&remaining);
            let all = Arc::clone(&futs);
            let f = Arc::clone(&f);
            let world = self.clone();
            fut.on_ready(move |_| {
                if remaining.fetch_sub(1, Ordering::AcqRel) != 1 {
                    return;
                }
                let Some(f) = f.lock().take() else {
                    return;
                };
                let values: Vec<T> = all.iter().filter_map(|x| x.get().cloned()).collect();
                world.submit_or_report(owner, priority, Box::new(move || f(values)));
            });
        }
    }
}

static_assertions::assert_impl_all!(World: Send, Sync, Clone);
