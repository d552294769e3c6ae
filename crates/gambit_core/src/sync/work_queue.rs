//! # Fixed Worker Pool
//!
//! A bounded set of threads draining one job channel, plus a pending
//! counter that `wait()` blocks on.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::{Condvar, Mutex};

use crate::error::{CoreError, CoreResult};

/// A unit of work for the pool.
///
/// Tasks must only touch state they own (their own path or widget).
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// An ordered batch of independent tasks.
///
/// The order is only the order of submission; execution order is not
/// defined.
#[derive(Default)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty list with room for `capacity` tasks.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tasks: Vec::with_capacity(capacity),
        }
    }

    /// Appends a task.
    pub fn push<F>(&mut self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.tasks.push(Box::new(task));
    }

    /// Moves every task of `other` onto the end of this list.
    pub fn append(&mut self, mut other: TaskList) {
        self.tasks.append(&mut other.tasks);
    }

    /// Number of tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true if there are no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Runs every task on the calling thread.
    pub fn run_inline(self) {
        for task in self.tasks {
            task();
        }
    }
}

impl IntoIterator for TaskList {
    type Item = Task;
    type IntoIter = std::vec::IntoIter<Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.into_iter()
    }
}

impl std::fmt::Debug for TaskList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskList").field("len", &self.tasks.len()).finish()
    }
}

/// Count of submitted-but-unfinished tasks.
struct JoinBarrier {
    pending: Mutex<usize>,
    drained: Condvar,
}

impl JoinBarrier {
    fn new() -> Self {
        Self {
            pending: Mutex::new(0),
            drained: Condvar::new(),
        }
    }

    fn add(&self, count: usize) {
        *self.pending.lock() += count;
    }

    fn complete_one(&self) {
        let mut pending = self.pending.lock();
        *pending = pending.saturating_sub(1);
        if *pending == 0 {
            self.drained.notify_all();
        }
    }

    fn wait(&self) {
        let mut pending = self.pending.lock();
        while *pending > 0 {
            self.drained.wait(&mut pending);
        }
    }

    fn pending(&self) -> usize {
        *self.pending.lock()
    }
}

/// Fixed-size worker pool with a join barrier.
///
/// ## Usage
///
/// ```rust,ignore
/// let pool = WorkerPool::new(8)?;
///
/// loop {
///     pool.submit_batch(engine.widget_work(now));
///     pool.wait(); // every task has finished
///     engine.update(now);
/// }
/// ```
///
/// A panicking task is caught, logged and counted; it still releases the
/// barrier so `wait()` cannot hang.
pub struct WorkerPool {
    sender: Option<Sender<Task>>,
    workers: Vec<JoinHandle<()>>,
    barrier: Arc<JoinBarrier>,
    panicked: Arc<AtomicUsize>,
}

impl WorkerPool {
    /// Default worker count.
    pub const DEFAULT_SIZE: usize = 8;

    /// Spawns `size` workers (at least one).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::WorkerSpawn`] if the OS refuses a thread.
    pub fn new(size: usize) -> CoreResult<Self> {
        let size = size.max(1);
        let (sender, receiver) = unbounded::<Task>();
        let barrier = Arc::new(JoinBarrier::new());
        let panicked = Arc::new(AtomicUsize::new(0));

        let mut workers = Vec::with_capacity(size);
        for index in 0..size {
            let receiver = receiver.clone();
            let barrier = Arc::clone(&barrier);
            let panicked = Arc::clone(&panicked);
            let handle = thread::Builder::new()
                .name(format!("gambit-worker-{index}"))
                .spawn(move || worker_loop(&receiver, &barrier, &panicked))
                .map_err(|source| CoreError::WorkerSpawn { index, source })?;
            workers.push(handle);
        }

        tracing::debug!(size, "worker pool started");

        Ok(Self {
            sender: Some(sender),
            workers,
            barrier,
            panicked,
        })
    }

    /// Number of worker threads.
    #[must_use]
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Number of tasks submitted but not yet finished.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.barrier.pending()
    }

    /// Number of tasks that panicked since the pool started.
    #[must_use]
    pub fn panicked_tasks(&self) -> usize {
        self.panicked.load(Ordering::Relaxed)
    }

    /// Queues one task.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::PoolClosed`] if the workers are gone.
    pub fn submit<F>(&self, task: F) -> CoreResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = self.sender.as_ref().ok_or(CoreError::PoolClosed)?;
        self.barrier.add(1);
        sender.send(Box::new(task)).map_err(|_| {
            self.barrier.complete_one();
            CoreError::PoolClosed
        })
    }

    /// Queues a whole batch. Returns the number of tasks accepted.
    pub fn submit_batch(&self, tasks: TaskList) -> usize {
        let Some(sender) = self.sender.as_ref() else {
            return 0;
        };

        self.barrier.add(tasks.len());
        let mut accepted = 0;
        for task in tasks {
            if sender.send(task).is_ok() {
                accepted += 1;
            } else {
                self.barrier.complete_one();
            }
        }
        accepted
    }

    /// Blocks until every queued task has completed.
    pub fn wait(&self) {
        self.barrier.wait();
    }

    /// Submits a batch and waits for it.
    pub fn run_batch(&self, tasks: TaskList) -> usize {
        let accepted = self.submit_batch(tasks);
        self.wait();
        accepted
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Closing the channel ends every worker loop once the queue drains.
        self.sender.take();
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                tracing::error!("worker thread exited abnormally");
            }
        }
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("size", &self.workers.len())
            .field("pending", &self.pending())
            .finish()
    }
}

fn worker_loop(receiver: &Receiver<Task>, barrier: &JoinBarrier, panicked: &AtomicUsize) {
    for task in receiver {
        if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
            panicked.fetch_add(1, Ordering::Relaxed);
            let current = thread::current();
            let worker = current.name().unwrap_or("worker");
            tracing::error!(worker, "task panicked");
        }
        barrier.complete_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_wait_sees_every_task() {
        let pool = WorkerPool::new(4).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        let mut tasks = TaskList::new();
        for _ in 0..1_000 {
            let counter = Arc::clone(&counter);
            tasks.push(move || {
                counter.fetch_add(1, Ordering::Relaxed);
            });
        }

        assert_eq!(pool.submit_batch(tasks), 1_000);
        pool.wait();
        assert_eq!(counter.load(Ordering::Relaxed), 1_000);
        assert_eq!(pool.pending(), 0);
    }

    #[test]
    fn test_wait_blocks_on_slow_tasks() {
        let pool = WorkerPool::new(2).unwrap();
        let done = Arc::new(AtomicUsize::new(0));

        for _ in 0..4 {
            let done = Arc::clone(&done);
            pool.submit(move || {
                thread::sleep(Duration::from_millis(20));
                done.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }

        pool.wait();
        assert_eq!(done.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_panicking_task_releases_barrier() {
        let pool = WorkerPool::new(1).unwrap();
        pool.submit(|| panic!("boom")).unwrap();
        pool.submit(|| {}).unwrap();
        pool.wait();
        assert_eq!(pool.panicked_tasks(), 1);
        assert_eq!(pool.pending(), 0);
    }

    #[test]
    fn test_zero_size_clamps_to_one() {
        let pool = WorkerPool::new(0).unwrap();
        assert_eq!(pool.size(), 1);
        assert_eq!(pool.run_batch(TaskList::new()), 0);
    }
}
