//! Invocation strategies.
//!
//! The polling executor is parameterized over two [`Invoker`] strategies: one
//! that runs the poll closure and one that runs dispatch closures. They are
//! plain callables over boxed tasks; only the thread placement differs.
//!
//! - [`NewThreadInvoker`] spawns a short-lived thread per task and keeps two
//!   rotating join slots so a retiring generation is always joined before its
//!   slot is reused. Suited to the poll side, where the executor guarantees
//!   at most one task in flight.
//! - [`SingleThreadInvoker`] owns one long-lived worker draining a FIFO
//!   queue. Suited to the dispatch side: it serializes user continuations
//!   and bounds thread creation.
//! - [`InlineInvoker`] runs the task on the calling thread; test use only.
//!
//! No strategy detaches threads. Each joins everything it spawned when
//! dropped.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_queue::SegQueue;
use tracing::{debug, trace, warn};

/// A unit of work handed to an invoker.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Strategy object that decides which thread runs a task.
pub trait Invoker: Send + Sync {
    /// Schedules the task. Must not run it more than once.
    fn invoke(&self, task: Task);
}

/// Park interval for the queue worker; bounds the window in which a
/// notification can race the pop-then-park transition.
const WORKER_PARK: Duration = Duration::from_millis(50);

/// Configuration shared by the thread-spawning invokers.
#[derive(Debug, Clone)]
pub struct InvokerOptions {
    /// Prefix for spawned thread names.
    pub thread_name_prefix: String,
}

impl Default for InvokerOptions {
    fn default() -> Self {
        Self {
            thread_name_prefix: "pollex".to_string(),
        }
    }
}

// === Single dedicated worker ===

struct WorkerInner {
    queue: SegQueue<Task>,
    shutdown: AtomicBool,
    mutex: Mutex<()>,
    condvar: Condvar,
}

impl WorkerInner {
    fn notify(&self) {
        let _guard = self.mutex.lock().expect("invoker mutex poisoned");
        self.condvar.notify_one();
    }
}

/// An [`Invoker`] backed by one dedicated worker thread and an unbounded
/// FIFO queue.
///
/// Tasks run in enqueue order. On drop the queue is drained before the
/// worker exits, so nothing accepted while the invoker was alive is lost;
/// tasks enqueued after shutdown are discarded (and logged).
///
/// A task that panics tears down the worker; every task queued behind it is
/// discarded when the invoker is dropped. The composition adapters never
/// panic in dispatch except observation under its fail-fast
/// [`FailurePolicy`](crate::FailurePolicy), which documents exactly this
/// teardown.
pub struct SingleThreadInvoker {
    inner: Arc<WorkerInner>,
    worker: Option<JoinHandle<()>>,
}

impl SingleThreadInvoker {
    /// Creates the invoker and spawns its worker thread.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(InvokerOptions::default())
    }

    /// Creates the invoker with a custom thread-name prefix.
    #[must_use]
    pub fn with_options(options: InvokerOptions) -> Self {
        let inner = Arc::new(WorkerInner {
            queue: SegQueue::new(),
            shutdown: AtomicBool::new(false),
            mutex: Mutex::new(()),
            condvar: Condvar::new(),
        });

        let worker_inner = Arc::clone(&inner);
        let name = format!("{}-dispatch", options.thread_name_prefix);
        let worker = thread::Builder::new()
            .name(name)
            .spawn(move || worker_loop(&worker_inner))
            .expect("failed to spawn dispatch thread");

        Self {
            inner,
            worker: Some(worker),
        }
    }
}

impl Default for SingleThreadInvoker {
    fn default() -> Self {
        Self::new()
    }
}

impl Invoker for SingleThreadInvoker {
    fn invoke(&self, task: Task) {
        if self.inner.shutdown.load(Ordering::Acquire) {
            warn!("task enqueued after invoker shutdown; discarding");
            return;
        }
        self.inner.queue.push(task);
        self.inner.notify();
    }
}

impl Drop for SingleThreadInvoker {
    fn drop(&mut self) {
        self.inner.shutdown.store(true, Ordering::Release);
        {
            let _guard = self.inner.mutex.lock().expect("invoker mutex poisoned");
            self.inner.condvar.notify_all();
        }
        if let Some(worker) = self.worker.take() {
            // Err means a task panicked and the worker unwound; the panic
            // has already been reported by the panic hook.
            let _ = worker.join();
        }
    }
}

fn worker_loop(inner: &WorkerInner) {
    trace!("dispatch worker started");
    loop {
        if let Some(task) = inner.queue.pop() {
            task();
            continue;
        }

        if inner.shutdown.load(Ordering::Acquire) {
            break;
        }

        let guard = inner.mutex.lock().expect("invoker mutex poisoned");
        let _ = inner
            .condvar
            .wait_timeout(guard, WORKER_PARK)
            .expect("invoker mutex poisoned");
    }

    // Shutdown observed: drain whatever was accepted before it.
    while let Some(task) = inner.queue.pop() {
        task();
    }
    trace!("dispatch worker exited");
}

// === Fresh thread per task ===

/// An [`Invoker`] that spawns a new thread for every task.
///
/// Two join slots rotate so that invoking generation `n` first joins
/// generation `n - 2`; the caller must guarantee at most one task is in
/// flight, which makes that join immediate in practice. The polling
/// executor provides exactly that guarantee for its poll closure.
pub struct NewThreadInvoker {
    slots: Mutex<Slots>,
    options: InvokerOptions,
    generation: AtomicU64,
}

struct Slots {
    use_first: bool,
    handles: [Option<JoinHandle<()>>; 2],
}

impl NewThreadInvoker {
    /// Creates the invoker; no thread is spawned until the first task.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(InvokerOptions::default())
    }

    /// Creates the invoker with a custom thread-name prefix.
    #[must_use]
    pub fn with_options(options: InvokerOptions) -> Self {
        Self {
            slots: Mutex::new(Slots {
                use_first: true,
                handles: [None, None],
            }),
            options,
            generation: AtomicU64::new(0),
        }
    }
}

impl Default for NewThreadInvoker {
    fn default() -> Self {
        Self::new()
    }
}

impl Invoker for NewThreadInvoker {
    fn invoke(&self, task: Task) {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let name = format!("{}-poll-{}", self.options.thread_name_prefix, generation);

        let mut slots = self.slots.lock().expect("invoker mutex poisoned");
        let index = usize::from(!slots.use_first);

        if let Some(retired) = slots.handles[index].take() {
            let _ = retired.join();
        }

        let handle = thread::Builder::new()
            .name(name)
            .spawn(task)
            .expect("failed to spawn poll thread");
        slots.handles[index] = Some(handle);
        slots.use_first = !slots.use_first;
    }
}

impl Drop for NewThreadInvoker {
    fn drop(&mut self) {
        let mut slots = self.slots.lock().expect("invoker mutex poisoned");
        for handle in &mut slots.handles {
            if let Some(handle) = handle.take() {
                let _ = handle.join();
            }
        }
        debug!("poll invoker joined");
    }
}

// === Inline ===

/// An [`Invoker`] that runs the task synchronously on the calling thread.
///
/// With this as the poll strategy, `watch` blocks until the executor's
/// queue drains. Useful for deterministic tests, never for production.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineInvoker;

impl Invoker for InlineInvoker {
    fn invoke(&self, task: Task) {
        task();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn single_thread_runs_tasks_in_fifo_order() {
        let invoker = SingleThreadInvoker::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        let done = Arc::new(AtomicUsize::new(0));

        for i in 0..100 {
            let order = Arc::clone(&order);
            let done = Arc::clone(&done);
            invoker.invoke(Box::new(move || {
                order.lock().unwrap().push(i);
                done.fetch_add(1, Ordering::Relaxed);
            }));
        }

        while done.load(Ordering::Relaxed) < 100 {
            thread::sleep(Duration::from_millis(1));
        }
        let recorded = order.lock().unwrap().clone();
        assert_eq!(recorded, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn single_thread_runs_off_the_caller() {
        let invoker = SingleThreadInvoker::new();
        let caller = thread::current().id();
        let (tx, rx) = std::sync::mpsc::channel();

        invoker.invoke(Box::new(move || {
            tx.send(thread::current().id()).unwrap();
        }));

        let worker = rx.recv_timeout(Duration::from_secs(2)).expect("task ran");
        assert_ne!(worker, caller);
    }

    #[test]
    fn single_thread_drains_queue_on_drop() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let invoker = SingleThreadInvoker::new();
            for _ in 0..50 {
                let counter = Arc::clone(&counter);
                invoker.invoke(Box::new(move || {
                    counter.fetch_add(1, Ordering::Relaxed);
                }));
            }
        }
        assert_eq!(counter.load(Ordering::Relaxed), 50);
    }

    #[test]
    fn single_thread_concurrent_enqueue() {
        let invoker = Arc::new(SingleThreadInvoker::new());
        let counter = Arc::new(AtomicUsize::new(0));
        let mut producers = Vec::new();

        for _ in 0..4 {
            let invoker = Arc::clone(&invoker);
            let counter = Arc::clone(&counter);
            producers.push(thread::spawn(move || {
                for _ in 0..50 {
                    let counter = Arc::clone(&counter);
                    invoker.invoke(Box::new(move || {
                        counter.fetch_add(1, Ordering::Relaxed);
                    }));
                }
            }));
        }
        for p in producers {
            p.join().expect("producer panicked");
        }

        drop(Arc::try_unwrap(invoker).ok().expect("sole owner"));
        assert_eq!(counter.load(Ordering::Relaxed), 200);
    }

    #[test]
    fn new_thread_runs_each_task_on_a_fresh_thread() {
        let invoker = NewThreadInvoker::new();
        let ids = Arc::new(Mutex::new(Vec::new()));

        for _ in 0..3 {
            let ids = Arc::clone(&ids);
            let (tx, rx) = std::sync::mpsc::channel();
            invoker.invoke(Box::new(move || {
                ids.lock().unwrap().push(thread::current().id());
                tx.send(()).unwrap();
            }));
            rx.recv_timeout(Duration::from_secs(2)).expect("task ran");
        }

        let recorded = ids.lock().unwrap().clone();
        assert_eq!(recorded.len(), 3);
        assert_ne!(recorded[0], recorded[1]);
        assert_ne!(recorded[1], recorded[2]);
    }

    #[test]
    fn new_thread_joins_everything_on_drop() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let invoker = NewThreadInvoker::new();
            for _ in 0..2 {
                let counter = Arc::clone(&counter);
                invoker.invoke(Box::new(move || {
                    thread::sleep(Duration::from_millis(20));
                    counter.fetch_add(1, Ordering::Relaxed);
                }));
            }
        }
        // Drop joined both generations, so the work is complete.
        assert_eq!(counter.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn thread_names_carry_the_prefix() {
        let invoker = SingleThreadInvoker::with_options(InvokerOptions {
            thread_name_prefix: "renamed".to_string(),
        });
        let (tx, rx) = std::sync::mpsc::channel();
        invoker.invoke(Box::new(move || {
            tx.send(thread::current().name().map(str::to_string)).unwrap();
        }));

        let name = rx
            .recv_timeout(Duration::from_secs(2))
            .expect("task ran")
            .expect("worker thread named");
        assert_eq!(name, "renamed-dispatch");
    }

    #[test]
    fn inline_runs_on_the_caller() {
        let invoker = InlineInvoker;
        let caller = thread::current().id();
        let observed = Arc::new(Mutex::new(None));

        let slot = Arc::clone(&observed);
        invoker.invoke(Box::new(move || {
            *slot.lock().unwrap() = Some(thread::current().id());
        }));

        assert_eq!(observed.lock().unwrap().expect("ran"), caller);
    }
}
