//! The polling executor.
//!
//! [`PollingExecutor`] multiplexes many outstanding waitables onto a bounded
//! set of worker threads using timed waits. It owns two [`Invoker`]
//! strategies: the poll invoker runs the poll closure (at most one in flight
//! per executor), and the dispatch invoker runs ready waitables' terminal
//! `dispatch` off the poll thread.
//!
//! # Poll loop
//!
//! The poll closure repeatedly merges the shared queue into a local polling
//! set under the state lock, scans the set in deadline order with
//! quantum-bounded waits, and hands ready or failed items to the dispatch
//! invoker. The lock-scoped re-merge is what keeps the loop alive while
//! continuations running on the dispatch thread watch new adapters: the loop
//! only goes idle when both the shared queue and the local set are empty.
//! Without it, a chained continuation watched mid-sweep would stall until
//! some unrelated `watch` restarted the poller.
//!
//! # Shutdown
//!
//! `stop` latches the executor inactive and rejects everything queued with
//! [`ErrorKind::ExecutorStopped`]; the poll loop rejects its local set the
//! same way on its next merge. Watching a stopped executor hands the
//! waitable straight to the dispatch invoker with
//! [`ErrorKind::ExecutorInactive`]. Dropping the executor stops it and joins
//! both invokers, so every watched waitable is dispatched exactly once, even
//! across destruction.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::error::{Error, ErrorKind};
use crate::invoker::{Invoker, NewThreadInvoker, SingleThreadInvoker};
use crate::waitable::Waitable;

/// The component that eventually dispatches every waitable handed to it.
pub trait Executor: Send + Sync {
    /// Takes ownership of `w`, watches it, and dispatches it when ready.
    ///
    /// A waitable is ready when its `wait` returns true or fails. Returns
    /// immediately; on a stopped executor the waitable is dispatched with an
    /// [`ErrorKind::ExecutorInactive`] failure instead of being watched.
    fn watch(&self, w: Box<dyn Waitable>);

    /// Stops watching: rejects everything queued and refuses new work.
    ///
    /// Idempotent. Waitables already handed to the dispatch invoker still
    /// run their dispatch.
    fn stop(&self);
}

/// An [`Executor`] that polls its watched waitables with a bounded quantum.
///
/// `P` runs the poll closure, `D` runs dispatch closures. The default pair
/// spawns a fresh poll thread per poll run and serializes dispatches on one
/// dedicated worker.
pub struct PollingExecutor<P: Invoker = NewThreadInvoker, D: Invoker = SingleThreadInvoker> {
    // Dropped before `core`: joining the poll thread first guarantees no
    // poll closure still holds a core reference when the dispatcher winds
    // down.
    poller: P,
    core: Arc<Core<D>>,
}

struct Core<D> {
    q: Duration,
    state: Mutex<State>,
    dispatcher: D,
}

struct State {
    waitables: Vec<Box<dyn Waitable>>,
    active: bool,
    poller_running: bool,
}

impl PollingExecutor {
    /// Creates an executor with the default invoker pair and the given
    /// polling quantum.
    ///
    /// Larger quanta mean fewer OS wakeups but slower response; `q` of zero
    /// busy-polls. Around 10ms is a good general default.
    #[must_use]
    pub fn new(q: Duration) -> Self {
        Self::with_invokers(q, NewThreadInvoker::new(), SingleThreadInvoker::new())
    }
}

impl Default for PollingExecutor {
    fn default() -> Self {
        Self::new(Duration::from_millis(10))
    }
}

impl<P: Invoker, D: Invoker> PollingExecutor<P, D> {
    /// Creates an executor with explicit poll and dispatch strategies.
    #[must_use]
    pub fn with_invokers(q: Duration, poller: P, dispatcher: D) -> Self {
        Self {
            poller,
            core: Arc::new(Core {
                q,
                state: Mutex::new(State {
                    waitables: Vec::new(),
                    active: true,
                    poller_running: false,
                }),
                dispatcher,
            }),
        }
    }

    /// The polling quantum.
    #[must_use]
    pub fn quantum(&self) -> Duration {
        self.core.q
    }
}

impl<P: Invoker, D: Invoker + 'static> Executor for PollingExecutor<P, D> {
    fn watch(&self, w: Box<dyn Waitable>) {
        {
            let mut state = self.core.state.lock();
            if state.active {
                state.waitables.push(w);
                if state.poller_running {
                    return;
                }
                state.poller_running = true;
            } else {
                drop(state);
                trace!("watch on inactive executor, rejecting");
                self.core.reject(w, ErrorKind::ExecutorInactive);
                return;
            }
        }

        trace!("starting poll closure");
        let core = Arc::clone(&self.core);
        self.poller.invoke(Box::new(move || core.poll()));
    }

    fn stop(&self) {
        self.core.stop();
    }
}

impl<P: Invoker, D: Invoker> Drop for PollingExecutor<P, D> {
    fn drop(&mut self) {
        self.core.stop();
    }
}

impl<D: Invoker> Core<D> {
    fn stop(&self) {
        let rejected = {
            let mut state = self.state.lock();
            state.active = false;
            std::mem::take(&mut state.waitables)
        };

        if !rejected.is_empty() {
            debug!(count = rejected.len(), "stop rejecting queued waitables");
        }
        for w in rejected {
            self.reject(w, ErrorKind::ExecutorStopped);
        }
    }

    /// One poll run: drains the shared queue and the local set to empty (or
    /// to executor stop), then returns.
    fn poll(&self) {
        let mut polling: Vec<Box<dyn Waitable>> = Vec::new();

        loop {
            let running = {
                let mut state = self.state.lock();
                polling.append(&mut state.waitables);
                if !state.active || polling.is_empty() {
                    state.poller_running = false;
                }
                state.poller_running
            };

            if !running {
                // Empty set on a live executor: clean idle. Otherwise the
                // executor stopped mid-flight and the set is rejected here,
                // because nothing will poll it again.
                for w in polling.drain(..) {
                    self.reject(w, ErrorKind::ExecutorStopped);
                }
                trace!("poll closure exiting");
                return;
            }

            // Near-deadline items first: minimizes the gap between an item
            // becoming ready and its dispatch under a large set.
            polling.sort_by_key(|w| w.deadline());

            let mut still_pending = Vec::with_capacity(polling.len());
            for mut w in polling.drain(..) {
                match w.wait(self.q) {
                    Ok(true) => self.dispatch(w, None),
                    Ok(false) => still_pending.push(w),
                    Err(err) => self.dispatch(w, Some(err)),
                }
            }
            polling = still_pending;
        }
    }

    fn dispatch(&self, w: Box<dyn Waitable>, err: Option<Error>) {
        self.dispatcher
            .invoke(Box::new(move || w.dispatch(err)));
    }

    fn reject(&self, w: Box<dyn Waitable>, kind: ErrorKind) {
        self.dispatch(w, Some(Error::new(kind)));
    }
}
