//! Single-shot pending results.
//!
//! A [`pair`] produces the two halves of a one-time result slot: the
//! [`Promise`] that fulfills it and the [`Pending`] handle that consumes it.
//! `Pending` is the unit the rest of the crate composes over: it exposes a
//! bounded [`timed_wait`](Pending::timed_wait) probe for the polling executor
//! and a blocking [`take`](Pending::take) getter for user code.
//!
//! The slot transitions `Empty -> {Value | Failed} -> Taken` exactly once.
//! Dropping a `Promise` without fulfilling it fails the slot with
//! [`ErrorKind::Abandoned`], so a consumer can never block forever on a
//! producer that went away.
//!
//! `take` works through a shared reference and invalidates the slot, the way
//! a one-time getter behaves in most runtimes; a second `take` reports
//! [`ErrorKind::ValueTaken`]. This is what lets a delivered container of
//! pending results be consumed element by element without moving them out.

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::error::{Error, ErrorKind};

/// Creates a new single-shot result slot, returning its producer and
/// consumer halves.
#[must_use]
pub fn pair<T>() -> (Promise<T>, Pending<T>) {
    let shared = Arc::new(Shared {
        slot: Mutex::new(Slot::Empty),
        ready: Condvar::new(),
    });
    (
        Promise {
            shared: Arc::clone(&shared),
            done: false,
        },
        Pending { shared },
    )
}

enum Slot<T> {
    Empty,
    Value(T),
    Failed(Error),
    Taken,
}

impl<T> Slot<T> {
    fn is_settled(&self) -> bool {
        !matches!(self, Self::Empty)
    }
}

struct Shared<T> {
    slot: Mutex<Slot<T>>,
    ready: Condvar,
}

impl<T> Shared<T> {
    fn settle(&self, settled: Slot<T>) {
        let mut slot = self.slot.lock().expect("pending slot poisoned");
        debug_assert!(!slot.is_settled(), "single-shot slot settled twice");
        *slot = settled;
        drop(slot);
        self.ready.notify_all();
    }
}

/// The producing half of a single-shot result slot.
///
/// Consumed by [`fulfill`](Promise::fulfill) or [`fail`](Promise::fail);
/// dropping it unconsumed fails the slot with [`ErrorKind::Abandoned`].
pub struct Promise<T> {
    shared: Arc<Shared<T>>,
    done: bool,
}

impl<T> Promise<T> {
    /// Fulfills the slot with a value, waking any blocked consumer.
    pub fn fulfill(mut self, value: T) {
        self.done = true;
        self.shared.settle(Slot::Value(value));
    }

    /// Fails the slot with an error, waking any blocked consumer.
    pub fn fail(mut self, error: Error) {
        self.done = true;
        self.shared.settle(Slot::Failed(error));
    }

    /// Fulfills with `Ok` or fails with `Err`.
    pub fn settle(self, result: Result<T, Error>) {
        match result {
            Ok(value) => self.fulfill(value),
            Err(error) => self.fail(error),
        }
    }

    /// Returns true if the consumer half has been dropped.
    #[must_use]
    pub fn is_disconnected(&self) -> bool {
        Arc::strong_count(&self.shared) == 1
    }
}

impl<T> Drop for Promise<T> {
    fn drop(&mut self) {
        if !self.done {
            self.shared.settle(Slot::Failed(Error::new(ErrorKind::Abandoned)));
        }
    }
}

impl<T> std::fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Promise").field("done", &self.done).finish()
    }
}

/// The consuming half of a single-shot result slot.
pub struct Pending<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Pending<T> {
    /// Waits at most `q` for the slot to settle.
    ///
    /// Returns true if the result is observable without further waiting.
    /// Once this returns true it keeps returning true; a taken slot still
    /// counts as ready.
    #[must_use]
    pub fn timed_wait(&self, q: Duration) -> bool {
        let mut slot = self.shared.slot.lock().expect("pending slot poisoned");
        if slot.is_settled() {
            return true;
        }
        if q.is_zero() {
            return false;
        }

        let deadline = Instant::now() + q;
        while !slot.is_settled() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            let (guard, _timeout) = self
                .shared
                .ready
                .wait_timeout(slot, remaining)
                .expect("pending slot poisoned");
            slot = guard;
        }
        true
    }

    /// Returns true if the result is observable without waiting.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.shared
            .slot
            .lock()
            .expect("pending slot poisoned")
            .is_settled()
    }

    /// Blocks until the slot settles and moves its value out.
    ///
    /// # Errors
    ///
    /// Returns the failure the producer stored, [`ErrorKind::Abandoned`] if
    /// the producer was dropped unfulfilled, or [`ErrorKind::ValueTaken`]
    /// if the value was already taken through this handle.
    pub fn take(&self) -> Result<T, Error> {
        let mut slot = self.shared.slot.lock().expect("pending slot poisoned");
        while !slot.is_settled() {
            slot = self
                .shared
                .ready
                .wait(slot)
                .expect("pending slot poisoned");
        }

        match std::mem::replace(&mut *slot, Slot::Taken) {
            Slot::Value(value) => Ok(value),
            Slot::Failed(error) => Err(error),
            Slot::Taken => Err(Error::new(ErrorKind::ValueTaken)),
            Slot::Empty => unreachable!("slot settled above"),
        }
    }
}

impl<T> std::fmt::Debug for Pending<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pending")
            .field("ready", &self.is_ready())
            .finish()
    }
}
