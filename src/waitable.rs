//! The executor-level unit of work.
//!
//! A [`Waitable`] is something the polling executor can probe with a bounded
//! wait and, once ready (or failed), hand to the dispatch invoker for its
//! terminal [`dispatch`](Waitable::dispatch) step. Waitables are ordered by
//! an absolute deadline so the poll loop can scan near-deadline items first.

use std::cmp::Ordering;
use std::time::{Duration, Instant};

use crate::error::Error;

/// An object that can be waited on and then dispatched exactly once.
///
/// # Contract
///
/// - `wait(q)` must not block beyond `q` unless the object is already ready.
///   It may return earlier. Returning `Err` signals an unrecoverable wait
///   failure and is treated as "ready with that error".
/// - Once `wait` reports ready, subsequent calls must report ready promptly.
/// - `dispatch` is terminal; the executor consumes the box, so no call can
///   follow it. The executor also guarantees `wait` is never invoked from
///   more than one thread at a time.
pub trait Waitable: Send {
    /// Waits at most `q` to determine whether the object is ready.
    fn wait(&mut self, q: Duration) -> Result<bool, Error>;

    /// Dispatches the object, fulfilling any downstream sink.
    ///
    /// `err` carries the wait failure when the executor observed one; the
    /// implementation forwards it instead of running its continuation.
    fn dispatch(self: Box<Self>, err: Option<Error>);

    /// The absolute deadline after which waiting turns into a timeout.
    fn deadline(&self) -> Instant;

    /// Orders two waitables by deadline.
    fn compare(&self, other: &dyn Waitable) -> Ordering {
        self.deadline().cmp(&other.deadline())
    }

    /// Time left until the deadline, saturating at zero.
    fn time_left(&self, now: Instant) -> Duration {
        self.deadline().saturating_duration_since(now)
    }

    /// Whether the deadline has passed.
    fn expired(&self, now: Instant) -> bool {
        self.deadline() <= now
    }
}
