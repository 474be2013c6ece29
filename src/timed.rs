//! Deadline enforcement for waitables.
//!
//! [`TimedWaitable`] wraps a [`TimedWait`] implementation with an absolute
//! deadline computed at construction. While the deadline has not passed,
//! waits delegate to the inner probe; once it has, one last zero-length probe
//! runs and, if the object is still not ready, the wait fails with
//! [`ErrorKind::Timeout`]. An absolute deadline keeps behavior stable under a
//! variable polling quantum and makes comparison between waitables constant
//! time, unlike a cumulative budget that is decremented per call.

use std::time::{Duration, Instant};

use crate::error::{Error, ErrorKind};
use crate::waitable::Waitable;

/// The waiting-and-completion half of a deadline-bounded waitable.
///
/// Implementations supply the probe and the terminal completion step;
/// [`TimedWaitable`] supplies the timeout policy. If `timed_wait` reports
/// ready, later probes must report ready promptly.
pub trait TimedWait: Send {
    /// Waits at most `q` to determine whether the object is fulfilled.
    fn timed_wait(&mut self, q: Duration) -> Result<bool, Error>;

    /// Completes the object, fulfilling any downstream sink.
    fn dispatch(self, err: Option<Error>);
}

/// A [`Waitable`] that bounds the total wait with an absolute deadline.
#[derive(Debug)]
pub struct TimedWaitable<W> {
    deadline: Instant,
    inner: W,
}

impl<W: TimedWait> TimedWaitable<W> {
    /// Wraps `inner` with a deadline of now plus `wait_limit`.
    #[must_use]
    pub fn new(wait_limit: Duration, inner: W) -> Self {
        Self::with_deadline(Instant::now() + wait_limit, inner)
    }

    /// Wraps `inner` with an explicit absolute deadline.
    ///
    /// Used when a remaining budget carries over from an earlier waitable,
    /// as in chained continuations.
    #[must_use]
    pub fn with_deadline(deadline: Instant, inner: W) -> Self {
        Self { deadline, inner }
    }

    /// Boxes the wrapper for handing to an executor.
    #[must_use]
    pub fn boxed(self) -> Box<dyn Waitable>
    where
        W: 'static,
    {
        Box::new(self)
    }
}

impl<W: TimedWait> Waitable for TimedWaitable<W> {
    fn wait(&mut self, q: Duration) -> Result<bool, Error> {
        if Instant::now() < self.deadline {
            return self.inner.timed_wait(q);
        }

        // Expired: give the inner probe one last zero-length chance so a
        // result that became ready exactly at the deadline still dispatches
        // cleanly.
        if self.inner.timed_wait(Duration::ZERO)? {
            return Ok(true);
        }
        Err(Error::new(ErrorKind::Timeout))
    }

    fn dispatch(self: Box<Self>, err: Option<Error>) {
        self.inner.dispatch(err);
    }

    fn deadline(&self) -> Instant {
        self.deadline
    }
}
