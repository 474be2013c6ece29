//! Continuations that return another pending result.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use crate::error::{Error, ErrorKind};
use crate::executor::Executor;
use crate::promise::{pair, Pending, Promise};
use crate::timed::{TimedWait, TimedWaitable};

/// Adapter that moves an inner pending result's outcome into a sink.
///
/// Chaining hands one of these to the executor once the user continuation
/// has produced the inner result; the user-visible sink is fulfilled here,
/// not by the chaining adapter itself.
pub(crate) struct Forwarding<T> {
    inner: Pending<T>,
    sink: Promise<T>,
}

impl<T: Send + 'static> TimedWait for Forwarding<T> {
    fn timed_wait(&mut self, q: Duration) -> Result<bool, Error> {
        Ok(self.inner.timed_wait(q))
    }

    fn dispatch(self, err: Option<Error>) {
        if let Some(err) = err {
            self.sink.fail(err);
            return;
        }
        self.sink.settle(self.inner.take());
    }
}

/// Adapter for continuations whose output is itself a pending result.
///
/// Holds its executor weakly: the executor owns this adapter while it is
/// watched, and a strong handle back would keep both alive forever. A dead
/// handle at dispatch time fails the sink with
/// [`ErrorKind::ExecutorUnavailable`]; no attempt is made to resurrect.
pub(crate) struct Chaining<TIn, TOut, F> {
    executor: Weak<dyn Executor>,
    deadline: Instant,
    input: Pending<TIn>,
    sink: Promise<TOut>,
    cont: F,
}

impl<TIn, TOut, F> TimedWait for Chaining<TIn, TOut, F>
where
    TIn: Send + 'static,
    TOut: Send + 'static,
    F: FnOnce(Pending<TIn>) -> Result<Pending<TOut>, Error> + Send + 'static,
{
    fn timed_wait(&mut self, q: Duration) -> Result<bool, Error> {
        Ok(self.input.timed_wait(q))
    }

    fn dispatch(self, err: Option<Error>) {
        let Self {
            executor,
            deadline,
            input,
            sink,
            cont,
        } = self;

        if let Some(err) = err {
            sink.fail(err);
            return;
        }

        let Some(executor) = executor.upgrade() else {
            sink.fail(Error::new(ErrorKind::ExecutorUnavailable));
            return;
        };

        match catch_unwind(AssertUnwindSafe(move || cont(input))) {
            Ok(Ok(inner)) => {
                // The inner result inherits the remaining budget: same
                // absolute deadline, no arithmetic.
                executor.watch(
                    TimedWaitable::with_deadline(deadline, Forwarding { inner, sink }).boxed(),
                );
            }
            Ok(Err(err)) => sink.fail(err),
            Err(payload) => sink.fail(Error::panicked(payload)),
        }
    }
}

pub(crate) fn chain_impl<TIn, TOut, F>(
    executor: &Arc<dyn Executor>,
    wait_limit: Duration,
    input: Pending<TIn>,
    cont: F,
) -> Pending<TOut>
where
    TIn: Send + 'static,
    TOut: Send + 'static,
    F: FnOnce(Pending<TIn>) -> Result<Pending<TOut>, Error> + Send + 'static,
{
    let (sink, result) = pair();
    let deadline = Instant::now() + wait_limit;
    executor.watch(
        TimedWaitable::with_deadline(
            deadline,
            Chaining {
                executor: Arc::downgrade(executor),
                deadline,
                input,
                sink,
                cont,
            },
        )
        .boxed(),
    );
    result
}
