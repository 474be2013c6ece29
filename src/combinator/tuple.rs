//! Waiting on every element of a heterogeneous tuple.

use std::sync::Arc;
use std::time::Duration;

use crate::error::Error;
use crate::executor::Executor;
use crate::promise::{pair, Pending, Promise};
use crate::timed::{TimedWait, TimedWaitable};

/// A tuple whose elements are all pending results.
///
/// Implemented for tuples of [`Pending`] values up to arity eight. The
/// sink of an [`all_tuple`](crate::ExecutorExt::all_tuple) mirrors the
/// tuple type, so each element keeps its own value type end to end.
pub trait PendingTuple: Send + 'static {
    /// Probes every element in order, giving each at most `q`, and
    /// short-circuits on the first that is not ready.
    fn timed_wait_all(&self, q: Duration) -> bool;
}

macro_rules! impl_pending_tuple {
    ($($t:ident),+) => {
        #[allow(non_snake_case)]
        impl<$($t: Send + 'static),+> PendingTuple for ($(Pending<$t>,)+) {
            fn timed_wait_all(&self, q: Duration) -> bool {
                let ($($t,)+) = self;
                $(
                    if !$t.timed_wait(q) {
                        return false;
                    }
                )+
                true
            }
        }
    };
}

impl_pending_tuple!(A);
impl_pending_tuple!(A, B);
impl_pending_tuple!(A, B, C);
impl_pending_tuple!(A, B, C, D);
impl_pending_tuple!(A, B, C, D, E);
impl_pending_tuple!(A, B, C, D, E, F);
impl_pending_tuple!(A, B, C, D, E, F, G);
impl_pending_tuple!(A, B, C, D, E, F, G, H);

/// Adapter that is ready when every element of a tuple of pending results
/// is; the whole tuple moves into the sink on dispatch.
pub(crate) struct AllTuple<Tup> {
    futures: Tup,
    sink: Promise<Tup>,
}

impl<Tup: PendingTuple> TimedWait for AllTuple<Tup> {
    fn timed_wait(&mut self, q: Duration) -> Result<bool, Error> {
        Ok(self.futures.timed_wait_all(q))
    }

    fn dispatch(self, err: Option<Error>) {
        match err {
            Some(err) => self.sink.fail(err),
            None => self.sink.fulfill(self.futures),
        }
    }
}

pub(crate) fn all_tuple_impl<Tup: PendingTuple>(
    executor: &Arc<dyn Executor>,
    wait_limit: Duration,
    futures: Tup,
) -> Pending<Tup> {
    let (sink, result) = pair();
    executor.watch(TimedWaitable::new(wait_limit, AllTuple { futures, sink }).boxed());
    result
}
