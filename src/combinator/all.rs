//! Waiting on every element of a homogeneous collection.

use std::marker::PhantomData;
use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

use crate::error::Error;
use crate::executor::Executor;
use crate::promise::{pair, Pending, Promise};
use crate::timed::{TimedWait, TimedWaitable};

/// Adapter that is ready when every pending result in a container is.
///
/// Elements are scanned in order each poll, short-circuiting on the first
/// one that is not ready. An empty container is vacuously ready on the
/// first probe. The container itself (not references into it) moves into
/// the sink on dispatch.
pub(crate) struct AllContainer<C, T> {
    futures: C,
    sink: Promise<C>,
    _item: PhantomData<fn() -> T>,
}

impl<C, T> TimedWait for AllContainer<C, T>
where
    C: Send + 'static,
    T: Send + 'static,
    for<'a> &'a C: IntoIterator<Item = &'a Pending<T>>,
{
    fn timed_wait(&mut self, q: Duration) -> Result<bool, Error> {
        for f in &self.futures {
            if !f.timed_wait(q) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn dispatch(self, err: Option<Error>) {
        match err {
            Some(err) => self.sink.fail(err),
            None => self.sink.fulfill(self.futures),
        }
    }
}

pub(crate) fn all_impl<C, T>(
    executor: &Arc<dyn Executor>,
    wait_limit: Duration,
    futures: C,
) -> Pending<C>
where
    C: Send + 'static,
    T: Send + 'static,
    for<'a> &'a C: IntoIterator<Item = &'a Pending<T>>,
{
    let (sink, result) = pair();
    executor.watch(
        TimedWaitable::new(
            wait_limit,
            AllContainer {
                futures,
                sink,
                _item: PhantomData,
            },
        )
        .boxed(),
    );
    result
}

/// Adapter over a sub-range of a shared, externally-owned sequence.
///
/// The sequence is held by `Arc`, so it necessarily outlives consumption of
/// the sink; the sink yields the sequence and range back once every element
/// in the range is ready. Elements outside the range are ignored.
pub(crate) struct AllRange<T> {
    futures: Arc<[Pending<T>]>,
    range: Range<usize>,
    sink: Promise<(Arc<[Pending<T>]>, Range<usize>)>,
}

impl<T: Send + 'static> TimedWait for AllRange<T> {
    fn timed_wait(&mut self, q: Duration) -> Result<bool, Error> {
        for f in &self.futures[self.range.clone()] {
            if !f.timed_wait(q) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn dispatch(self, err: Option<Error>) {
        match err {
            Some(err) => self.sink.fail(err),
            None => self.sink.fulfill((self.futures, self.range)),
        }
    }
}

/// # Panics
///
/// Panics if `range` does not lie within `futures`.
pub(crate) fn all_range_impl<T>(
    executor: &Arc<dyn Executor>,
    wait_limit: Duration,
    futures: Arc<[Pending<T>]>,
    range: Range<usize>,
) -> Pending<(Arc<[Pending<T>]>, Range<usize>)>
where
    T: Send + 'static,
{
    assert!(
        range.start <= range.end && range.end <= futures.len(),
        "range {range:?} out of bounds for {} pending results",
        futures.len()
    );

    let (sink, result) = pair();
    executor.watch(
        TimedWaitable::new(
            wait_limit,
            AllRange {
                futures,
                range,
                sink,
            },
        )
        .boxed(),
    );
    result
}
