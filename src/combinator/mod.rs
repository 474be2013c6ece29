//! Composition over pending results.
//!
//! Every composition family comes in four forms, two axes each:
//!
//! - **Explicit executor**: methods on `Arc<dyn Executor>` via
//!   [`ExecutorExt`], as in `executor.then(input, cont)` and
//!   `executor.then_within(limit, input, cont)`.
//! - **Default executor**: free functions of the same names that resolve
//!   the executor from the [scoped registry](crate::registry), as in
//!   `then(input, cont)` and `then_within(limit, input, cont)`. These
//!   panic if no default executor is installed; that is a documented
//!   programming error, not a recoverable condition.
//!
//! Forms without an explicit wait limit use [`DEFAULT_WAIT_LIMIT`] (one
//! hour). When the limit is exceeded before the input becomes ready, the
//! outgoing pending result fails with a distinct
//! [`ErrorKind::Timeout`](crate::ErrorKind::Timeout).
//!
//! Families:
//!
//! - `then`: run a continuation over the ready input; its return value
//!   settles the outgoing result.
//! - `chain`: like `then`, but the continuation returns another pending
//!   result whose outcome is forwarded.
//! - `all`: a container of pending results, ready when all elements are.
//! - `all_range`: a sub-range of a shared sequence of pending results.
//! - `all_tuple`: a heterogeneous tuple of pending results.
//! - `observe`: run a continuation for its side effect only; no outgoing
//!   result.

mod all;
mod chain;
mod observe;
mod then;
mod tuple;

pub use observe::FailurePolicy;
pub use tuple::PendingTuple;

use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

use crate::error::Error;
use crate::executor::Executor;
use crate::promise::Pending;
use crate::registry;

/// Wait limit applied by the forms that do not take one: one hour.
pub const DEFAULT_WAIT_LIMIT: Duration = Duration::from_secs(60 * 60);

/// Composition entry points on an executor handle.
///
/// All methods return immediately; the work happens on the executor's poll
/// and dispatch threads. Continuations run to completion on the dispatch
/// thread and must not block on results the same executor has yet to
/// dispatch.
pub trait ExecutorExt {
    /// Creates a pending result that carries `cont`'s return value once
    /// `input` is ready.
    ///
    /// The continuation receives the ready input and typically `take`s it;
    /// an `Err` return, a failure taken from the input and propagated with
    /// `?`, or a panic all fail the outgoing result instead.
    fn then<TIn, TOut, F>(&self, input: Pending<TIn>, cont: F) -> Pending<TOut>
    where
        TIn: Send + 'static,
        TOut: Send + 'static,
        F: FnOnce(Pending<TIn>) -> Result<TOut, Error> + Send + 'static;

    /// [`then`](ExecutorExt::then) with an explicit wait limit for the
    /// input to become ready.
    fn then_within<TIn, TOut, F>(
        &self,
        wait_limit: Duration,
        input: Pending<TIn>,
        cont: F,
    ) -> Pending<TOut>
    where
        TIn: Send + 'static,
        TOut: Send + 'static,
        F: FnOnce(Pending<TIn>) -> Result<TOut, Error> + Send + 'static;

    /// Creates a pending result that forwards the outcome of the pending
    /// result returned by `cont`.
    ///
    /// The wait limit spans the whole chain: input readiness, the
    /// continuation, and the inner result share one absolute deadline.
    fn chain<TIn, TOut, F>(&self, input: Pending<TIn>, cont: F) -> Pending<TOut>
    where
        TIn: Send + 'static,
        TOut: Send + 'static,
        F: FnOnce(Pending<TIn>) -> Result<Pending<TOut>, Error> + Send + 'static;

    /// [`chain`](ExecutorExt::chain) with an explicit wait limit.
    fn chain_within<TIn, TOut, F>(
        &self,
        wait_limit: Duration,
        input: Pending<TIn>,
        cont: F,
    ) -> Pending<TOut>
    where
        TIn: Send + 'static,
        TOut: Send + 'static,
        F: FnOnce(Pending<TIn>) -> Result<Pending<TOut>, Error> + Send + 'static;

    /// Creates a pending result that delivers the whole container back once
    /// every element is ready.
    ///
    /// An empty container is ready immediately.
    fn all<C, T>(&self, futures: C) -> Pending<C>
    where
        C: Send + 'static,
        T: Send + 'static,
        for<'a> &'a C: IntoIterator<Item = &'a Pending<T>>;

    /// [`all`](ExecutorExt::all) with an explicit wait limit.
    fn all_within<C, T>(&self, wait_limit: Duration, futures: C) -> Pending<C>
    where
        C: Send + 'static,
        T: Send + 'static,
        for<'a> &'a C: IntoIterator<Item = &'a Pending<T>>;

    /// Creates a pending result that delivers the shared sequence and range
    /// back once every element inside the range is ready.
    ///
    /// An empty range is ready immediately. Panics if `range` does not lie
    /// within `futures`.
    fn all_range<T>(
        &self,
        futures: Arc<[Pending<T>]>,
        range: Range<usize>,
    ) -> Pending<(Arc<[Pending<T>]>, Range<usize>)>
    where
        T: Send + 'static;

    /// [`all_range`](ExecutorExt::all_range) with an explicit wait limit.
    fn all_range_within<T>(
        &self,
        wait_limit: Duration,
        futures: Arc<[Pending<T>]>,
        range: Range<usize>,
    ) -> Pending<(Arc<[Pending<T>]>, Range<usize>)>
    where
        T: Send + 'static;

    /// Creates a pending result that delivers the tuple back once every
    /// element is ready. Element types may differ.
    fn all_tuple<Tup: PendingTuple>(&self, futures: Tup) -> Pending<Tup>;

    /// [`all_tuple`](ExecutorExt::all_tuple) with an explicit wait limit.
    fn all_tuple_within<Tup: PendingTuple>(
        &self,
        wait_limit: Duration,
        futures: Tup,
    ) -> Pending<Tup>;

    /// Watches `input` and runs `cont` on it for its side effect once it is
    /// ready.
    ///
    /// There is no outgoing result: a wait failure (timeout, executor
    /// stop) is handled per [`FailurePolicy::Propagate`], and a panic from
    /// the continuation escapes on the dispatch thread.
    fn observe<TIn, F>(&self, input: Pending<TIn>, cont: F)
    where
        TIn: Send + 'static,
        F: FnOnce(Pending<TIn>) + Send + 'static;

    /// [`observe`](ExecutorExt::observe) with an explicit wait limit.
    fn observe_within<TIn, F>(&self, wait_limit: Duration, input: Pending<TIn>, cont: F)
    where
        TIn: Send + 'static,
        F: FnOnce(Pending<TIn>) + Send + 'static;

    /// [`observe`](ExecutorExt::observe) with an explicit wait limit and
    /// wait-failure policy.
    fn observe_with_policy<TIn, F>(
        &self,
        wait_limit: Duration,
        input: Pending<TIn>,
        cont: F,
        policy: FailurePolicy,
    ) where
        TIn: Send + 'static,
        F: FnOnce(Pending<TIn>) + Send + 'static;
}

impl ExecutorExt for Arc<dyn Executor> {
    fn then<TIn, TOut, F>(&self, input: Pending<TIn>, cont: F) -> Pending<TOut>
    where
        TIn: Send + 'static,
        TOut: Send + 'static,
        F: FnOnce(Pending<TIn>) -> Result<TOut, Error> + Send + 'static,
    {
        then::then_impl(self, DEFAULT_WAIT_LIMIT, input, cont)
    }

    fn then_within<TIn, TOut, F>(
        &self,
        wait_limit: Duration,
        input: Pending<TIn>,
        cont: F,
    ) -> Pending<TOut>
    where
        TIn: Send + 'static,
        TOut: Send + 'static,
        F: FnOnce(Pending<TIn>) -> Result<TOut, Error> + Send + 'static,
    {
        then::then_impl(self, wait_limit, input, cont)
    }

    fn chain<TIn, TOut, F>(&self, input: Pending<TIn>, cont: F) -> Pending<TOut>
    where
        TIn: Send + 'static,
        TOut: Send + 'static,
        F: FnOnce(Pending<TIn>) -> Result<Pending<TOut>, Error> + Send + 'static,
    {
        chain::chain_impl(self, DEFAULT_WAIT_LIMIT, input, cont)
    }

    fn chain_within<TIn, TOut, F>(
        &self,
        wait_limit: Duration,
        input: Pending<TIn>,
        cont: F,
    ) -> Pending<TOut>
    where
        TIn: Send + 'static,
        TOut: Send + 'static,
        F: FnOnce(Pending<TIn>) -> Result<Pending<TOut>, Error> + Send + 'static,
    {
        chain::chain_impl(self, wait_limit, input, cont)
    }

    fn all<C, T>(&self, futures: C) -> Pending<C>
    where
        C: Send + 'static,
        T: Send + 'static,
        for<'a> &'a C: IntoIterator<Item = &'a Pending<T>>,
    {
        all::all_impl(self, DEFAULT_WAIT_LIMIT, futures)
    }

    fn all_within<C, T>(&self, wait_limit: Duration, futures: C) -> Pending<C>
    where
        C: Send + 'static,
        T: Send + 'static,
        for<'a> &'a C: IntoIterator<Item = &'a Pending<T>>,
    {
        all::all_impl(self, wait_limit, futures)
    }

    fn all_range<T>(
        &self,
        futures: Arc<[Pending<T>]>,
        range: Range<usize>,
    ) -> Pending<(Arc<[Pending<T>]>, Range<usize>)>
    where
        T: Send + 'static,
    {
        all::all_range_impl(self, DEFAULT_WAIT_LIMIT, futures, range)
    }

    fn all_range_within<T>(
        &self,
        wait_limit: Duration,
        futures: Arc<[Pending<T>]>,
        range: Range<usize>,
    ) -> Pending<(Arc<[Pending<T>]>, Range<usize>)>
    where
        T: Send + 'static,
    {
        all::all_range_impl(self, wait_limit, futures, range)
    }

    fn all_tuple<Tup: PendingTuple>(&self, futures: Tup) -> Pending<Tup> {
        tuple::all_tuple_impl(self, DEFAULT_WAIT_LIMIT, futures)
    }

    fn all_tuple_within<Tup: PendingTuple>(
        &self,
        wait_limit: Duration,
        futures: Tup,
    ) -> Pending<Tup> {
        tuple::all_tuple_impl(self, wait_limit, futures)
    }

    fn observe<TIn, F>(&self, input: Pending<TIn>, cont: F)
    where
        TIn: Send + 'static,
        F: FnOnce(Pending<TIn>) + Send + 'static,
    {
        observe::observe_impl(
            self,
            DEFAULT_WAIT_LIMIT,
            input,
            cont,
            FailurePolicy::Propagate,
        );
    }

    fn observe_within<TIn, F>(&self, wait_limit: Duration, input: Pending<TIn>, cont: F)
    where
        TIn: Send + 'static,
        F: FnOnce(Pending<TIn>) + Send + 'static,
    {
        observe::observe_impl(self, wait_limit, input, cont, FailurePolicy::Propagate);
    }

    fn observe_with_policy<TIn, F>(
        &self,
        wait_limit: Duration,
        input: Pending<TIn>,
        cont: F,
        policy: FailurePolicy,
    ) where
        TIn: Send + 'static,
        F: FnOnce(Pending<TIn>) + Send + 'static,
    {
        observe::observe_impl(self, wait_limit, input, cont, policy);
    }
}

/// [`ExecutorExt::then`] on the default executor.
///
/// # Panics
///
/// Panics if no default executor is installed.
pub fn then<TIn, TOut, F>(input: Pending<TIn>, cont: F) -> Pending<TOut>
where
    TIn: Send + 'static,
    TOut: Send + 'static,
    F: FnOnce(Pending<TIn>) -> Result<TOut, Error> + Send + 'static,
{
    registry::current().then(input, cont)
}

/// [`ExecutorExt::then_within`] on the default executor.
///
/// # Panics
///
/// Panics if no default executor is installed.
pub fn then_within<TIn, TOut, F>(
    wait_limit: Duration,
    input: Pending<TIn>,
    cont: F,
) -> Pending<TOut>
where
    TIn: Send + 'static,
    TOut: Send + 'static,
    F: FnOnce(Pending<TIn>) -> Result<TOut, Error> + Send + 'static,
{
    registry::current().then_within(wait_limit, input, cont)
}

/// [`ExecutorExt::chain`] on the default executor.
///
/// # Panics
///
/// Panics if no default executor is installed.
pub fn chain<TIn, TOut, F>(input: Pending<TIn>, cont: F) -> Pending<TOut>
where
    TIn: Send + 'static,
    TOut: Send + 'static,
    F: FnOnce(Pending<TIn>) -> Result<Pending<TOut>, Error> + Send + 'static,
{
    registry::current().chain(input, cont)
}

/// [`ExecutorExt::chain_within`] on the default executor.
///
/// # Panics
///
/// Panics if no default executor is installed.
pub fn chain_within<TIn, TOut, F>(
    wait_limit: Duration,
    input: Pending<TIn>,
    cont: F,
) -> Pending<TOut>
where
    TIn: Send + 'static,
    TOut: Send + 'static,
    F: FnOnce(Pending<TIn>) -> Result<Pending<TOut>, Error> + Send + 'static,
{
    registry::current().chain_within(wait_limit, input, cont)
}

/// [`ExecutorExt::all`] on the default executor.
///
/// # Panics
///
/// Panics if no default executor is installed.
pub fn all<C, T>(futures: C) -> Pending<C>
where
    C: Send + 'static,
    T: Send + 'static,
    for<'a> &'a C: IntoIterator<Item = &'a Pending<T>>,
{
    registry::current().all(futures)
}

/// [`ExecutorExt::all_within`] on the default executor.
///
/// # Panics
///
/// Panics if no default executor is installed.
pub fn all_within<C, T>(wait_limit: Duration, futures: C) -> Pending<C>
where
    C: Send + 'static,
    T: Send + 'static,
    for<'a> &'a C: IntoIterator<Item = &'a Pending<T>>,
{
    registry::current().all_within(wait_limit, futures)
}

/// [`ExecutorExt::all_range`] on the default executor.
///
/// # Panics
///
/// Panics if no default executor is installed, or if `range` does not lie
/// within `futures`.
pub fn all_range<T>(
    futures: Arc<[Pending<T>]>,
    range: Range<usize>,
) -> Pending<(Arc<[Pending<T>]>, Range<usize>)>
where
    T: Send + 'static,
{
    registry::current().all_range(futures, range)
}

/// [`ExecutorExt::all_range_within`] on the default executor.
///
/// # Panics
///
/// Panics if no default executor is installed, or if `range` does not lie
/// within `futures`.
pub fn all_range_within<T>(
    wait_limit: Duration,
    futures: Arc<[Pending<T>]>,
    range: Range<usize>,
) -> Pending<(Arc<[Pending<T>]>, Range<usize>)>
where
    T: Send + 'static,
{
    registry::current().all_range_within(wait_limit, futures, range)
}

/// [`ExecutorExt::all_tuple`] on the default executor.
///
/// # Panics
///
/// Panics if no default executor is installed.
pub fn all_tuple<Tup: PendingTuple>(futures: Tup) -> Pending<Tup> {
    registry::current().all_tuple(futures)
}

/// [`ExecutorExt::all_tuple_within`] on the default executor.
///
/// # Panics
///
/// Panics if no default executor is installed.
pub fn all_tuple_within<Tup: PendingTuple>(wait_limit: Duration, futures: Tup) -> Pending<Tup> {
    registry::current().all_tuple_within(wait_limit, futures)
}

/// [`ExecutorExt::observe`] on the default executor.
///
/// # Panics
///
/// Panics if no default executor is installed.
pub fn observe<TIn, F>(input: Pending<TIn>, cont: F)
where
    TIn: Send + 'static,
    F: FnOnce(Pending<TIn>) + Send + 'static,
{
    registry::current().observe(input, cont);
}

/// [`ExecutorExt::observe_within`] on the default executor.
///
/// # Panics
///
/// Panics if no default executor is installed.
pub fn observe_within<TIn, F>(wait_limit: Duration, input: Pending<TIn>, cont: F)
where
    TIn: Send + 'static,
    F: FnOnce(Pending<TIn>) + Send + 'static,
{
    registry::current().observe_within(wait_limit, input, cont);
}

/// [`ExecutorExt::observe_with_policy`] on the default executor.
///
/// # Panics
///
/// Panics if no default executor is installed.
pub fn observe_with_policy<TIn, F>(
    wait_limit: Duration,
    input: Pending<TIn>,
    cont: F,
    policy: FailurePolicy,
) where
    TIn: Send + 'static,
    F: FnOnce(Pending<TIn>) + Send + 'static,
{
    registry::current().observe_with_policy(wait_limit, input, cont, policy);
}
