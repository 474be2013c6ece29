//! Value-returning continuations.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use crate::error::Error;
use crate::executor::Executor;
use crate::promise::{pair, Pending, Promise};
use crate::timed::{TimedWait, TimedWaitable};

/// Adapter that waits for its input and runs a continuation over it.
///
/// On dispatch with a wait failure, the failure is forwarded to the sink and
/// the continuation never runs. Otherwise the continuation receives the
/// ready input; its `Ok`/`Err` settles the sink, and a panic is captured
/// into the sink as [`ErrorKind::Panicked`](crate::ErrorKind::Panicked).
pub(crate) struct Continuation<TIn, TOut, F> {
    input: Pending<TIn>,
    sink: Promise<TOut>,
    cont: F,
}

impl<TIn, TOut, F> TimedWait for Continuation<TIn, TOut, F>
where
    TIn: Send + 'static,
    TOut: Send + 'static,
    F: FnOnce(Pending<TIn>) -> Result<TOut, Error> + Send + 'static,
{
    fn timed_wait(&mut self, q: Duration) -> Result<bool, Error> {
        Ok(self.input.timed_wait(q))
    }

    fn dispatch(self, err: Option<Error>) {
        let Self { input, sink, cont } = self;

        if let Some(err) = err {
            sink.fail(err);
            return;
        }

        match catch_unwind(AssertUnwindSafe(move || cont(input))) {
            Ok(result) => sink.settle(result),
            Err(payload) => sink.fail(Error::panicked(payload)),
        }
    }
}

pub(crate) fn then_impl<TIn, TOut, F>(
    executor: &Arc<dyn Executor>,
    wait_limit: Duration,
    input: Pending<TIn>,
    cont: F,
) -> Pending<TOut>
where
    TIn: Send + 'static,
    TOut: Send + 'static,
    F: FnOnce(Pending<TIn>) -> Result<TOut, Error> + Send + 'static,
{
    let (sink, result) = pair();
    executor.watch(TimedWaitable::new(wait_limit, Continuation { input, sink, cont }).boxed());
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::executor::PollingExecutor;
    use crate::util::{from_error, from_value};

    fn test_executor() -> Arc<dyn Executor> {
        Arc::new(PollingExecutor::new(Duration::from_millis(1)))
    }

    #[test]
    fn continuation_maps_the_ready_value() {
        let executor = test_executor();
        let result = then_impl(&executor, Duration::from_secs(5), from_value(1821), |x| {
            Ok(x.take()?.to_string())
        });

        assert_eq!(result.take().expect("value"), "1821");
    }

    #[test]
    fn input_failure_surfaces_through_the_continuation() {
        let executor = test_executor();
        let input: Pending<i32> = from_error(Error::new(ErrorKind::User));
        let result = then_impl(&executor, Duration::from_secs(5), input, |x| {
            Ok(x.take()? + 1)
        });

        let err = result.take().expect_err("propagated");
        assert_eq!(err.kind(), ErrorKind::User);
    }

    #[test]
    fn continuation_error_fails_the_sink() {
        let executor = test_executor();
        let result: Pending<i32> =
            then_impl(&executor, Duration::from_secs(5), from_value(1), |_x| {
                Err(Error::new(ErrorKind::User).with_context("rejected"))
            });

        let err = result.take().expect_err("failed");
        assert_eq!(err.to_string(), "user error: rejected");
    }

    #[test]
    fn continuation_panic_is_captured() {
        let executor = test_executor();
        let result: Pending<i32> =
            then_impl(&executor, Duration::from_secs(5), from_value(1), |_x| {
                panic!("continuation blew up")
            });

        let err = result.take().expect_err("captured");
        assert_eq!(err.kind(), ErrorKind::Panicked);
        assert!(err.to_string().contains("continuation blew up"));
    }

    #[test]
    fn unit_output_needs_no_special_case() {
        let executor = test_executor();
        let result: Pending<()> =
            then_impl(&executor, Duration::from_secs(5), from_value(9), |x| {
                x.take().map(|_| ())
            });

        result.take().expect("unit value");
    }

    #[test]
    fn wait_failure_skips_the_continuation() {
        let ran = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let (sink, result) = pair::<i32>();
        let (_producer, input) = pair::<i32>();

        let ran_inner = Arc::clone(&ran);
        let adapter = Continuation {
            input,
            sink,
            cont: move |_x: Pending<i32>| {
                ran_inner.store(true, std::sync::atomic::Ordering::Relaxed);
                Ok(0)
            },
        };
        adapter.dispatch(Some(Error::new(ErrorKind::Timeout)));

        assert!(result.take().expect_err("forwarded").is_timeout());
        assert!(!ran.load(std::sync::atomic::Ordering::Relaxed));
    }
}
