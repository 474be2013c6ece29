//! Side-effect observation of a pending result.

use std::sync::Arc;
use std::time::Duration;

use tracing::error;

use crate::error::Error;
use crate::executor::Executor;
use crate::promise::Pending;
use crate::timed::{TimedWait, TimedWaitable};

/// What an observation does with a wait failure.
///
/// An observed result has no outgoing sink to absorb a timeout or an
/// executor-stop failure, so the adapter must act on it directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Panic on the dispatch thread. Fail-fast: with the default
    /// single-thread dispatch invoker this tears down the dispatch worker,
    /// and every dispatch queued behind it is lost.
    #[default]
    Propagate,
    /// Emit a `tracing` error event and drop the failure.
    Log,
}

/// Adapter that runs a continuation for its side effect only.
///
/// Panics from the continuation itself are not caught; they escape on the
/// dispatch thread, exactly like [`FailurePolicy::Propagate`].
pub(crate) struct Observed<TIn, F> {
    input: Pending<TIn>,
    cont: F,
    policy: FailurePolicy,
}

impl<TIn, F> TimedWait for Observed<TIn, F>
where
    TIn: Send + 'static,
    F: FnOnce(Pending<TIn>) + Send + 'static,
{
    fn timed_wait(&mut self, q: Duration) -> Result<bool, Error> {
        Ok(self.input.timed_wait(q))
    }

    fn dispatch(self, err: Option<Error>) {
        if let Some(err) = err {
            match self.policy {
                FailurePolicy::Propagate => {
                    panic!("observed pending result failed: {err}")
                }
                FailurePolicy::Log => {
                    error!(%err, "observed pending result failed");
                }
            }
            return;
        }

        (self.cont)(self.input);
    }
}

pub(crate) fn observe_impl<TIn, F>(
    executor: &Arc<dyn Executor>,
    wait_limit: Duration,
    input: Pending<TIn>,
    cont: F,
    policy: FailurePolicy,
) where
    TIn: Send + 'static,
    F: FnOnce(Pending<TIn>) + Send + 'static,
{
    executor.watch(
        TimedWaitable::new(
            wait_limit,
            Observed {
                input,
                cont,
                policy,
            },
        )
        .boxed(),
    );
}
