//! Pollex: non-blocking composition for single-shot pending results.
//!
//! # Overview
//!
//! Pollex extends a blocking single-shot result primitive (a handle that
//! eventually carries a value or an error and exposes a bounded timed-wait
//! probe) with non-blocking composition: continuations, chaining,
//! combining many results, side-effect observation, and deadlines. The
//! heart of the crate is the [`PollingExecutor`], which multiplexes any
//! number of outstanding results onto a bounded set of worker threads
//! using timed waits instead of blocking ones.
//!
//! # Core guarantees
//!
//! - **Exactly-once dispatch**: every waitable handed to `watch` is
//!   dispatched exactly once, by the poll/dispatch path or by stop-time
//!   rejection, including across executor destruction
//! - **No blocked threads**: waits are quantum-bounded; one poll closure
//!   per executor, one dedicated dispatch worker by default
//! - **No detached threads**: every spawned thread is joined
//! - **Typed failures**: timeout, executor-stop, and continuation panics
//!   are distinct, discriminable error kinds on the outgoing result
//!
//! # Module structure
//!
//! - [`promise`]: the single-shot `Promise`/`Pending` primitive
//! - [`waitable`]: the executor-level unit of work
//! - [`timed`]: absolute-deadline enforcement
//! - [`invoker`]: poll/dispatch thread-placement strategies
//! - [`executor`]: the polling executor
//! - [`combinator`]: `then`, `chain`, `all`, `all_range`, `all_tuple`,
//!   `observe`
//! - [`registry`]: scoped default executor
//! - [`util`]: ready-result constructors
//! - [`error`]: error types
//!
//! # Example
//!
//! ```
//! use pollex::{Executor, ExecutorExt, PollingExecutor};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let executor: Arc<dyn pollex::Executor> =
//!     Arc::new(PollingExecutor::new(Duration::from_millis(10)));
//!
//! let f = executor.then(pollex::from_value(1821), |x| Ok(x.take()?.to_string()));
//! assert_eq!(f.take().unwrap(), "1821");
//!
//! executor.stop();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod combinator;
pub mod error;
pub mod executor;
pub mod invoker;
pub mod promise;
pub mod registry;
pub mod timed;
pub mod util;
pub mod waitable;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-exports for convenient access to the composition surface.
pub use combinator::{
    all, all_range, all_range_within, all_tuple, all_tuple_within, all_within, chain,
    chain_within, observe, observe_with_policy, observe_within, then, then_within, ExecutorExt,
    FailurePolicy, PendingTuple, DEFAULT_WAIT_LIMIT,
};
pub use error::{Error, ErrorKind, Result, ResultExt};
pub use executor::{Executor, PollingExecutor};
pub use invoker::{
    InlineInvoker, Invoker, InvokerOptions, NewThreadInvoker, SingleThreadInvoker, Task,
};
pub use promise::{pair, Pending, Promise};
pub use registry::{current, set_default, try_current, DefaultGuard};
pub use timed::{TimedWait, TimedWaitable};
pub use util::{from_error, from_value};
pub use waitable::Waitable;
