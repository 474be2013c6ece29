#![allow(dead_code)]
//! Shared integration test utilities.
//!
//! Import with:
//! ```ignore
//! mod common;
//! use common::*;
//! ```

use std::sync::{Arc, Mutex, Once};
use std::thread;
use std::time::Duration;

use pollex::{pair, Executor, Pending, PollingExecutor};

static INIT_LOGGING: Once = Once::new();

/// Serializes tests that install a process-wide default executor.
pub static REGISTRY_SCOPE: Mutex<()> = Mutex::new(());

/// Initialize test logging with trace-level output.
///
/// Safe to call multiple times; only initializes once.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(true)
            .with_ansi(false)
            .try_init();
    });
}

/// A default-strategy polling executor behind a trait handle.
pub fn executor(q: Duration) -> Arc<dyn Executor> {
    init_test_logging();
    Arc::new(PollingExecutor::new(q))
}

/// A pending result fulfilled with `value` from a helper thread after
/// `delay`.
pub fn delayed_value<T: Send + 'static>(delay: Duration, value: T) -> Pending<T> {
    let (promise, pending) = pair();
    thread::spawn(move || {
        thread::sleep(delay);
        promise.fulfill(value);
    });
    pending
}

/// Locks the registry scope, recovering from a poisoned lock (a
/// should-panic test may have held it).
pub fn registry_scope() -> std::sync::MutexGuard<'static, ()> {
    match REGISTRY_SCOPE.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
