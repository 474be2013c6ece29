//! Scoped default executor.
//!
//! Convenience entry points that omit the executor argument resolve it here.
//! [`set_default`] installs an executor and returns a guard; dropping the
//! guard restores whatever was installed before, so nested scopes behave as
//! a LIFO stack. Reads are a mutex-guarded clone: thread-safe, and
//! contention-free in the read-heavy common case.

use std::sync::{Arc, Mutex};

use crate::executor::Executor;

static DEFAULT: Mutex<Option<Arc<dyn Executor>>> = Mutex::new(None);

/// Installs `executor` as the process-wide default for the lifetime of the
/// returned guard.
///
/// The previous default (if any) is restored when the guard drops. Guards
/// must be dropped in reverse creation order for the stack discipline to
/// hold; keeping them on the stack does this naturally.
#[must_use = "dropping the guard immediately restores the previous default"]
pub fn set_default(executor: Arc<dyn Executor>) -> DefaultGuard {
    let mut slot = DEFAULT.lock().expect("default executor lock poisoned");
    let previous = slot.replace(executor);
    DefaultGuard { previous }
}

/// Returns the current default executor, if one is installed.
#[must_use]
pub fn try_current() -> Option<Arc<dyn Executor>> {
    DEFAULT
        .lock()
        .expect("default executor lock poisoned")
        .clone()
}

/// Returns the current default executor.
///
/// # Panics
///
/// Panics if no default executor is installed. Entry points that omit the
/// executor argument document this as a programming error.
#[must_use]
pub fn current() -> Arc<dyn Executor> {
    try_current().expect("no default executor installed; use `registry::set_default`")
}

/// Guard returned by [`set_default`]; restores the previous default on drop.
pub struct DefaultGuard {
    previous: Option<Arc<dyn Executor>>,
}

impl std::fmt::Debug for DefaultGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultGuard")
            .field("previous", &self.previous.as_ref().map(|_| "<executor>"))
            .finish()
    }
}

impl Drop for DefaultGuard {
    fn drop(&mut self) {
        let mut slot = DEFAULT.lock().expect("default executor lock poisoned");
        *slot = self.previous.take();
    }
}
