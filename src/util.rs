//! Ready-result constructors.

use crate::error::Error;
use crate::promise::{pair, Pending};

/// Returns a pending result that is already ready with `value`.
#[must_use]
pub fn from_value<T>(value: T) -> Pending<T> {
    let (promise, pending) = pair();
    promise.fulfill(value);
    pending
}

/// Returns a pending result that is already ready with `error`.
#[must_use]
pub fn from_error<T>(error: Error) -> Pending<T> {
    let (promise, pending) = pair();
    promise.fail(error);
    pending
}
