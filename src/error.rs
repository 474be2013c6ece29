//! Error types for pollex.
//!
//! All failures that can surface on a pending result funnel through a single
//! [`Error`] type. Error handling follows these principles:
//!
//! - Errors are explicit and typed (no stringly-typed errors)
//! - Timeouts are a distinct kind so callers can discriminate them from
//!   user-raised failures
//! - Panics inside continuations are isolated and converted to
//!   [`ErrorKind::Panicked`]

use core::fmt;
use std::any::Any;
use std::sync::Arc;

/// The kind of error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // === Waiting ===
    /// Deadline passed before the pending result became ready.
    Timeout,
    /// Generic unrecoverable wait failure.
    WaitFailed,

    // === Executor lifecycle ===
    /// The executor was stopped while the waitable was being watched.
    ExecutorStopped,
    /// The waitable was handed to an executor that had already stopped.
    ExecutorInactive,
    /// A chained continuation found its executor gone.
    ExecutorUnavailable,

    // === Pending results ===
    /// The producing side was dropped without fulfilling the result.
    Abandoned,
    /// The value was already taken out of this pending result.
    ValueTaken,

    // === User code ===
    /// A continuation panicked; the payload text is preserved in the context.
    Panicked,
    /// User-provided error.
    User,
}

impl ErrorKind {
    fn message(self) -> &'static str {
        match self {
            Self::Timeout => "wait limit exceeded",
            Self::WaitFailed => "wait failed",
            Self::ExecutorStopped => "executor stopped",
            Self::ExecutorInactive => "executor inactive",
            Self::ExecutorUnavailable => "no executor available",
            Self::Abandoned => "pending result abandoned by its producer",
            Self::ValueTaken => "value already taken",
            Self::Panicked => "continuation panicked",
            Self::User => "user error",
        }
    }
}

/// The error type carried by pending results and adapter sinks.
///
/// Clonable so a single failure can be observed through every handle that
/// still refers to it.
#[derive(Debug, Clone)]
pub struct Error {
    kind: ErrorKind,
    context: Option<String>,
    source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Creates a new error with the given kind and its fixed message.
    #[must_use]
    pub const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
            source: None,
        }
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns true if this error is the timeout condition raised when a
    /// deadline passes without readiness.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self.kind, ErrorKind::Timeout)
    }

    /// Returns true if this error was injected by executor shutdown,
    /// either at `stop()` or at watch-after-stop.
    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::ExecutorStopped | ErrorKind::ExecutorInactive
        )
    }

    /// Adds context text to the error.
    #[must_use]
    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context = Some(ctx.into());
        self
    }

    /// Adds a source error to the chain.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Creates a `User` error wrapping an arbitrary error value.
    #[must_use]
    pub fn user(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::new(ErrorKind::User).with_source(source)
    }

    /// Creates a `Panicked` error from a caught panic payload, preserving
    /// the payload text when it is a string.
    #[must_use]
    pub fn panicked(payload: Box<dyn Any + Send>) -> Self {
        let err = Self::new(ErrorKind::Panicked);
        if let Some(s) = payload.downcast_ref::<&'static str>() {
            err.with_context(*s)
        } else if let Some(s) = payload.downcast_ref::<String>() {
            err.with_context(s.clone())
        } else {
            err
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.message())?;
        if let Some(ctx) = &self.context {
            write!(f, ": {ctx}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as _)
    }
}

/// Extension trait for attaching context to Results.
pub trait ResultExt<T> {
    /// Attach a context string on error.
    fn context(self, ctx: impl Into<String>) -> Result<T>;
    /// Attach context computed lazily on error.
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for core::result::Result<T, E> {
    fn context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(ctx))
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| e.into().with_context(f()))
    }
}

/// A specialized Result type for pollex operations.
pub type Result<T> = core::result::Result<T, Error>;
