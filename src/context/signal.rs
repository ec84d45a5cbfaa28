//! Cancellation Signal
//!
//! A shared, write-once cancellation primitive observed cooperatively by
//! suppliers, workers and the sequential runner. The signal can be triggered
//! explicitly or armed with a deadline; the deadline is evaluated lazily at
//! every observation point, so no timer thread is required.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use once_cell::sync::OnceCell;

use crate::error::Error;

/// Why a [`CancelSignal`] fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelCause {
    /// [`CancelSignal::cancel`] was called.
    Canceled,
    /// The signal's deadline elapsed.
    DeadlineExceeded,
}

impl CancelCause {
    /// Converts the cause into the corresponding [`Error`].
    pub fn into_error(self) -> Error {
        match self {
            CancelCause::Canceled => Error::Canceled,
            CancelCause::DeadlineExceeded => Error::DeadlineExceeded,
        }
    }
}

impl fmt::Display for CancelCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelCause::Canceled => write!(f, "canceled"),
            CancelCause::DeadlineExceeded => write!(f, "deadline exceeded"),
        }
    }
}

/// Shared cancellation signal.
///
/// Clones share the same underlying state. The cause is write-once: the
/// first trigger (explicit cancel or deadline expiry) wins and is never
/// overwritten.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    canceled: AtomicBool,
    cause: OnceCell<CancelCause>,
    deadline: Option<Instant>,
}

impl CancelSignal {
    /// Creates a signal that only fires when [`cancel`](Self::cancel) is called.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Creates a signal that fires once `deadline` is reached.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self::build(Some(deadline))
    }

    /// Creates a signal that fires once `timeout` has elapsed from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    fn build(deadline: Option<Instant>) -> Self {
        Self {
            inner: Arc::new(Inner {
                canceled: AtomicBool::new(false),
                cause: OnceCell::new(),
                deadline,
            }),
        }
    }

    /// Triggers the signal explicitly.
    ///
    /// Has no effect if the signal already fired.
    pub fn cancel(&self) {
        let _ = self.inner.cause.set(CancelCause::Canceled);
        self.inner.canceled.store(true, Ordering::Release);
    }

    /// Returns true if the signal has fired.
    ///
    /// Checking also latches an expired deadline, so the reported cause is
    /// stable from the first observation onwards.
    pub fn is_canceled(&self) -> bool {
        if self.inner.canceled.load(Ordering::Acquire) {
            return true;
        }
        if let Some(deadline) = self.inner.deadline {
            if Instant::now() >= deadline {
                let _ = self.inner.cause.set(CancelCause::DeadlineExceeded);
                self.inner.canceled.store(true, Ordering::Release);
                return true;
            }
        }
        false
    }

    /// Returns the cause if the signal has fired, `None` otherwise.
    pub fn cause(&self) -> Option<CancelCause> {
        if self.is_canceled() {
            self.inner.cause.get().copied()
        } else {
            None
        }
    }

    /// Returns the cause as an [`Error`] if the signal has fired.
    pub fn error(&self) -> Option<Error> {
        self.cause().map(CancelCause::into_error)
    }

    /// Returns the configured deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}
