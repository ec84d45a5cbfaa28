//! Execution Context Module
//!
//! Provides the typed context threaded through every step action:
//!
//! - [`Context`]: a caller-defined payload paired with a cancellation signal
//! - [`CancelSignal`]: shared, write-once cancellation flag with optional deadline
//! - [`CancelCause`]: why a signal fired
//!
//! The payload is an ordinary value of a caller-chosen type. Steps receive
//! the context by shared reference; payloads that are mutated from several
//! concurrent tasks must bring their own synchronization (atomics, mutexes).

pub mod signal;

pub use signal::{CancelCause, CancelSignal};

use std::time::{Duration, Instant};

use crate::error::Error;

/// Execution context handed to every step action.
///
/// Carries a caller-typed payload and the cancellation signal for the run.
///
/// # Example
///
/// ```
/// use std::sync::atomic::{AtomicU64, Ordering};
/// use conveyor::Context;
///
/// let ctx = Context::new(AtomicU64::new(0));
/// ctx.payload().fetch_add(1, Ordering::Relaxed);
/// assert_eq!(ctx.payload().load(Ordering::Relaxed), 1);
/// assert!(!ctx.is_canceled());
/// ```
#[derive(Debug)]
pub struct Context<C> {
    payload: C,
    signal: CancelSignal,
}

impl<C> Context<C> {
    /// Creates a context that is only canceled explicitly.
    pub fn new(payload: C) -> Self {
        Self::with_signal(payload, CancelSignal::new())
    }

    /// Creates a context whose signal fires after `timeout`.
    pub fn with_timeout(payload: C, timeout: Duration) -> Self {
        Self::with_signal(payload, CancelSignal::with_timeout(timeout))
    }

    /// Creates a context whose signal fires at `deadline`.
    pub fn with_deadline(payload: C, deadline: Instant) -> Self {
        Self::with_signal(payload, CancelSignal::with_deadline(deadline))
    }

    /// Creates a context from an existing signal.
    ///
    /// Useful to cancel a run from another thread while it is in progress.
    pub fn with_signal(payload: C, signal: CancelSignal) -> Self {
        Self { payload, signal }
    }

    /// Returns the payload.
    pub fn payload(&self) -> &C {
        &self.payload
    }

    /// Consumes the context and returns the payload.
    pub fn into_payload(self) -> C {
        self.payload
    }

    /// Returns the cancellation signal of this context.
    pub fn signal(&self) -> &CancelSignal {
        &self.signal
    }

    /// Triggers the cancellation signal.
    pub fn cancel(&self) {
        self.signal.cancel();
    }

    /// Returns true if the cancellation signal has fired.
    pub fn is_canceled(&self) -> bool {
        self.signal.is_canceled()
    }

    /// Returns the cancellation cause if the signal has fired.
    pub fn cancellation(&self) -> Option<CancelCause> {
        self.signal.cause()
    }

    /// Returns the cancellation cause as an [`Error`] if the signal has fired.
    pub fn cancellation_error(&self) -> Option<Error> {
        self.signal.error()
    }
}
