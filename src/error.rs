//! Error Types
//!
//! All failure modes of the crate are expressed through a single [`Error`]
//! enum: application errors returned from step actions, cancellation-derived
//! errors, the composite produced when cancellation and result collection
//! both fail, and dependency-recorder misses.

use thiserror::Error;

/// Boxed error type accepted from application code.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced by pipelines, steps and the concurrent executors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The cancellation signal was triggered explicitly.
    #[error("canceled")]
    Canceled,

    /// The cancellation signal's deadline elapsed.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// A step returned an error; the step name is attached for context.
    #[error("step '{name}' failed: {source}")]
    StepFailed {
        /// Name of the failing step.
        name: String,
        /// The error the step returned.
        #[source]
        source: Box<Error>,
    },

    /// Cancellation fired while the result collection also reported an
    /// error. Both causes stay identifiable in the rendered message.
    #[error("{cancellation}, collection error: {collection}")]
    CanceledWithCollection {
        /// The cancellation signal's own error.
        cancellation: Box<Error>,
        /// The error returned by the result collection.
        collection: Box<Error>,
    },

    /// One or more required steps have not been recorded as executed.
    #[error("required steps did not run: [{}]", .missing.join(", "))]
    MissingDependencies {
        /// Names of the steps that did not run.
        missing: Vec<String>,
    },

    /// Sentinel that stops a pipeline gracefully without failing it.
    #[error("abort")]
    Abort,

    /// A plain application error message.
    #[error("{0}")]
    Message(String),

    /// An arbitrary application error.
    #[error("{0}")]
    Other(#[source] BoxError),
}

impl Error {
    /// Wraps an arbitrary application error.
    pub fn other(err: impl Into<BoxError>) -> Self {
        Error::Other(err.into())
    }

    /// Creates an application error from a message.
    pub fn message(msg: impl Into<String>) -> Self {
        Error::Message(msg.into())
    }

    /// Returns true if this is the graceful-stop sentinel.
    pub fn is_abort(&self) -> bool {
        matches!(self, Error::Abort)
    }

    /// Returns true if this error originates from the cancellation signal.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Error::Canceled | Error::DeadlineExceeded)
    }
}
