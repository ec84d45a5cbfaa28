//! Step and Pipeline Outcomes
//!
//! An [`Outcome`] is produced by every step action and by every pipeline
//! run. It carries the name of the step that produced it, an optional
//! error, and two flags: whether the run was aborted gracefully and whether
//! it was truncated by cancellation.

use crate::error::Error;

/// Result of running a step or a pipeline.
///
/// Outcomes are immutable once stored in a result table; the concurrent
/// executors aggregate them through a user-supplied reduction function.
#[derive(Debug, Default)]
pub struct Outcome {
    name: Option<String>,
    err: Option<Error>,
    aborted: bool,
    canceled: bool,
}

impl Outcome {
    /// Creates a successful outcome without a name.
    pub fn ok() -> Self {
        Self::default()
    }

    /// Creates a successful outcome attributed to a step.
    pub fn ok_named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Creates a failed outcome attributed to a step.
    pub fn failed(name: impl Into<String>, err: Error) -> Self {
        Self {
            name: Some(name.into()),
            err: Some(err),
            ..Self::default()
        }
    }

    /// Creates an outcome for a gracefully aborted run.
    pub fn aborted(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            aborted: true,
            ..Self::default()
        }
    }

    /// Creates an outcome for a run truncated by cancellation.
    pub fn canceled(name: impl Into<String>, err: Error) -> Self {
        Self {
            name: Some(name.into()),
            err: Some(err),
            canceled: true,
            ..Self::default()
        }
    }

    /// Name of the step this outcome is attributed to.
    ///
    /// For a pipeline run this is the step at which execution stopped, or
    /// the last executed step on success.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The contained error, if any.
    pub fn err(&self) -> Option<&Error> {
        self.err.as_ref()
    }

    /// Consumes the outcome and returns the contained error, if any.
    pub fn into_err(self) -> Option<Error> {
        self.err
    }

    /// Converts the outcome into a `Result`, discarding name and flags.
    pub fn into_result(self) -> Result<(), Error> {
        match self.err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Returns true if the contained error is `None`.
    ///
    /// An aborted run counts as successful.
    pub fn is_successful(&self) -> bool {
        self.err.is_none()
    }

    /// Returns true if the contained error is set.
    pub fn is_failed(&self) -> bool {
        self.err.is_some()
    }

    /// Returns true if the run was stopped gracefully via [`Error::Abort`].
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Returns true if the run was truncated by the cancellation signal.
    pub fn is_canceled(&self) -> bool {
        self.canceled
    }

    pub(crate) fn take_err(&mut self) -> Option<Error> {
        self.err.take()
    }

    pub(crate) fn set_err(&mut self, err: Option<Error>) {
        self.err = err;
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub(crate) fn mark_canceled(&mut self) {
        self.canceled = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_outcome() {
        let outcome = Outcome::ok();
        assert!(outcome.is_successful());
        assert!(!outcome.is_failed());
        assert!(!outcome.is_aborted());
        assert!(!outcome.is_canceled());
        assert!(outcome.name().is_none());
    }

    #[test]
    fn test_ok_named_outcome() {
        let outcome = Outcome::ok_named("align");
        assert!(outcome.is_successful());
        assert_eq!(outcome.name(), Some("align"));
    }

    #[test]
    fn test_failed_outcome() {
        let outcome = Outcome::failed("align", Error::message("boom"));
        assert!(outcome.is_failed());
        assert!(!outcome.is_successful());
        assert_eq!(outcome.name(), Some("align"));
        assert_eq!(outcome.err().unwrap().to_string(), "boom");
    }

    #[test]
    fn test_aborted_outcome_is_successful() {
        let outcome = Outcome::aborted("gate");
        assert!(outcome.is_aborted());
        assert!(outcome.is_successful());
        assert!(outcome.err().is_none());
    }

    #[test]
    fn test_canceled_outcome() {
        let outcome = Outcome::canceled("slow", Error::DeadlineExceeded);
        assert!(outcome.is_canceled());
        assert!(outcome.is_failed());
        assert_eq!(outcome.err().unwrap().to_string(), "deadline exceeded");
    }

    #[test]
    fn test_into_result() {
        assert!(Outcome::ok().into_result().is_ok());

        let err = Outcome::failed("x", Error::message("nope"))
            .into_result()
            .unwrap_err();
        assert_eq!(err.to_string(), "nope");
    }

    #[test]
    fn test_take_err_clears_error() {
        let mut outcome = Outcome::failed("x", Error::message("gone"));
        assert!(outcome.take_err().is_some());
        assert!(outcome.is_successful());
    }
}
