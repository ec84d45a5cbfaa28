//! Step Execution Recording
//!
//! Records which steps a pipeline has executed so later steps can assert
//! that their prerequisites actually ran. Feed the recorder through a
//! before-hook and query it from step actions.

use std::sync::{Arc, Mutex, PoisonError};

use crate::error::Error;
use crate::pipeline::runner::HookFn;
use crate::pipeline::step::Step;

/// Thread-safe record of executed step names.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use conveyor::{Context, DependencyRecorder, Pipeline, Step};
///
/// let recorder = Arc::new(DependencyRecorder::new());
/// let lookup = Arc::clone(&recorder);
///
/// let pipeline: Pipeline<()> = Pipeline::new()
///     .add_before_hook(DependencyRecorder::hook(&recorder))
///     .add_step(Step::from_fn("connect", |_| Ok(())))
///     .add_step(Step::from_fn("fetch", move |_| {
///         lookup.require_dependencies(["connect"])
///     }));
///
/// assert!(pipeline.run(()).is_successful());
/// ```
#[derive(Debug, Default)]
pub struct DependencyRecorder {
    records: Mutex<Vec<String>>,
}

impl DependencyRecorder {
    /// Creates a new empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a step name to the records.
    pub fn record(&self, step_name: impl Into<String>) {
        self.lock().push(step_name.into());
    }

    /// Returns the recorded step names in execution order.
    ///
    /// Includes the last step that failed with an error.
    pub fn recorded(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// Returns true if a step with the given name is in the records.
    ///
    /// Steps that share the same name are not distinguishable.
    pub fn contains(&self, step_name: &str) -> bool {
        self.lock().iter().any(|name| name == step_name)
    }

    /// Checks that all given step names are present in the records.
    ///
    /// Returns [`Error::MissingDependencies`] listing every name that is
    /// not recorded, in the order given. Order of execution is not checked.
    pub fn require_dependencies<'a>(
        &self,
        step_names: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), Error> {
        let records = self.lock();
        let missing: Vec<String> = step_names
            .into_iter()
            .filter(|wanted| !records.iter().any(|name| name == wanted))
            .map(str::to_string)
            .collect();

        if missing.is_empty() {
            return Ok(());
        }
        Err(Error::MissingDependencies { missing })
    }

    /// Returns a before-hook that records every step it sees.
    pub fn hook<C>(recorder: &Arc<Self>) -> HookFn<C> {
        let recorder = Arc::clone(recorder);
        Box::new(move |step: &Step<C>| recorder.record(step.name()))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
