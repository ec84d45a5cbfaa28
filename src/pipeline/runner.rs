//! Sequential Pipeline Runner
//!
//! Executes steps in order, stopping at the first failure. Supports
//! before-hooks, a finalizer that runs on every exit, graceful aborts via
//! [`Error::Abort`], and a cancellation check before each step.

use log::debug;

use crate::context::Context;
use crate::error::Error;
use crate::pipeline::outcome::Outcome;
use crate::pipeline::step::Step;

/// Listener invoked just before each step's action runs.
///
/// Hooks should return quickly; they are meant for bookkeeping such as
/// logging or dependency recording, not business logic.
pub type HookFn<C> = Box<dyn Fn(&Step<C>) + Send + Sync>;

/// Handler that runs after the last step on every exit path.
///
/// The error it returns (or `Ok(())`) replaces the run's error.
pub type FinalizerFn<C> = Box<dyn Fn(&Context<C>, &Outcome) -> Result<(), Error> + Send + Sync>;

/// Behaviour-altering settings for a [`Pipeline`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Disables wrapping of step errors into `step '<name>' failed: ...`.
    ///
    /// With wrapping disabled the run's error is exactly the error the
    /// failing step returned.
    pub disable_error_wrapping: bool,
}

/// An ordered sequence of steps executed in a fail-first fashion.
///
/// # Example
///
/// ```
/// use std::sync::atomic::{AtomicU64, Ordering};
/// use conveyor::{Context, Pipeline, Step};
///
/// let pipeline: Pipeline<AtomicU64> = Pipeline::new()
///     .add_step(Step::from_fn("first", |ctx: &Context<AtomicU64>| {
///         ctx.payload().fetch_add(1, Ordering::Relaxed);
///         Ok(())
///     }))
///     .add_step(Step::from_fn("second", |ctx: &Context<AtomicU64>| {
///         ctx.payload().fetch_add(1, Ordering::Relaxed);
///         Ok(())
///     }));
///
/// let outcome = pipeline.run(AtomicU64::new(0));
/// assert!(outcome.is_successful());
/// assert_eq!(outcome.name(), Some("second"));
/// ```
pub struct Pipeline<C> {
    steps: Vec<Step<C>>,
    before_hooks: Vec<HookFn<C>>,
    finalizer: Option<FinalizerFn<C>>,
    options: Options,
}

impl<C> Pipeline<C> {
    /// Creates a new empty pipeline.
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            before_hooks: Vec::new(),
            finalizer: None,
            options: Options::default(),
        }
    }

    /// Appends the given step at the end and returns the pipeline itself.
    pub fn add_step(mut self, step: Step<C>) -> Self {
        self.steps.push(step);
        self
    }

    /// Replaces the pipeline's steps.
    pub fn with_steps(mut self, steps: Vec<Step<C>>) -> Self {
        self.steps = steps;
        self
    }

    /// Adds a listener that is called just before each step's action runs.
    pub fn add_before_hook(mut self, hook: impl Fn(&Step<C>) + Send + Sync + 'static) -> Self {
        self.before_hooks.push(Box::new(hook));
        self
    }

    /// Replaces the pipeline's before-hooks.
    pub fn with_before_hooks(mut self, hooks: Vec<HookFn<C>>) -> Self {
        self.before_hooks = hooks;
        self
    }

    /// Sets the finalizer for the pipeline.
    ///
    /// The finalizer gets called after the last step completed, including
    /// early exits through failures or aborts.
    pub fn with_finalizer(
        mut self,
        finalizer: impl Fn(&Context<C>, &Outcome) -> Result<(), Error> + Send + Sync + 'static,
    ) -> Self {
        self.finalizer = Some(Box::new(finalizer));
        self
    }

    /// Configures the pipeline with settings.
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Returns the number of steps in the pipeline.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if the pipeline has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Executes the pipeline with a fresh context around `payload`.
    ///
    /// Steps are executed sequentially in the order they were added. If a
    /// step fails, the pipeline stops and the outcome contains the affected
    /// step's error.
    pub fn run(&self, payload: C) -> Outcome {
        self.run_with_context(&Context::new(payload))
    }

    /// Like [`run`](Self::run) but with a caller-provided context.
    ///
    /// Use this to share a cancellation signal or a payload with outside
    /// observers.
    pub fn run_with_context(&self, ctx: &Context<C>) -> Outcome {
        let mut outcome = self.do_run(ctx);
        if let Some(finalizer) = &self.finalizer {
            let err = finalizer(ctx, &outcome).err();
            outcome.set_err(err);
        }
        outcome
    }

    fn do_run(&self, ctx: &Context<C>) -> Outcome {
        let mut last_name: Option<&str> = None;
        for step in &self.steps {
            // Canceled runs stop before the next step's action fires.
            if let Some(cause) = ctx.cancellation() {
                debug!("Pipeline canceled before step '{}'", step.name);
                let err = self.wrap_step_error(&step.name, cause.into_error());
                return Outcome::canceled(step.name.clone(), err);
            }

            for hook in &self.before_hooks {
                hook(step);
            }

            debug!("Running step '{}'", step.name);
            let outcome = (step.action)(ctx);
            let canceled = outcome.is_canceled();

            let err = match &step.handler {
                Some(handler) => handler(ctx, outcome).err(),
                None => outcome.into_err(),
            };

            if let Some(err) = err {
                if err.is_abort() {
                    debug!("Step '{}' aborted the pipeline", step.name);
                    return Outcome::aborted(step.name.clone());
                }
                let wrapped = self.wrap_step_error(&step.name, err);
                let mut failed = Outcome::failed(step.name.clone(), wrapped);
                if canceled {
                    failed.mark_canceled();
                }
                return failed;
            }

            last_name = Some(&step.name);
        }

        match last_name {
            Some(name) => Outcome::ok_named(name),
            None => Outcome::ok(),
        }
    }

    fn wrap_step_error(&self, name: &str, err: Error) -> Error {
        if self.options.disable_error_wrapping {
            return err;
        }
        Error::StepFailed {
            name: name.to_string(),
            source: Box::new(err),
        }
    }

    /// Converts the pipeline into a step usable in other pipelines.
    ///
    /// The nested pipeline runs with the enclosing run's context, so
    /// cancellation propagates into it.
    pub fn as_nested_step(self, name: impl Into<String>) -> Step<C>
    where
        C: 'static,
    {
        Step::new(name, move |ctx| self.run_with_context(ctx))
    }
}

impl<C> Default for Pipeline<C> {
    fn default() -> Self {
        Self::new()
    }
}
