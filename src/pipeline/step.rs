//! Pipeline Steps
//!
//! A [`Step`] is a named unit of work. Its action receives the execution
//! context and produces an [`Outcome`]; an optional result handler can
//! inspect the outcome and swallow or replace its error before the pipeline
//! decides whether to continue.

use std::fmt;

use crate::context::Context;
use crate::error::Error;
use crate::pipeline::outcome::Outcome;

/// Action assigned to a step.
pub type ActionFn<C> = Box<dyn Fn(&Context<C>) -> Outcome + Send + Sync>;

/// Handler invoked with a step's outcome.
///
/// Returning `Ok(())` continues the pipeline even if the outcome contained
/// an error; returning an error fails (or, with [`Error::Abort`], stops)
/// the pipeline.
pub type StepHandlerFn<C> = Box<dyn Fn(&Context<C>, Outcome) -> Result<(), Error> + Send + Sync>;

/// A named unit of work within a [`Pipeline`](crate::Pipeline).
///
/// # Example
///
/// ```
/// use conveyor::{Context, Step};
///
/// let step = Step::from_fn("greet", |_ctx: &Context<()>| {
///     println!("hello");
///     Ok(())
/// });
/// assert_eq!(step.name(), "greet");
/// ```
pub struct Step<C> {
    pub(crate) name: String,
    pub(crate) action: ActionFn<C>,
    pub(crate) handler: Option<StepHandlerFn<C>>,
}

impl<C> Step<C> {
    /// Creates a new step with the given name and action.
    pub fn new(
        name: impl Into<String>,
        action: impl Fn(&Context<C>) -> Outcome + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into().trim().to_string(),
            action: Box::new(action),
            handler: None,
        }
    }

    /// Creates a step from a function that returns a plain `Result`.
    ///
    /// The produced outcome is attributed to the step's name.
    pub fn from_fn(
        name: impl Into<String>,
        action: impl Fn(&Context<C>) -> Result<(), Error> + Send + Sync + 'static,
    ) -> Self {
        let name = name.into().trim().to_string();
        let outcome_name = name.clone();
        Self {
            name,
            action: Box::new(move |ctx| match action(ctx) {
                Ok(()) => Outcome::ok_named(outcome_name.clone()),
                Err(err) => Outcome::failed(outcome_name.clone(), err),
            }),
            handler: None,
        }
    }

    /// Sets the result handler of this step and returns the step itself.
    ///
    /// The handler is called with the action's outcome in any case, before
    /// the next step runs. Use cases are logging, progress reporting, or
    /// tolerating individual failures by returning `Ok(())`.
    pub fn with_result_handler(
        mut self,
        handler: impl Fn(&Context<C>, Outcome) -> Result<(), Error> + Send + Sync + 'static,
    ) -> Self {
        self.handler = Some(Box::new(handler));
        self
    }

    /// Returns the step's name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<C> fmt::Debug for Step<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}
