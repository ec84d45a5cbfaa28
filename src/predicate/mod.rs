//! Conditional Step Execution
//!
//! Wraps existing actions, steps, or nested pipelines so they only execute
//! when a predicate evaluates true. A false predicate skips the wrapped
//! work and the step reports success.
//!
//! Predicates are evaluated lazily, at the moment the wrapping step runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::context::Context;
use crate::pipeline::outcome::Outcome;
use crate::pipeline::runner::Pipeline;
use crate::pipeline::step::Step;

/// A function that decides whether a wrapped action should run.
pub type Predicate<C> = Box<dyn Fn(&Context<C>) -> bool + Send + Sync>;

/// Returns a predicate that always evaluates to `v`.
///
/// Use [`from_flag`] over [`bool_value`] if the value can change between
/// setting up the pipeline and evaluating the predicate.
pub fn bool_value<C>(v: bool) -> Predicate<C> {
    Box::new(move |_| v)
}

/// Returns a predicate that reads the given shared flag when evaluated.
pub fn from_flag<C>(flag: Arc<AtomicBool>) -> Predicate<C> {
    Box::new(move |_| flag.load(Ordering::Relaxed))
}

/// Returns a predicate that negates the given predicate.
pub fn not<C: 'static>(predicate: Predicate<C>) -> Predicate<C> {
    Box::new(move |ctx| !predicate(ctx))
}

/// Returns the logical AND of the given predicates.
///
/// `p2` is not evaluated if `p1` already evaluates to false.
pub fn and<C: 'static>(p1: Predicate<C>, p2: Predicate<C>) -> Predicate<C> {
    Box::new(move |ctx| p1(ctx) && p2(ctx))
}

/// Returns the logical OR of the given predicates.
///
/// `p2` is not evaluated if `p1` already evaluates to true.
pub fn or<C: 'static>(p1: Predicate<C>, p2: Predicate<C>) -> Predicate<C> {
    Box::new(move |ctx| p1(ctx) || p2(ctx))
}

/// Wraps the given action in a step that only runs it when the predicate
/// evaluates true, reporting success otherwise.
pub fn to_step<C: 'static>(
    name: impl Into<String>,
    action: impl Fn(&Context<C>) -> Outcome + Send + Sync + 'static,
    predicate: Predicate<C>,
) -> Step<C> {
    Step::new(name, move |ctx| {
        if predicate(ctx) {
            return action(ctx);
        }
        Outcome::ok()
    })
}

/// Wraps the given pipeline in a step that only runs it when the predicate
/// evaluates true, reporting success otherwise.
///
/// The enclosing run's context is passed through to the nested pipeline.
pub fn to_nested_step<C>(
    name: impl Into<String>,
    predicate: Predicate<C>,
    pipeline: Pipeline<C>,
) -> Step<C>
where
    C: 'static,
{
    Step::new(name, move |ctx| {
        if predicate(ctx) {
            return pipeline.run_with_context(ctx);
        }
        Outcome::ok()
    })
}

/// Wraps an existing step so its action only runs when the predicate
/// evaluates true. The step keeps its name and result handler.
pub fn when<C>(predicate: Predicate<C>, step: Step<C>) -> Step<C>
where
    C: 'static,
{
    let Step {
        name,
        action,
        handler,
    } = step;
    let mut wrapped = Step::new(name, move |ctx| {
        if predicate(ctx) {
            return action(ctx);
        }
        Outcome::ok()
    });
    wrapped.handler = handler;
    wrapped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::AtomicU64;

    fn run_step(step: &Step<()>) -> Outcome {
        (step.action)(&Context::new(()))
    }

    #[test]
    fn test_bool_value() {
        let truthy: Predicate<()> = bool_value(true);
        let falsy: Predicate<()> = bool_value(false);
        let ctx = Context::new(());

        assert!(truthy(&ctx));
        assert!(!falsy(&ctx));
    }

    #[test]
    fn test_from_flag_reads_current_value() {
        let flag = Arc::new(AtomicBool::new(false));
        let predicate: Predicate<()> = from_flag(Arc::clone(&flag));
        let ctx = Context::new(());

        assert!(!predicate(&ctx));
        flag.store(true, Ordering::Relaxed);
        assert!(predicate(&ctx));
    }

    #[test]
    fn test_not() {
        let predicate: Predicate<()> = not(bool_value(false));
        assert!(predicate(&Context::new(())));
    }

    #[test]
    fn test_and_or_combinations() {
        let ctx = Context::new(());

        assert!(and::<()>(bool_value(true), bool_value(true))(&ctx));
        assert!(!and::<()>(bool_value(true), bool_value(false))(&ctx));
        assert!(or::<()>(bool_value(false), bool_value(true))(&ctx));
        assert!(!or::<()>(bool_value(false), bool_value(false))(&ctx));
    }

    #[test]
    fn test_and_short_circuits() {
        let evaluated = Arc::new(AtomicBool::new(false));
        let witness = Arc::clone(&evaluated);
        let second: Predicate<()> = Box::new(move |_| {
            witness.store(true, Ordering::Relaxed);
            true
        });

        assert!(!and(bool_value(false), second)(&Context::new(())));
        assert!(!evaluated.load(Ordering::Relaxed));
    }

    #[test]
    fn test_to_step_runs_action_when_true() {
        let step = to_step(
            "conditional",
            |_: &Context<()>| Outcome::failed("conditional", Error::message("ran")),
            bool_value(true),
        );

        let outcome = run_step(&step);
        assert!(outcome.is_failed());
    }

    #[test]
    fn test_to_step_skips_action_when_false() {
        let step = to_step(
            "conditional",
            |_: &Context<()>| Outcome::failed("conditional", Error::message("ran")),
            bool_value(false),
        );

        let outcome = run_step(&step);
        assert!(outcome.is_successful());
    }

    #[test]
    fn test_to_nested_step_skips_pipeline() {
        let counter = Arc::new(AtomicU64::new(0));
        let seen = Arc::clone(&counter);
        let nested: Pipeline<()> = Pipeline::new().add_step(Step::from_fn("count", move |_| {
            seen.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }));

        let step = to_nested_step("maybe", bool_value(false), nested);
        assert!(run_step(&step).is_successful());
        assert_eq!(counter.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_to_nested_step_runs_pipeline() {
        let counter = Arc::new(AtomicU64::new(0));
        let seen = Arc::clone(&counter);
        let nested: Pipeline<()> = Pipeline::new().add_step(Step::from_fn("count", move |_| {
            seen.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }));

        let step = to_nested_step("maybe", bool_value(true), nested);
        assert!(run_step(&step).is_successful());
        assert_eq!(counter.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_when_keeps_name_and_skips() {
        let step = when(
            bool_value(false),
            Step::from_fn("guarded", |_: &Context<()>| Err(Error::message("ran"))),
        );

        assert_eq!(step.name(), "guarded");
        assert!(run_step(&step).is_successful());
    }

    #[test]
    fn test_when_passes_through_when_true() {
        let step = when(
            bool_value(true),
            Step::from_fn("guarded", |_: &Context<()>| Err(Error::message("ran"))),
        );

        let outcome = run_step(&step);
        assert_eq!(outcome.err().unwrap().to_string(), "ran");
    }
}
