//! Result Collection
//!
//! After a concurrent executor reaches quiescence its result table is
//! handed to a user-supplied reduction function that collapses the
//! per-task outcomes into one combined outcome. The cancellation signal's
//! own error is then merged in so a caller can tell "we were canceled"
//! apart from "and the reduction also reported an error".

use std::collections::HashMap;
use std::sync::Arc;

use crate::context::Context;
use crate::error::Error;
use crate::pipeline::outcome::Outcome;

/// Reduction function collapsing a result table into one combined outcome.
///
/// The map key is the zero-based ordinal of the n-th task; the value is the
/// outcome of that task's sub-pipeline. The function decides the executor's
/// visible result entirely: return [`Outcome::ok`] to ignore individual
/// failures, pick the first error found, or synthesize an aggregate error.
pub type ParallelResultHandler<C> =
    Arc<dyn Fn(&Context<C>, HashMap<u64, Outcome>) -> Outcome + Send + Sync>;

/// Reduces the result table via the handler.
///
/// Without a handler the executor is considered successful regardless of
/// individual task failures. Runs exactly once, strictly after all workers
/// have quiesced; the table is an ordinary map by then.
pub(crate) fn collect_results<C>(
    ctx: &Context<C>,
    handler: Option<&ParallelResultHandler<C>>,
    results: HashMap<u64, Outcome>,
) -> Outcome {
    match handler {
        Some(handler) => handler(ctx, results),
        None => Outcome::ok(),
    }
}

/// Merges the cancellation signal's error into the collected outcome.
///
/// If the signal fired and the collection reported an error, both causes
/// are combined; if only the signal fired, the outcome is exactly the
/// cancellation error. Without cancellation the outcome passes through
/// untouched.
pub(crate) fn merge_cancellation<C>(ctx: &Context<C>, mut outcome: Outcome) -> Outcome {
    let Some(cause) = ctx.cancellation() else {
        return outcome;
    };

    let cancellation = cause.into_error();
    let err = match outcome.take_err() {
        Some(collection) => Error::CanceledWithCollection {
            cancellation: Box::new(cancellation),
            collection: Box::new(collection),
        },
        None => cancellation,
    };
    outcome.set_err(Some(err));
    outcome.mark_canceled();
    outcome
}
