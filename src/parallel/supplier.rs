//! Work Supply
//!
//! A [`Supplier`] produces the stream of sub-pipelines a concurrent
//! executor consumes. It writes each pipeline into a [`Feeder`], the
//! producer-side handle of the executor's queue.
//!
//! The queue closes when the `Feeder` is dropped. Since the supplier takes
//! the feeder by value, this happens on every exit path (normal return,
//! early return on cancellation, or panic), so consumers can never block
//! on a queue that will not close.

use std::collections::VecDeque;
use std::sync::mpsc;
use std::sync::{Mutex, PoisonError};

use crate::context::Context;
use crate::pipeline::runner::Pipeline;

/// Producer-side handle of an executor's queue.
///
/// Created by the executors; suppliers only feed it. For the worker-pool
/// variant the queue is bounded and [`feed`](Feeder::feed) blocks while it
/// is full.
pub struct Feeder<C> {
    tx: FeederKind<C>,
}

enum FeederKind<C> {
    Unbounded(mpsc::Sender<Pipeline<C>>),
    Bounded(mpsc::SyncSender<Pipeline<C>>),
}

impl<C> Feeder<C> {
    pub(crate) fn unbounded(tx: mpsc::Sender<Pipeline<C>>) -> Self {
        Self {
            tx: FeederKind::Unbounded(tx),
        }
    }

    pub(crate) fn bounded(tx: mpsc::SyncSender<Pipeline<C>>) -> Self {
        Self {
            tx: FeederKind::Bounded(tx),
        }
    }

    /// Writes a sub-pipeline into the queue.
    ///
    /// Blocks while a bounded queue is full. Returns false if the consumer
    /// side is gone and the pipeline was not accepted.
    pub fn feed(&self, pipeline: Pipeline<C>) -> bool {
        match &self.tx {
            FeederKind::Unbounded(tx) => tx.send(pipeline).is_ok(),
            FeederKind::Bounded(tx) => tx.send(pipeline).is_ok(),
        }
    }
}

/// Spawns sub-pipelines for consumption by a concurrent executor.
///
/// Implementations must check the context's cancellation signal before each
/// [`Feeder::feed`] call and stop supplying once it fires; otherwise a
/// canceled executor keeps receiving work it will immediately cancel.
///
/// Plain closures implement this trait:
///
/// ```
/// use conveyor::parallel::{Feeder, Supplier};
/// use conveyor::{Context, Pipeline, Step};
///
/// let supplier = |ctx: &Context<()>, feeder: Feeder<()>| {
///     for _ in 0..3 {
///         if ctx.is_canceled() {
///             return;
///         }
///         let pipeline = Pipeline::new().add_step(Step::from_fn("work", |_| Ok(())));
///         if !feeder.feed(pipeline) {
///             return;
///         }
///     }
/// };
/// let _: &dyn Supplier<()> = &supplier;
/// ```
pub trait Supplier<C>: Send + Sync {
    /// Produces sub-pipelines into the feeder until exhausted or canceled.
    fn supply(&self, ctx: &Context<C>, feeder: Feeder<C>);
}

impl<C, F> Supplier<C> for F
where
    F: Fn(&Context<C>, Feeder<C>) + Send + Sync,
{
    fn supply(&self, ctx: &Context<C>, feeder: Feeder<C>) {
        self(ctx, feeder)
    }
}

/// Supplier over a fixed, pre-built sequence of sub-pipelines.
///
/// Iteration stops early once the cancellation signal fires; pipelines not
/// yet fed are discarded. Each pipeline is yielded at most once, so a
/// second executor run over the same supplier sees an empty stream.
pub struct SliceSupplier<C> {
    pipelines: Mutex<VecDeque<Pipeline<C>>>,
}

impl<C> SliceSupplier<C> {
    /// Creates a supplier over the given pipelines, fed in order.
    pub fn new(pipelines: impl IntoIterator<Item = Pipeline<C>>) -> Self {
        Self {
            pipelines: Mutex::new(pipelines.into_iter().collect()),
        }
    }

    /// Returns the number of pipelines not yet fed.
    pub fn remaining(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Pipeline<C>>> {
        self.pipelines.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C> Supplier<C> for SliceSupplier<C> {
    fn supply(&self, ctx: &Context<C>, feeder: Feeder<C>) {
        loop {
            if ctx.is_canceled() {
                return;
            }
            let next = self.lock().pop_front();
            match next {
                Some(pipeline) => {
                    if !feeder.feed(pipeline) {
                        return;
                    }
                }
                None => return,
            }
        }
    }
}
