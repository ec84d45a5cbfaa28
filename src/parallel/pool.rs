//! Worker Pool Execution
//!
//! Runs supplied sub-pipelines on a fixed number of long-lived worker
//! threads pulling from a bounded queue.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::{Mutex, PoisonError};
use std::thread;

use log::debug;

use crate::context::Context;
use crate::parallel::collector::{collect_results, merge_cancellation, ParallelResultHandler};
use crate::parallel::supplier::{Feeder, Supplier};
use crate::pipeline::outcome::Outcome;
use crate::pipeline::runner::Pipeline;
use crate::pipeline::step::Step;

/// Creates a step that runs supplied sub-pipelines in a worker pool.
///
/// `size` worker threads pull from a queue bounded to `size` entries and
/// run one sub-pipeline at a time until the queue is closed and drained.
/// The ordinal index of each task is claimed atomically at dequeue time, so
/// index order is dequeue order. With a size of 1 the sub-pipelines are
/// effectively run in sequence.
///
/// The step waits until all sub-pipelines are finished, then reduces their
/// outcomes via the given handler; without a handler the step is considered
/// successful regardless of individual task failures. If the context is
/// canceled, the supplier is expected to stop supplying; the step still
/// waits for in-flight sub-pipelines and merges the cancellation error into
/// the combined outcome.
///
/// # Panics
///
/// Panics if `size` is 0. A pool without workers is a configuration error.
pub fn worker_pool_step<C, S>(
    name: impl Into<String>,
    size: usize,
    supplier: S,
    handler: Option<ParallelResultHandler<C>>,
) -> Step<C>
where
    C: Sync + 'static,
    S: Supplier<C> + 'static,
{
    assert!(size >= 1, "worker pool size must be at least 1");

    let name = name.into();
    let step_name = name.clone();
    Step::new(name, move |ctx: &Context<C>| {
        let (tx, rx) = mpsc::sync_channel::<Pipeline<C>>(size);
        let receiver = Mutex::new(rx);
        let counter = AtomicU64::new(0);
        let table: Mutex<HashMap<u64, Outcome>> = Mutex::new(HashMap::new());

        debug!("Worker pool step '{}' starting {} workers", step_name, size);
        thread::scope(|scope| {
            let supplier = &supplier;
            let feeder = Feeder::bounded(tx);
            scope.spawn(move || supplier.supply(ctx, feeder));

            for _ in 0..size {
                let receiver = &receiver;
                let counter = &counter;
                let table = &table;
                scope.spawn(move || pool_work(ctx, receiver, counter, table));
            }
        });

        let results = table.into_inner().unwrap_or_else(PoisonError::into_inner);
        debug!(
            "Worker pool step '{}' quiesced after {} tasks",
            step_name,
            results.len()
        );
        let collected = collect_results(ctx, handler.as_ref(), results);
        let mut outcome = merge_cancellation(ctx, collected);
        if outcome.name().is_none() {
            outcome.set_name(step_name.as_str());
        }
        outcome
    })
}

/// Worker loop: dequeue, claim an index, run, store the record.
///
/// Ends once the queue is closed and drained.
fn pool_work<C>(
    ctx: &Context<C>,
    receiver: &Mutex<mpsc::Receiver<Pipeline<C>>>,
    counter: &AtomicU64,
    table: &Mutex<HashMap<u64, Outcome>>,
) {
    loop {
        let message = receiver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .recv();
        let Ok(pipeline) = message else {
            return;
        };
        let index = counter.fetch_add(1, Ordering::Relaxed);
        let outcome = pipeline.run_with_context(ctx);
        table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(index, outcome);
    }
}

/// Returns a pool size matching the number of logical CPUs, minimum 1.
///
/// A reasonable default for CPU-bound sub-pipelines.
pub fn default_pool_size() -> usize {
    num_cpus::get().max(1)
}
