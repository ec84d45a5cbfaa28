//! Fan-Out Execution
//!
//! Runs every supplied sub-pipeline on its own thread, without an upper
//! bound on simultaneous tasks.

use std::collections::HashMap;
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

/// Creates a step that runs supplied sub-pipelines in their own threads.
///
/// One thread is spawned per sub-pipeline as it arrives on the queue; the
/// ordinal index of each task is assigned in arrival order. The step waits
/// until all sub-pipelines are finished, then reduces their outcomes via
/// the given handler. Without a handler the step is considered successful
/// regardless of individual task failures.
///
/// If the context is canceled, the supplier is expected to stop supplying
/// new instances. The step still waits for the remaining sub-pipelines and
/// collects their results; the cancellation error is merged into the
/// combined outcome.
pub fn fan_out_step<C, S>(
    name: impl Into<String>,
    supplier: S,
    handler: Option<ParallelResultHandler<C>>,
) -> Step<C>
where
    C: Sync + 'static,
    S: Supplier<C> + 'static,
{
    let name = name.into();
    let step_name = name.clone();
    Step::new(name, move |ctx: &Context<C>| {
        let (tx, rx) = mpsc::channel::<Pipeline<C>>();
        let table: Mutex<HashMap<u64, Outcome>> = Mutex::new(HashMap::new());
        let mut spawned: u64 = 0;

        thread::scope(|scope| {
            let supplier = &supplier;
            let feeder = Feeder::unbounded(tx);
            scope.spawn(move || supplier.supply(ctx, feeder));

            for pipeline in rx {
                let index = spawned;
                spawned += 1;
                let table = &table;
                scope.spawn(move || {
                    let outcome = pipeline.run_with_context(ctx);
                    table
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .insert(index, outcome);
                });
            }
        });

        debug!("Fan-out step '{}' quiesced after {} tasks", step_name, spawned);
        let results = table.into_inner().unwrap_or_else(PoisonError::into_inner);
        let collected = collect_results(ctx, handler.as_ref(), results);
        let mut outcome = merge_cancellation(ctx, collected);
        if outcome.name().is_none() {
            outcome.set_name(step_name.as_str());
        }
        outcome
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::parallel::supplier::SliceSupplier;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn counting_pipeline() -> Pipeline<AtomicU64> {
        Pipeline::new().add_step(Step::from_fn("increase", |ctx: &Context<AtomicU64>| {
            ctx.payload().fetch_add(1, Ordering::Relaxed);
            Ok(())
        }))
    }

    #[test]
    fn test_fan_out_runs_every_supplied_pipeline() {
        let jobs = 200;
        let supplier = SliceSupplier::new((0..jobs).map(|_| counting_pipeline()));
        let handler: ParallelResultHandler<AtomicU64> = Arc::new(move |_, results| {
            assert_eq!(results.len(), jobs as usize);
            for index in 0..jobs {
                let record = &results[&index];
                assert!(record.is_successful(), "task {} failed", index);
            }
            Outcome::ok()
        });

        let step = fan_out_step("fanout", supplier, Some(handler));
        let ctx = Context::new(AtomicU64::new(0));
        let outcome = Pipeline::new().add_step(step).run_with_context(&ctx);

        assert!(outcome.is_successful());
        assert_eq!(ctx.payload().load(Ordering::Relaxed), jobs);
    }

    #[test]
    fn test_fan_out_without_handler_ignores_failures() {
        let failing: Pipeline<()> =
            Pipeline::new().add_step(Step::from_fn("fail", |_| Err(Error::message("boom"))));
        let supplier = SliceSupplier::new(vec![failing]);

        let step = fan_out_step("fanout", supplier, None);
        let outcome = Pipeline::new().add_step(step).run(());

        assert!(outcome.is_successful());
    }

    #[test]
    fn test_fan_out_three_tasks_increment_shared_counter() {
        let supplier = SliceSupplier::new((0..3).map(|_| counting_pipeline()));
        let handler: ParallelResultHandler<AtomicU64> = Arc::new(|_, _| Outcome::ok());

        let step = fan_out_step("fanout", supplier, Some(handler));
        let ctx = Context::new(AtomicU64::new(0));
        let outcome = Pipeline::new().add_step(step).run_with_context(&ctx);

        assert!(outcome.is_successful());
        assert_eq!(ctx.payload().load(Ordering::Relaxed), 3);
    }

    #[test]
    fn test_fan_out_handler_can_ignore_failures() {
        let failing: Pipeline<()> =
            Pipeline::new().add_step(Step::from_fn("fail", |_| Err(Error::message("boom"))));
        let supplier = SliceSupplier::new(vec![failing]);
        let handler: ParallelResultHandler<()> = Arc::new(|_, _| Outcome::ok());

        let step = fan_out_step("fanout", supplier, Some(handler));
        let outcome = Pipeline::new().add_step(step).run(());

        assert!(outcome.is_successful());
    }

    #[test]
    fn test_fan_out_handler_propagates_task_error() {
        let failing: Pipeline<()> =
            Pipeline::new().add_step(Step::from_fn("fail", |_| Err(Error::message("boom"))));
        let supplier = SliceSupplier::new(vec![failing]);
        let handler: ParallelResultHandler<()> = Arc::new(|_, mut results| {
            assert_eq!(results.len(), 1);
            let record = results.remove(&0).unwrap();
            assert!(record.is_failed());
            let err = record.into_err().unwrap();
            Outcome::failed("fail", err)
        });

        let step = fan_out_step("fanout", supplier, Some(handler));
        let outcome = Pipeline::new().add_step(step).run(());

        assert_eq!(
            outcome.err().unwrap().to_string(),
            "step 'fanout' failed: step 'fail' failed: boom"
        );
    }

    #[test]
    fn test_fan_out_empty_supply() {
        let supplier = SliceSupplier::new(Vec::<Pipeline<()>>::new());
        let handler: ParallelResultHandler<()> = Arc::new(|_, results| {
            assert!(results.is_empty());
            Outcome::ok()
        });

        let step = fan_out_step("fanout", supplier, Some(handler));
        let outcome = Pipeline::new().add_step(step).run(());

        assert!(outcome.is_successful());
        assert_eq!(outcome.name(), Some("fanout"));
    }

    #[test]
    fn test_fan_out_cancellation_truncates_supply_and_merges_errors() {
        let _ = env_logger::builder().is_test(true).try_init();

        let supplier = |ctx: &Context<AtomicU64>, feeder: Feeder<AtomicU64>| {
            for _ in 0..10000 {
                if ctx.is_canceled() {
                    return;
                }
                if !feeder.feed(counting_pipeline()) {
                    return;
                }
                std::thread::sleep(Duration::from_millis(5));
            }
            unreachable!("supplier must stop after cancellation");
        };

        let recorded = Arc::new(AtomicU64::new(0));
        let seen = Arc::clone(&recorded);
        let handler: ParallelResultHandler<AtomicU64> = Arc::new(move |_, results| {
            seen.store(results.len() as u64, Ordering::Relaxed);
            // Quiescence: every dequeued task has stored a record.
            for record in results.values() {
                assert!(record.is_successful() || record.is_canceled());
            }
            Outcome::failed("collect", Error::message("some error"))
        });

        let step = fan_out_step("fanout", supplier, Some(handler));
        let ctx = Context::with_timeout(AtomicU64::new(0), Duration::from_millis(25));
        let outcome = Pipeline::new().add_step(step).run_with_context(&ctx);

        assert!(outcome.is_canceled());
        assert_eq!(
            outcome.err().unwrap().to_string(),
            "step 'fanout' failed: deadline exceeded, collection error: some error"
        );

        let records = recorded.load(Ordering::Relaxed);
        assert!(records >= 1, "at least one task must have been supplied");
        assert!(records < 10000, "supply must be truncated by cancellation");
        assert!(ctx.payload().load(Ordering::Relaxed) <= records);
    }
}
