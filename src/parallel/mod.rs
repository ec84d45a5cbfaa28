//! Concurrent Execution Module
//!
//! Runs many independent sub-pipelines in parallel and collects their
//! outcomes into a single combined result.
//!
//! # Structure
//!
//! - [`supplier`]: Work supply over a closable queue
//! - [`fanout`]: One thread per sub-pipeline, unbounded parallelism
//! - [`pool`]: Fixed number of long-lived workers over a bounded queue
//! - [`collector`]: Outcome reduction and cancellation/error composition
//!
//! Both executors produce an ordinary [`Step`](crate::Step), so concurrent
//! stages nest inside sequential pipelines like any other step. They block
//! until every spawned sub-pipeline has stored its outcome, even when the
//! run is canceled mid-flight, so no background work is ever orphaned.
//!
//! # Example
//!
//! ```
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use conveyor::parallel::{fan_out_step, SliceSupplier};
//! use conveyor::{Context, Pipeline, Step};
//!
//! let tasks: Vec<Pipeline<AtomicU64>> = (0..3)
//!     .map(|_| {
//!         Pipeline::new().add_step(Step::from_fn("count", |ctx: &Context<AtomicU64>| {
//!             ctx.payload().fetch_add(1, Ordering::Relaxed);
//!             Ok(())
//!         }))
//!     })
//!     .collect();
//!
//! let step = fan_out_step("fan-out", SliceSupplier::new(tasks), None);
//! let ctx = Context::new(AtomicU64::new(0));
//! let outcome = Pipeline::new().add_step(step).run_with_context(&ctx);
//!
//! assert!(outcome.is_successful());
//! assert_eq!(ctx.payload().load(Ordering::Relaxed), 3);
//! ```

pub mod collector;
pub mod fanout;
pub mod pool;
pub mod supplier;

pub use collector::ParallelResultHandler;
pub use fanout::fan_out_step;
pub use pool::{default_pool_size, worker_pool_step};
pub use supplier::{Feeder, SliceSupplier, Supplier};
