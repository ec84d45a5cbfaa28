//! Conveyor - Composable Step Pipelines
//!
//! A library for building pipelines of named steps that execute
//! sequentially, with a concurrent extension that runs many independent
//! sub-pipelines in parallel and reduces their outcomes into a single
//! combined result. Parallelism is either unbounded (one thread per task)
//! or constrained by a fixed-size worker pool.
//!
//! # Architecture
//!
//! The library is organized into four main modules:
//!
//! - [`context`]: Typed execution context and cooperative cancellation
//! - [`pipeline`]: Steps, outcomes and the sequential runner
//! - [`parallel`]: Fan-out and worker-pool execution of sub-pipelines
//! - [`predicate`]: Conditional step execution
//!
//! # Example
//!
//! ```
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use conveyor::{Context, Pipeline, Step};
//!
//! let pipeline: Pipeline<AtomicU64> = Pipeline::new()
//!     .add_step(Step::from_fn("prepare", |ctx: &Context<AtomicU64>| {
//!         ctx.payload().fetch_add(1, Ordering::Relaxed);
//!         Ok(())
//!     }))
//!     .add_step(Step::from_fn("publish", |ctx: &Context<AtomicU64>| {
//!         ctx.payload().fetch_add(1, Ordering::Relaxed);
//!         Ok(())
//!     }));
//!
//! let ctx = Context::new(AtomicU64::new(0));
//! let outcome = pipeline.run_with_context(&ctx);
//!
//! assert!(outcome.is_successful());
//! assert_eq!(ctx.payload().load(Ordering::Relaxed), 2);
//! ```

pub mod context;
pub mod error;
pub mod parallel;
pub mod pipeline;
pub mod predicate;

// Re-export commonly used types
pub use context::{CancelCause, CancelSignal, Context};
pub use error::{BoxError, Error};
pub use pipeline::{DependencyRecorder, Options, Outcome, Pipeline, Step};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
