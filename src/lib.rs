//! # pi-bench: Monte Carlo PI Estimation Benchmark
//!
//! Estimates PI by throwing random darts at the square `[-1, 1)²` and
//! counting how many land inside the unit circle. The sampling work is
//! split across partitions and reduced in parallel on an explicit
//! [`ExecutionContext`](context::ExecutionContext), and every trial is
//! timed twice over:
//!
//! - **No caching**: each trial regenerates all of its samples
//! - **With caching**: samples are materialized once, then only reduced
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use pi_bench::context::ExecutionContext;
//! use pi_bench::harness::{BenchmarkHarness, TrialConfig};
//! use pi_bench::sampler::RandomSource;
//!
//! let ctx = ExecutionContext::builder().num_threads(2).build()?;
//! let config = TrialConfig::new(1_000, 4, 2)?;
//!
//! let mut harness = BenchmarkHarness::new(&ctx, Arc::new(RandomSource::Thread));
//! let records = harness.run_cycles(&config)?;
//! assert_eq!(records.len(), 4);
//!
//! for record in &records {
//!     println!("{}", pi_bench::report::format_record(record));
//! }
//! drop(harness);
//! ctx.stop();
//! # Ok::<(), pi_bench::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod cli;
pub mod context;
pub mod dataset;
pub mod error;
pub mod harness;
pub mod report;
pub mod sampler;
pub mod strategy;

pub use error::{Error, Result};
