//! Execution context
//!
//! Owns the worker thread pool every map/reduce runs on. The context is
//! created explicitly at the start of a benchmark, passed to whatever needs
//! parallelism, and released with [`ExecutionContext::stop`]. There is no
//! process-wide session.

use crate::dataset::PartitionedRange;
use crate::Result;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info};

/// Default application name reported in logs
pub const DEFAULT_APP_NAME: &str = "pi-bench";

/// Explicit owner of the parallel execution resources
pub struct ExecutionContext {
    app_name: String,
    pool: ThreadPool,
}

impl ExecutionContext {
    /// Create a context with the default name and a pool sized by rayon.
    ///
    /// # Errors
    ///
    /// Returns error if the thread pool cannot be built
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a context builder
    #[must_use]
    pub fn builder() -> ExecutionContextBuilder {
        ExecutionContextBuilder::default()
    }

    /// Application name given at construction.
    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Number of worker threads in the pool.
    #[must_use]
    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `op` inside the context's pool.
    ///
    /// Parallel iterators used by `op` execute on this pool's workers.
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }

    /// Split sample indices `0..n` into `partitions` contiguous ranges.
    ///
    /// # Errors
    ///
    /// Returns error if `partitions` is zero
    pub fn parallelize(&self, n: u64, partitions: usize) -> Result<PartitionedRange> {
        PartitionedRange::new(n, partitions)
    }

    /// Release the thread pool.
    ///
    /// Consumes the context; outstanding work finishes before workers exit.
    pub fn stop(self) {
        info!(app = %self.app_name, "Stopping execution context");
        drop(self.pool);
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("app_name", &self.app_name)
            .field("num_threads", &self.num_threads())
            .finish()
    }
}

/// Execution context builder
#[derive(Debug, Default)]
pub struct ExecutionContextBuilder {
    app_name: Option<String>,
    num_threads: Option<usize>,
}

impl ExecutionContextBuilder {
    /// Set the application name used in logs and worker thread names
    #[must_use]
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    /// Set the worker thread count (`0` lets rayon decide)
    #[must_use]
    pub fn num_threads(mut self, threads: usize) -> Self {
        self.num_threads = Some(threads);
        self
    }

    /// Build the context and start its worker threads
    ///
    /// # Errors
    ///
    /// Returns error if the thread pool cannot be built
    pub fn build(self) -> Result<ExecutionContext> {
        let app_name = self.app_name.unwrap_or_else(|| DEFAULT_APP_NAME.to_string());
        let thread_prefix = app_name.clone();
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.num_threads.unwrap_or(0))
            .thread_name(move |i| format!("{thread_prefix}-worker-{i}"))
            .build()?;

        info!(
            app = %app_name,
            threads = pool.current_num_threads(),
            "Started execution context"
        );
        debug!(requested_threads = ?self.num_threads, "Thread pool configuration");

        Ok(ExecutionContext { app_name, pool })
    }
}
