//! Error types for pi-bench
//!
//! Every message names the offending value so a failed benchmark run can be
//! fixed from the command line without reading the source.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// pi-bench error types
#[derive(Error, Debug)]
pub enum Error {
    /// Trial configuration rejected at construction time
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A trial over zero samples has no defined PI estimate
    #[error("Empty trial: sample count must be > 0 to estimate PI")]
    EmptyTrial,

    /// A reduction counted more hits than samples (critical bug)
    #[error("Hit count {hits} exceeds sample count {samples}\nThe reduction is miscounting. Please report this issue.")]
    HitsExceedSamples {
        /// Hits reported by the reduction
        hits: u64,
        /// Samples the reduction was asked to cover
        samples: u64,
    },

    /// A cached dataset was asked to stand in for a different sample count
    #[error("Cached dataset holds {cached} samples but {requested} were requested")]
    CacheSizeMismatch {
        /// Samples materialized in the cache
        cached: u64,
        /// Samples the trial asked for
        requested: u64,
    },

    /// Worker thread pool could not be created
    #[error("Thread pool build failed: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// JSON report serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
