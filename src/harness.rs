//! Benchmark harness
//!
//! Drives timed PI estimation trials through the two hit counting
//! strategies and records one [`ResultRecord`] per trial.
//!
//! ## Cycle layout
//!
//! ```text
//! run_cycles(config), n = iterations_per_partition × partitions
//!   ├── No caching   : cycles × (generate n samples → reduce)
//!   ├── persist      : generate n samples once, force evaluation
//!   └── With caching : cycles × (reduce cached samples)
//! ```

use crate::context::ExecutionContext;
use crate::sampler::HitGenerator;
use crate::strategy::{CachingMode, HitCounter};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Default samples generated per partition
pub const DEFAULT_ITERATIONS_PER_PARTITION: u64 = 100_000;

/// Default number of partitions
pub const DEFAULT_PARTITIONS: usize = 8;

/// Default number of trials per caching mode
pub const DEFAULT_CYCLES: usize = 5;

/// Shape of one benchmark cycle run.
///
/// Immutable once constructed; construction rejects configurations with no
/// samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialConfig {
    iterations_per_partition: u64,
    partitions: usize,
    cycles: usize,
}

impl TrialConfig {
    /// Create a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns error if `partitions` or `iterations_per_partition` is zero,
    /// or if their product overflows `u64`
    pub fn new(iterations_per_partition: u64, partitions: usize, cycles: usize) -> Result<Self> {
        if partitions == 0 {
            return Err(Error::InvalidConfig(
                "partitions must be > 0".to_string(),
            ));
        }
        if iterations_per_partition == 0 {
            return Err(Error::InvalidConfig(
                "iterations_per_partition must be > 0".to_string(),
            ));
        }
        if iterations_per_partition.checked_mul(partitions as u64).is_none() {
            return Err(Error::InvalidConfig(format!(
                "{iterations_per_partition} iterations × {partitions} partitions overflows the sample count"
            )));
        }

        Ok(Self {
            iterations_per_partition,
            partitions,
            cycles,
        })
    }

    /// Create a builder starting from the default configuration.
    #[must_use]
    pub const fn builder() -> TrialConfigBuilder {
        TrialConfigBuilder::new()
    }

    /// Samples generated per partition.
    #[must_use]
    pub const fn iterations_per_partition(&self) -> u64 {
        self.iterations_per_partition
    }

    /// Number of partitions.
    #[must_use]
    pub const fn partitions(&self) -> usize {
        self.partitions
    }

    /// Trials per caching mode.
    #[must_use]
    pub const fn cycles(&self) -> usize {
        self.cycles
    }

    /// Total samples per trial: `iterations_per_partition × partitions`.
    #[must_use]
    pub const fn total_samples(&self) -> u64 {
        self.iterations_per_partition * self.partitions as u64
    }
}

/// Builder for `TrialConfig`.
#[derive(Debug, Clone, Copy)]
pub struct TrialConfigBuilder {
    iterations_per_partition: u64,
    partitions: usize,
    cycles: usize,
}

impl TrialConfigBuilder {
    /// Create a builder with the default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            iterations_per_partition: DEFAULT_ITERATIONS_PER_PARTITION,
            partitions: DEFAULT_PARTITIONS,
            cycles: DEFAULT_CYCLES,
        }
    }

    /// Set samples generated per partition.
    #[must_use]
    pub const fn iterations_per_partition(mut self, iterations: u64) -> Self {
        self.iterations_per_partition = iterations;
        self
    }

    /// Set the number of partitions.
    #[must_use]
    pub const fn partitions(mut self, partitions: usize) -> Self {
        self.partitions = partitions;
        self
    }

    /// Set trials per caching mode.
    #[must_use]
    pub const fn cycles(mut self, cycles: usize) -> Self {
        self.cycles = cycles;
        self
    }

    /// Build the `TrialConfig`.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid (see [`TrialConfig::new`])
    pub fn build(self) -> Result<TrialConfig> {
        TrialConfig::new(self.iterations_per_partition, self.partitions, self.cycles)
    }
}

impl Default for TrialConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of one timed trial.
///
/// The estimate is always exactly `4 × hits / samples`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultRecord {
    description: String,
    iteration: usize,
    samples: u64,
    hits: u64,
    elapsed_secs: f64,
    pi_estimate: f64,
}

impl ResultRecord {
    /// Create a record, deriving the PI estimate from `hits / samples`.
    ///
    /// # Errors
    ///
    /// Returns error if `samples` is zero or `hits > samples`
    pub fn new(
        description: impl Into<String>,
        iteration: usize,
        samples: u64,
        hits: u64,
        elapsed: Duration,
    ) -> Result<Self> {
        if samples == 0 {
            return Err(Error::EmptyTrial);
        }
        if hits > samples {
            return Err(Error::HitsExceedSamples { hits, samples });
        }

        Ok(Self {
            description: description.into(),
            iteration,
            samples,
            hits,
            elapsed_secs: elapsed.as_secs_f64(),
            pi_estimate: estimate_pi(hits, samples),
        })
    }

    /// Trial description (label).
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Iteration index within its cycle run.
    #[must_use]
    pub const fn iteration(&self) -> usize {
        self.iteration
    }

    /// Total samples reduced.
    #[must_use]
    pub const fn samples(&self) -> u64 {
        self.samples
    }

    /// Samples that fell inside the unit circle.
    #[must_use]
    pub const fn hits(&self) -> u64 {
        self.hits
    }

    /// Wall-clock seconds spent in the reduction.
    #[must_use]
    pub const fn elapsed_secs(&self) -> f64 {
        self.elapsed_secs
    }

    /// `4 × hits / samples`.
    #[must_use]
    pub const fn pi_estimate(&self) -> f64 {
        self.pi_estimate
    }
}

/// `4 × hits / samples`; callers guarantee `samples > 0`.
#[allow(clippy::cast_precision_loss)]
fn estimate_pi(hits: u64, samples: u64) -> f64 {
    4.0 * hits as f64 / samples as f64
}

/// Runs trials on an execution context and keeps their records.
pub struct BenchmarkHarness<'ctx> {
    ctx: &'ctx ExecutionContext,
    generator: Arc<dyn HitGenerator>,
    label_prefix: Option<String>,
    results: Vec<ResultRecord>,
}

impl<'ctx> BenchmarkHarness<'ctx> {
    /// Create a harness drawing samples from `generator`.
    #[must_use]
    pub fn new(ctx: &'ctx ExecutionContext, generator: Arc<dyn HitGenerator>) -> Self {
        Self {
            ctx,
            generator,
            label_prefix: None,
            results: Vec::new(),
        }
    }

    /// Prefix every trial description with `prefix`.
    #[must_use]
    pub fn with_label_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.label_prefix = (!prefix.is_empty()).then_some(prefix);
        self
    }

    /// Description used for trials in `mode`.
    #[must_use]
    pub fn label(&self, mode: CachingMode) -> String {
        match &self.label_prefix {
            Some(prefix) => format!("{prefix} {}", mode.label()),
            None => mode.label().to_string(),
        }
    }

    /// Records captured so far, in execution order.
    #[must_use]
    pub fn results(&self) -> &[ResultRecord] {
        &self.results
    }

    /// Consume the harness, returning its records.
    #[must_use]
    pub fn into_results(self) -> Vec<ResultRecord> {
        self.results
    }

    /// Time one hit-counting reduction over `n` samples and record it.
    ///
    /// # Errors
    ///
    /// Returns error if `n` is zero or the counter fails
    pub fn run_trial(
        &mut self,
        label: &str,
        iteration: usize,
        n: u64,
        counter: &dyn HitCounter,
    ) -> Result<ResultRecord> {
        if n == 0 {
            return Err(Error::EmptyTrial);
        }

        let start = Instant::now();
        let hits = counter.reduce_hits(self.ctx, n)?;
        let elapsed = start.elapsed();

        let record = ResultRecord::new(label, iteration, n, hits, elapsed)?;
        debug!(
            label,
            iteration,
            samples = n,
            hits,
            secs = record.elapsed_secs(),
            pi = record.pi_estimate(),
            "Trial complete"
        );

        self.results.push(record.clone());
        Ok(record)
    }

    /// Run `cycles` trials without caching, persist one dataset, then run
    /// `cycles` trials against it.
    ///
    /// Returns the records produced by this call; they are also appended to
    /// [`results`](Self::results). With zero cycles nothing runs and no
    /// dataset is materialized.
    ///
    /// # Errors
    ///
    /// Returns error if any trial fails
    pub fn run_cycles(&mut self, config: &TrialConfig) -> Result<Vec<ResultRecord>> {
        let first = self.results.len();
        if config.cycles() == 0 {
            return Ok(Vec::new());
        }

        let n = config.total_samples();
        info!(
            samples = n,
            partitions = config.partitions(),
            cycles = config.cycles(),
            "Running benchmark cycles"
        );

        for mode in CachingMode::ALL {
            let counter = mode.strategy(
                self.ctx,
                Arc::clone(&self.generator),
                n,
                config.partitions(),
            )?;
            let label = self.label(mode);
            for iteration in 0..config.cycles() {
                self.run_trial(&label, iteration, n, counter.as_ref())?;
            }
        }

        Ok(self.results[first..].to_vec())
    }

    /// Run [`run_cycles`](Self::run_cycles) once per iterations-per-partition
    /// value, in order.
    ///
    /// # Errors
    ///
    /// Returns error if any configuration is invalid or any trial fails
    pub fn run_sweep(
        &mut self,
        iterations_per_partition: &[u64],
        partitions: usize,
        cycles: usize,
    ) -> Result<Vec<ResultRecord>> {
        let mut records = Vec::new();
        for &iterations in iterations_per_partition {
            let config = TrialConfig::new(iterations, partitions, cycles)?;
            records.extend(self.run_cycles(&config)?);
        }
        Ok(records)
    }
}

impl std::fmt::Debug for BenchmarkHarness<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenchmarkHarness")
            .field("ctx", self.ctx)
            .field("label_prefix", &self.label_prefix)
            .field("results", &self.results.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::FixedOutcomes;
    use crate::strategy::Regenerate;

    fn test_ctx() -> ExecutionContext {
        ExecutionContext::builder().num_threads(2).build().unwrap()
    }

    fn stub() -> Arc<dyn HitGenerator> {
        Arc::new(FixedOutcomes::new(vec![1, 0, 1, 1]))
    }

    #[test]
    fn test_trial_config_defaults() {
        let config = TrialConfig::builder().build().unwrap();
        assert_eq!(config.iterations_per_partition(), 100_000);
        assert_eq!(config.partitions(), 8);
        assert_eq!(config.cycles(), 5);
        assert_eq!(config.total_samples(), 800_000);
    }

    #[test]
    fn test_trial_config_rejects_empty() {
        assert!(matches!(TrialConfig::new(0, 8, 5), Err(Error::InvalidConfig(_))));
        assert!(matches!(TrialConfig::new(10, 0, 5), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_trial_config_rejects_overflow() {
        assert!(matches!(TrialConfig::new(u64::MAX, 2, 1), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_record_estimate_identity() {
        let record = ResultRecord::new("x", 0, 4, 3, Duration::ZERO).unwrap();
        assert!((record.pi_estimate() - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_record_rejects_invalid_counts() {
        assert!(matches!(
            ResultRecord::new("x", 0, 0, 0, Duration::ZERO),
            Err(Error::EmptyTrial)
        ));
        assert!(matches!(
            ResultRecord::new("x", 0, 2, 3, Duration::ZERO),
            Err(Error::HitsExceedSamples { hits: 3, samples: 2 })
        ));
    }

    #[test]
    fn test_run_trial_stubbed_generator() {
        let ctx = test_ctx();
        let mut harness = BenchmarkHarness::new(&ctx, stub());
        let counter = Regenerate::new(stub(), 2).unwrap();

        let record = harness.run_trial("stub", 0, 4, &counter).unwrap();

        assert_eq!(record.hits(), 3);
        assert!((record.pi_estimate() - 3.0).abs() < f64::EPSILON);
        assert_eq!(harness.results().len(), 1);
    }

    #[test]
    fn test_run_trial_rejects_zero_samples() {
        let ctx = test_ctx();
        let mut harness = BenchmarkHarness::new(&ctx, stub());
        let counter = Regenerate::new(stub(), 2).unwrap();

        assert!(matches!(harness.run_trial("stub", 0, 0, &counter), Err(Error::EmptyTrial)));
        assert!(harness.results().is_empty());
    }

    #[test]
    fn test_label_prefix() {
        let ctx = test_ctx();
        let harness = BenchmarkHarness::new(&ctx, stub()).with_label_prefix("pi3");
        assert_eq!(harness.label(CachingMode::None), "pi3 No caching");
        let harness = BenchmarkHarness::new(&ctx, stub()).with_label_prefix("");
        assert_eq!(harness.label(CachingMode::Persisted), "With caching");
    }

    #[test]
    fn test_run_cycles_layout() {
        let ctx = test_ctx();
        let mut harness = BenchmarkHarness::new(&ctx, stub());
        let config = TrialConfig::new(2, 2, 3).unwrap();

        let records = harness.run_cycles(&config).unwrap();

        assert_eq!(records.len(), 6);
        for (i, record) in records.iter().take(3).enumerate() {
            assert_eq!(record.description(), "No caching");
            assert_eq!(record.iteration(), i);
        }
        for (i, record) in records.iter().skip(3).enumerate() {
            assert_eq!(record.description(), "With caching");
            assert_eq!(record.iteration(), i);
        }
        assert!(records.iter().all(|r| r.samples() == 4 && r.hits() == 3));
    }

    #[test]
    fn test_run_cycles_zero_cycles() {
        let ctx = test_ctx();
        let mut harness = BenchmarkHarness::new(&ctx, stub());
        let config = TrialConfig::new(10, 2, 0).unwrap();

        assert!(harness.run_cycles(&config).unwrap().is_empty());
        assert!(harness.results().is_empty());
    }

    #[test]
    fn test_run_sweep_appends_in_order() {
        let ctx = test_ctx();
        let mut harness = BenchmarkHarness::new(&ctx, stub());

        let records = harness.run_sweep(&[1, 2], 2, 1).unwrap();

        let samples: Vec<u64> = records.iter().map(ResultRecord::samples).collect();
        assert_eq!(samples, vec![2, 2, 4, 4]);
        assert_eq!(harness.into_results().len(), 4);
    }
}
