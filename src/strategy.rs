//! Hit counting strategies
//!
//! Both strategies answer the same question, "how many of `n` samples hit
//! the circle", and differ only in where the outcomes come from:
//!
//! - [`Regenerate`]: draws `n` fresh samples across the partitions on every
//!   call (no caching)
//! - [`Cached`]: reduces outcomes materialized once by
//!   [`PartitionedRange::persist`] (with caching)

use crate::context::ExecutionContext;
use crate::dataset::{CachedDataset, PartitionedRange};
use crate::sampler::HitGenerator;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Counts hits over `n` samples.
pub trait HitCounter: Send + Sync {
    /// Reduce `n` sample outcomes to a hit count.
    ///
    /// # Errors
    ///
    /// Returns error if the strategy cannot cover exactly `n` samples
    fn reduce_hits(&self, ctx: &ExecutionContext, n: u64) -> Result<u64>;

    /// Caching mode this strategy implements.
    fn mode(&self) -> CachingMode;
}

/// Whether trials regenerate samples or reuse a persisted dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CachingMode {
    /// Regenerate every sample on each reduction
    None,
    /// Reduce a dataset materialized once up front
    Persisted,
}

impl CachingMode {
    /// Both modes, in the order a benchmark cycle runs them.
    pub const ALL: [Self; 2] = [Self::None, Self::Persisted];

    /// Human-readable label used in result descriptions.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "No caching",
            Self::Persisted => "With caching",
        }
    }

    /// Build the strategy for this mode over `n` samples.
    ///
    /// For [`CachingMode::Persisted`] this generates and materializes all `n`
    /// outcomes before returning.
    ///
    /// # Errors
    ///
    /// Returns error if `partitions` is zero
    pub fn strategy(
        self,
        ctx: &ExecutionContext,
        generator: Arc<dyn HitGenerator>,
        n: u64,
        partitions: usize,
    ) -> Result<Box<dyn HitCounter>> {
        match self {
            Self::None => Ok(Box::new(Regenerate::new(generator, partitions)?)),
            Self::Persisted => {
                let start = Instant::now();
                let dataset = ctx.parallelize(n, partitions)?.persist(ctx, &*generator);
                info!(
                    samples = n,
                    partitions,
                    secs = start.elapsed().as_secs_f64(),
                    "Materialized cached dataset"
                );
                Ok(Box::new(Cached::new(dataset)))
            }
        }
    }
}

impl std::fmt::Display for CachingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// No caching: fresh samples on every reduction
pub struct Regenerate {
    generator: Arc<dyn HitGenerator>,
    partitions: usize,
}

impl Regenerate {
    /// Create a strategy spreading samples over `partitions`.
    ///
    /// # Errors
    ///
    /// Returns error if `partitions` is zero
    pub fn new(generator: Arc<dyn HitGenerator>, partitions: usize) -> Result<Self> {
        if partitions == 0 {
            return Err(Error::InvalidConfig(
                "num_partitions must be > 0".to_string(),
            ));
        }
        Ok(Self {
            generator,
            partitions,
        })
    }

    /// Number of partitions each reduction is split into.
    #[must_use]
    pub const fn partitions(&self) -> usize {
        self.partitions
    }
}

impl HitCounter for Regenerate {
    fn reduce_hits(&self, ctx: &ExecutionContext, n: u64) -> Result<u64> {
        let range = ctx.parallelize(n, self.partitions)?;
        Ok(range.map_reduce_hits(ctx, &*self.generator))
    }

    fn mode(&self) -> CachingMode {
        CachingMode::None
    }
}

/// With caching: repeated reductions over one persisted dataset
#[derive(Debug, Clone)]
pub struct Cached {
    dataset: CachedDataset,
}

impl Cached {
    /// Wrap an already materialized dataset.
    #[must_use]
    pub const fn new(dataset: CachedDataset) -> Self {
        Self { dataset }
    }

    /// The persisted dataset.
    #[must_use]
    pub const fn dataset(&self) -> &CachedDataset {
        &self.dataset
    }
}

impl HitCounter for Cached {
    fn reduce_hits(&self, ctx: &ExecutionContext, n: u64) -> Result<u64> {
        if n != self.dataset.len() {
            return Err(Error::CacheSizeMismatch {
                cached: self.dataset.len(),
                requested: n,
            });
        }
        Ok(self.dataset.reduce_hits(ctx))
    }

    fn mode(&self) -> CachingMode {
        CachingMode::Persisted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::FixedOutcomes;

    fn test_ctx() -> ExecutionContext {
        ExecutionContext::builder().num_threads(2).build().unwrap()
    }

    #[test]
    fn test_caching_mode_labels() {
        assert_eq!(CachingMode::None.label(), "No caching");
        assert_eq!(CachingMode::Persisted.label(), "With caching");
        assert_eq!(CachingMode::Persisted.to_string(), "With caching");
    }

    #[test]
    fn test_regenerate_counts_stubbed_hits() {
        let ctx = test_ctx();
        let strategy = Regenerate::new(Arc::new(FixedOutcomes::new(vec![1, 0, 1, 1])), 2).unwrap();
        assert_eq!(strategy.reduce_hits(&ctx, 4).unwrap(), 3);
        assert_eq!(strategy.mode(), CachingMode::None);
        ctx.stop();
    }

    #[test]
    fn test_regenerate_rejects_zero_partitions() {
        let result = Regenerate::new(Arc::new(FixedOutcomes::new(vec![1])), 0);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_cached_counts_stubbed_hits() {
        let ctx = test_ctx();
        let strategy = CachingMode::Persisted
            .strategy(&ctx, Arc::new(FixedOutcomes::new(vec![1, 0, 1, 1])), 4, 3)
            .unwrap();
        assert_eq!(strategy.mode(), CachingMode::Persisted);
        assert_eq!(strategy.reduce_hits(&ctx, 4).unwrap(), 3);
        assert_eq!(strategy.reduce_hits(&ctx, 4).unwrap(), 3);
        ctx.stop();
    }

    #[test]
    fn test_cached_rejects_size_mismatch() {
        let ctx = test_ctx();
        let strategy = CachingMode::Persisted
            .strategy(&ctx, Arc::new(FixedOutcomes::new(vec![1])), 10, 2)
            .unwrap();
        let result = strategy.reduce_hits(&ctx, 11);
        assert!(matches!(
            result,
            Err(Error::CacheSizeMismatch {
                cached: 10,
                requested: 11
            })
        ));
        ctx.stop();
    }
}
