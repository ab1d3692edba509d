//! Partitioned datasets
//!
//! Architecture:
//! - A [`PartitionedRange`] splits sample indices `0..n` into contiguous
//!   chunks, one per partition (range partitioning)
//! - Each partition is one unit of parallel work; samples inside a
//!   partition are generated sequentially
//! - Per-partition hit counts are summed into the final answer
//! - [`PartitionedRange::persist`] materializes every outcome once so later
//!   reductions skip generation entirely
//!
//! References:
//! - Leis et al. (2014): Morsel-driven parallelism for NUMA systems

use crate::context::ExecutionContext;
use crate::sampler::HitGenerator;
use crate::{Error, Result};
use rayon::prelude::*;
use std::ops::Range;
use std::sync::Arc;
use tracing::debug;

/// Sample indices `0..n` split into contiguous partitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionedRange {
    partitions: Vec<Range<u64>>,
}

impl PartitionedRange {
    /// Partition `0..n` into `num_partitions` ranges.
    ///
    /// The first `n % num_partitions` partitions get one extra index. When
    /// `n < num_partitions` the trailing partitions are empty.
    ///
    /// # Errors
    ///
    /// Returns error if `num_partitions` is zero
    pub fn new(n: u64, num_partitions: usize) -> Result<Self> {
        if num_partitions == 0 {
            return Err(Error::InvalidConfig(
                "num_partitions must be > 0".to_string(),
            ));
        }

        let count = num_partitions as u64;
        let base_size = n / count;
        let remainder = n % count;

        let mut partitions = Vec::with_capacity(num_partitions);
        let mut offset = 0;
        for id in 0..count {
            let size = if id < remainder { base_size + 1 } else { base_size };
            partitions.push(offset..offset + size);
            offset += size;
        }

        Ok(Self { partitions })
    }

    /// Index ranges, one per partition.
    #[must_use]
    pub fn partitions(&self) -> &[Range<u64>] {
        &self.partitions
    }

    /// Number of partitions.
    #[must_use]
    pub fn num_partitions(&self) -> usize {
        self.partitions.len()
    }

    /// Total number of sample indices.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.partitions.last().map_or(0, |r| r.end)
    }

    /// Whether the range covers no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Map every index through `generator` and sum the outcomes.
    ///
    /// Samples are regenerated on every call.
    pub fn map_reduce_hits<G>(&self, ctx: &ExecutionContext, generator: &G) -> u64
    where
        G: HitGenerator + ?Sized,
    {
        ctx.install(|| {
            self.partitions
                .par_iter()
                .map(|range| {
                    range
                        .clone()
                        .map(|i| u64::from(generator.hit(i)))
                        .sum::<u64>()
                })
                .sum()
        })
    }

    /// Generate every outcome once and keep them in memory.
    ///
    /// Evaluation is forced before returning; the result is read-only.
    pub fn persist<G>(&self, ctx: &ExecutionContext, generator: &G) -> CachedDataset
    where
        G: HitGenerator + ?Sized,
    {
        let partitions: Vec<Box<[u8]>> = ctx.install(|| {
            self.partitions
                .par_iter()
                .map(|range| range.clone().map(|i| generator.hit(i)).collect())
                .collect()
        });

        debug!(
            samples = self.len(),
            partitions = partitions.len(),
            "Persisted dataset"
        );

        CachedDataset {
            partitions: Arc::from(partitions),
            len: self.len(),
        }
    }
}

/// Materialized per-sample outcomes, shared read-only across reductions
///
/// Cloning is cheap: clones share the same outcome buffers.
#[derive(Debug, Clone)]
pub struct CachedDataset {
    partitions: Arc<[Box<[u8]>]>,
    len: u64,
}

impl CachedDataset {
    /// Total number of cached samples.
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.len
    }

    /// Whether the cache holds no samples.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of partitions.
    #[must_use]
    pub fn num_partitions(&self) -> usize {
        self.partitions.len()
    }

    /// Cached outcomes of one partition.
    #[must_use]
    pub fn partition(&self, index: usize) -> Option<&[u8]> {
        self.partitions.get(index).map(AsRef::as_ref)
    }

    /// Sum the cached outcomes in parallel.
    #[must_use]
    pub fn reduce_hits(&self, ctx: &ExecutionContext) -> u64 {
        ctx.install(|| {
            self.partitions
                .par_iter()
                .map(|outcomes| outcomes.iter().map(|&o| u64::from(o)).sum::<u64>())
                .sum()
        })
    }
}
