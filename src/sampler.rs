//! Sample generator (dart-throwing estimator)
//!
//! A sample is one point drawn uniformly from the square `[-1, 1)²`. It is a
//! hit when it lies strictly inside the unit circle; the ratio of hits to
//! samples approaches `PI / 4`.
//!
//! Generators never share mutable RNG state between threads: the thread
//! source draws from a thread-local generator, the OS source asks the
//! operating system on every call.

use rand::rngs::OsRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One random point in `[-1, 1)²`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    x: f64,
    y: f64,
}

impl Sample {
    /// Create a sample at the given coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Draw a sample with each axis independent and uniform on `[-1, 1)`.
    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            x: rng.gen_range(-1.0..1.0),
            y: rng.gen_range(-1.0..1.0),
        }
    }

    /// X coordinate.
    #[must_use]
    pub const fn x(&self) -> f64 {
        self.x
    }

    /// Y coordinate.
    #[must_use]
    pub const fn y(&self) -> f64 {
        self.y
    }

    /// Whether the point lies strictly inside the unit circle.
    #[must_use]
    pub fn inside(&self) -> bool {
        self.x.mul_add(self.x, self.y * self.y) < 1.0
    }

    /// `1` for a hit, `0` for a miss.
    #[must_use]
    pub fn outcome(&self) -> u8 {
        u8::from(self.inside())
    }
}

/// Produces one hit/miss outcome per sample index.
///
/// The index identifies the sample within a dataset. Random generators
/// ignore it; scripted generators use it to replay a fixed sequence.
pub trait HitGenerator: Send + Sync {
    /// Return `1` if sample `index` is inside the unit circle, else `0`.
    fn hit(&self, index: u64) -> u8;
}

/// Source of randomness for [`HitGenerator`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RandomSource {
    /// Thread-local CSPRNG, seeded once per worker thread
    #[default]
    Thread,
    /// Operating-system entropy, queried on every draw
    Os,
}

impl HitGenerator for RandomSource {
    fn hit(&self, _index: u64) -> u8 {
        let sample = match self {
            Self::Thread => Sample::draw(&mut rand::thread_rng()),
            Self::Os => Sample::draw(&mut OsRng),
        };
        sample.outcome()
    }
}

/// Scripted generator replaying a fixed outcome sequence.
///
/// Sample `index` yields `outcomes[index % outcomes.len()]`, so results do
/// not depend on how samples are spread across partitions or threads. An
/// empty script always misses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedOutcomes {
    outcomes: Vec<u8>,
}

impl FixedOutcomes {
    /// Create a generator from outcomes; any non-zero value counts as a hit.
    #[must_use]
    pub fn new(outcomes: impl Into<Vec<u8>>) -> Self {
        let outcomes = outcomes.into().into_iter().map(|o| u8::from(o != 0)).collect();
        Self { outcomes }
    }

    /// The scripted outcomes.
    #[must_use]
    pub fn outcomes(&self) -> &[u8] {
        &self.outcomes
    }
}

impl HitGenerator for FixedOutcomes {
    fn hit(&self, index: u64) -> u8 {
        if self.outcomes.is_empty() {
            return 0;
        }
        #[allow(clippy::cast_possible_truncation)]
        let slot = (index % self.outcomes.len() as u64) as usize;
        self.outcomes[slot]
    }
}
