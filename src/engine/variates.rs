//! Seedable source of uniform and Poisson variates.
//!
//! Every stochastic component takes a `&mut VariateSource` instead of reaching
//! for a global generator, so tests can pin the seed and production code can
//! use an entropy-seeded instance.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Poisson};

#[derive(Debug, Clone)]
pub struct VariateSource {
    rng: ChaCha8Rng,
}

impl VariateSource {
    /// Deterministic source: the same seed always yields the same stream.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Source seeded from the thread-local OS-backed generator.
    pub fn from_entropy() -> Self {
        Self::seeded(rand::random())
    }

    /// Seeded when a seed is supplied, entropy-backed otherwise.
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }

    /// One draw from `[low, high)`. A degenerate range returns `low`.
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        self.rng.gen_range(low..high)
    }

    pub fn uniform_vector(&mut self, low: f64, high: f64, n: usize) -> Vec<f64> {
        (0..n).map(|_| self.uniform(low, high)).collect()
    }

    /// `n` Poisson counts with mean `rate`.
    ///
    /// `rate` must be positive and finite; callers validate before sampling.
    /// A violating rate yields all-zero counts in release builds.
    pub fn poisson(&mut self, rate: f64, n: usize) -> Vec<u32> {
        debug_assert!(rate.is_finite() && rate > 0.0, "poisson rate must be > 0");
        let Ok(dist) = Poisson::new(rate) else {
            return vec![0; n];
        };
        (0..n).map(|_| dist.sample(&mut self.rng) as u32).collect()
    }
}

impl Default for VariateSource {
    fn default() -> Self {
        Self::from_entropy()
    }
}
