// Rust guideline compliant 2026-02-16

//! Randomizer transform (spec §4.1.1 step 3): multiplies each period's
//! signal count by a factor sampled from a direction-dependent range,
//! drawn in bulk and cyclically reshuffled once exhausted.

use rand::seq::SliceRandom;
use rand::Rng;

/// Which side of `1.0` the sampled factor may fall on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RandomizerDirection {
    Decrease,
    Increase,
    Mixed,
}

/// Validated configuration for a [`Randomizer`].
#[derive(Debug, Clone, Copy)]
pub struct RandomizerConfig {
    pub direction: RandomizerDirection,
    /// `d` in `[1-d, 1]` / `[1, 1+d]` / `[1-d, 1+d]`.
    pub deviation: f64,
    /// Bulk sample size; default 1024 per spec.
    pub sampling: usize,
}

impl Default for RandomizerConfig {
    fn default() -> Self {
        Self { direction: RandomizerDirection::Mixed, deviation: 0.0, sampling: 1024 }
    }
}

/// Cyclic source of randomizer factors.
///
/// Draws `sampling` factors up front; each full pass is reshuffled in place,
/// matching the source's "shuffle on exhaustion" generator.
pub struct Randomizer {
    factors: Vec<f64>,
    cursor: usize,
}

impl std::fmt::Debug for Randomizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Randomizer").field("sampling", &self.factors.len()).field("cursor", &self.cursor).finish()
    }
}

impl Randomizer {
    pub fn new(config: RandomizerConfig, rng: &mut impl Rng) -> Self {
        let (low, high) = match config.direction {
            RandomizerDirection::Decrease => (1.0 - config.deviation, 1.0),
            RandomizerDirection::Increase => (1.0, 1.0 + config.deviation),
            RandomizerDirection::Mixed => (1.0 - config.deviation, 1.0 + config.deviation),
        };
        let factors = (0..config.sampling.max(1)).map(|_| rng.random_range(low..=high)).collect();
        Self { factors, cursor: 0 }
    }

    /// Draw the next factor, reshuffling once the sample is exhausted.
    pub fn next_factor(&mut self, rng: &mut impl Rng) -> f64 {
        if self.cursor >= self.factors.len() {
            self.factors.shuffle(rng);
            self.cursor = 0;
        }
        let factor = self.factors[self.cursor];
        self.cursor += 1;
        factor
    }
}

#[cfg(test)]
mod tests {
    use super::{Randomizer, RandomizerConfig, RandomizerDirection};
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn decrease_direction_stays_at_or_below_one() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut randomizer = Randomizer::new(
            RandomizerConfig { direction: RandomizerDirection::Decrease, deviation: 0.5, sampling: 32 },
            &mut rng,
        );
        for _ in 0..64 {
            let f = randomizer.next_factor(&mut rng);
            assert!((0.5..=1.0).contains(&f));
        }
    }

    #[test]
    fn increase_direction_stays_at_or_above_one() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut randomizer = Randomizer::new(
            RandomizerConfig { direction: RandomizerDirection::Increase, deviation: 0.3, sampling: 16 },
            &mut rng,
        );
        for _ in 0..32 {
            let f = randomizer.next_factor(&mut rng);
            assert!((1.0..=1.3).contains(&f));
        }
    }
}
