// Rust guideline compliant 2026-02-16

//! Spreader transform (spec §4.1.1 step 4): distributes a period's signal
//! count across the period using a sampled, sorted distribution.

use domain::InitError;
use rand::distr::Uniform;
use rand::Rng;
use rand_distr::{Beta, Distribution as _, Triangular};

/// Which sampling distribution spreads signals within a period.
#[derive(Debug, Clone, Copy)]
pub enum Spreader {
    Uniform { low: f64, high: f64 },
    Triangular { left: f64, mode: f64, right: f64 },
    Beta { a: f64, b: f64 },
}

impl Spreader {
    /// Validate shape constraints (spec §4.1.1: `left <= mode <= right` and
    /// not all three equal for `triangular`).
    ///
    /// # Errors
    ///
    /// Returns [`InitError`] if the triangular bounds are degenerate.
    pub fn validate(self) -> Result<Self, InitError> {
        if let Spreader::Triangular { left, mode, right } = self
            && !(left <= mode && mode <= right && !(left == mode && mode == right))
        {
            return Err(InitError {
                reason: "triangular spreader requires left <= mode <= right, not all equal".to_owned(),
                context: domain::errors::context([]),
            });
        }
        Ok(self)
    }

    /// Sample `size` fractions in `[0, 1]`, sorted ascending.
    #[must_use]
    pub fn sample(self, size: usize, rng: &mut impl Rng) -> Vec<f64> {
        let mut values: Vec<f64> = match self {
            Spreader::Uniform { low, high } => {
                let dist = Uniform::new_inclusive(low, high).expect("validated bounds");
                (0..size).map(|_| dist.sample(rng)).collect()
            }
            Spreader::Triangular { left, mode, right } => {
                let dist = Triangular::new(left, right, mode).expect("validated bounds");
                (0..size).map(|_| dist.sample(rng)).collect()
            }
            Spreader::Beta { a, b } => {
                let dist = Beta::new(a, b).expect("validated shape parameters");
                (0..size).map(|_| dist.sample(rng)).collect()
            }
        };
        values.sort_by(|a, b| a.partial_cmp(b).expect("distribution samples are never NaN"));
        values
    }
}

#[cfg(test)]
mod tests {
    use super::Spreader;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn uniform_sample_is_sorted_and_bounded() {
        let mut rng = StdRng::seed_from_u64(7);
        let values = Spreader::Uniform { low: 0.0, high: 1.0 }.sample(50, &mut rng);
        assert_eq!(values.len(), 50);
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        assert!(values.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn triangular_rejects_degenerate_bounds() {
        let err = Spreader::Triangular { left: 1.0, mode: 1.0, right: 1.0 }.validate();
        assert!(err.is_err());
    }

    #[test]
    fn triangular_accepts_valid_bounds() {
        let ok = Spreader::Triangular { left: 0.0, mode: 0.5, right: 1.0 }.validate();
        assert!(ok.is_ok());
    }
}
