use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::error::{OperationError, Result};

const SLACK: f64 = 1e-9;

/// Draws parcel frontage widths from a clamped normal distribution.
#[derive(Debug, Clone, Copy)]
pub struct WidthSampler {
    min: f64,
    max: f64,
    normal: Normal<f64>,
}

impl WidthSampler {
    /// Creates a sampler with mean `(min + max) / 2` and the given variance.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` unless `0 < min <= max`, or if
    /// the distribution cannot be built from the variance.
    pub fn new(min: f64, max: f64, variance: f64) -> Result<Self> {
        if !(min > 0.0 && min <= max && max.is_finite()) {
            return Err(OperationError::InvalidInput(format!(
                "width range [{min}, {max}] must be positive and ordered"
            ))
            .into());
        }
        let normal = Normal::new(0.5 * (min + max), variance.sqrt())
            .map_err(|e| OperationError::InvalidInput(format!("width distribution: {e}")))?;
        Ok(Self { min, max, normal })
    }

    /// Splits a frontage of `length` into widths that sum to `length`.
    ///
    /// While more than `max` remains, a width is drawn, clamped to
    /// `[min, max]` and then moved to the nearest value that leaves a
    /// remainder which can itself be split within bounds. What is left, at
    /// most `max`, is the last width. A frontage shorter than `min` is one
    /// width; one that cannot be split within bounds at all is halved.
    pub fn sample<R: Rng + ?Sized>(&self, length: f64, rng: &mut R) -> Vec<f64> {
        if length <= 0.0 {
            return Vec::new();
        }
        if length < self.min {
            return vec![length];
        }

        let mut widths = Vec::new();
        let mut remaining = length;
        while remaining > self.max + SLACK {
            let draw = self.normal.sample(rng).clamp(self.min, self.max);
            let Some(width) = self.nearest_feasible(remaining, draw) else {
                widths.push(0.5 * remaining);
                widths.push(0.5 * remaining);
                return widths;
            };
            widths.push(width);
            remaining -= width;
        }
        widths.push(remaining);
        widths
    }

    /// The width in `[min, max]` closest to `draw` whose remainder is a sum
    /// of `k >= 1` widths in `[min, max]`.
    fn nearest_feasible(&self, remaining: f64, draw: f64) -> Option<f64> {
        let mut best: Option<f64> = None;
        // `min > 0`, so at most `remaining / min` widths fit.
        let mut k = 1.0;
        while k * self.min <= remaining {
            let hi = (remaining - k * self.min).min(self.max);
            if hi < self.min - SLACK {
                break;
            }
            let lo = (remaining - k * self.max).max(self.min);
            if lo <= hi + SLACK {
                let candidate = draw.clamp(lo, hi.max(lo));
                if best.map_or(true, |b| (candidate - draw).abs() < (b - draw).abs()) {
                    best = Some(candidate);
                }
            }
            k += 1.0;
        }
        best
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn widths_stay_in_range_and_sum_to_length() {
        let sampler = WidthSampler::new(8.0, 12.0, 4.0).unwrap();
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            for length in [16.0, 17.0, 23.0, 40.0, 97.3] {
                let widths = sampler.sample(length, &mut rng);
                assert_relative_eq!(widths.iter().sum::<f64>(), length, epsilon = 1e-9);
                for w in &widths {
                    assert!(*w >= 8.0 - 1e-9 && *w <= 12.0 + 1e-9, "{w} for {length}");
                }
            }
        }
    }

    #[test]
    fn short_frontage_is_one_width() {
        let sampler = WidthSampler::new(8.0, 12.0, 1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(sampler.sample(5.0, &mut rng), vec![5.0]);
        assert!(sampler.sample(0.0, &mut rng).is_empty());
        assert_eq!(sampler.sample(11.0, &mut rng), vec![11.0]);
        // 13 fits neither one width nor two.
        assert_eq!(sampler.sample(13.0, &mut rng), vec![6.5, 6.5]);
    }

    #[test]
    fn same_seed_same_widths() {
        let sampler = WidthSampler::new(8.0, 12.0, 1.0).unwrap();
        let a = sampler.sample(60.0, &mut StdRng::seed_from_u64(3));
        let b = sampler.sample(60.0, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn width_range_must_be_positive_and_ordered() {
        assert!(WidthSampler::new(0.0, 12.0, 1.0).is_err());
        assert!(WidthSampler::new(-2.0, 12.0, 1.0).is_err());
        assert!(WidthSampler::new(12.0, 8.0, 1.0).is_err());
        assert!(WidthSampler::new(f64::NAN, 12.0, 1.0).is_err());
        assert!(WidthSampler::new(8.0, 8.0, 0.0).is_ok());
    }

    #[test]
    fn equal_bounds_split_exact_multiples() {
        let sampler = WidthSampler::new(8.0, 8.0, 1.0).unwrap();
        let widths = sampler.sample(32.0, &mut StdRng::seed_from_u64(1));
        assert_eq!(widths.len(), 4);
        for w in widths {
            assert_relative_eq!(w, 8.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn zero_variance_gives_the_mean() {
        let sampler = WidthSampler::new(8.0, 12.0, 0.0).unwrap();
        let widths = sampler.sample(40.0, &mut StdRng::seed_from_u64(0));
        assert_eq!(widths.len(), 4);
        for w in widths {
            assert_relative_eq!(w, 10.0, epsilon = 1e-12);
        }
    }
}
