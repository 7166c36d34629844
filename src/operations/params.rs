use crate::error::{OperationError, Result};
use crate::math::tolerance_from_precision;

/// Parameters controlling strip decomposition.
#[derive(Debug, Clone, Copy)]
pub struct DecompositionParams {
    /// Decimal digits kept when merging nodes; the snapping tolerance is
    /// `2·10⁻ᵖʳᵉᶜⁱˢⁱᵒⁿ`.
    pub precision: u32,
    /// How far from an exterior edge a road may lie.
    pub max_road_distance: f64,
    /// Minimum parcel frontage width.
    pub min_width: f64,
    /// Maximum parcel frontage width.
    pub max_width: f64,
    /// Variance of the sampled widths.
    pub width_variance: f64,
    /// Seed of the width sampler.
    pub seed: u64,
    /// Largest angle (radians) between a followed graph edge and the inward
    /// normal of the supporting line.
    pub max_cut_deviation: f64,
    /// Report named checkpoints while running.
    pub debug: bool,
}

impl Default for DecompositionParams {
    fn default() -> Self {
        Self {
            precision: 6,
            max_road_distance: 20.0,
            min_width: 8.0,
            max_width: 12.0,
            width_variance: 1.0,
            seed: 0,
            max_cut_deviation: 30f64.to_radians(),
            debug: false,
        }
    }
}

impl DecompositionParams {
    /// The node-merging and snapping tolerance.
    #[must_use]
    pub fn tolerance(&self) -> f64 {
        tolerance_from_precision(self.precision)
    }

    /// Mean of the width distribution.
    #[must_use]
    pub fn mean_width(&self) -> f64 {
        0.5 * (self.min_width + self.max_width)
    }

    /// Checks that the parameters are usable.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` for non-positive or inverted
    /// widths, a negative variance or search distance, or a deviation
    /// outside `[0, π/2)`.
    pub fn validate(&self) -> Result<()> {
        if self.min_width.is_nan() || self.min_width <= 0.0 || self.min_width > self.max_width {
            return Err(OperationError::InvalidInput(format!(
                "width range [{}, {}] is empty or non-positive",
                self.min_width, self.max_width
            ))
            .into());
        }
        if !self.width_variance.is_finite() || self.width_variance < 0.0 {
            return Err(OperationError::InvalidInput("width variance must be >= 0".into()).into());
        }
        if self.max_road_distance.is_nan() || self.max_road_distance < 0.0 {
            return Err(OperationError::InvalidInput("road distance must be >= 0".into()).into());
        }
        if !(0.0..std::f64::consts::FRAC_PI_2).contains(&self.max_cut_deviation) {
            return Err(OperationError::InvalidInput(
                "cut deviation must be in [0, pi/2)".into(),
            )
            .into());
        }
        Ok(())
    }
}
