//! The straight-skeleton seam.
//!
//! Computing a weighted straight skeleton is left to an external kernel; the
//! decomposition only needs the resulting faces.

use geo::Polygon;

use crate::error::{OperationError, Result};
use crate::geometry::exterior_points;
use crate::topology::PlanarGraph;

/// Computes the faces of a block's weighted straight skeleton.
pub trait SkeletonKernel {
    /// Returns one polygon per skeleton face. Together they must tile the
    /// block, sharing edges exactly.
    ///
    /// `weights` holds one entry per exterior edge of `block`, in ring order.
    /// `offset_cap` limits how far the wavefront may travel, if set.
    ///
    /// # Errors
    ///
    /// Returns an error if the skeleton cannot be computed.
    fn compute_skeleton(
        &self,
        block: &Polygon<f64>,
        weights: &[f64],
        offset_cap: Option<f64>,
    ) -> Result<Vec<Polygon<f64>>>;
}

/// Runs a kernel and builds the planar graph of its faces.
///
/// # Errors
///
/// Returns `OperationError::InvalidInput` if `weights` does not match the
/// block's edge count, and propagates kernel and graph construction errors.
pub fn skeleton_graph(
    kernel: &dyn SkeletonKernel,
    block: &Polygon<f64>,
    weights: &[f64],
    offset_cap: Option<f64>,
    tolerance: f64,
) -> Result<PlanarGraph> {
    let edges = exterior_points(block).len();
    if weights.len() != edges {
        return Err(OperationError::InvalidInput(format!(
            "{} weights for {} boundary edges",
            weights.len(),
            edges
        ))
        .into());
    }
    let faces = kernel.compute_skeleton(block, weights, offset_cap)?;
    PlanarGraph::from_faces(&faces, tolerance)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_fixtures::{rectangle_block, FixedKernel};

    #[test]
    fn kernel_faces_become_a_graph() {
        let graph = skeleton_graph(&FixedKernel, &rectangle_block(), &[1.0; 4], None, 1e-6).unwrap();
        assert_eq!(graph.faces().count(), 4);
    }

    #[test]
    fn weight_count_must_match() {
        assert!(skeleton_graph(&FixedKernel, &rectangle_block(), &[1.0; 3], None, 1e-6).is_err());
    }
}
