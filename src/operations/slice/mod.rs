mod cut;
mod widths;

pub use widths::WidthSampler;

use geo::Polygon;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info_span, warn};

use self::cut::CutWalker;
use super::params::DecompositionParams;
use crate::error::{ParcelError, Result, StripError};
use crate::geometry::boolean::boundary_distance;
use crate::geometry::split::split_polygon;
use crate::geometry::{exterior_points, multi, Polyline};
use crate::math::distance_2d::point_to_ring_dist;
use crate::topology::{PlanarGraph, StripGraph, StripId};

/// One output lot.
#[derive(Debug, Clone)]
pub struct Parcel {
    pub polygon: Polygon<f64>,
    /// Length of supporting line fronting this parcel; `0` for parcels
    /// without road frontage.
    pub frontage_width: f64,
    pub strip: StripId,
}

/// Cuts every beta-strip into parcels along its supporting line.
pub struct ParcelSlicer {
    params: DecompositionParams,
}

impl ParcelSlicer {
    /// Creates a new `ParcelSlicer`.
    #[must_use]
    pub fn new(params: DecompositionParams) -> Self {
        Self { params }
    }

    /// Executes the slicing over all strips in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the width distribution is invalid or a graph
    /// entity is missing. Ambiguous splits and dangling cuts are recovered.
    pub fn execute(&self, graph: &PlanarGraph, strips: &StripGraph) -> Result<Vec<Parcel>> {
        let _span = info_span!("slice").entered();
        let params = &self.params;
        let sampler = WidthSampler::new(params.min_width, params.max_width, params.width_variance)?;
        let mut rng = StdRng::seed_from_u64(params.seed);

        let mut parcels = Vec::new();
        for (id, strip) in strips.iter() {
            let Some(face) = strip.face else { continue };
            let geometry = &graph.face(face)?.geometry;
            if strip.psi.is_empty() {
                debug!("strip has no supporting line, kept whole");
                parcels.extend(geometry.0.iter().map(|p| Parcel {
                    polygon: p.clone(),
                    frontage_width: 0.0,
                    strip: id,
                }));
                continue;
            }

            // The part touching the supporting line is sliced, the rest kept.
            let Some(anchor) = strip.psi.point_at(0.5 * strip.psi.length()) else {
                continue;
            };
            let Some(main) = geometry.0.iter().min_by(|a, b| {
                let da = boundary_distance(&multi((*a).clone()), &anchor);
                let db = boundary_distance(&multi((*b).clone()), &anchor);
                da.total_cmp(&db)
            }) else {
                continue;
            };
            for part in geometry.0.iter().filter(|p| !std::ptr::eq(*p, main)) {
                parcels.push(Parcel {
                    polygon: part.clone(),
                    frontage_width: 0.0,
                    strip: id,
                });
            }

            let widths = sampler.sample(strip.psi.length(), &mut rng);
            let before = parcels.len();
            self.slice_part(graph, main, &strip.psi, &widths, id, &mut parcels)?;
            debug!(widths = widths.len(), parcels = parcels.len() - before, "strip sliced");
        }
        Ok(parcels)
    }

    /// Cuts `polygon` at every cumulative width but the last.
    fn slice_part(
        &self,
        graph: &PlanarGraph,
        polygon: &Polygon<f64>,
        psi: &Polyline,
        widths: &[f64],
        strip: StripId,
        parcels: &mut Vec<Parcel>,
    ) -> Result<()> {
        let tol = self.params.tolerance();
        let mut remaining = polygon.clone();
        let mut previous = 0.0;
        let mut offset = 0.0;
        for width in widths.iter().take(widths.len().saturating_sub(1)) {
            offset += width;
            let (Some(start), Some(normal)) = (psi.point_at(offset), psi.normal_at(offset)) else {
                break;
            };
            let walker = CutWalker::new(graph, &remaining, self.params.max_cut_deviation, tol)?;
            let cut = match walker.cut(start, &normal) {
                Ok(cut) => cut,
                Err(ParcelError::Strip(StripError::DanglingProjection { x, y })) => {
                    warn!(x, y, "cut left the strip, keeping the rest whole");
                    break;
                }
                Err(e) => return Err(e),
            };
            let (first, second) = match split_polygon(&remaining, &cut, tol) {
                Ok(pieces) => pieces,
                Err(ParcelError::Strip(StripError::AmbiguousSplit { pieces })) => {
                    warn!(offset, pieces, "ambiguous split skipped");
                    continue;
                }
                Err(e) => return Err(e),
            };

            // The parcel is the piece fronting the supporting line before the cut.
            let Some(front) = psi.point_at(0.5 * (previous + offset)) else {
                break;
            };
            let d_first = point_to_ring_dist(&front, &exterior_points(&first));
            let d_second = point_to_ring_dist(&front, &exterior_points(&second));
            let (parcel, rest) = if d_first <= d_second {
                (first, second)
            } else {
                (second, first)
            };
            parcels.push(Parcel {
                polygon: parcel,
                frontage_width: offset - previous,
                strip,
            });
            remaining = rest;
            previous = offset;
        }
        parcels.push(Parcel {
            polygon: remaining,
            frontage_width: psi.length() - previous,
            strip,
        });
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;
    use geo::Area;

    use super::*;
    use crate::geometry::polygon_from_points;
    use crate::math::Point2;
    use crate::topology::{FaceData, FrontageSegment, StripData, StripKind};

    fn rectangle_strip(graph: &mut PlanarGraph, strips: &mut StripGraph) -> StripId {
        let polygon = polygon_from_points(
            &[
                Point2::new(0.0, 0.0),
                Point2::new(40.0, 0.0),
                Point2::new(40.0, 20.0),
                Point2::new(0.0, 20.0),
            ],
            1e-9,
        );
        let face = graph.add_face(FaceData::strip(multi(polygon)));
        let mut strip = StripData::new(StripKind::Primary);
        strip.face = Some(face);
        strip.frontage = vec![FrontageSegment {
            start: Point2::new(0.0, 0.0),
            end: Point2::new(40.0, 0.0),
            road: Some(crate::road::RoadAttribute::new("Main", 1.0)),
            position: 0,
        }];
        strip.psi = strip.alpha_line();
        strips.add(strip)
    }

    #[test]
    fn rectangle_is_cut_into_widths() {
        let mut graph = PlanarGraph::new(1e-6);
        let mut strips = StripGraph::new();
        rectangle_strip(&mut graph, &mut strips);
        let params = DecompositionParams {
            width_variance: 0.0,
            ..DecompositionParams::default()
        };
        let parcels = ParcelSlicer::new(params).execute(&graph, &strips).unwrap();
        assert_eq!(parcels.len(), 4);
        for parcel in &parcels {
            assert_relative_eq!(parcel.frontage_width, 10.0, epsilon = 1e-9);
            assert_relative_eq!(parcel.polygon.unsigned_area(), 200.0, epsilon = 1e-6);
        }
        // Parcels follow the frontage from its start.
        let first = exterior_points(&parcels[0].polygon);
        assert!(first.iter().all(|p| p.x <= 10.0 + 1e-9));
    }

    #[test]
    fn strip_without_supporting_line_is_kept_whole() {
        let mut graph = PlanarGraph::new(1e-6);
        let mut strips = StripGraph::new();
        let id = rectangle_strip(&mut graph, &mut strips);
        strips.strip_mut(id).unwrap().psi = Polyline::default();
        let parcels = ParcelSlicer::new(DecompositionParams::default())
            .execute(&graph, &strips)
            .unwrap();
        assert_eq!(parcels.len(), 1);
        assert_relative_eq!(parcels[0].frontage_width, 0.0);
        assert_relative_eq!(parcels[0].polygon.unsigned_area(), 800.0, epsilon = 1e-6);
    }
}
