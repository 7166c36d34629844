use geo::{MultiPolygon, Polygon};

use super::{polygon_from_points, ring_points};
use crate::math::distance_2d::project_onto_segment;
use crate::math::polygon_2d::signed_area_2d;
use crate::math::Point2;

/// Reference geometry that polygons are snapped back onto.
///
/// Boolean operations introduce floating-point drift; snapping each vertex to
/// the nearest reference vertex (or, failing that, the nearest reference
/// segment) within tolerance restores exact shared coordinates.
#[derive(Debug, Clone, Default)]
pub struct SnapReference {
    vertices: Vec<Point2>,
    segments: Vec<(Point2, Point2)>,
}

impl SnapReference {
    /// Creates an empty reference.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the exterior ring of a polygon.
    pub fn add_polygon(&mut self, polygon: &Polygon<f64>) {
        let pts = ring_points(polygon.exterior());
        let n = pts.len();
        for i in 0..n {
            self.add_segment(pts[i], pts[(i + 1) % n]);
        }
    }

    /// Adds a segment and both of its endpoints.
    pub fn add_segment(&mut self, a: Point2, b: Point2) {
        self.vertices.push(a);
        self.vertices.push(b);
        self.segments.push((a, b));
    }

    /// Adds an isolated vertex.
    pub fn add_vertex(&mut self, p: Point2) {
        self.vertices.push(p);
    }

    /// Snaps a single point; points farther than `tol` from any reference stay put.
    #[must_use]
    pub fn snap_point(&self, p: &Point2, tol: f64) -> Point2 {
        let tol_sq = tol * tol;
        let nearest_vertex = self
            .vertices
            .iter()
            .map(|v| (v, (v - p).norm_squared()))
            .filter(|(_, d)| *d <= tol_sq)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((v, _)) = nearest_vertex {
            return *v;
        }
        let nearest_segment = self
            .segments
            .iter()
            .map(|(a, b)| {
                let (q, _) = project_onto_segment(p, a, b);
                (q, (q - p).norm_squared())
            })
            .filter(|(_, d)| *d <= tol_sq)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        nearest_segment.map_or(*p, |(q, _)| q)
    }

    /// Snaps every exterior vertex of a polygon. Returns `None` if the ring
    /// collapses.
    #[must_use]
    pub fn snap_polygon(&self, polygon: &Polygon<f64>, tol: f64) -> Option<Polygon<f64>> {
        let snapped: Vec<Point2> = ring_points(polygon.exterior())
            .iter()
            .map(|p| self.snap_point(p, tol))
            .collect();
        let result = polygon_from_points(&snapped, tol);
        let pts = ring_points(result.exterior());
        (pts.len() >= 3 && signed_area_2d(&pts).abs() > tol * tol).then_some(result)
    }

    /// Snaps every part of a region, dropping parts that collapse.
    #[must_use]
    pub fn snap(&self, geometry: &MultiPolygon<f64>, tol: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(
            geometry
                .0
                .iter()
                .filter_map(|p| self.snap_polygon(p, tol))
                .collect(),
        )
    }
}
