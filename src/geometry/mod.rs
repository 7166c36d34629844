//! Polygon and polyline operations used by the strip pipeline.
//!
//! Boolean operations delegate to `geo`; snapping, clipping, splitting and
//! polylines are implemented here on top of [`crate::math`].

pub mod boolean;
pub mod clip;
pub mod polyline;
pub mod snap;
pub mod split;

pub use polyline::Polyline;

use geo::{Coord, LineString, MultiPolygon, Polygon};

use crate::math::polygon_2d::signed_area_2d;
use crate::math::{same_point, Point2};

/// Converts a point to a `geo` coordinate.
#[must_use]
pub fn to_coord(p: &Point2) -> Coord<f64> {
    Coord { x: p.x, y: p.y }
}

/// Converts a `geo` coordinate to a point.
#[must_use]
pub fn to_point(c: &Coord<f64>) -> Point2 {
    Point2::new(c.x, c.y)
}

/// Returns the vertices of a ring without the closing duplicate.
#[must_use]
pub fn ring_points(ring: &LineString<f64>) -> Vec<Point2> {
    let mut points: Vec<Point2> = ring.coords().map(to_point).collect();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

/// Returns the exterior vertices of a polygon, counter-clockwise, without the
/// closing duplicate.
#[must_use]
pub fn exterior_points(polygon: &Polygon<f64>) -> Vec<Point2> {
    let mut points = ring_points(polygon.exterior());
    if signed_area_2d(&points) < 0.0 {
        points.reverse();
    }
    points
}

/// Builds a hole-free polygon from a ring, oriented counter-clockwise.
///
/// Consecutive duplicates within `tol` are dropped.
#[must_use]
pub fn polygon_from_points(points: &[Point2], tol: f64) -> Polygon<f64> {
    let mut ring: Vec<Point2> = Vec::with_capacity(points.len());
    for p in points {
        if ring.last().map_or(true, |last| !same_point(last, p, tol)) {
            ring.push(*p);
        }
    }
    while ring.len() > 1 && same_point(&ring[0], &ring[ring.len() - 1], tol) {
        ring.pop();
    }
    if signed_area_2d(&ring) < 0.0 {
        ring.reverse();
    }
    Polygon::new(LineString::from(ring.iter().map(to_coord).collect::<Vec<_>>()), Vec::new())
}

/// Wraps a single polygon.
#[must_use]
pub fn multi(polygon: Polygon<f64>) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![polygon])
}

/// An empty multi-polygon.
#[must_use]
pub fn empty() -> MultiPolygon<f64> {
    MultiPolygon::new(Vec::new())
}

/// All boundary segments of every ring of a multi-polygon.
#[must_use]
pub fn boundary_segments(geometry: &MultiPolygon<f64>) -> Vec<(Point2, Point2)> {
    let mut segments = Vec::new();
    for polygon in &geometry.0 {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
            let pts = ring_points(ring);
            let n = pts.len();
            for i in 0..n {
                segments.push((pts[i], pts[(i + 1) % n]));
            }
        }
    }
    segments
}
