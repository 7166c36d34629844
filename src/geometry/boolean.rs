use geo::{Area, BooleanOps, Contains, MultiPolygon, Point, Polygon};

use super::boundary_segments;
use crate::math::distance_2d::point_to_segment_dist;
use crate::math::Point2;

/// Boolean union of two regions.
#[must_use]
pub fn union(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    if a.0.is_empty() {
        return b.clone();
    }
    if b.0.is_empty() {
        return a.clone();
    }
    a.union(b)
}

/// Boolean difference `a − b`.
#[must_use]
pub fn difference(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    if a.0.is_empty() || b.0.is_empty() {
        return a.clone();
    }
    a.difference(b)
}

/// Boolean intersection of two regions.
#[must_use]
pub fn intersection(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    if a.0.is_empty() || b.0.is_empty() {
        return MultiPolygon::new(Vec::new());
    }
    a.intersection(b)
}

/// Unions every polygon of the iterator into one region.
pub fn union_all<I>(polygons: I) -> MultiPolygon<f64>
where
    I: IntoIterator<Item = Polygon<f64>>,
{
    polygons
        .into_iter()
        .fold(MultiPolygon::new(Vec::new()), |acc, p| {
            union(&acc, &MultiPolygon::new(vec![p]))
        })
}

/// Drops every interior ring.
#[must_use]
pub fn without_holes(geometry: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    MultiPolygon::new(
        geometry
            .0
            .iter()
            .map(|p| Polygon::new(p.exterior().clone(), Vec::new()))
            .collect(),
    )
}

/// Drops parts whose area is below `min_area`.
#[must_use]
pub fn without_slivers(geometry: &MultiPolygon<f64>, min_area: f64) -> MultiPolygon<f64> {
    MultiPolygon::new(
        geometry
            .0
            .iter()
            .filter(|p| p.unsigned_area() >= min_area)
            .cloned()
            .collect(),
    )
}

/// Unsigned area of a region.
#[must_use]
pub fn area(geometry: &MultiPolygon<f64>) -> f64 {
    geometry.unsigned_area()
}

/// Returns `true` if `p` lies inside the region or within `tol` of its boundary.
#[must_use]
pub fn covers_point(geometry: &MultiPolygon<f64>, p: &Point2, tol: f64) -> bool {
    geometry.contains(&Point::new(p.x, p.y)) || boundary_distance(geometry, p) <= tol
}

/// Distance from `p` to the nearest boundary segment of the region.
#[must_use]
pub fn boundary_distance(geometry: &MultiPolygon<f64>, p: &Point2) -> f64 {
    boundary_segments(geometry)
        .iter()
        .map(|(a, b)| point_to_segment_dist(p, a, b))
        .fold(f64::INFINITY, f64::min)
}
