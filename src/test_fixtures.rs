//! Skeleton decompositions shared by the unit tests.

use geo::Polygon;

use crate::error::Result;
use crate::geometry::polygon_from_points;
use crate::math::Point2;
use crate::road::RoadAttribute;
use crate::skeleton::SkeletonKernel;

fn polygon(points: &[(f64, f64)]) -> Polygon<f64> {
    let pts: Vec<Point2> = points.iter().map(|&(x, y)| Point2::new(x, y)).collect();
    polygon_from_points(&pts, 1e-9)
}

/// The 40×20 rectangle block.
pub(crate) fn rectangle_block() -> Polygon<f64> {
    polygon(&[(0.0, 0.0), (40.0, 0.0), (40.0, 20.0), (0.0, 20.0)])
}

/// Returns the precomputed faces of the 40×20 rectangle for any block.
pub(crate) struct FixedKernel;

impl SkeletonKernel for FixedKernel {
    fn compute_skeleton(
        &self,
        _block: &Polygon<f64>,
        _weights: &[f64],
        _offset_cap: Option<f64>,
    ) -> Result<Vec<Polygon<f64>>> {
        Ok(rectangle_faces())
    }
}

/// Straight skeleton of the 40×20 rectangle: two trapezoids along the long
/// sides and two triangles at the ends.
pub(crate) fn rectangle_faces() -> Vec<Polygon<f64>> {
    vec![
        polygon(&[(0.0, 0.0), (40.0, 0.0), (30.0, 10.0), (10.0, 10.0)]),
        polygon(&[(40.0, 0.0), (40.0, 20.0), (30.0, 10.0)]),
        polygon(&[(40.0, 20.0), (0.0, 20.0), (10.0, 10.0), (30.0, 10.0)]),
        polygon(&[(0.0, 20.0), (0.0, 0.0), (10.0, 10.0)]),
    ]
}

/// An L-shaped block with its reflex corner at (10, 10).
pub(crate) fn l_shape_faces() -> Vec<Polygon<f64>> {
    vec![
        polygon(&[(0.0, 0.0), (20.0, 0.0), (15.0, 5.0), (5.0, 5.0)]),
        polygon(&[(20.0, 0.0), (20.0, 10.0), (15.0, 5.0)]),
        polygon(&[(20.0, 10.0), (10.0, 10.0), (5.0, 5.0), (15.0, 5.0)]),
        polygon(&[(10.0, 10.0), (10.0, 20.0), (5.0, 15.0), (5.0, 5.0)]),
        polygon(&[(10.0, 20.0), (0.0, 20.0), (5.0, 15.0)]),
        polygon(&[(0.0, 20.0), (0.0, 0.0), (5.0, 5.0), (5.0, 15.0)]),
    ]
}

/// A 30×10 block whose large face reaches the bottom side twice, on either
/// side of a small face.
pub(crate) fn multi_frontage_faces() -> Vec<Polygon<f64>> {
    vec![
        polygon(&[(0.0, 0.0), (6.0, 0.0), (6.0, 6.0), (0.0, 6.0)]),
        polygon(&[(10.0, 0.0), (20.0, 0.0), (20.0, 5.0), (10.0, 5.0)]),
        polygon(&[
            (6.0, 0.0),
            (10.0, 0.0),
            (10.0, 5.0),
            (20.0, 5.0),
            (20.0, 0.0),
            (30.0, 0.0),
            (30.0, 10.0),
            (0.0, 10.0),
            (0.0, 6.0),
            (6.0, 6.0),
        ]),
    ]
}

/// A road along `y = 0` only.
pub(crate) fn bottom_road(importance: f64) -> impl Fn(&Point2, &Point2) -> Option<RoadAttribute> {
    move |a: &Point2, b: &Point2| {
        (a.y.abs() < 1e-6 && b.y.abs() < 1e-6).then(|| RoadAttribute::new("Main", importance))
    }
}

/// Roads along `y = 0` and `x = 40` with the given importances.
pub(crate) fn corner_roads(
    bottom: f64,
    right: f64,
) -> impl Fn(&Point2, &Point2) -> Option<RoadAttribute> {
    corner_roads_at(40.0, bottom, right)
}

/// `"Main"` along `y = 0` and `"Side"` along `x = right_x`.
pub(crate) fn corner_roads_at(
    right_x: f64,
    bottom: f64,
    right: f64,
) -> impl Fn(&Point2, &Point2) -> Option<RoadAttribute> {
    move |a: &Point2, b: &Point2| {
        if a.y.abs() < 1e-6 && b.y.abs() < 1e-6 {
            Some(RoadAttribute::new("Main", bottom))
        } else if (a.x - right_x).abs() < 1e-6 && (b.x - right_x).abs() < 1e-6 {
            Some(RoadAttribute::new("Side", right))
        } else {
            None
        }
    }
}

/// A road on every side of the 40×20 rectangle, named after the side.
pub(crate) fn four_roads(
    bottom: f64,
    right: f64,
    top: f64,
    left: f64,
) -> impl Fn(&Point2, &Point2) -> Option<RoadAttribute> {
    move |a: &Point2, b: &Point2| {
        let along = |x: Option<f64>, y: Option<f64>| {
            x.map_or(true, |x| (a.x - x).abs() < 1e-6 && (b.x - x).abs() < 1e-6)
                && y.map_or(true, |y| (a.y - y).abs() < 1e-6 && (b.y - y).abs() < 1e-6)
        };
        if along(None, Some(0.0)) {
            Some(RoadAttribute::new("Bottom", bottom))
        } else if along(Some(40.0), None) {
            Some(RoadAttribute::new("Right", right))
        } else if along(None, Some(20.0)) {
            Some(RoadAttribute::new("Top", top))
        } else if along(Some(0.0), None) {
            Some(RoadAttribute::new("Left", left))
        } else {
            None
        }
    }
}

/// A distinct road on every edge, named after the edge's midpoint.
pub(crate) fn named_roads() -> impl Fn(&Point2, &Point2) -> Option<RoadAttribute> {
    |a: &Point2, b: &Point2| {
        let mid = a + (b - a) * 0.5;
        Some(RoadAttribute::new(format!("{:.1},{:.1}", mid.x, mid.y), 1.0))
    }
}
