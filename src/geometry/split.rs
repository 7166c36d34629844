use geo::Polygon;

use super::{exterior_points, polygon_from_points};
use crate::error::{Result, StripError};
use crate::math::distance_2d::project_onto_segment;
use crate::math::polygon_2d::signed_area_2d;
use crate::math::{same_point, Point2};

/// Splits a polygon along a cut polyline whose two endpoints lie on the
/// polygon's exterior ring.
///
/// The exterior ring is noded at both cut endpoints and the faces of the
/// resulting line network (ring plus cut) are traced. The first returned
/// piece runs along the ring from the cut's start to its end; the second
/// runs along the ring from the cut's end back to its start.
///
/// # Errors
///
/// Returns `StripError::AmbiguousSplit` if an endpoint is off the ring, both
/// endpoints coincide, or either piece is degenerate.
pub fn split_polygon(
    polygon: &Polygon<f64>,
    cut: &[Point2],
    tol: f64,
) -> Result<(Polygon<f64>, Polygon<f64>)> {
    let (Some(start), Some(end)) = (cut.first(), cut.last()) else {
        return Err(StripError::AmbiguousSplit { pieces: 1 }.into());
    };
    if cut.len() < 2 || same_point(start, end, tol) {
        return Err(StripError::AmbiguousSplit { pieces: 1 }.into());
    }

    let ring = exterior_points(polygon);
    let (ring, _) = insert_on_ring(ring, start, tol).ok_or(StripError::AmbiguousSplit { pieces: 1 })?;
    let (ring, ib) = insert_on_ring(ring, end, tol).ok_or(StripError::AmbiguousSplit { pieces: 1 })?;
    // Inserting the end may shift the start index.
    let ia = ring
        .iter()
        .position(|p| same_point(p, start, tol))
        .ok_or(StripError::AmbiguousSplit { pieces: 1 })?;
    if ia == ib {
        return Err(StripError::AmbiguousSplit { pieces: 1 }.into());
    }

    let interior = &cut[1..cut.len() - 1];

    let mut first = ring_arc(&ring, ia, ib);
    first.extend(interior.iter().rev());
    let mut second = ring_arc(&ring, ib, ia);
    second.extend(interior.iter());

    let min_area = tol * tol;
    let pieces = usize::from(signed_area_2d(&first).abs() > min_area)
        + usize::from(signed_area_2d(&second).abs() > min_area);
    if pieces != 2 {
        return Err(StripError::AmbiguousSplit { pieces }.into());
    }

    Ok((polygon_from_points(&first, tol), polygon_from_points(&second, tol)))
}

/// Inserts `p` into the ring if it lies within `tol` of it.
///
/// Returns the new ring and the index of `p` in it.
fn insert_on_ring(mut ring: Vec<Point2>, p: &Point2, tol: f64) -> Option<(Vec<Point2>, usize)> {
    if let Some(i) = ring.iter().position(|q| same_point(q, p, tol)) {
        return Some((ring, i));
    }
    let n = ring.len();
    let (best, dist) = (0..n)
        .map(|i| {
            let (q, _) = project_onto_segment(p, &ring[i], &ring[(i + 1) % n]);
            (i, (q - p).norm())
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))?;
    if dist > tol {
        return None;
    }
    ring.insert(best + 1, *p);
    Some((ring, best + 1))
}

/// Vertices from `from` to `to` inclusive, walking forward around the ring.
fn ring_arc(ring: &[Point2], from: usize, to: usize) -> Vec<Point2> {
    let n = ring.len();
    let mut out = Vec::new();
    let mut k = from;
    loop {
        out.push(ring[k]);
        if k == to {
            break;
        }
        k = (k + 1) % n;
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use geo::Area;

    use super::*;
    use crate::error::ParcelError;

    fn rect() -> Polygon<f64> {
        polygon_from_points(
            &[
                Point2::new(0.0, 0.0),
                Point2::new(40.0, 0.0),
                Point2::new(40.0, 20.0),
                Point2::new(0.0, 20.0),
            ],
            1e-9,
        )
    }

    #[test]
    fn straight_cut_makes_two_pieces() {
        let cut = [Point2::new(10.0, 0.0), Point2::new(10.0, 20.0)];
        let (a, b) = split_polygon(&rect(), &cut, 1e-6).unwrap();
        // The first piece follows the ring from (10,0) counter-clockwise.
        assert!((a.unsigned_area() - 600.0).abs() < 1e-9);
        assert!((b.unsigned_area() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn bent_cut_keeps_interior_vertices() {
        let cut = [Point2::new(10.0, 0.0), Point2::new(12.0, 10.0), Point2::new(10.0, 20.0)];
        let (a, b) = split_polygon(&rect(), &cut, 1e-6).unwrap();
        assert!((a.unsigned_area() + b.unsigned_area() - 800.0).abs() < 1e-9);
        assert_eq!(exterior_points(&b).len(), 5);
    }

    #[test]
    fn cut_off_the_ring_is_ambiguous() {
        let cut = [Point2::new(10.0, 5.0), Point2::new(10.0, 20.0)];
        let err = split_polygon(&rect(), &cut, 1e-6).unwrap_err();
        assert!(matches!(err, ParcelError::Strip(StripError::AmbiguousSplit { .. })));
    }

    #[test]
    fn cut_along_the_boundary_is_ambiguous() {
        let cut = [Point2::new(0.0, 0.0), Point2::new(40.0, 0.0)];
        assert!(split_polygon(&rect(), &cut, 1e-6).is_err());
    }
}
