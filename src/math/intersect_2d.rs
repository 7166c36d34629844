use super::polygon_2d::cross;
use super::{Point2, Vector2, TOLERANCE};

/// Parametric 2D line-line intersection.
///
/// Given lines `p1 + t * d1` and `p2 + u * d2`, returns `(t, u)` if not parallel.
#[must_use]
pub fn line_line_intersect_2d(
    p1: &Point2,
    d1: &Vector2,
    p2: &Point2,
    d2: &Vector2,
) -> Option<(f64, f64)> {
    let denom = cross(d1, d2);
    if denom.abs() < TOLERANCE {
        return None;
    }
    let delta = p2 - p1;
    let t = cross(&delta, d2) / denom;
    let u = cross(&delta, d1) / denom;
    Some((t, u))
}

/// Bounded segment-segment intersection in 2D.
///
/// Returns `(intersection_point, t, u)` where `t` and `u` are in `[0, 1]`.
/// Endpoints are included.
#[must_use]
pub fn segment_segment_intersect_2d(
    a0: &Point2,
    a1: &Point2,
    b0: &Point2,
    b1: &Point2,
) -> Option<(Point2, f64, f64)> {
    let da = a1 - a0;
    let db = b1 - b0;
    let (t, u) = line_line_intersect_2d(a0, &da, b0, &db)?;

    let eps = 1e-9;
    if t >= -eps && t <= 1.0 + eps && u >= -eps && u <= 1.0 + eps {
        let t = t.clamp(0.0, 1.0);
        Some((a0 + da * t, t, u.clamp(0.0, 1.0)))
    } else {
        None
    }
}

/// Intersection of the ray `origin + t * dir` (`t ≥ 0`) with segment `b0 → b1`.
///
/// `dir` must be a unit vector so that `t` is a distance. Returns
/// `(point, t, u)` with `u ∈ [0, 1]` the parameter on the segment.
#[must_use]
pub fn ray_segment_intersect_2d(
    origin: &Point2,
    dir: &Vector2,
    b0: &Point2,
    b1: &Point2,
) -> Option<(Point2, f64, f64)> {
    let db = b1 - b0;
    let (t, u) = line_line_intersect_2d(origin, dir, b0, &db)?;

    let eps = 1e-9;
    if t >= 0.0 && u >= -eps && u <= 1.0 + eps {
        Some((origin + dir * t, t, u.clamp(0.0, 1.0)))
    } else {
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn line_line_perpendicular() {
        let p1 = Point2::new(0.0, 0.0);
        let d1 = Vector2::new(1.0, 0.0);
        let p2 = Point2::new(0.5, -1.0);
        let d2 = Vector2::new(0.0, 1.0);
        let (t, u) = line_line_intersect_2d(&p1, &d1, &p2, &d2).unwrap();
        assert!((t - 0.5).abs() < TOLERANCE);
        assert!((u - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn line_line_parallel_returns_none() {
        let d = Vector2::new(1.0, 0.0);
        assert!(line_line_intersect_2d(&Point2::new(0.0, 0.0), &d, &Point2::new(0.0, 1.0), &d).is_none());
    }

    #[test]
    fn segment_segment_crossing() {
        let (pt, t, u) = segment_segment_intersect_2d(
            &Point2::new(0.0, 0.0),
            &Point2::new(2.0, 2.0),
            &Point2::new(0.0, 2.0),
            &Point2::new(2.0, 0.0),
        )
        .unwrap();
        assert!((pt.x - 1.0).abs() < TOLERANCE);
        assert!((pt.y - 1.0).abs() < TOLERANCE);
        assert!((t - 0.5).abs() < TOLERANCE);
        assert!((u - 0.5).abs() < TOLERANCE);
    }

    #[test]
    fn segment_segment_disjoint() {
        assert!(segment_segment_intersect_2d(
            &Point2::new(0.0, 0.0),
            &Point2::new(1.0, 0.0),
            &Point2::new(0.0, 1.0),
            &Point2::new(1.0, 1.0),
        )
        .is_none());
    }

    #[test]
    fn ray_hits_segment_endpoint() {
        let (pt, t, u) = ray_segment_intersect_2d(
            &Point2::new(10.0, 0.0),
            &Vector2::new(0.0, 1.0),
            &Point2::new(0.0, 0.0),
            &Point2::new(10.0, 10.0),
        )
        .unwrap();
        assert!((pt.y - 10.0).abs() < 1e-9);
        assert!((t - 10.0).abs() < 1e-9);
        assert!((u - 1.0).abs() < 1e-9);
    }

    #[test]
    fn ray_behind_origin_misses() {
        assert!(ray_segment_intersect_2d(
            &Point2::new(0.0, 5.0),
            &Vector2::new(0.0, 1.0),
            &Point2::new(-1.0, 0.0),
            &Point2::new(1.0, 0.0),
        )
        .is_none());
    }
}
