use super::Point2;

/// Projects `p` onto the segment `a → b`.
///
/// Returns the closest point and its clamped parameter in `[0, 1]`.
#[must_use]
pub fn project_onto_segment(p: &Point2, a: &Point2, b: &Point2) -> (Point2, f64) {
    let d = b - a;
    let len_sq = d.norm_squared();
    if len_sq < 1e-20 {
        return (*a, 0.0);
    }
    let t = ((p - a).dot(&d) / len_sq).clamp(0.0, 1.0);
    (a + d * t, t)
}

/// Returns the minimum distance from `p` to the segment `a → b`.
#[must_use]
pub fn point_to_segment_dist(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let (closest, _) = project_onto_segment(p, a, b);
    (p - closest).norm()
}

/// Returns the minimum distance from `p` to a closed ring.
#[must_use]
pub fn point_to_ring_dist(p: &Point2, ring: &[Point2]) -> f64 {
    let n = ring.len();
    if n == 0 {
        return f64::INFINITY;
    }
    (0..n)
        .map(|i| point_to_segment_dist(p, &ring[i], &ring[(i + 1) % n]))
        .fold(f64::INFINITY, f64::min)
}
