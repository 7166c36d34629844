use geo::MultiPolygon;

use super::boolean::covers_point;
use super::boundary_segments;
use crate::math::distance_2d::{point_to_segment_dist, project_onto_segment};
use crate::math::intersect_2d::segment_segment_intersect_2d;
use crate::math::polygon_2d::left_normal;
use crate::math::Point2;

/// Returns the parameter intervals `[t0, t1] ⊆ [0, 1]` of segment `a → b`
/// lying inside the region or on its boundary (within `tol`).
///
/// Adjacent covered intervals are merged; intervals shorter than `tol` are
/// dropped.
#[must_use]
pub fn covered_intervals(
    a: &Point2,
    b: &Point2,
    region: &MultiPolygon<f64>,
    tol: f64,
) -> Vec<(f64, f64)> {
    let len = (b - a).norm();
    if len <= tol {
        return Vec::new();
    }

    let mut params = vec![0.0, 1.0];
    for (p, q) in boundary_segments(region) {
        if let Some((_, t, _)) = segment_segment_intersect_2d(a, b, &p, &q) {
            params.push(t);
        }
        // Collinear overlaps and touching vertices.
        for v in [p, q] {
            if point_to_segment_dist(&v, a, b) <= tol {
                params.push(project_onto_segment(&v, a, b).1);
            }
        }
    }
    params.sort_by(f64::total_cmp);
    params.dedup_by(|x, y| (*x - *y).abs() * len <= tol);

    let mut intervals: Vec<(f64, f64)> = Vec::new();
    for w in params.windows(2) {
        let (t0, t1) = (w[0], w[1]);
        let mid = a + (b - a) * (0.5 * (t0 + t1));
        if !covers_point(region, &mid, tol) {
            continue;
        }
        match intervals.last_mut() {
            Some(last) if (last.1 - t0).abs() * len <= tol => last.1 = t1,
            _ => intervals.push((t0, t1)),
        }
    }
    intervals.retain(|(t0, t1)| (t1 - t0) * len > tol);
    intervals
}

/// Total length of segment `a → b` covered by the region.
#[must_use]
pub fn covered_length(a: &Point2, b: &Point2, region: &MultiPolygon<f64>, tol: f64) -> f64 {
    let len = (b - a).norm();
    covered_intervals(a, b, region, tol)
        .iter()
        .map(|(t0, t1)| (t1 - t0) * len)
        .sum()
}

/// Length of boundary shared by two regions.
///
/// Counts every boundary segment of `a` that runs along the boundary of `b`.
#[must_use]
pub fn shared_boundary_length(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>, tol: f64) -> f64 {
    let others = boundary_segments(b);
    let mut total = 0.0;
    for (p, q) in boundary_segments(a) {
        let len = (q - p).norm();
        if len <= tol {
            continue;
        }
        let dir = (q - p) / len;
        let normal = left_normal(dir);
        for (r, s) in &others {
            // Both ends of the other segment must be on the supporting line.
            let off_r = (r - p).dot(&normal).abs();
            let off_s = (s - p).dot(&normal).abs();
            if off_r > tol || off_s > tol {
                continue;
            }
            let t_r = (r - p).dot(&dir);
            let t_s = (s - p).dot(&dir);
            let lo = t_r.min(t_s).max(0.0);
            let hi = t_r.max(t_s).min(len);
            if hi - lo > tol {
                total += hi - lo;
            }
        }
    }
    total
}
