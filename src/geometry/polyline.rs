
use crate::math::distance_2d::project_onto_segment;
use crate::math::polygon_2d::left_normal;
use crate::math::{same_point, Point2, Vector2, TOLERANCE};

/// An open polyline parameterized by arc length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polyline {
    /// The ordered vertices.
    pub points: Vec<Point2>,
}

impl Polyline {
    /// Creates a polyline, dropping consecutive duplicate vertices.
    #[must_use]
    pub fn new(points: Vec<Point2>) -> Self {
        let mut deduped: Vec<Point2> = Vec::with_capacity(points.len());
        for p in points {
            if deduped.last().map_or(true, |last| !same_point(last, &p, TOLERANCE)) {
                deduped.push(p);
            }
        }
        Self { points: deduped }
    }

    /// Returns `true` if the polyline has no extent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.len() < 2
    }

    /// Total arc length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
    }

    /// First vertex.
    #[must_use]
    pub fn start(&self) -> Option<Point2> {
        self.points.first().copied()
    }

    /// Last vertex.
    #[must_use]
    pub fn end(&self) -> Option<Point2> {
        self.points.last().copied()
    }

    /// Returns the segment index and local parameter holding arc length `s`.
    fn segment_at(&self, s: f64) -> Option<(usize, f64)> {
        if self.is_empty() {
            return None;
        }
        let mut acc = 0.0;
        let last = self.points.len() - 2;
        for (i, w) in self.points.windows(2).enumerate() {
            let len = (w[1] - w[0]).norm();
            if s <= acc + len || i == last {
                let local = if len < TOLERANCE { 0.0 } else { ((s - acc) / len).clamp(0.0, 1.0) };
                return Some((i, local));
            }
            acc += len;
        }
        None
    }

    /// The point at arc length `s`, clamped to the polyline.
    #[must_use]
    pub fn point_at(&self, s: f64) -> Option<Point2> {
        let (i, t) = self.segment_at(s)?;
        let a = self.points[i];
        let b = self.points[i + 1];
        Some(a + (b - a) * t)
    }

    /// The unit direction of the segment holding arc length `s`.
    #[must_use]
    pub fn direction_at(&self, s: f64) -> Option<Vector2> {
        let (i, _) = self.segment_at(s)?;
        let d = self.points[i + 1] - self.points[i];
        let len = d.norm();
        (len > TOLERANCE).then(|| d / len)
    }

    /// The left unit normal at arc length `s`.
    #[must_use]
    pub fn normal_at(&self, s: f64) -> Option<Vector2> {
        self.direction_at(s).map(left_normal)
    }

    /// Projects `p` onto the polyline.
    ///
    /// Returns the arc length of the nearest point and the distance to it.
    #[must_use]
    pub fn locate(&self, p: &Point2) -> Option<(f64, f64)> {
        if self.is_empty() {
            return None;
        }
        let mut best: Option<(f64, f64)> = None;
        let mut acc = 0.0;
        for w in self.points.windows(2) {
            let len = (w[1] - w[0]).norm();
            let (closest, t) = project_onto_segment(p, &w[0], &w[1]);
            let dist = (p - closest).norm();
            if best.map_or(true, |(_, d)| dist < d - TOLERANCE) {
                best = Some((acc + t * len, dist));
            }
            acc += len;
        }
        best
    }

    /// The portion between arc lengths `s0` and `s1`.
    ///
    /// If `s0 > s1` the result runs backwards.
    #[must_use]
    pub fn sub_line(&self, s0: f64, s1: f64) -> Polyline {
        if s0 > s1 {
            let mut forward = self.sub_line(s1, s0);
            forward.points.reverse();
            return forward;
        }
        let (Some(p0), Some(p1)) = (self.point_at(s0), self.point_at(s1)) else {
            return Polyline::default();
        };
        let mut points = vec![p0];
        let mut acc = 0.0;
        for w in self.points.windows(2) {
            acc += (w[1] - w[0]).norm();
            if acc > s0 + TOLERANCE && acc < s1 - TOLERANCE {
                points.push(w[1]);
            }
        }
        points.push(p1);
        Polyline::new(points)
    }

    /// Appends another polyline, joining at a shared endpoint when present.
    pub fn extend(&mut self, other: &Polyline) {
        for p in &other.points {
            if self.points.last().map_or(true, |last| !same_point(last, p, TOLERANCE)) {
                self.points.push(*p);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn ell() -> Polyline {
        Polyline::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 5.0),
        ])
    }

    #[test]
    fn length_and_point_at() {
        let line = ell();
        assert_relative_eq!(line.length(), 15.0);
        let p = line.point_at(12.0).unwrap();
        assert_relative_eq!(p.x, 10.0);
        assert_relative_eq!(p.y, 2.0);
        let clamped = line.point_at(40.0).unwrap();
        assert_relative_eq!(clamped.y, 5.0);
    }

    #[test]
    fn normal_points_left() {
        let n = ell().normal_at(3.0).unwrap();
        assert_relative_eq!(n.x, 0.0);
        assert_relative_eq!(n.y, 1.0);
    }

    #[test]
    fn locate_projects_to_nearest_segment() {
        let (s, d) = ell().locate(&Point2::new(8.0, 3.0)).unwrap();
        assert_relative_eq!(s, 13.0);
        assert_relative_eq!(d, 2.0);
    }

    #[test]
    fn sub_line_forward_and_backward() {
        let line = ell();
        let forward = line.sub_line(5.0, 12.0);
        assert_eq!(forward.points.len(), 3);
        assert_relative_eq!(forward.length(), 7.0);
        let backward = line.sub_line(12.0, 5.0);
        assert_relative_eq!(backward.start().unwrap().y, 2.0);
        assert_relative_eq!(backward.end().unwrap().x, 5.0);
    }

    #[test]
    fn new_drops_duplicates() {
        let line = Polyline::new(vec![Point2::new(0.0, 0.0), Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)]);
        assert_eq!(line.points.len(), 2);
        assert!(!line.is_empty());
        assert!(Polyline::new(vec![Point2::new(1.0, 1.0)]).is_empty());
    }
}
