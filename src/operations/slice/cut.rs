use geo::Polygon;

use crate::error::{Result, StripError};
use crate::geometry::boolean::covers_point;
use crate::geometry::{boundary_segments, multi};
use crate::math::distance_2d::point_to_segment_dist;
use crate::math::intersect_2d::{ray_segment_intersect_2d, segment_segment_intersect_2d};
use crate::math::{same_point, Point2, Vector2};
use crate::topology::PlanarGraph;

/// Traces cut lines from a supporting line into the polygon being sliced.
///
/// A cut prefers interior graph edges running close to the inward normal and
/// otherwise casts the normal ray to the next graph edge or boundary hit. It
/// ends on the polygon boundary.
pub(super) struct CutWalker {
    segments: Vec<(Point2, Point2)>,
    ring: Vec<(Point2, Point2)>,
    min_cos: f64,
    tol: f64,
}

impl CutWalker {
    /// Collects the interior graph edges lying in `region`.
    ///
    /// # Errors
    ///
    /// Returns an error if an edge refers to a missing node.
    pub(super) fn new(
        graph: &PlanarGraph,
        region: &Polygon<f64>,
        max_deviation: f64,
        tol: f64,
    ) -> Result<Self> {
        let area = multi(region.clone());
        let mut segments = Vec::new();
        for (_, edge) in graph.half_edges() {
            if edge.exterior {
                continue;
            }
            let a = graph.point(edge.origin)?;
            let b = graph.point(edge.target)?;
            if (b - a).norm() <= tol {
                continue;
            }
            if covers_point(&area, &(a + (b - a) * 0.5), tol) {
                segments.push((a, b));
            }
        }
        Ok(Self {
            segments,
            ring: boundary_segments(&area),
            min_cos: max_deviation.cos(),
            tol,
        })
    }

    /// Traces the cut from `start` along the unit `normal`.
    ///
    /// # Errors
    ///
    /// Returns `StripError::DanglingProjection` if the walk leaves the
    /// polygon without reaching its boundary.
    pub(super) fn cut(&self, start: Point2, normal: &Vector2) -> Result<Vec<Point2>> {
        let mut path = vec![start];
        let mut current = start;
        let limit = 2 * (self.segments.len() + self.ring.len()) + 4;
        for _ in 0..limit {
            let next = match self.follow(&current, normal) {
                Some(p) => p,
                None => self.cast(&current, normal).ok_or(StripError::DanglingProjection {
                    x: current.x,
                    y: current.y,
                })?,
            };
            path.push(next);
            if self.on_ring(&next) {
                return Ok(path);
            }
            current = next;
        }
        Err(StripError::DanglingProjection {
            x: current.x,
            y: current.y,
        }
        .into())
    }

    fn on_ring(&self, p: &Point2) -> bool {
        self.ring
            .iter()
            .any(|(a, b)| point_to_segment_dist(p, a, b) <= self.tol)
    }

    /// The far end of the graph edge through `current` that runs closest to
    /// `normal`, clipped at the boundary.
    fn follow(&self, current: &Point2, normal: &Vector2) -> Option<Point2> {
        let mut best: Option<(Point2, f64)> = None;
        for (a, b) in &self.segments {
            let targets = if same_point(current, a, self.tol) {
                [Some(*b), None]
            } else if same_point(current, b, self.tol) {
                [Some(*a), None]
            } else if point_to_segment_dist(current, a, b) <= self.tol {
                [Some(*a), Some(*b)]
            } else {
                continue;
            };
            for target in targets.into_iter().flatten() {
                let d = target - current;
                let len = d.norm();
                if len <= self.tol {
                    continue;
                }
                let cos = d.dot(normal) / len;
                if cos >= self.min_cos && best.map_or(true, |(_, c)| cos > c) {
                    best = Some((target, cos));
                }
            }
        }
        best.map(|(target, _)| self.clip(current, &target))
    }

    /// The first boundary crossing on `from → to`, or `to`.
    fn clip(&self, from: &Point2, to: &Point2) -> Point2 {
        let len = (to - from).norm();
        let mut end = *to;
        let mut nearest = 1.0;
        for (a, b) in &self.ring {
            if let Some((p, t, _)) = segment_segment_intersect_2d(from, to, a, b) {
                if t * len > self.tol && t < nearest {
                    nearest = t;
                    end = p;
                }
            }
        }
        end
    }

    /// The nearest graph edge or boundary hit along the ray.
    fn cast(&self, current: &Point2, normal: &Vector2) -> Option<Point2> {
        self.segments
            .iter()
            .chain(&self.ring)
            .filter_map(|(a, b)| ray_segment_intersect_2d(current, normal, a, b))
            .filter(|(_, t, _)| *t > self.tol)
            .min_by(|x, y| x.1.total_cmp(&y.1))
            .map(|(p, _, _)| p)
    }
}
