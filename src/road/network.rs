use geo::MultiPolygon;
use tracing::trace;

use super::{RoadAttribute, RoadLookup};
use crate::geometry::boolean::covers_point;
use crate::geometry::Polyline;
use crate::math::intersect_2d::ray_segment_intersect_2d;
use crate::math::polygon_2d::left_normal;
use crate::math::{Point2, TOLERANCE};

/// A road centreline with its attribute.
#[derive(Debug, Clone)]
pub struct Road {
    pub attribute: RoadAttribute,
    pub centreline: Polyline,
}

/// A set of road centrelines searched by ray casting.
#[derive(Debug, Clone, Default)]
pub struct RoadNetwork {
    roads: Vec<Road>,
}

impl RoadNetwork {
    /// Creates an empty network.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a road.
    pub fn add_road(&mut self, attribute: RoadAttribute, centreline: Polyline) {
        self.roads.push(Road {
            attribute,
            centreline,
        });
    }

    /// Number of roads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roads.len()
    }

    /// Returns `true` if the network has no roads.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roads.is_empty()
    }
}

impl RoadLookup for RoadNetwork {
    /// Casts a ray from the edge midpoint along the normal pointing away
    /// from `context`; the nearest road hit within `max_distance` wins.
    fn find_road_in_direction(
        &self,
        start: &Point2,
        end: &Point2,
        context: &MultiPolygon<f64>,
        max_distance: f64,
    ) -> Option<RoadAttribute> {
        let d = end - start;
        let len = d.norm();
        if len < TOLERANCE {
            return None;
        }
        let mid = start + d * 0.5;
        // Boundaries run counter-clockwise, so the outside is on the right.
        let mut outward = -left_normal(d / len);
        let outside = mid + outward * (len * 1e-3).min(1e-3);
        if covers_point(context, &outside, 0.0) {
            outward = -outward;
        }

        let mut best: Option<(f64, &RoadAttribute)> = None;
        for road in &self.roads {
            for w in road.centreline.points.windows(2) {
                let Some((_, t, _)) = ray_segment_intersect_2d(&mid, &outward, &w[0], &w[1]) else {
                    continue;
                };
                if t <= max_distance && best.map_or(true, |(bt, _)| t < bt) {
                    best = Some((t, &road.attribute));
                }
            }
        }
        if let Some((t, road)) = best {
            trace!(road = %road.name, distance = t, "edge fronts road");
        }
        best.map(|(_, road)| road.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{multi, polygon_from_points};

    fn block() -> MultiPolygon<f64> {
        multi(polygon_from_points(
            &[
                Point2::new(0.0, 0.0),
                Point2::new(40.0, 0.0),
                Point2::new(40.0, 20.0),
                Point2::new(0.0, 20.0),
            ],
            1e-9,
        ))
    }

    fn network() -> RoadNetwork {
        let mut net = RoadNetwork::new();
        net.add_road(
            RoadAttribute::new("Main", 5.0),
            Polyline::new(vec![Point2::new(-10.0, -5.0), Point2::new(50.0, -5.0)]),
        );
        net.add_road(
            RoadAttribute::new("Far", 1.0),
            Polyline::new(vec![Point2::new(-10.0, 60.0), Point2::new(50.0, 60.0)]),
        );
        net
    }

    #[test]
    fn bottom_edge_finds_the_road_below() {
        let road = network()
            .find_road_in_direction(&Point2::new(0.0, 0.0), &Point2::new(40.0, 0.0), &block(), 20.0)
            .unwrap();
        assert_eq!(road.name, "Main");
    }

    #[test]
    fn roads_beyond_the_search_distance_are_ignored() {
        let road = network().find_road_in_direction(
            &Point2::new(40.0, 20.0),
            &Point2::new(0.0, 20.0),
            &block(),
            20.0,
        );
        assert!(road.is_none());
    }

    #[test]
    fn reversed_edge_still_looks_outward() {
        let road = network()
            .find_road_in_direction(&Point2::new(40.0, 0.0), &Point2::new(0.0, 0.0), &block(), 20.0)
            .unwrap();
        assert_eq!(road.name, "Main");
    }

    #[test]
    fn closures_are_lookups() {
        let lookup = |a: &Point2, _: &Point2| (a.y < 1.0).then(|| RoadAttribute::new("Low", 1.0));
        let found = lookup.find_road_in_direction(
            &Point2::new(0.0, 0.0),
            &Point2::new(1.0, 0.0),
            &block(),
            20.0,
        );
        assert!(found.is_some());
    }
}
