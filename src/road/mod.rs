//! Road attributes and the lookup that assigns them to boundary edges.

pub mod network;

pub use network::RoadNetwork;

use geo::MultiPolygon;

use crate::math::Point2;

/// The road an exterior edge fronts.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadAttribute {
    pub name: String,
    /// Higher is more important. A missing importance reads as `0`.
    pub importance: f64,
}

impl RoadAttribute {
    /// Creates a road attribute.
    #[must_use]
    pub fn new(name: impl Into<String>, importance: f64) -> Self {
        Self {
            name: name.into(),
            importance,
        }
    }
}

/// Finds the road an exterior edge faces.
pub trait RoadLookup {
    /// Looks for a road within `max_distance` on the far side of the edge
    /// `start → end` from `context`.
    fn find_road_in_direction(
        &self,
        start: &Point2,
        end: &Point2,
        context: &MultiPolygon<f64>,
        max_distance: f64,
    ) -> Option<RoadAttribute>;
}

/// Any closure over the edge endpoints is a lookup.
impl<F> RoadLookup for F
where
    F: Fn(&Point2, &Point2) -> Option<RoadAttribute>,
{
    fn find_road_in_direction(
        &self,
        start: &Point2,
        end: &Point2,
        _context: &MultiPolygon<f64>,
        _max_distance: f64,
    ) -> Option<RoadAttribute> {
        self(start, end)
    }
}
