use slotmap::SlotMap;

use super::face::FaceId;
use super::half_edge::HalfEdgeId;
use crate::error::TopologyError;
use crate::geometry::Polyline;
use crate::math::{same_point, Point2};
use crate::road::RoadAttribute;

slotmap::new_key_type! {
    /// Unique identifier for a strip.
    pub struct StripId;
}

/// Whether a strip runs along a primary road frontage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripKind {
    Primary,
    Secondary,
}

/// One exterior edge's contribution to a strip's frontage.
#[derive(Debug, Clone)]
pub struct FrontageSegment {
    pub start: Point2,
    pub end: Point2,
    /// The road fronted, if any.
    pub road: Option<RoadAttribute>,
    /// Index of the source edge in the ordered exterior cycle.
    pub position: usize,
}

impl FrontageSegment {
    #[must_use]
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }
}

/// A contiguous group of exterior edges that becomes one row of parcels.
#[derive(Debug, Clone)]
pub struct StripData {
    /// Exterior half-edges in cycle order.
    pub edges: Vec<HalfEdgeId>,
    pub kind: StripKind,
    /// The grouping face whose geometry is this strip's polygon.
    pub face: Option<FaceId>,
    /// Exterior segments the strip was built from, in cycle order.
    pub frontage: Vec<FrontageSegment>,
    /// The corrected supporting line the slicer walks along.
    pub psi: Polyline,
}

impl StripData {
    /// Creates an empty strip of the given kind.
    #[must_use]
    pub fn new(kind: StripKind) -> Self {
        Self {
            edges: Vec::new(),
            kind,
            face: None,
            frontage: Vec::new(),
            psi: Polyline::default(),
        }
    }

    /// The uncorrected supporting line: the frontage segments joined in
    /// cycle order.
    ///
    /// Gaps between non-adjacent segments are bridged by a straight jump.
    #[must_use]
    pub fn alpha_line(&self) -> Polyline {
        let mut line = Polyline::default();
        for seg in &self.frontage {
            line.extend(&Polyline::new(vec![seg.start, seg.end]));
        }
        line
    }

    /// Merges another strip's frontage, keeping cycle order.
    pub fn absorb_frontage(&mut self, other: Vec<FrontageSegment>) {
        self.frontage.extend(other);
        self.frontage.sort_by_key(|s| s.position);
    }

    /// Returns `true` if the frontage segments join end to start in order.
    #[must_use]
    pub fn is_contiguous(&self, tol: f64) -> bool {
        self.frontage
            .windows(2)
            .all(|w| same_point(&w[0].end, &w[1].start, tol))
    }
}

/// Arena of strips plus their order around the block.
#[derive(Debug, Default)]
pub struct StripGraph {
    strips: SlotMap<StripId, StripData>,
    order: Vec<StripId>,
}

impl StripGraph {
    /// Creates an empty strip graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a strip at the end of the order and returns its ID.
    pub fn add(&mut self, data: StripData) -> StripId {
        let id = self.strips.insert(data);
        self.order.push(id);
        id
    }

    /// Returns a reference to the strip data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the graph.
    pub fn strip(&self, id: StripId) -> Result<&StripData, TopologyError> {
        self.strips
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("strip".into()))
    }

    /// Returns a mutable reference to the strip data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the graph.
    pub fn strip_mut(&mut self, id: StripId) -> Result<&mut StripData, TopologyError> {
        self.strips
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("strip".into()))
    }

    /// Removes a strip, returning its data.
    pub fn remove(&mut self, id: StripId) -> Option<StripData> {
        self.order.retain(|s| *s != id);
        self.strips.remove(id)
    }

    /// Returns `true` if the strip exists.
    #[must_use]
    pub fn contains(&self, id: StripId) -> bool {
        self.strips.contains_key(id)
    }

    /// Strip IDs in order around the block.
    #[must_use]
    pub fn order(&self) -> &[StripId] {
        &self.order
    }

    /// Replaces the order. IDs that are not in the arena are dropped.
    pub fn set_order(&mut self, order: Vec<StripId>) {
        self.order = order
            .into_iter()
            .filter(|id| self.strips.contains_key(*id))
            .collect();
    }

    /// Iterates strips in order.
    pub fn iter(&self) -> impl Iterator<Item = (StripId, &StripData)> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.strips.get(*id).map(|s| (*id, s)))
    }

    /// Number of strips.
    #[must_use]
    pub fn len(&self) -> usize {
        self.strips.len()
    }

    /// Returns `true` if there are no strips.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strips.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn segment(x0: f64, x1: f64, position: usize) -> FrontageSegment {
        FrontageSegment {
            start: Point2::new(x0, 0.0),
            end: Point2::new(x1, 0.0),
            road: None,
            position,
        }
    }

    #[test]
    fn order_follows_insertion_and_removal() {
        let mut graph = StripGraph::new();
        let a = graph.add(StripData::new(StripKind::Primary));
        let b = graph.add(StripData::new(StripKind::Secondary));
        let c = graph.add(StripData::new(StripKind::Primary));
        assert_eq!(graph.order(), &[a, b, c]);
        graph.remove(b);
        assert_eq!(graph.order(), &[a, c]);
        assert!(graph.strip(b).is_err());
        graph.set_order(vec![c, b, a]);
        assert_eq!(graph.order(), &[c, a]);
    }

    #[test]
    fn absorbed_frontage_is_sorted_and_contiguous() {
        let mut strip = StripData::new(StripKind::Primary);
        strip.frontage.push(segment(10.0, 20.0, 1));
        strip.absorb_frontage(vec![segment(0.0, 10.0, 0)]);
        assert_eq!(strip.frontage[0].position, 0);
        assert!(strip.is_contiguous(1e-9));
        assert!((strip.alpha_line().length() - 20.0).abs() < 1e-12);
    }
}
