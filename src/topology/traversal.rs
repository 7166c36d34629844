use tracing::warn;

use super::{HalfEdgeId, NodeId, PlanarGraph};
use crate::error::TopologyError;
use crate::math::polygon_2d::turning_angle;
use crate::math::{Vector2, TOLERANCE};

/// Walk direction around the exterior boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

impl PlanarGraph {
    /// Unit direction of a half-edge. `None` for missing or zero-length edges.
    #[must_use]
    pub fn direction(&self, id: HalfEdgeId) -> Option<Vector2> {
        let (a, b) = self.endpoints(id).ok()?;
        let d = b - a;
        let len = d.norm();
        (len > TOLERANCE).then(|| d / len)
    }

    /// Exterior half-edges, in arena order.
    #[must_use]
    pub fn exterior_edges(&self) -> Vec<HalfEdgeId> {
        self.half_edges()
            .filter(|(_, e)| e.exterior)
            .map(|(id, _)| id)
            .collect()
    }

    /// The exterior half-edge ending at `node`, if any.
    #[must_use]
    pub fn exterior_edge_into(&self, node: NodeId) -> Option<HalfEdgeId> {
        self.half_edges()
            .find(|(_, e)| e.exterior && e.target == node)
            .map(|(id, _)| id)
    }

    /// The exterior half-edge starting at `node`, if any.
    #[must_use]
    pub fn exterior_edge_out_of(&self, node: NodeId) -> Option<HalfEdgeId> {
        self.half_edges()
            .find(|(_, e)| e.exterior && e.origin == node)
            .map(|(id, _)| id)
    }

    /// Chooses the continuation of `current` at `node` among `candidates`.
    ///
    /// `current` must end at `node`. Only candidates starting at `node` are
    /// considered; `current`, its twin and its geometric reverse are never
    /// chosen. Among the rest, the one with the smallest absolute turning
    /// angle wins; ties keep the first candidate.
    #[must_use]
    pub fn next(
        &self,
        node: NodeId,
        current: HalfEdgeId,
        candidates: &[HalfEdgeId],
    ) -> Option<HalfEdgeId> {
        let cur = self.half_edge(current).ok()?;
        let incoming = self.direction(current)?;
        let mut best: Option<(HalfEdgeId, f64)> = None;
        for &c in candidates {
            if c == current || Some(c) == cur.twin {
                continue;
            }
            let Ok(edge) = self.half_edge(c) else { continue };
            if edge.origin != node || (edge.target == cur.origin && edge.origin == cur.target) {
                continue;
            }
            let Some(outgoing) = self.direction(c) else { continue };
            let angle = turning_angle(&incoming, &outgoing).abs();
            if best.map_or(true, |(_, a)| angle < a - TOLERANCE) {
                best = Some((c, angle));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Chooses the predecessor of `current` at `node` among `candidates`.
    ///
    /// The mirror image of [`next`](Self::next): `current` starts at `node`
    /// and only candidates ending at `node` are considered.
    #[must_use]
    pub fn previous(
        &self,
        node: NodeId,
        current: HalfEdgeId,
        candidates: &[HalfEdgeId],
    ) -> Option<HalfEdgeId> {
        let cur = self.half_edge(current).ok()?;
        let outgoing = self.direction(current)?;
        let mut best: Option<(HalfEdgeId, f64)> = None;
        for &c in candidates {
            if c == current || Some(c) == cur.twin {
                continue;
            }
            let Ok(edge) = self.half_edge(c) else { continue };
            if edge.target != node || (edge.target == cur.origin && edge.origin == cur.target) {
                continue;
            }
            let Some(incoming) = self.direction(c) else { continue };
            let angle = turning_angle(&incoming, &outgoing).abs();
            if best.map_or(true, |(_, a)| angle < a - TOLERANCE) {
                best = Some((c, angle));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Orders the exterior half-edges into one closed cycle.
    ///
    /// The walk starts at the first exterior edge and follows successors. If
    /// the chain does not close, it is retried following predecessors.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::OpenBoundary` if neither walk closes or the
    /// closed cycle misses some exterior edges.
    pub fn ordered_exterior_edges(&self) -> Result<Vec<HalfEdgeId>, TopologyError> {
        let exterior = self.exterior_edges();
        let Some(&first) = exterior.first() else {
            return Err(TopologyError::OpenBoundary("no exterior edges".into()));
        };

        let cycle = match self.walk_cycle(first, &exterior, Direction::Forward) {
            Some(cycle) => cycle,
            None => {
                warn!("exterior walk did not close, retrying backwards");
                self.walk_cycle(first, &exterior, Direction::Backward)
                    .ok_or_else(|| TopologyError::OpenBoundary("chain does not close".into()))?
            }
        };

        if cycle.len() != exterior.len() {
            return Err(TopologyError::OpenBoundary(format!(
                "cycle holds {} of {} exterior edges",
                cycle.len(),
                exterior.len()
            )));
        }
        Ok(cycle)
    }

    /// Walks from `first` until the chain returns to it. The result is
    /// always in forward order.
    fn walk_cycle(
        &self,
        first: HalfEdgeId,
        exterior: &[HalfEdgeId],
        direction: Direction,
    ) -> Option<Vec<HalfEdgeId>> {
        let mut cycle = vec![first];
        let mut current = first;
        for _ in 0..exterior.len() {
            let edge = self.half_edge(current).ok()?;
            let step = match direction {
                Direction::Forward => self.next(edge.target, current, exterior)?,
                Direction::Backward => self.previous(edge.origin, current, exterior)?,
            };
            if step == first {
                if direction == Direction::Backward {
                    cycle[1..].reverse();
                }
                return Some(cycle);
            }
            if cycle.contains(&step) {
                return None;
            }
            cycle.push(step);
            current = step;
        }
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point2;
    use crate::test_fixtures::{l_shape_faces, rectangle_faces};

    #[test]
    fn rectangle_cycle_is_closed_and_counter_clockwise() {
        let graph = PlanarGraph::from_faces(&rectangle_faces(), 1e-6).unwrap();
        let cycle = graph.ordered_exterior_edges().unwrap();
        assert_eq!(cycle.len(), 4);
        for i in 0..cycle.len() {
            let a = graph.half_edge(cycle[i]).unwrap();
            let b = graph.half_edge(cycle[(i + 1) % cycle.len()]).unwrap();
            assert_eq!(a.target, b.origin);
        }
        let points: Vec<Point2> = cycle
            .iter()
            .map(|e| graph.endpoints(*e).unwrap().0)
            .collect();
        assert!(crate::math::polygon_2d::signed_area_2d(&points) > 0.0);
    }

    #[test]
    fn l_shape_cycle_covers_every_exterior_edge() {
        let graph = PlanarGraph::from_faces(&l_shape_faces(), 1e-6).unwrap();
        let cycle = graph.ordered_exterior_edges().unwrap();
        assert_eq!(cycle.len(), 6);
    }

    #[test]
    fn next_prefers_the_straightest_continuation() {
        let mut graph = PlanarGraph::new(1e-6);
        let o = graph.add_node(Point2::new(0.0, 0.0));
        let m = graph.add_node(Point2::new(1.0, 0.0));
        let ahead = graph.add_node(Point2::new(2.0, 0.1));
        let left = graph.add_node(Point2::new(1.0, 1.0));
        let (om, _) = graph.add_edge_pair(o, m);
        let (m_ahead, _) = graph.add_edge_pair(m, ahead);
        let (m_left, _) = graph.add_edge_pair(m, left);
        let candidates: Vec<HalfEdgeId> = graph.half_edges().map(|(id, _)| id).collect();
        assert_eq!(graph.next(m, om, &candidates), Some(m_ahead));
        assert_eq!(graph.next(m, om, &[m_left]), Some(m_left));
        // The twin of the current edge is never a continuation.
        let back = graph.half_edge(om).unwrap().twin.unwrap();
        assert_eq!(graph.next(m, om, &[back]), None);
        assert_eq!(graph.previous(m, m_ahead, &candidates), Some(om));
    }

    #[test]
    fn open_chain_is_an_error() {
        let mut graph = PlanarGraph::new(1e-6);
        let a = graph.add_node(Point2::new(0.0, 0.0));
        let b = graph.add_node(Point2::new(1.0, 0.0));
        let (ab, ba) = graph.add_edge_pair(a, b);
        for id in [ab, ba] {
            let e = graph.half_edge_mut(id).unwrap();
            e.twin = None;
            e.exterior = true;
        }
        graph.remove_edge(ba).unwrap();
        assert!(matches!(
            graph.ordered_exterior_edges(),
            Err(TopologyError::OpenBoundary(_))
        ));
    }
}
