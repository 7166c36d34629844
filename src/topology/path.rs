use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use super::{HalfEdgeId, NodeId, PlanarGraph};

/// A path through the graph and its Euclidean length.
#[derive(Debug, Clone)]
pub struct EdgePath {
    /// Half-edges along the path. Each one may be traversed in either
    /// direction.
    pub edges: Vec<HalfEdgeId>,
    pub cost: f64,
}

/// Min-heap entry for Dijkstra's algorithm.
#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    cost: f64,
    node: NodeId,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap.
        other.cost.total_cmp(&self.cost)
    }
}

impl PlanarGraph {
    /// Shortest path from any source node to any target node, using only
    /// `candidates` and treating them as undirected.
    ///
    /// Returns `None` if no target is reachable.
    #[must_use]
    pub fn shortest_path_between(
        &self,
        sources: &[NodeId],
        targets: &[NodeId],
        candidates: &[HalfEdgeId],
    ) -> Option<EdgePath> {
        let mut adjacency: HashMap<NodeId, Vec<(NodeId, HalfEdgeId, f64)>> = HashMap::new();
        for &id in candidates {
            let Ok(edge) = self.half_edge(id) else { continue };
            let Ok(len) = self.edge_length(id) else { continue };
            adjacency
                .entry(edge.origin)
                .or_default()
                .push((edge.target, id, len));
            adjacency
                .entry(edge.target)
                .or_default()
                .push((edge.origin, id, len));
        }

        let targets: HashSet<NodeId> = targets.iter().copied().collect();
        let mut dist: HashMap<NodeId, f64> = HashMap::new();
        let mut prev: HashMap<NodeId, (NodeId, HalfEdgeId)> = HashMap::new();
        let mut heap = BinaryHeap::new();
        for &s in sources {
            dist.insert(s, 0.0);
            heap.push(QueueEntry { cost: 0.0, node: s });
        }

        while let Some(QueueEntry { cost, node }) = heap.pop() {
            if cost > dist.get(&node).copied().unwrap_or(f64::INFINITY) {
                continue;
            }
            if targets.contains(&node) {
                let mut edges = Vec::new();
                let mut at = node;
                while let Some(&(from, edge)) = prev.get(&at) {
                    edges.push(edge);
                    at = from;
                }
                edges.reverse();
                return Some(EdgePath { edges, cost });
            }
            let Some(neighbours) = adjacency.get(&node) else { continue };
            for &(next, edge, len) in neighbours {
                let candidate = cost + len;
                if candidate < dist.get(&next).copied().unwrap_or(f64::INFINITY) {
                    dist.insert(next, candidate);
                    prev.insert(next, (node, edge));
                    heap.push(QueueEntry { cost: candidate, node: next });
                }
            }
        }
        None
    }

    /// Shortest path joining the endpoints of two half-edges.
    ///
    /// Neither edge (nor its twin) may be used by the path itself.
    #[must_use]
    pub fn shortest_path(
        &self,
        from: HalfEdgeId,
        to: HalfEdgeId,
        candidates: &[HalfEdgeId],
    ) -> Option<EdgePath> {
        let a = self.half_edge(from).ok()?;
        let b = self.half_edge(to).ok()?;
        let excluded = [Some(from), a.twin, Some(to), b.twin];
        let usable: Vec<HalfEdgeId> = candidates
            .iter()
            .copied()
            .filter(|c| !excluded.contains(&Some(*c)))
            .collect();
        self.shortest_path_between(&[a.origin, a.target], &[b.origin, b.target], &usable)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point2;

    #[test]
    fn dijkstra_takes_the_shorter_branch() {
        let mut graph = PlanarGraph::new(1e-6);
        let a = graph.add_node(Point2::new(0.0, 0.0));
        let b = graph.add_node(Point2::new(10.0, 0.0));
        let c = graph.add_node(Point2::new(5.0, 1.0));
        let d = graph.add_node(Point2::new(5.0, 10.0));
        let (ac, _) = graph.add_edge_pair(a, c);
        let (cb, _) = graph.add_edge_pair(c, b);
        let (ad, _) = graph.add_edge_pair(a, d);
        let (db, _) = graph.add_edge_pair(d, b);
        let path = graph
            .shortest_path_between(&[a], &[b], &[ac, cb, ad, db])
            .unwrap();
        assert_eq!(path.edges, vec![ac, cb]);
        assert!((path.cost - 2.0 * 26f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn edges_are_undirected() {
        let mut graph = PlanarGraph::new(1e-6);
        let a = graph.add_node(Point2::new(0.0, 0.0));
        let b = graph.add_node(Point2::new(3.0, 4.0));
        let (_, ba) = graph.add_edge_pair(a, b);
        let path = graph.shortest_path_between(&[a], &[b], &[ba]).unwrap();
        assert_eq!(path.edges, vec![ba]);
        assert!((path.cost - 5.0).abs() < 1e-12);
    }

    #[test]
    fn unreachable_target_is_none() {
        let mut graph = PlanarGraph::new(1e-6);
        let a = graph.add_node(Point2::new(0.0, 0.0));
        let b = graph.add_node(Point2::new(1.0, 0.0));
        assert!(graph.shortest_path_between(&[a], &[b], &[]).is_none());
    }

    #[test]
    fn shortest_path_skips_its_own_endpoint_edges() {
        let mut graph = PlanarGraph::new(1e-6);
        let a = graph.add_node(Point2::new(0.0, 0.0));
        let b = graph.add_node(Point2::new(1.0, 0.0));
        let c = graph.add_node(Point2::new(5.0, 0.0));
        let d = graph.add_node(Point2::new(6.0, 0.0));
        let (ab, _) = graph.add_edge_pair(a, b);
        let (bc, _) = graph.add_edge_pair(b, c);
        let (cd, _) = graph.add_edge_pair(c, d);
        let path = graph.shortest_path(ab, cd, &[ab, bc, cd]).unwrap();
        assert_eq!(path.edges, vec![bc]);
    }
}
