use std::collections::HashMap;

use tracing::{debug, info_span, warn};

use super::frontage::Frontage;
use crate::error::Result;
use crate::geometry::boolean::{union_all, without_holes};
use crate::topology::{
    FaceData, FaceId, FrontageSegment, HalfEdgeId, PlanarGraph, StripData, StripGraph, StripId,
    StripKind,
};

/// Merges the classified exterior cycle into alpha-strips and groups the
/// skeleton faces behind them.
pub struct AlphaStripBuilder<'a> {
    frontage: &'a Frontage,
}

impl<'a> AlphaStripBuilder<'a> {
    /// Creates a new `AlphaStripBuilder` over a classified cycle.
    #[must_use]
    pub fn new(frontage: &'a Frontage) -> Self {
        Self { frontage }
    }

    /// Executes the builder, tagging edges and skeleton faces with their strip.
    ///
    /// # Errors
    ///
    /// Returns an error if a graph entity referenced by the frontage is missing.
    pub fn execute(&self, graph: &mut PlanarGraph) -> Result<StripGraph> {
        let _span = info_span!("alpha").entered();
        let mut strips = StripGraph::new();
        for (kind, edges) in self.chains(graph)? {
            let id = strips.add(StripData::new(kind));
            for edge in edges {
                attach(graph, &mut strips, id, edge)?;
            }
        }
        debug!(strips = strips.len(), "chains built");

        self.stitch(graph, &mut strips)?;
        let owner = self.assign_faces(graph, &strips)?;
        hand_over_faceless(graph, &mut strips, &owner)?;
        self.normalize(&mut strips)?;
        self.build_geometry(graph, &mut strips, &owner)?;

        debug!(strips = strips.len(), "alpha-strips built");
        Ok(strips)
    }

    /// Runs the merge rules over consecutive edge pairs, wrap included.
    fn chains(&self, graph: &PlanarGraph) -> Result<Vec<(StripKind, Vec<HalfEdgeId>)>> {
        let cycle = &self.frontage.cycle;
        let Some(&first) = cycle.first() else {
            return Ok(Vec::new());
        };
        let mut chains = vec![(self.kind_of(first), vec![first])];
        for w in cycle.windows(2) {
            if self.continues(graph, w[0], w[1])? {
                if let Some((_, edges)) = chains.last_mut() {
                    edges.push(w[1]);
                }
            } else {
                chains.push((self.kind_of(w[1]), vec![w[1]]));
            }
        }

        let last = cycle[cycle.len() - 1];
        if chains.len() > 1 && self.continues(graph, last, first)? {
            if let Some((_, tail)) = chains.pop() {
                // The first chain now starts where the last one did.
                chains[0].1.splice(0..0, tail);
            }
        }
        Ok(chains)
    }

    fn kind_of(&self, edge: HalfEdgeId) -> StripKind {
        if self.frontage.is_primary(edge) {
            StripKind::Primary
        } else {
            StripKind::Secondary
        }
    }

    /// Whether `b` stays in the strip that holds `a`.
    fn continues(&self, graph: &PlanarGraph, a: HalfEdgeId, b: HalfEdgeId) -> Result<bool> {
        let (pa, pb) = (self.frontage.is_primary(a), self.frontage.is_primary(b));
        Ok(match (pa, pb) {
            (true, true) => {
                let (ea, eb) = (graph.half_edge(a)?, graph.half_edge(b)?);
                let same_road = match (&ea.road, &eb.road) {
                    (Some(ra), Some(rb)) => ra.name == rb.name,
                    _ => false,
                };
                ea.face == eb.face || same_road
            }
            (false, false) => true,
            _ => false,
        })
    }

    /// Joins every secondary fragment of a multi-frontage face to the face's
    /// primary strip along the cheapest exterior path.
    fn stitch(&self, graph: &mut PlanarGraph, strips: &mut StripGraph) -> Result<()> {
        for &face in &self.frontage.faces_with_multiple_frontages {
            let Some(run) = self.frontage.primary_run(face) else { continue };
            let Some(primary) = graph.half_edge(run.edges[0])?.strip else { continue };

            let mut secondaries: Vec<StripId> = Vec::new();
            for (id, strip) in strips.iter() {
                if id == primary || strip.kind != StripKind::Secondary {
                    continue;
                }
                let mut touches = false;
                for &e in &strip.edges {
                    touches |= graph.half_edge(e)?.face == Some(face);
                }
                if touches {
                    secondaries.push(id);
                }
            }

            let mut paths = Vec::new();
            for secondary in secondaries {
                let own: Vec<HalfEdgeId> = strips
                    .strip(primary)?
                    .edges
                    .iter()
                    .chain(&strips.strip(secondary)?.edges)
                    .copied()
                    .collect();
                let candidates: Vec<HalfEdgeId> = self
                    .frontage
                    .cycle
                    .iter()
                    .filter(|e| !own.contains(e))
                    .copied()
                    .collect();
                let sources = strip_nodes(graph, strips.strip(primary)?)?;
                let targets = strip_nodes(graph, strips.strip(secondary)?)?;
                match graph.shortest_path_between(&sources, &targets, &candidates) {
                    Some(path) => paths.push((secondary, path)),
                    None => warn!("no exterior path joins a secondary fragment"),
                }
            }
            paths.sort_by(|a, b| a.1.cost.total_cmp(&b.1.cost));

            for (secondary, path) in paths {
                if strips.contains(secondary) {
                    absorb(graph, strips, primary, secondary)?;
                }
                for edge in path.edges {
                    let touched = graph.half_edge(edge)?.strip;
                    if let Some(t) = touched.filter(|t| *t != primary && strips.contains(*t)) {
                        absorb(graph, strips, primary, t)?;
                    }
                }
            }
            debug!(strips = strips.len(), "multi-frontage face stitched");
        }
        Ok(())
    }

    /// Assigns every skeleton face to one strip.
    fn assign_faces(
        &self,
        graph: &PlanarGraph,
        strips: &StripGraph,
    ) -> Result<HashMap<FaceId, StripId>> {
        let faces = graph.skeleton_faces();
        let mut owner: HashMap<FaceId, StripId> = HashMap::new();

        // The strip holding the face's primary run.
        for &face in &faces {
            if let Some(run) = self.frontage.primary_run(face) {
                if let Some(strip) = graph.half_edge(run.edges[0])?.strip {
                    owner.insert(face, strip);
                }
            }
        }

        // The strip holding the face's longest boundary edge.
        let mut longest: HashMap<FaceId, (f64, StripId)> = HashMap::new();
        for &edge in &self.frontage.cycle {
            let data = graph.half_edge(edge)?;
            let (Some(face), Some(strip)) = (data.face, data.strip) else { continue };
            if owner.contains_key(&face) {
                continue;
            }
            let len = graph.edge_length(edge)?;
            match longest.get(&face) {
                Some((best, _)) if len <= *best => {}
                _ => {
                    longest.insert(face, (len, strip));
                }
            }
        }
        owner.extend(longest.into_iter().map(|(face, (_, strip))| (face, strip)));

        // Interior faces follow their neighbour across the longest shared edge.
        loop {
            let mut progress = false;
            for &face in &faces {
                if owner.contains_key(&face) {
                    continue;
                }
                let mut shared: Vec<(StripId, f64)> = Vec::new();
                for (id, edge) in graph.half_edges() {
                    if edge.face != Some(face) {
                        continue;
                    }
                    let Some(twin) = edge.twin else { continue };
                    let Some(other) = graph.half_edge(twin)?.face else { continue };
                    let Some(&strip) = owner.get(&other) else { continue };
                    let len = graph.edge_length(id)?;
                    match shared.iter_mut().find(|(s, _)| *s == strip) {
                        Some(entry) => entry.1 += len,
                        None => shared.push((strip, len)),
                    }
                }
                let best = shared
                    .into_iter()
                    .fold(None, |best: Option<(StripId, f64)>, (s, len)| match best {
                        Some((_, b)) if len <= b => best,
                        _ => Some((s, len)),
                    });
                if let Some((strip, _)) = best {
                    owner.insert(face, strip);
                    progress = true;
                }
            }
            if !progress {
                break;
            }
        }

        if let Some(&fallback) = strips.order().first() {
            for &face in &faces {
                if !owner.contains_key(&face) {
                    warn!("skeleton face is not connected to any strip");
                    owner.insert(face, fallback);
                }
            }
        }
        Ok(owner)
    }

    /// Sorts each strip's edges into cycle order, and the strips by their
    /// first edge.
    fn normalize(&self, strips: &mut StripGraph) -> Result<()> {
        let n = self.frontage.cycle.len();
        let mut order: Vec<(usize, StripId)> = Vec::new();
        let ids: Vec<StripId> = strips.order().to_vec();
        for id in ids {
            let strip = strips.strip_mut(id)?;
            let mut positioned: Vec<(usize, HalfEdgeId)> = strip
                .edges
                .iter()
                .filter_map(|e| self.frontage.position(*e).map(|p| (p, *e)))
                .collect();
            positioned.sort_by_key(|(p, _)| *p);
            // Start after the largest gap so a run across the wrap stays whole.
            let mut start = 0;
            let mut largest = 1;
            for i in 0..positioned.len() {
                let next = (i + 1) % positioned.len();
                let gap = (positioned[next].0 + n - positioned[i].0) % n;
                if gap > largest {
                    largest = gap;
                    start = next;
                }
            }
            positioned.rotate_left(start);
            strip.edges = positioned.iter().map(|(_, e)| *e).collect();
            let min = positioned.iter().map(|(p, _)| *p).min().unwrap_or(n);
            order.push((min, id));
        }
        order.sort_by_key(|(p, _)| *p);
        strips.set_order(order.into_iter().map(|(_, id)| id).collect());
        Ok(())
    }

    /// Creates each strip's grouping face and its alpha supporting line.
    fn build_geometry(
        &self,
        graph: &mut PlanarGraph,
        strips: &mut StripGraph,
        owner: &HashMap<FaceId, StripId>,
    ) -> Result<()> {
        let mut faces: Vec<FaceId> = owner.keys().copied().collect();
        faces.sort();
        let ids: Vec<StripId> = strips.order().to_vec();
        for id in ids {
            let children: Vec<FaceId> = faces
                .iter()
                .filter(|f| owner.get(f) == Some(&id))
                .copied()
                .collect();
            let mut parts = Vec::new();
            for &child in &children {
                parts.extend(graph.face(child)?.geometry.0.iter().cloned());
            }
            let group = graph.add_face(FaceData::strip(without_holes(&union_all(parts))));
            for &child in &children {
                graph.face_mut(child)?.parent = Some(group);
            }

            let edges = strips.strip(id)?.edges.clone();
            let mut frontage = Vec::with_capacity(edges.len());
            for edge in edges {
                let (start, end) = graph.endpoints(edge)?;
                frontage.push(FrontageSegment {
                    start,
                    end,
                    road: graph.half_edge(edge)?.road.clone(),
                    position: self.frontage.position(edge).unwrap_or(usize::MAX),
                });
            }
            let strip = strips.strip_mut(id)?;
            strip.face = Some(group);
            strip.frontage = frontage;
        }
        Ok(())
    }
}

/// Adds an edge to a strip and tags it.
fn attach(
    graph: &mut PlanarGraph,
    strips: &mut StripGraph,
    strip: StripId,
    edge: HalfEdgeId,
) -> Result<()> {
    strips.strip_mut(strip)?.edges.push(edge);
    graph.half_edge_mut(edge)?.strip = Some(strip);
    Ok(())
}

/// Moves every edge of `from` into `into` and removes `from`.
fn absorb(
    graph: &mut PlanarGraph,
    strips: &mut StripGraph,
    into: StripId,
    from: StripId,
) -> Result<()> {
    let Some(data) = strips.remove(from) else {
        return Ok(());
    };
    for edge in data.edges {
        attach(graph, strips, into, edge)?;
    }
    Ok(())
}

/// Strips that own no face give their edges to the owners of those edges'
/// faces.
fn hand_over_faceless(
    graph: &mut PlanarGraph,
    strips: &mut StripGraph,
    owner: &HashMap<FaceId, StripId>,
) -> Result<()> {
    let ids: Vec<StripId> = strips.order().to_vec();
    for id in ids {
        if owner.values().any(|s| *s == id) {
            continue;
        }
        let Some(data) = strips.remove(id) else { continue };
        debug!(edges = data.edges.len(), "strip owns no face, handing over its edges");
        for edge in data.edges {
            let face = graph.half_edge(edge)?.face;
            let target = face.and_then(|f| owner.get(&f)).copied();
            match target {
                Some(target) if strips.contains(target) => attach(graph, strips, target, edge)?,
                _ => graph.half_edge_mut(edge)?.strip = None,
            }
        }
    }
    Ok(())
}

/// Every node touched by a strip's edges.
fn strip_nodes(graph: &PlanarGraph, strip: &StripData) -> Result<Vec<crate::topology::NodeId>> {
    let mut nodes = Vec::with_capacity(strip.edges.len() + 1);
    for &edge in &strip.edges {
        let data = graph.half_edge(edge)?;
        for node in [data.origin, data.target] {
            if !nodes.contains(&node) {
                nodes.push(node);
            }
        }
    }
    Ok(nodes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::boolean::area;
    use crate::math::Point2;
    use crate::operations::FrontageClassifier;
    use crate::road::RoadAttribute;
    use crate::test_fixtures::{bottom_road, multi_frontage_faces, named_roads, rectangle_faces};

    fn build<L>(faces: &[geo::Polygon<f64>], lookup: &L) -> (PlanarGraph, StripGraph)
    where
        L: crate::road::RoadLookup,
    {
        let mut graph = PlanarGraph::from_faces(faces, 1e-6).unwrap();
        let frontage = FrontageClassifier::new(20.0).execute(&mut graph, lookup).unwrap();
        let strips = AlphaStripBuilder::new(&frontage).execute(&mut graph).unwrap();
        (graph, strips)
    }

    fn strip_area(graph: &PlanarGraph, strip: &StripData) -> f64 {
        area(&graph.face(strip.face.unwrap()).unwrap().geometry)
    }

    fn assert_contiguous(graph: &PlanarGraph, strip: &StripData) {
        for w in strip.edges.windows(2) {
            let a = graph.half_edge(w[0]).unwrap();
            let b = graph.half_edge(w[1]).unwrap();
            assert_eq!(a.target, b.origin);
        }
    }

    #[test]
    fn single_road_rectangle() {
        let (graph, strips) = build(&rectangle_faces(), &bottom_road(5.0));
        assert_eq!(strips.len(), 2);
        let (_, first) = strips.iter().next().unwrap();
        assert_eq!(first.kind, StripKind::Primary);
        assert!((first.alpha_line().length() - 40.0).abs() < 1e-9);
        assert!((strip_area(&graph, first) - 300.0).abs() < 1e-6);
        let (_, second) = strips.iter().nth(1).unwrap();
        assert_eq!(second.kind, StripKind::Secondary);
        assert_eq!(second.edges.len(), 3);
        assert_contiguous(&graph, second);
        assert!((strip_area(&graph, second) - 500.0).abs() < 1e-6);
    }

    #[test]
    fn shared_road_name_merges_across_the_wrap() {
        let lookup = |a: &Point2, b: &Point2| {
            let top = (a.y - 20.0).abs() < 1e-6 && (b.y - 20.0).abs() < 1e-6;
            Some(RoadAttribute::new(if top { "Other" } else { "Main" }, 1.0))
        };
        let (graph, strips) = build(&rectangle_faces(), &lookup);
        assert_eq!(strips.len(), 2);
        let (_, merged) = strips
            .iter()
            .find(|(_, s)| s.edges.len() == 3)
            .unwrap();
        assert_contiguous(&graph, merged);
        // The merged strip adopts the origin of the wrapped-around edge.
        let origin = graph
            .point(graph.half_edge(merged.edges[0]).unwrap().origin)
            .unwrap();
        assert!((origin - Point2::new(0.0, 20.0)).norm() < 1e-9);
        assert!((strip_area(&graph, merged) - 500.0).abs() < 1e-6);
    }

    #[test]
    fn multi_frontage_face_is_stitched_into_one_strip() {
        let (graph, strips) = build(&multi_frontage_faces(), &named_roads());
        assert_eq!(strips.len(), 2);
        let mut areas: Vec<f64> = strips.iter().map(|(_, s)| strip_area(&graph, s)).collect();
        areas.sort_by(f64::total_cmp);
        assert!((areas[0] - 36.0).abs() < 1e-6);
        assert!((areas[1] - 264.0).abs() < 1e-6);
        for (_, strip) in strips.iter() {
            assert_contiguous(&graph, strip);
        }
    }

    #[test]
    fn every_skeleton_face_has_a_parent() {
        let (graph, strips) = build(&rectangle_faces(), &bottom_road(5.0));
        for face in graph.skeleton_faces() {
            let parent = graph.face(face).unwrap().parent.unwrap();
            assert!(strips.iter().any(|(_, s)| s.face == Some(parent)));
        }
        // Every exterior edge is tagged with a live strip.
        for (_, edge) in graph.half_edges().filter(|(_, e)| e.exterior) {
            assert!(strips.contains(edge.strip.unwrap()));
        }
    }
}
