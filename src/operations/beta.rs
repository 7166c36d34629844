use std::collections::HashSet;

use geo::MultiPolygon;
use tracing::{debug, info_span, warn};

use crate::error::{Result, TopologyError};
use crate::geometry::boolean::{
    area, covers_point, difference, intersection, union, without_holes, without_slivers,
};
use crate::geometry::clip::{covered_intervals, covered_length, shared_boundary_length};
use crate::geometry::snap::SnapReference;
use crate::geometry::{multi, polygon_from_points, Polyline};
use crate::math::distance_2d::point_to_segment_dist;
use crate::math::polygon_2d::{is_reflex_turn, left_normal};
use crate::math::{same_point, Point2};
use crate::topology::{
    FaceData, FaceId, HalfEdgeId, NodeId, PlanarGraph, StripData, StripGraph, StripId,
};

/// Outcome of classifying a supporting vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportingVertexClass {
    /// No correction.
    None,
    /// The strip before the vertex gains the contested region.
    Previous,
    /// The strip after the vertex gains the contested region.
    Next,
}

/// Lifecycle of a supporting vertex during correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VertexState {
    Unvisited,
    Classified(SupportingVertexClass),
    Corrected,
    Finalized,
}

/// Classifies the vertex between two consecutive exterior edges.
///
/// A reflex turn is never corrected. Otherwise the more important road wins;
/// a missing road counts as importance `0`, and two present roads of
/// importance `0` leave the vertex alone.
///
/// # Errors
///
/// Returns an error if either edge is missing from the graph.
pub fn classify(
    graph: &PlanarGraph,
    previous: HalfEdgeId,
    next: HalfEdgeId,
) -> Result<SupportingVertexClass> {
    let (a, n) = graph.endpoints(previous)?;
    let (_, c) = graph.endpoints(next)?;
    if is_reflex_turn(&a, &n, &c) {
        return Ok(SupportingVertexClass::None);
    }
    let prev_road = graph.half_edge(previous)?.road.as_ref();
    let next_road = graph.half_edge(next)?.road.as_ref();
    let prev_importance = prev_road.map_or(0.0, |r| r.importance);
    let next_importance = next_road.map_or(0.0, |r| r.importance);
    if prev_importance > next_importance {
        Ok(SupportingVertexClass::Previous)
    } else if prev_road.is_some()
        && next_road.is_some()
        && prev_importance.abs() < f64::EPSILON
        && next_importance.abs() < f64::EPSILON
    {
        Ok(SupportingVertexClass::None)
    } else {
        Ok(SupportingVertexClass::Next)
    }
}

/// Moves the contested region at each supporting vertex to the strip
/// fronting the more important road, then cleans up strip geometry and
/// recomputes the supporting lines.
pub struct BetaStripCorrector<'a> {
    cycle: &'a [HalfEdgeId],
    tolerance: f64,
}

impl<'a> BetaStripCorrector<'a> {
    /// Creates a new `BetaStripCorrector` over the rotated exterior cycle.
    #[must_use]
    pub fn new(cycle: &'a [HalfEdgeId], tolerance: f64) -> Self {
        Self { cycle, tolerance }
    }

    /// Executes the correction, mutating strips and graph in place.
    ///
    /// # Errors
    ///
    /// Returns an error if a graph or strip entity is unexpectedly missing.
    pub fn execute(&self, graph: &mut PlanarGraph, strips: &mut StripGraph) -> Result<()> {
        let _span = info_span!("beta").entered();
        let vertices = self.supporting_vertices(graph)?;
        debug!(vertices = vertices.len(), "supporting vertices found");
        for node in vertices {
            let state = self.correct_vertex(graph, strips, node)?;
            debug!(?node, ?state, "supporting vertex done");
        }

        self.resnap(graph, strips)?;
        for id in strips.order().to_vec() {
            refresh_psi(graph, strips, id, self.tolerance)?;
        }
        self.dissolve(graph, strips)?;
        debug!(strips = strips.len(), "beta-strips built");
        Ok(())
    }

    /// Nodes where the strip membership of consecutive cycle edges changes.
    fn supporting_vertices(&self, graph: &PlanarGraph) -> Result<Vec<NodeId>> {
        let n = self.cycle.len();
        let mut vertices = Vec::new();
        for i in 0..n {
            let a = graph.half_edge(self.cycle[i])?;
            let b = graph.half_edge(self.cycle[(i + 1) % n])?;
            if a.strip != b.strip {
                vertices.push(a.target);
            }
        }
        Ok(vertices)
    }

    fn correct_vertex(
        &self,
        graph: &mut PlanarGraph,
        strips: &mut StripGraph,
        node: NodeId,
    ) -> Result<VertexState> {
        debug!(?node, state = ?VertexState::Unvisited, "visiting supporting vertex");
        // Edges are looked up again: earlier corrections may have split them.
        let (Some(prev), Some(next)) = (graph.exterior_edge_into(node), graph.exterior_edge_out_of(node))
        else {
            return Ok(VertexState::Finalized);
        };
        let (Some(prev_strip), Some(next_strip)) =
            (graph.half_edge(prev)?.strip, graph.half_edge(next)?.strip)
        else {
            return Ok(VertexState::Finalized);
        };
        if prev_strip == next_strip || !strips.contains(prev_strip) || !strips.contains(next_strip) {
            return Ok(VertexState::Finalized);
        }

        let class = classify(graph, prev, next)?;
        debug!(?node, state = ?VertexState::Classified(class), "supporting vertex classified");
        let (gain, lose) = match class {
            SupportingVertexClass::None => return Ok(VertexState::Finalized),
            SupportingVertexClass::Previous => (prev_strip, next_strip),
            SupportingVertexClass::Next => (next_strip, prev_strip),
        };

        let diagonal = diagonal(graph, strips, node, prev, prev_strip, next_strip)?;
        if diagonal.is_empty() {
            debug!(?node, "no diagonal between the strips");
            return Ok(VertexState::Finalized);
        }
        if self.transfer(graph, strips, node, &diagonal, gain, lose)? {
            debug!(?node, state = ?VertexState::Corrected, "contested region moved");
        }
        Ok(VertexState::Finalized)
    }

    /// Cuts the contested piece off the losing strip and gives it to the
    /// gaining strip. Returns `false` if nothing was moved.
    fn transfer(
        &self,
        graph: &mut PlanarGraph,
        strips: &mut StripGraph,
        node: NodeId,
        diagonal: &[HalfEdgeId],
        gain: StripId,
        lose: StripId,
    ) -> Result<bool> {
        let tol = self.tolerance;
        let corner = graph.point(node)?;
        let mut ring = vec![corner];
        for &edge in diagonal {
            ring.push(graph.endpoints(edge)?.1);
        }
        let far = ring[ring.len() - 1];

        // The far end is projected onto the losing strip's own frontage.
        let losing_line = strips.strip(lose)?.alpha_line();
        let (Some((s_far, _)), Some((s_corner, _))) = (losing_line.locate(&far), losing_line.locate(&corner))
        else {
            warn!(x = far.x, y = far.y, "diagonal end projects onto no supporting line");
            return Ok(false);
        };
        let Some(proj) = losing_line.point_at(s_far) else {
            return Ok(false);
        };
        ring.push(proj);
        ring.extend(losing_line.sub_line(s_far, s_corner).points.into_iter().skip(1));

        let gain_face = strip_face(strips, gain)?;
        let lose_face = strip_face(strips, lose)?;
        let lose_geometry = graph.face(lose_face)?.geometry.clone();
        let piece = without_slivers(
            &intersection(&multi(polygon_from_points(&ring, tol)), &lose_geometry),
            tol,
        );
        if area(&piece) <= tol {
            debug!("contested piece is degenerate");
            return Ok(false);
        }

        let gained = without_holes(&union(&graph.face(gain_face)?.geometry, &piece));
        let remaining = without_slivers(&difference(&lose_geometry, &piece), tol);
        graph.face_mut(gain_face)?.geometry = gained;
        graph.face_mut(lose_face)?.geometry = remaining.clone();

        for child in graph.children(lose_face) {
            let geometry = graph.face(child)?.geometry.clone();
            let inside = without_slivers(&intersection(&geometry, &piece), tol);
            if area(&inside) <= tol {
                continue;
            }
            let outside = without_slivers(&difference(&geometry, &piece), tol);
            if area(&outside) <= tol {
                graph.face_mut(child)?.parent = Some(gain_face);
                continue;
            }
            // The cut runs through this face: it keeps its edges and the
            // uncovered part, the covered part becomes a face of the gainer.
            graph.face_mut(child)?.geometry = outside;
            let mut part = FaceData::new(inside);
            part.parent = Some(gain_face);
            graph.add_face(part);
        }

        self.rewire(graph, strips, diagonal, far, proj)?;
        move_covered_edges(graph, strips, lose, gain, &piece, tol)?;

        if area(&remaining) <= tol {
            debug!("losing strip emptied, discarding it");
            merge_strip(graph, strips, lose, gain)?;
        }
        Ok(true)
    }

    /// Replaces the diagonal by a single cut edge from the projection to the
    /// diagonal's far end.
    fn rewire(
        &self,
        graph: &mut PlanarGraph,
        strips: &mut StripGraph,
        diagonal: &[HalfEdgeId],
        far: Point2,
        proj: Point2,
    ) -> Result<()> {
        let tol = self.tolerance;
        for &edge in diagonal {
            if graph.half_edge(edge).is_ok() {
                graph.remove_edge(edge)?;
            }
        }
        if same_point(&far, &proj, tol) {
            return Ok(());
        }

        let proj_node = match graph.find_node(&proj) {
            Some(id) => id,
            None => {
                let host = graph.exterior_edges().into_iter().find(|e| {
                    graph
                        .endpoints(*e)
                        .is_ok_and(|(a, b)| point_to_segment_dist(&proj, &a, &b) <= tol)
                });
                match host {
                    Some(host) => {
                        let (first, second) = graph.split_edge(host, proj)?;
                        if let Some(strip) = graph.half_edge(first)?.strip {
                            let edges = &mut strips.strip_mut(strip)?.edges;
                            if let Some(i) = edges.iter().position(|e| *e == first) {
                                edges.insert(i + 1, second);
                            }
                        }
                        graph.half_edge(first)?.target
                    }
                    None => graph.add_node(proj),
                }
            }
        };
        let far_node = graph.add_node(far);
        if proj_node != far_node && graph.find_edge(proj_node, far_node).is_none() {
            graph.add_edge_pair(proj_node, far_node);
        }
        Ok(())
    }

    /// Snaps every strip polygon back onto the skeleton geometry and the
    /// graph's nodes.
    fn resnap(&self, graph: &mut PlanarGraph, strips: &StripGraph) -> Result<()> {
        let mut reference = SnapReference::new();
        for face in graph.skeleton_faces() {
            for polygon in &graph.face(face)?.geometry.0 {
                reference.add_polygon(polygon);
            }
        }
        for (_, node) in graph.nodes() {
            reference.add_vertex(node.point);
        }
        for (_, strip) in strips.iter() {
            let Some(face) = strip.face else { continue };
            let snapped = reference.snap(&graph.face(face)?.geometry, self.tolerance);
            graph.face_mut(face)?.geometry = snapped;
        }
        Ok(())
    }

    /// Folds every strip without road frontage into the neighbour sharing
    /// the longest boundary with it.
    fn dissolve(&self, graph: &mut PlanarGraph, strips: &mut StripGraph) -> Result<()> {
        let mut stranded: HashSet<StripId> = HashSet::new();
        while strips.len() > 1 {
            let Some(orphan) = strips
                .iter()
                .find(|(id, s)| s.psi.is_empty() && !stranded.contains(id))
                .map(|(id, _)| id)
            else {
                break;
            };
            let geometry = graph.face(strip_face(strips, orphan)?)?.geometry.clone();
            let mut best: Option<(StripId, f64)> = None;
            for (id, strip) in strips.iter() {
                let Some(face) = strip.face.filter(|_| id != orphan) else { continue };
                let shared = shared_boundary_length(&geometry, &graph.face(face)?.geometry, self.tolerance);
                if shared > self.tolerance && best.map_or(true, |(_, b)| shared > b) {
                    best = Some((id, shared));
                }
            }
            match best {
                Some((target, _)) => {
                    debug!("strip without frontage dissolved into its neighbour");
                    merge_strip(graph, strips, orphan, target)?;
                    refresh_psi(graph, strips, target, self.tolerance)?;
                }
                None => {
                    warn!("strip without frontage has no neighbour");
                    stranded.insert(orphan);
                }
            }
        }
        Ok(())
    }
}

/// Walks the chain of interior edges separating the two strips,
/// starting at `node`.
///
/// An edge separates the strips when the points just left and right of its
/// midpoint lie one in each strip's polygon.
fn diagonal(
    graph: &PlanarGraph,
    strips: &StripGraph,
    node: NodeId,
    prev: HalfEdgeId,
    a: StripId,
    b: StripId,
) -> Result<Vec<HalfEdgeId>> {
    let (Some(fa), Some(fb)) = (strips.strip(a)?.face, strips.strip(b)?.face) else {
        return Ok(Vec::new());
    };
    let (ga, gb) = (&graph.face(fa)?.geometry, &graph.face(fb)?.geometry);
    let tol = graph.tolerance();
    let mut candidates = Vec::new();
    for (id, edge) in graph.half_edges() {
        if edge.twin.is_none() {
            continue;
        }
        let (p, q) = graph.endpoints(id)?;
        let dir = q - p;
        let len = dir.norm();
        if len <= tol {
            continue;
        }
        let mid = p + dir * 0.5;
        let offset = left_normal(dir / len) * (0.01 * len).min(1e3 * tol);
        let (left, right) = (mid + offset, mid - offset);
        let separates = |g1: &MultiPolygon<f64>, g2: &MultiPolygon<f64>| {
            covers_point(g1, &left, tol) && covers_point(g2, &right, tol)
        };
        if separates(ga, gb) || separates(gb, ga) {
            candidates.push(id);
        }
    }

    let mut walk = Vec::new();
    let mut visited: HashSet<HalfEdgeId> = HashSet::new();
    let mut current = prev;
    let mut at = node;
    while let Some(step) = graph.next(at, current, &candidates) {
        let data = graph.half_edge(step)?;
        if visited.contains(&step) || data.twin.is_some_and(|t| visited.contains(&t)) {
            break;
        }
        visited.insert(step);
        walk.push(step);
        at = data.target;
        current = step;
    }
    Ok(walk)
}

fn strip_face(strips: &StripGraph, id: StripId) -> Result<FaceId> {
    strips
        .strip(id)?
        .face
        .ok_or_else(|| TopologyError::EntityNotFound("strip face".into()).into())
}

/// Hands the losing strip's exterior edges lying inside `piece` to the
/// gaining strip.
fn move_covered_edges(
    graph: &mut PlanarGraph,
    strips: &mut StripGraph,
    lose: StripId,
    gain: StripId,
    piece: &MultiPolygon<f64>,
    tol: f64,
) -> Result<()> {
    let mut moved = Vec::new();
    for &edge in &strips.strip(lose)?.edges {
        let (a, b) = graph.endpoints(edge)?;
        let len = (b - a).norm();
        if len > tol && covered_length(&a, &b, piece, tol) >= len - tol {
            moved.push(edge);
        }
    }
    for edge in moved {
        strips.strip_mut(lose)?.edges.retain(|e| *e != edge);
        strips.strip_mut(gain)?.edges.push(edge);
        graph.half_edge_mut(edge)?.strip = Some(gain);
    }
    Ok(())
}

/// Merges strip `from` into `into`: geometry, faces, edges and frontage.
fn merge_strip(
    graph: &mut PlanarGraph,
    strips: &mut StripGraph,
    from: StripId,
    into: StripId,
) -> Result<()> {
    let into_face = strip_face(strips, into)?;
    let Some(data) = strips.remove(from) else {
        return Ok(());
    };
    if let Some(face) = data.face {
        for child in graph.children(face) {
            graph.face_mut(child)?.parent = Some(into_face);
        }
        if let Some(old) = graph.remove_face(face) {
            let merged = without_holes(&union(&graph.face(into_face)?.geometry, &old.geometry));
            graph.face_mut(into_face)?.geometry = merged;
        }
    }
    for &edge in &data.edges {
        graph.half_edge_mut(edge)?.strip = Some(into);
    }
    let target = strips.strip_mut(into)?;
    target.edges.extend(data.edges);
    target.absorb_frontage(data.frontage);
    Ok(())
}

/// Recomputes a strip's supporting line from its alpha frontage.
fn refresh_psi(graph: &PlanarGraph, strips: &mut StripGraph, id: StripId, tol: f64) -> Result<()> {
    let face = strip_face(strips, id)?;
    let psi = supporting_line(strips.strip(id)?, &graph.face(face)?.geometry, tol);
    strips.strip_mut(id)?.psi = psi;
    Ok(())
}

/// The longest contiguous road-fronting part of the alpha frontage that
/// lies within `geometry`.
#[must_use]
pub fn supporting_line(strip: &StripData, geometry: &MultiPolygon<f64>, tol: f64) -> Polyline {
    // `None` marks a break in contiguity.
    let mut pieces: Vec<Option<(Point2, Point2)>> = Vec::new();
    for seg in &strip.frontage {
        if seg.road.is_none() {
            pieces.push(None);
            continue;
        }
        let d = seg.end - seg.start;
        for (t0, t1) in covered_intervals(&seg.start, &seg.end, geometry, tol) {
            pieces.push(Some((seg.start + d * t0, seg.start + d * t1)));
        }
    }

    let mut runs: Vec<Vec<Point2>> = Vec::new();
    let mut open = false;
    for piece in pieces {
        let Some((a, b)) = piece else {
            open = false;
            continue;
        };
        match runs.last_mut() {
            Some(run) if open && run.last().is_some_and(|p| same_point(p, &a, tol)) => run.push(b),
            _ => runs.push(vec![a, b]),
        }
        open = true;
    }
    // A run may continue across the start of the cycle.
    if runs.len() > 1 {
        let joins = match (runs.last().and_then(|r| r.last()), runs[0].first()) {
            (Some(end), Some(start)) => same_point(end, start, tol),
            _ => false,
        };
        if joins {
            if let Some(mut tail) = runs.pop() {
                tail.extend(runs[0].iter().skip(1));
                runs[0] = tail;
            }
        }
    }

    runs.into_iter()
        .map(Polyline::new)
        .fold(Polyline::default(), |best, line| {
            if line.length() > best.length() {
                line
            } else {
                best
            }
        })
}
