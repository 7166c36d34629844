//! Half-edge planar graph over the faces of a block's straight skeleton.

pub mod face;
pub mod half_edge;
pub mod node;
pub mod path;
pub mod strip;
pub mod traversal;

pub use face::{FaceData, FaceId, FaceKind};
pub use half_edge::{HalfEdgeData, HalfEdgeId};
pub use node::{NodeData, NodeId};
pub use path::EdgePath;
pub use strip::{FrontageSegment, StripData, StripGraph, StripId, StripKind};

use std::collections::HashMap;

use geo::{MultiPolygon, Polygon};
use slotmap::SlotMap;
use tracing::debug;

use crate::error::{OperationError, TopologyError};
use crate::geometry::{exterior_points, multi, polygon_from_points};
use crate::math::{same_point, Point2};

/// Central arena that owns all graph entities.
///
/// Entities reference each other via typed IDs (generational indices), so
/// strips and faces can be merged and removed while the pipeline runs.
#[derive(Debug)]
pub struct PlanarGraph {
    nodes: SlotMap<NodeId, NodeData>,
    half_edges: SlotMap<HalfEdgeId, HalfEdgeData>,
    faces: SlotMap<FaceId, FaceData>,
    tolerance: f64,
}

impl PlanarGraph {
    /// Creates an empty graph. Nodes closer than `tolerance` are merged.
    #[must_use]
    pub fn new(tolerance: f64) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            half_edges: SlotMap::with_key(),
            faces: SlotMap::with_key(),
            tolerance,
        }
    }

    /// Builds the graph from the skeleton faces of one block.
    ///
    /// Each face's exterior ring is oriented counter-clockwise so that the
    /// face lies to the left of its half-edges. Half-edges with a reversed
    /// partner become twins; the rest form the exterior boundary.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` if there are no faces, and
    /// `TopologyError::InvalidTopology` if two faces claim the same directed
    /// edge.
    pub fn from_faces(polygons: &[Polygon<f64>], tolerance: f64) -> crate::error::Result<Self> {
        if polygons.is_empty() {
            return Err(OperationError::InvalidInput("no skeleton faces".into()).into());
        }
        let mut graph = Self::new(tolerance);
        let mut directed: HashMap<(NodeId, NodeId), HalfEdgeId> = HashMap::new();

        for polygon in polygons {
            let mut ring: Vec<NodeId> = Vec::new();
            for p in exterior_points(polygon) {
                let id = graph.add_node(p);
                if ring.last() != Some(&id) {
                    ring.push(id);
                }
            }
            if ring.len() > 1 && ring.first() == ring.last() {
                ring.pop();
            }
            if ring.len() < 3 {
                debug!(vertices = ring.len(), "skipping collapsed skeleton face");
                continue;
            }

            let points: Vec<Point2> = ring
                .iter()
                .map(|id| graph.nodes[*id].point)
                .collect();
            let face = graph.add_face(FaceData::new(multi(polygon_from_points(&points, tolerance))));

            for i in 0..ring.len() {
                let (origin, target) = (ring[i], ring[(i + 1) % ring.len()]);
                let id = graph.add_half_edge(HalfEdgeData::new(origin, target, Some(face)));
                if directed.insert((origin, target), id).is_some() {
                    return Err(TopologyError::InvalidTopology(
                        "two faces share a directed edge".into(),
                    )
                    .into());
                }
            }
        }

        for (&(origin, target), &id) in &directed {
            let twin = directed.get(&(target, origin)).copied();
            let edge = &mut graph.half_edges[id];
            edge.twin = twin;
            edge.exterior = twin.is_none();
        }

        debug!(
            nodes = graph.nodes.len(),
            half_edges = graph.half_edges.len(),
            faces = graph.faces.len(),
            "planar graph built"
        );
        Ok(graph)
    }

    /// The node-merging tolerance.
    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    // --- Node operations ---

    /// Returns the node at `point`, inserting one if none lies within tolerance.
    pub fn add_node(&mut self, point: Point2) -> NodeId {
        if let Some(id) = self.find_node(&point) {
            return id;
        }
        self.nodes.insert(NodeData::new(point))
    }

    /// Finds a node within tolerance of `point`.
    #[must_use]
    pub fn find_node(&self, point: &Point2) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, n)| same_point(&n.point, point, self.tolerance))
            .map(|(id, _)| id)
    }

    /// Returns a reference to the node data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the graph.
    pub fn node(&self, id: NodeId) -> Result<&NodeData, TopologyError> {
        self.nodes
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("node".into()))
    }

    /// Returns the position of a node.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the graph.
    pub fn point(&self, id: NodeId) -> Result<Point2, TopologyError> {
        self.node(id).map(|n| n.point)
    }

    /// Iterates every node.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &NodeData)> + '_ {
        self.nodes.iter()
    }

    // --- Half-edge operations ---

    /// Inserts a half-edge and returns its ID.
    pub fn add_half_edge(&mut self, data: HalfEdgeData) -> HalfEdgeId {
        self.half_edges.insert(data)
    }

    /// Inserts a twinned pair of interior half-edges with no face.
    pub fn add_edge_pair(&mut self, a: NodeId, b: NodeId) -> (HalfEdgeId, HalfEdgeId) {
        let forward = self.half_edges.insert(HalfEdgeData::new(a, b, None));
        let backward = self.half_edges.insert(HalfEdgeData::new(b, a, None));
        self.half_edges[forward].twin = Some(backward);
        self.half_edges[backward].twin = Some(forward);
        (forward, backward)
    }

    /// Returns a reference to the half-edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the graph.
    pub fn half_edge(&self, id: HalfEdgeId) -> Result<&HalfEdgeData, TopologyError> {
        self.half_edges
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("half-edge".into()))
    }

    /// Returns a mutable reference to the half-edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the graph.
    pub fn half_edge_mut(&mut self, id: HalfEdgeId) -> Result<&mut HalfEdgeData, TopologyError> {
        self.half_edges
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("half-edge".into()))
    }

    /// Iterates every half-edge.
    pub fn half_edges(&self) -> impl Iterator<Item = (HalfEdgeId, &HalfEdgeData)> + '_ {
        self.half_edges.iter()
    }

    /// The half-edge running from `a` to `b`, if any.
    #[must_use]
    pub fn find_edge(&self, a: NodeId, b: NodeId) -> Option<HalfEdgeId> {
        self.half_edges
            .iter()
            .find(|(_, e)| e.origin == a && e.target == b)
            .map(|(id, _)| id)
    }

    /// Removes a half-edge together with its twin.
    ///
    /// # Errors
    ///
    /// Returns an error if the half-edge is not found.
    pub fn remove_edge(&mut self, id: HalfEdgeId) -> Result<(), TopologyError> {
        let edge = self
            .half_edges
            .remove(id)
            .ok_or_else(|| TopologyError::EntityNotFound("half-edge".into()))?;
        if let Some(twin) = edge.twin {
            self.half_edges.remove(twin);
        }
        Ok(())
    }

    /// Start and end points of a half-edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the half-edge or its nodes are not found.
    pub fn endpoints(&self, id: HalfEdgeId) -> Result<(Point2, Point2), TopologyError> {
        let edge = self.half_edge(id)?;
        Ok((self.point(edge.origin)?, self.point(edge.target)?))
    }

    /// Euclidean length of a half-edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the half-edge or its nodes are not found.
    pub fn edge_length(&self, id: HalfEdgeId) -> Result<f64, TopologyError> {
        let (a, b) = self.endpoints(id)?;
        Ok((b - a).norm())
    }

    /// Splits a half-edge (and its twin) at `point`.
    ///
    /// The original ID keeps the first part; the returned pair is
    /// `(first, second)`. Both parts inherit every attribute.
    ///
    /// # Errors
    ///
    /// Returns an error if the half-edge is not found or `point` coincides
    /// with one of its endpoints.
    pub fn split_edge(
        &mut self,
        id: HalfEdgeId,
        point: Point2,
    ) -> Result<(HalfEdgeId, HalfEdgeId), TopologyError> {
        let edge = self.half_edge(id)?.clone();
        let mid = self.add_node(point);
        if mid == edge.origin || mid == edge.target {
            return Err(TopologyError::InvalidTopology(
                "split point coincides with an endpoint".into(),
            ));
        }

        self.half_edges[id].target = mid;
        let second = self.half_edges.insert(HalfEdgeData {
            origin: mid,
            ..edge.clone()
        });

        if let Some(twin) = edge.twin {
            let twin_data = self.half_edge(twin)?.clone();
            // twin runs target → origin; it keeps target → mid.
            self.half_edges[twin].target = mid;
            let twin_second = self.half_edges.insert(HalfEdgeData {
                origin: mid,
                ..twin_data
            });
            self.half_edges[id].twin = Some(twin_second);
            self.half_edges[twin_second].twin = Some(id);
            self.half_edges[second].twin = Some(twin);
            self.half_edges[twin].twin = Some(second);
        }

        Ok((id, second))
    }

    // --- Face operations ---

    /// Inserts a face and returns its ID.
    pub fn add_face(&mut self, data: FaceData) -> FaceId {
        self.faces.insert(data)
    }

    /// Returns a reference to the face data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the graph.
    pub fn face(&self, id: FaceId) -> Result<&FaceData, TopologyError> {
        self.faces
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("face".into()))
    }

    /// Returns a mutable reference to the face data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the graph.
    pub fn face_mut(&mut self, id: FaceId) -> Result<&mut FaceData, TopologyError> {
        self.faces
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("face".into()))
    }

    /// Removes a face, returning its data.
    pub fn remove_face(&mut self, id: FaceId) -> Option<FaceData> {
        self.faces.remove(id)
    }

    /// Iterates every face.
    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &FaceData)> + '_ {
        self.faces.iter()
    }

    /// Every skeleton face.
    #[must_use]
    pub fn skeleton_faces(&self) -> Vec<FaceId> {
        self.faces
            .iter()
            .filter(|(_, f)| f.kind == FaceKind::Skeleton)
            .map(|(id, _)| id)
            .collect()
    }

    /// Faces whose parent is `parent`.
    #[must_use]
    pub fn children(&self, parent: FaceId) -> Vec<FaceId> {
        self.faces
            .iter()
            .filter(|(_, f)| f.parent == Some(parent))
            .map(|(id, _)| id)
            .collect()
    }

    /// The union of every skeleton face.
    #[must_use]
    pub fn block(&self) -> MultiPolygon<f64> {
        crate::geometry::boolean::union_all(
            self.skeleton_faces()
                .into_iter()
                .filter_map(|id| self.faces.get(id))
                .flat_map(|f| f.geometry.0.iter().cloned()),
        )
    }
}
