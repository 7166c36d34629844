use super::face::FaceId;
use super::node::NodeId;
use super::strip::StripId;
use crate::road::RoadAttribute;

slotmap::new_key_type! {
    /// Unique identifier for a half-edge in the planar graph.
    pub struct HalfEdgeId;
}

/// Data associated with a directed half-edge.
#[derive(Debug, Clone)]
pub struct HalfEdgeData {
    /// Start node.
    pub origin: NodeId,
    /// End node.
    pub target: NodeId,
    /// The opposite half-edge of the same segment; `None` on the boundary.
    pub twin: Option<HalfEdgeId>,
    /// The face on the left of this half-edge.
    pub face: Option<FaceId>,
    /// Whether this half-edge lies on the block's outer boundary.
    pub exterior: bool,
    /// The road this edge fronts, once frontage detection has run.
    pub road: Option<RoadAttribute>,
    /// The strip holding this edge, once strips are built.
    pub strip: Option<StripId>,
}

impl HalfEdgeData {
    /// Creates an interior half-edge with no attributes.
    #[must_use]
    pub fn new(origin: NodeId, target: NodeId, face: Option<FaceId>) -> Self {
        Self {
            origin,
            target,
            twin: None,
            face,
            exterior: false,
            road: None,
            strip: None,
        }
    }
}
