use geo::MultiPolygon;

slotmap::new_key_type! {
    /// Unique identifier for a face in the planar graph.
    pub struct FaceId;
}

/// What a face represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceKind {
    /// A face of the straight skeleton.
    Skeleton,
    /// The grouping face of a strip.
    Strip,
}

/// Data associated with a face.
///
/// Skeleton faces and strip faces share one arena. A skeleton face points at
/// the strip face that owns it through `parent`; strip faces have no parent.
#[derive(Debug, Clone)]
pub struct FaceData {
    /// The region covered by this face.
    pub geometry: MultiPolygon<f64>,
    pub kind: FaceKind,
    /// The grouping face this face belongs to, if any.
    pub parent: Option<FaceId>,
}

impl FaceData {
    /// Creates a skeleton face.
    #[must_use]
    pub fn new(geometry: MultiPolygon<f64>) -> Self {
        Self {
            geometry,
            kind: FaceKind::Skeleton,
            parent: None,
        }
    }

    /// Creates a strip grouping face.
    #[must_use]
    pub fn strip(geometry: MultiPolygon<f64>) -> Self {
        Self {
            geometry,
            kind: FaceKind::Strip,
            parent: None,
        }
    }
}
