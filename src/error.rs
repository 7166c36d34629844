use thiserror::Error;

/// Top-level error type for the parcel decomposition engine.
#[derive(Debug, Error)]
pub enum ParcelError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Strip(#[from] StripError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors related to the planar graph.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    /// The exterior edges do not close into a single cycle in either direction.
    #[error("exterior edges do not form a single closed cycle: {0}")]
    OpenBoundary(String),

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Errors related to operation inputs and execution.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("operation failed: {0}")]
    Failed(String),
}

/// Recoverable failures of the strip pipeline.
///
/// These are handled where they occur; only [`TopologyError`] aborts a block.
#[derive(Debug, Error)]
pub enum StripError {
    #[error("no boundary edge resolves a road")]
    NoFrontageFound,

    #[error("polygon split produced {pieces} pieces, expected 2")]
    AmbiguousSplit { pieces: usize },

    #[error("projection from ({x}, {y}) found no intersection")]
    DanglingProjection { x: f64, y: f64 },
}

/// Convenience type alias for results using [`ParcelError`].
pub type Result<T> = std::result::Result<T, ParcelError>;
