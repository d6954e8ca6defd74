use thiserror::Error;

use crate::topology::ElementKind;

/// Top-level error type for the Polyedit mesh editing kernel.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Change(#[from] ChangeError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Triangulation(#[from] TriangulationError),
}

/// Errors raised by the topology graph and its sparse element stores.
///
/// These are precondition or consistency violations. Once one is returned,
/// the mesh may no longer satisfy its adjacency invariants and must not be
/// edited further.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("{kind:?} {index} is not allocated")]
    ElementNotFound { kind: ElementKind, index: u32 },

    #[error("{kind:?} slot {index} is already allocated")]
    SlotOccupied { kind: ElementKind, index: u32 },

    #[error("vertex {0} still has connected edges or instances and cannot be deleted as an orphan")]
    VertexNotOrphaned(u32),

    #[error("vertex instance {0} is still referenced by polygons")]
    VertexInstanceNotOrphaned(u32),

    #[error("polygon group {0} is not empty")]
    PolygonGroupNotEmpty(u32),

    #[error("polygon perimeter must have at least 3 vertices, got {0}")]
    DegeneratePerimeter(usize),

    #[error("inconsistent topology: {0}")]
    Inconsistent(String),
}

/// Errors raised by the modification/undo machinery.
#[derive(Debug, Error)]
pub enum ChangeError {
    #[error("a modification session is already open")]
    AlreadyModifying,

    #[error("no modification session is open")]
    NotModifying,

    #[error("remap table for {kind:?} has no entry for element {index}")]
    MissingRemapEntry { kind: ElementKind, index: u32 },
}

/// Errors raised by compound editing operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("operation failed: {0}")]
    Failed(String),
}

/// Errors raised while triangulating polygon contours.
#[derive(Debug, Error)]
pub enum TriangulationError {
    #[error("degenerate contour: {0}")]
    DegenerateContour(String),

    #[error("triangulation failed: {0}")]
    Failed(String),
}

/// Convenience type alias for results using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;
