//! Subdivision surface collaborator boundary.
//!
//! Generating the limit surface is a numerical black box (OpenSubdiv in the
//! original system); the kernel only decides *when* to regenerate and keeps
//! the result. A topology change regenerates everything, a geometry-only
//! edit asks for a cheap positions refresh.

use serde::{Deserialize, Serialize};

use crate::math::{Point3, Vector2, Vector3, Vector4};
use crate::mesh::EditableMesh;
use crate::topology::EdgeId;

/// One corner of a subdivided quad.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubdividedQuadVertex {
    /// Index into [`SubdivisionLimitData::vertex_positions`].
    pub vertex_position_index: usize,
    pub texture_coordinates: Vec<Vector2>,
    pub color: Vector4,
    pub normal: Vector3,
    pub tangent: Vector3,
    pub binormal_sign: f64,
}

/// One quad of the limit surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubdividedQuad {
    pub vertices: [SubdividedQuadVertex; 4],
}

/// The subdivided quads belonging to one polygon group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubdivisionLimitSection {
    pub quads: Vec<SubdividedQuad>,
}

/// A wire edge of the limit surface, drawn for base-cage edges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubdividedWireEdge {
    pub start_position_index: usize,
    pub end_position_index: usize,
    /// The base-cage edge this wire mirrors, or invalid for edges that only
    /// exist in the subdivided surface.
    pub counterpart_edge_id: EdgeId,
}

/// Limit surface geometry produced by a [`LimitSurfaceGenerator`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubdivisionLimitData {
    /// Shared vertex positions for this subdivision level.
    pub vertex_positions: Vec<Point3>,
    /// One section per polygon group, in group iteration order.
    pub sections: Vec<SubdivisionLimitSection>,
    /// All wire edges of the subdivided mesh.
    pub subdivided_wire_edges: Vec<SubdividedWireEdge>,
}

/// External generator of subdivision limit surfaces.
///
/// Called synchronously at the end of a modification session while the mesh
/// has a non-zero subdivision count.
pub trait LimitSurfaceGenerator {
    /// The mesh topology changed; rebuild the refiner and the surface.
    fn refresh_topology(&mut self, mesh: &EditableMesh) -> SubdivisionLimitData;

    /// Only positions or attributes changed; regenerate surface geometry.
    fn refresh_geometry(&mut self, mesh: &EditableMesh) -> SubdivisionLimitData;
}
