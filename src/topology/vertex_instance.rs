use serde::{Deserialize, Serialize};

use super::{PolygonId, VertexId};
use crate::math::{Vector2, Vector3, Vector4};

/// One polygon corner's use of a vertex.
///
/// Instances carry the per-corner attributes that may differ between
/// polygons sharing the same vertex position — hard edges get discreet
/// normals, UV seams get discreet texture coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VertexInstance {
    /// The vertex being instanced. Non-owning.
    pub vertex: VertexId,

    /// Shading normal at this corner.
    pub normal: Vector3,

    /// Tangent at this corner.
    pub tangent: Vector3,

    /// Sign of the binormal (`-1.0` or `1.0`).
    pub binormal_sign: f64,

    /// Texture coordinates, one entry per UV channel.
    pub uvs: Vec<Vector2>,

    /// Vertex color.
    pub color: Vector4,

    /// Polygons whose contours reference this instance.
    pub connected_polygons: Vec<PolygonId>,
}

impl VertexInstance {
    #[must_use]
    pub fn new(vertex: VertexId, uv_channel_count: usize) -> Self {
        Self {
            vertex,
            normal: Vector3::zeros(),
            tangent: Vector3::zeros(),
            binormal_sign: 1.0,
            uvs: vec![Vector2::zeros(); uv_channel_count],
            color: Vector4::new(1.0, 1.0, 1.0, 1.0),
            connected_polygons: Vec::new(),
        }
    }

    /// An orphaned instance is referenced by no polygon contour.
    #[must_use]
    pub fn is_orphaned(&self) -> bool {
        self.connected_polygons.is_empty()
    }
}
