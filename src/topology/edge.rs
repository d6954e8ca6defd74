use serde::{Deserialize, Serialize};

use super::{PolygonId, VertexId};

/// An unordered pair of vertices.
///
/// The connected-polygon list usually holds one or two entries, but the
/// model tolerates more (non-manifold meshes). Each endpoint vertex mirrors
/// this edge in its connected-edge list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// The two endpoint vertices.
    pub vertices: [VertexId; 2],

    /// Hard edges split shading normals across the polygons they border.
    pub is_hard: bool,

    /// Crease sharpness used by subdivision surfaces. Zero is smooth.
    pub crease_sharpness: f64,

    /// Polygons whose contours run along this edge.
    pub connected_polygons: Vec<PolygonId>,
}

impl Edge {
    #[must_use]
    pub fn new(vertex0: VertexId, vertex1: VertexId) -> Self {
        Self {
            vertices: [vertex0, vertex1],
            is_hard: false,
            crease_sharpness: 0.0,
            connected_polygons: Vec::new(),
        }
    }

    /// Returns the endpoint that is not `vertex`, if `vertex` is an endpoint.
    #[must_use]
    pub fn other_vertex(&self, vertex: VertexId) -> Option<VertexId> {
        if self.vertices[0] == vertex {
            Some(self.vertices[1])
        } else if self.vertices[1] == vertex {
            Some(self.vertices[0])
        } else {
            None
        }
    }

    /// An orphaned edge borders no polygons.
    #[must_use]
    pub fn is_orphaned(&self) -> bool {
        self.connected_polygons.is_empty()
    }
}
