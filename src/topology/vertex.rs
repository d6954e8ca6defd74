use serde::{Deserialize, Serialize};

use super::{EdgeId, VertexInstanceId};
use crate::math::Point3;

/// A unique point in 3D space.
///
/// A vertex owns nothing: the instances listed here reference back to it,
/// and the connected-edge list mirrors each edge's endpoint fields. A vertex
/// with connected edges can never be deleted directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertex {
    /// The 3D position of the vertex.
    pub position: Point3,

    /// Corner sharpness used by subdivision surfaces. Zero is smooth.
    pub corner_sharpness: f64,

    /// Vertex instances which reference this vertex.
    pub vertex_instances: Vec<VertexInstanceId>,

    /// Edges which have this vertex as an endpoint.
    pub connected_edges: Vec<EdgeId>,
}

impl Vertex {
    #[must_use]
    pub fn new(position: Point3) -> Self {
        Self {
            position,
            corner_sharpness: 0.0,
            vertex_instances: Vec::new(),
            connected_edges: Vec::new(),
        }
    }

    /// An orphaned vertex has no connected edges and no instances, and may
    /// be deleted.
    #[must_use]
    pub fn is_orphaned(&self) -> bool {
        self.connected_edges.is_empty() && self.vertex_instances.is_empty()
    }
}

impl Default for Vertex {
    fn default() -> Self {
        Self::new(Point3::origin())
    }
}
