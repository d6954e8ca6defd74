//! Input descriptions for kernel operations.
//!
//! The same structs serve as the payloads of undo records: deleting an
//! element captures a `*ToCreate` describing how to bring it back, and the
//! `original_*_id` fields let redo and undo reproduce historical IDs
//! exactly.

use serde::{Deserialize, Serialize};

use crate::attributes::{EdgeAttribute, VertexAttribute, VertexInstanceAttribute};
use crate::math::Point3;
use crate::topology::{
    EdgeId, ElementId, PolygonGroupId, PolygonId, VertexId, VertexInstanceId,
};

/// Describes a vertex to create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VertexToCreate {
    pub position: Point3,
    pub corner_sharpness: f64,
    /// Only used by the undo system to reproduce an ID.
    pub original_vertex_id: VertexId,
}

impl VertexToCreate {
    #[must_use]
    pub fn at_position(position: Point3) -> Self {
        Self {
            position,
            corner_sharpness: 0.0,
            original_vertex_id: VertexId::INVALID,
        }
    }
}

/// Describes a vertex instance to create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VertexInstanceToCreate {
    /// The vertex being instanced.
    pub vertex_id: VertexId,
    /// Attributes applied over the instance defaults.
    pub attributes: Vec<VertexInstanceAttribute>,
    /// Only used by the undo system to reproduce an ID.
    pub original_vertex_instance_id: VertexInstanceId,
}

impl VertexInstanceToCreate {
    #[must_use]
    pub fn for_vertex(vertex_id: VertexId) -> Self {
        Self {
            vertex_id,
            attributes: Vec::new(),
            original_vertex_instance_id: VertexInstanceId::INVALID,
        }
    }
}

/// Describes an edge to create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeToCreate {
    pub vertex_id0: VertexId,
    pub vertex_id1: VertexId,
    /// Polygons already known to be connected to this edge.
    pub connected_polygons: Vec<PolygonId>,
    pub is_hard: bool,
    pub crease_sharpness: f64,
    /// Only used by the undo system to reproduce an ID.
    pub original_edge_id: EdgeId,
}

impl EdgeToCreate {
    #[must_use]
    pub fn between(vertex_id0: VertexId, vertex_id1: VertexId) -> Self {
        Self {
            vertex_id0,
            vertex_id1,
            connected_polygons: Vec::new(),
            is_hard: false,
            crease_sharpness: 0.0,
            original_edge_id: EdgeId::INVALID,
        }
    }
}

/// One corner of a polygon contour being created or spliced in.
///
/// Either names an existing vertex instance to reuse, or — when
/// `vertex_instance_id` is invalid — asks for a new instance of `vertex_id`
/// with the given attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VertexAndAttributes {
    pub vertex_instance_id: VertexInstanceId,
    pub vertex_id: VertexId,
    pub attributes: Vec<VertexInstanceAttribute>,
}

impl VertexAndAttributes {
    /// A corner that creates a fresh instance of `vertex_id`.
    #[must_use]
    pub fn new_instance_of(vertex_id: VertexId) -> Self {
        Self {
            vertex_instance_id: VertexInstanceId::INVALID,
            vertex_id,
            attributes: Vec::new(),
        }
    }

    /// A corner that reuses an existing instance.
    #[must_use]
    pub fn existing_instance(vertex_instance_id: VertexInstanceId) -> Self {
        Self {
            vertex_instance_id,
            vertex_id: VertexId::INVALID,
            attributes: Vec::new(),
        }
    }
}

/// How `create_polygons` treats the hardness of the polygon's edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolygonEdgeHardness {
    /// Create any new edges as soft, leaving existing edges as they are.
    NewEdgesSoft,
    /// Create any new edges as hard, leaving existing edges as they are.
    NewEdgesHard,
    /// Set all of the polygon's edges soft, overriding existing hardness.
    AllEdgesSoft,
    /// Set all of the polygon's edges hard, overriding existing hardness.
    AllEdgesHard,
}

/// Describes a polygon to create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolygonToCreate {
    /// The group the polygon will be added to.
    pub polygon_group_id: PolygonGroupId,
    /// Ordered counter-clockwise perimeter corners.
    pub perimeter: Vec<VertexAndAttributes>,
    /// Hole contours, if any.
    pub holes: Vec<Vec<VertexAndAttributes>>,
    pub edge_hardness: PolygonEdgeHardness,
    /// Only used by the undo system to reproduce an ID.
    pub original_polygon_id: PolygonId,
}

impl PolygonToCreate {
    #[must_use]
    pub fn in_group(polygon_group_id: PolygonGroupId, perimeter: Vec<VertexAndAttributes>) -> Self {
        Self {
            polygon_group_id,
            perimeter,
            holes: Vec::new(),
            edge_hardness: PolygonEdgeHardness::NewEdgesSoft,
            original_polygon_id: PolygonId::INVALID,
        }
    }
}

/// Describes a polygon group to create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolygonGroupToCreate {
    pub material_asset: String,
    pub casts_shadow: bool,
    pub collision_enabled: bool,
    /// Only used by the undo system to reproduce an ID.
    pub original_polygon_group_id: PolygonGroupId,
}

impl PolygonGroupToCreate {
    #[must_use]
    pub fn with_material(material_asset: impl Into<String>) -> Self {
        Self {
            material_asset: material_asset.into(),
            casts_shadow: true,
            collision_enabled: true,
            original_polygon_group_id: PolygonGroupId::INVALID,
        }
    }
}

/// A batch of attribute writes for one vertex.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributesForVertex {
    pub vertex_id: VertexId,
    pub attributes: Vec<VertexAttribute>,
}

/// A batch of attribute writes for one vertex instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributesForVertexInstance {
    pub vertex_instance_id: VertexInstanceId,
    pub attributes: Vec<VertexInstanceAttribute>,
}

/// A batch of attribute writes for one edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributesForEdge {
    pub edge_id: EdgeId,
    pub attributes: Vec<EdgeAttribute>,
}

/// A batch of attribute writes for one polygon group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributesForPolygonGroup {
    pub polygon_group_id: PolygonGroupId,
    pub attributes: Vec<crate::attributes::PolygonGroupAttribute>,
}

/// New endpoint vertices for an edge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VerticesForEdge {
    pub edge_id: EdgeId,
    pub new_vertex_id0: VertexId,
    pub new_vertex_id1: VertexId,
}

/// A vertex and the position it should move to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VertexToMove {
    pub vertex_id: VertexId,
    pub new_position: Point3,
}

/// Assignment of a polygon to a group.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PolygonGroupForPolygon {
    pub polygon_id: PolygonId,
    pub polygon_group_id: PolygonGroupId,
}

/// One contour slot receiving a different vertex instance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VertexIndexAndInstance {
    /// Index of the corner within its contour.
    pub contour_index: usize,
    /// The instance to put there.
    pub vertex_instance_id: VertexInstanceId,
}

/// Re-points contour slots of one polygon at different vertex instances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeVertexInstancesForPolygon {
    pub polygon_id: PolygonId,
    pub perimeter: Vec<VertexIndexAndInstance>,
    /// Outer index = hole number.
    pub holes: Vec<Vec<VertexIndexAndInstance>>,
}

/// A polygon to split and the vertex pairs to split it at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolygonToSplit {
    pub polygon_id: PolygonId,
    /// Ordered pairs of vertices that new edges will be created between.
    /// The vertices must already exist on the polygon's perimeter.
    pub vertex_pairs: Vec<(VertexId, VertexId)>,
}
