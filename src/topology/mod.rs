pub mod edge;
pub mod ids;
pub mod polygon;
pub mod polygon_group;
pub mod vertex;
pub mod vertex_instance;

pub use edge::Edge;
pub use ids::{
    EdgeId, ElementId, ElementKind, PolygonGroupId, PolygonId, VertexId, VertexInstanceId,
};
pub use polygon::{Contour, Polygon, Triangle};
pub use polygon_group::PolygonGroup;
pub use vertex::Vertex;
pub use vertex_instance::VertexInstance;

use serde::{Deserialize, Serialize};

use crate::error::TopologyError;
use crate::store::SparseStore;

/// Central store that owns all five element kinds of a mesh.
///
/// Elements reference each other via typed IDs, avoiding self-referential
/// structures; ownership is solely "store owns record at ID". Between
/// modification sessions every cross-reference is bidirectionally
/// consistent (see [`MeshTopology::validate`]).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeshTopology {
    pub(crate) vertices: SparseStore<VertexId, Vertex>,
    pub(crate) vertex_instances: SparseStore<VertexInstanceId, VertexInstance>,
    pub(crate) edges: SparseStore<EdgeId, Edge>,
    pub(crate) polygons: SparseStore<PolygonId, Polygon>,
    pub(crate) polygon_groups: SparseStore<PolygonGroupId, PolygonGroup>,
}

impl MeshTopology {
    /// Creates a new, empty topology.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Vertex accessors ---

    /// Returns a reference to the vertex, or an error if not allocated.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found in the store.
    pub fn vertex(&self, id: VertexId) -> Result<&Vertex, TopologyError> {
        self.vertices.get(id)
    }

    /// Returns a mutable reference to the vertex, or an error if not allocated.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found in the store.
    pub fn vertex_mut(&mut self, id: VertexId) -> Result<&mut Vertex, TopologyError> {
        self.vertices.get_mut(id)
    }

    // --- Vertex instance accessors ---

    /// Returns a reference to the vertex instance, or an error if not allocated.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found in the store.
    pub fn vertex_instance(&self, id: VertexInstanceId) -> Result<&VertexInstance, TopologyError> {
        self.vertex_instances.get(id)
    }

    /// Returns a mutable reference to the vertex instance, or an error if not allocated.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found in the store.
    pub fn vertex_instance_mut(
        &mut self,
        id: VertexInstanceId,
    ) -> Result<&mut VertexInstance, TopologyError> {
        self.vertex_instances.get_mut(id)
    }

    // --- Edge accessors ---

    /// Returns a reference to the edge, or an error if not allocated.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found in the store.
    pub fn edge(&self, id: EdgeId) -> Result<&Edge, TopologyError> {
        self.edges.get(id)
    }

    /// Returns a mutable reference to the edge, or an error if not allocated.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found in the store.
    pub fn edge_mut(&mut self, id: EdgeId) -> Result<&mut Edge, TopologyError> {
        self.edges.get_mut(id)
    }

    // --- Polygon accessors ---

    /// Returns a reference to the polygon, or an error if not allocated.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found in the store.
    pub fn polygon(&self, id: PolygonId) -> Result<&Polygon, TopologyError> {
        self.polygons.get(id)
    }

    /// Returns a mutable reference to the polygon, or an error if not allocated.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found in the store.
    pub fn polygon_mut(&mut self, id: PolygonId) -> Result<&mut Polygon, TopologyError> {
        self.polygons.get_mut(id)
    }

    // --- Polygon group accessors ---

    /// Returns a reference to the polygon group, or an error if not allocated.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found in the store.
    pub fn polygon_group(&self, id: PolygonGroupId) -> Result<&PolygonGroup, TopologyError> {
        self.polygon_groups.get(id)
    }

    /// Returns a mutable reference to the polygon group, or an error if not allocated.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found in the store.
    pub fn polygon_group_mut(
        &mut self,
        id: PolygonGroupId,
    ) -> Result<&mut PolygonGroup, TopologyError> {
        self.polygon_groups.get_mut(id)
    }

    // --- Store access ---

    #[must_use]
    pub fn vertices(&self) -> &SparseStore<VertexId, Vertex> {
        &self.vertices
    }

    #[must_use]
    pub fn vertex_instances(&self) -> &SparseStore<VertexInstanceId, VertexInstance> {
        &self.vertex_instances
    }

    #[must_use]
    pub fn edges(&self) -> &SparseStore<EdgeId, Edge> {
        &self.edges
    }

    #[must_use]
    pub fn polygons(&self) -> &SparseStore<PolygonId, Polygon> {
        &self.polygons
    }

    #[must_use]
    pub fn polygon_groups(&self) -> &SparseStore<PolygonGroupId, PolygonGroup> {
        &self.polygon_groups
    }

    // --- Adjacency queries ---

    /// Finds the edge connecting two vertices, if one exists.
    #[must_use]
    pub fn edge_that_connects_vertices(
        &self,
        vertex0: VertexId,
        vertex1: VertexId,
    ) -> Option<EdgeId> {
        let vertex = self.vertices.get(vertex0).ok()?;
        vertex.connected_edges.iter().copied().find(|&edge_id| {
            self.edges
                .get(edge_id)
                .is_ok_and(|edge| edge.other_vertex(vertex0) == Some(vertex1))
        })
    }

    /// Collects the polygons connected to a vertex through its edges,
    /// deduplicated, in discovery order.
    #[must_use]
    pub fn vertex_connected_polygons(&self, vertex_id: VertexId) -> Vec<PolygonId> {
        let mut polygons = Vec::new();
        if let Ok(vertex) = self.vertices.get(vertex_id) {
            for &edge_id in &vertex.connected_edges {
                if let Ok(edge) = self.edges.get(edge_id) {
                    for &polygon_id in &edge.connected_polygons {
                        if !polygons.contains(&polygon_id) {
                            polygons.push(polygon_id);
                        }
                    }
                }
            }
        }
        polygons
    }

    /// Finds the vertex instance a polygon uses for `vertex_id`, if any.
    #[must_use]
    pub fn vertex_instance_in_polygon_for_vertex(
        &self,
        polygon_id: PolygonId,
        vertex_id: VertexId,
    ) -> Option<VertexInstanceId> {
        let polygon = self.polygons.get(polygon_id).ok()?;
        polygon
            .contours()
            .flat_map(|contour| contour.vertex_instances.iter().copied())
            .find(|&instance_id| {
                self.vertex_instances
                    .get(instance_id)
                    .is_ok_and(|instance| instance.vertex == vertex_id)
            })
    }

    /// Resolves a contour to the vertices behind its instances.
    ///
    /// # Errors
    ///
    /// Returns an error if an instance in the contour is not allocated.
    pub fn contour_vertices(&self, contour: &Contour) -> Result<Vec<VertexId>, TopologyError> {
        contour
            .vertex_instances
            .iter()
            .map(|&instance_id| Ok(self.vertex_instances.get(instance_id)?.vertex))
            .collect()
    }

    /// Collects the edges running along a contour, one per contour segment.
    ///
    /// # Errors
    ///
    /// Returns an error if a contour segment has no edge connecting its
    /// vertices — the contour and edge stores are out of sync.
    pub fn contour_edges(&self, contour: &Contour) -> Result<Vec<EdgeId>, TopologyError> {
        let vertices = self.contour_vertices(contour)?;
        let count = vertices.len();
        let mut edge_ids = Vec::with_capacity(count);
        for i in 0..count {
            let vertex0 = vertices[i];
            let vertex1 = vertices[(i + 1) % count];
            let edge_id = self
                .edge_that_connects_vertices(vertex0, vertex1)
                .ok_or_else(|| {
                    TopologyError::Inconsistent(format!(
                        "no edge connects contour vertices {vertex0} and {vertex1}"
                    ))
                })?;
            edge_ids.push(edge_id);
        }
        Ok(edge_ids)
    }

    // --- Consistency ---

    /// Verifies the invariants that must hold between modification sessions.
    ///
    /// # Errors
    ///
    /// Returns the first violation found. A violation is fatal: it means an
    /// earlier unchecked mutation already corrupted the graph.
    pub fn validate(&self) -> Result<(), TopologyError> {
        for (edge_id, edge) in self.edges.iter() {
            for &vertex_id in &edge.vertices {
                let vertex = self.vertices.get(vertex_id).map_err(|_| {
                    TopologyError::Inconsistent(format!(
                        "edge {edge_id} references missing vertex {vertex_id}"
                    ))
                })?;
                if !vertex.connected_edges.contains(&edge_id) {
                    return Err(TopologyError::Inconsistent(format!(
                        "vertex {vertex_id} does not list connected edge {edge_id}"
                    )));
                }
            }
            for &polygon_id in &edge.connected_polygons {
                if !self.polygons.is_allocated(polygon_id) {
                    return Err(TopologyError::Inconsistent(format!(
                        "edge {edge_id} references missing polygon {polygon_id}"
                    )));
                }
            }
        }

        for (vertex_id, vertex) in self.vertices.iter() {
            for &edge_id in &vertex.connected_edges {
                let edge = self.edges.get(edge_id).map_err(|_| {
                    TopologyError::Inconsistent(format!(
                        "vertex {vertex_id} references missing edge {edge_id}"
                    ))
                })?;
                if edge.other_vertex(vertex_id).is_none() {
                    return Err(TopologyError::Inconsistent(format!(
                        "edge {edge_id} does not have vertex {vertex_id} as an endpoint"
                    )));
                }
            }
            for &instance_id in &vertex.vertex_instances {
                let instance = self.vertex_instances.get(instance_id).map_err(|_| {
                    TopologyError::Inconsistent(format!(
                        "vertex {vertex_id} references missing instance {instance_id}"
                    ))
                })?;
                if instance.vertex != vertex_id {
                    return Err(TopologyError::Inconsistent(format!(
                        "instance {instance_id} does not reference back to vertex {vertex_id}"
                    )));
                }
            }
        }

        for (polygon_id, polygon) in self.polygons.iter() {
            let group = self.polygon_groups.get(polygon.group).map_err(|_| {
                TopologyError::Inconsistent(format!(
                    "polygon {polygon_id} references missing group {}",
                    polygon.group
                ))
            })?;
            if !group.polygons.contains(&polygon_id) {
                return Err(TopologyError::Inconsistent(format!(
                    "group {} does not list polygon {polygon_id}",
                    polygon.group
                )));
            }

            let mut contour_instances = Vec::new();
            for contour in polygon.contours() {
                for &instance_id in &contour.vertex_instances {
                    let instance = self.vertex_instances.get(instance_id).map_err(|_| {
                        TopologyError::Inconsistent(format!(
                            "polygon {polygon_id} references missing instance {instance_id}"
                        ))
                    })?;
                    if !instance.connected_polygons.contains(&polygon_id) {
                        return Err(TopologyError::Inconsistent(format!(
                            "instance {instance_id} does not list connected polygon {polygon_id}"
                        )));
                    }
                    contour_instances.push(instance_id);
                }
                self.contour_edges(contour)?;
            }

            for triangle in &polygon.triangles {
                for instance_id in triangle.vertex_instances {
                    if !contour_instances.contains(&instance_id) {
                        return Err(TopologyError::Inconsistent(format!(
                            "triangulation of polygon {polygon_id} references instance \
                             {instance_id} outside its contours"
                        )));
                    }
                }
            }
        }

        for (group_id, group) in self.polygon_groups.iter() {
            for &polygon_id in &group.polygons {
                let polygon = self.polygons.get(polygon_id).map_err(|_| {
                    TopologyError::Inconsistent(format!(
                        "group {group_id} references missing polygon {polygon_id}"
                    ))
                })?;
                if polygon.group != group_id {
                    return Err(TopologyError::Inconsistent(format!(
                        "polygon {polygon_id} is listed in group {group_id} but belongs to {}",
                        polygon.group
                    )));
                }
            }
        }

        Ok(())
    }
}
