//! Read-only queries over the mesh.

use crate::error::Result;
use crate::math::polygon_3d::{polygon_center, polygon_normal};
use crate::math::{Point3, Vector3};
use crate::mesh::EditableMesh;
use crate::topology::{
    EdgeId, PolygonGroupId, PolygonId, VertexId, VertexInstanceId,
};

impl EditableMesh {
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.topology.vertices().len()
    }

    #[must_use]
    pub fn vertex_instance_count(&self) -> usize {
        self.topology.vertex_instances().len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.topology.edges().len()
    }

    #[must_use]
    pub fn polygon_count(&self) -> usize {
        self.topology.polygons().len()
    }

    #[must_use]
    pub fn polygon_group_count(&self) -> usize {
        self.topology.polygon_groups().len()
    }

    #[must_use]
    pub fn is_valid_vertex(&self, vertex_id: VertexId) -> bool {
        self.topology.vertices().is_allocated(vertex_id)
    }

    #[must_use]
    pub fn is_valid_vertex_instance(&self, instance_id: VertexInstanceId) -> bool {
        self.topology.vertex_instances().is_allocated(instance_id)
    }

    #[must_use]
    pub fn is_valid_edge(&self, edge_id: EdgeId) -> bool {
        self.topology.edges().is_allocated(edge_id)
    }

    #[must_use]
    pub fn is_valid_polygon(&self, polygon_id: PolygonId) -> bool {
        self.topology.polygons().is_allocated(polygon_id)
    }

    #[must_use]
    pub fn is_valid_polygon_group(&self, group_id: PolygonGroupId) -> bool {
        self.topology.polygon_groups().is_allocated(group_id)
    }

    /// Returns `true` if the vertex exists and nothing references it.
    #[must_use]
    pub fn is_orphaned_vertex(&self, vertex_id: VertexId) -> bool {
        self.topology
            .vertex(vertex_id)
            .is_ok_and(crate::topology::Vertex::is_orphaned)
    }

    /// The edges connected to a vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex ID is not allocated.
    pub fn vertex_connected_edges(&self, vertex_id: VertexId) -> Result<Vec<EdgeId>> {
        Ok(self.topology.vertex(vertex_id)?.connected_edges.clone())
    }

    /// The polygons connected to a vertex through its edges, deduplicated.
    #[must_use]
    pub fn vertex_connected_polygons(&self, vertex_id: VertexId) -> Vec<PolygonId> {
        self.topology.vertex_connected_polygons(vertex_id)
    }

    /// The vertices adjacent to a vertex across its connected edges.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex ID is not allocated.
    pub fn vertex_adjacent_vertices(&self, vertex_id: VertexId) -> Result<Vec<VertexId>> {
        let vertex = self.topology.vertex(vertex_id)?;
        let mut adjacent = Vec::with_capacity(vertex.connected_edges.len());
        for &edge_id in &vertex.connected_edges {
            if let Some(other) = self.topology.edge(edge_id)?.other_vertex(vertex_id) {
                if !adjacent.contains(&other) {
                    adjacent.push(other);
                }
            }
        }
        Ok(adjacent)
    }

    /// Finds the edge connecting two vertices, if one exists.
    #[must_use]
    pub fn edge_that_connects_vertices(
        &self,
        vertex_id0: VertexId,
        vertex_id1: VertexId,
    ) -> Option<EdgeId> {
        self.topology.edge_that_connects_vertices(vertex_id0, vertex_id1)
    }

    /// The two endpoint vertices of an edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge ID is not allocated.
    pub fn edge_vertices(&self, edge_id: EdgeId) -> Result<[VertexId; 2]> {
        Ok(self.topology.edge(edge_id)?.vertices)
    }

    /// The polygons bordering an edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge ID is not allocated.
    pub fn edge_connected_polygons(&self, edge_id: EdgeId) -> Result<Vec<PolygonId>> {
        Ok(self.topology.edge(edge_id)?.connected_polygons.clone())
    }

    /// The vertices around a polygon's perimeter, in contour order.
    ///
    /// # Errors
    ///
    /// Returns an error if the polygon ID is not allocated.
    pub fn polygon_perimeter_vertices(&self, polygon_id: PolygonId) -> Result<Vec<VertexId>> {
        let polygon = self.topology.polygon(polygon_id)?;
        Ok(self.topology.contour_vertices(&polygon.perimeter)?)
    }

    /// The vertex instances around a polygon's perimeter, in contour order.
    ///
    /// # Errors
    ///
    /// Returns an error if the polygon ID is not allocated.
    pub fn polygon_perimeter_vertex_instances(
        &self,
        polygon_id: PolygonId,
    ) -> Result<Vec<VertexInstanceId>> {
        Ok(self
            .topology
            .polygon(polygon_id)?
            .perimeter
            .vertex_instances
            .clone())
    }

    /// The edges around a polygon's perimeter, in contour order.
    ///
    /// # Errors
    ///
    /// Returns an error if the polygon ID is not allocated or the contour
    /// is out of sync with the edge store.
    pub fn polygon_perimeter_edges(&self, polygon_id: PolygonId) -> Result<Vec<EdgeId>> {
        let polygon = self.topology.polygon(polygon_id)?;
        Ok(self.topology.contour_edges(&polygon.perimeter)?)
    }

    /// The polygons sharing an edge with a polygon, deduplicated.
    ///
    /// # Errors
    ///
    /// Returns an error if the polygon ID is not allocated.
    pub fn polygon_adjacent_polygons(&self, polygon_id: PolygonId) -> Result<Vec<PolygonId>> {
        let mut adjacent = Vec::new();
        for edge_id in self.polygon_perimeter_edges(polygon_id)? {
            for &other in &self.topology.edge(edge_id)?.connected_polygons {
                if other != polygon_id && !adjacent.contains(&other) {
                    adjacent.push(other);
                }
            }
        }
        Ok(adjacent)
    }

    /// The edges shared by at least two of the given polygons.
    ///
    /// # Errors
    ///
    /// Returns an error if a polygon ID is not allocated.
    pub fn polygons_shared_edges(&self, polygon_ids: &[PolygonId]) -> Result<Vec<EdgeId>> {
        let mut shared = Vec::new();
        for &polygon_id in polygon_ids {
            for edge_id in self.polygon_perimeter_edges(polygon_id)? {
                if shared.contains(&edge_id) {
                    continue;
                }
                let bordering = &self.topology.edge(edge_id)?.connected_polygons;
                let count = bordering
                    .iter()
                    .filter(|p| polygon_ids.contains(p))
                    .count();
                if count >= 2 {
                    shared.push(edge_id);
                }
            }
        }
        Ok(shared)
    }

    /// The center (average of perimeter vertex positions) of a polygon.
    ///
    /// # Errors
    ///
    /// Returns an error if the polygon ID is not allocated.
    pub fn compute_polygon_center(&self, polygon_id: PolygonId) -> Result<Point3> {
        let positions = self.polygon_perimeter_positions(polygon_id)?;
        Ok(polygon_center(&positions))
    }

    /// The unit normal of a polygon's perimeter (Newell's method).
    ///
    /// # Errors
    ///
    /// Returns an error if the polygon ID is not allocated or the perimeter
    /// encloses no area.
    pub fn compute_polygon_normal(&self, polygon_id: PolygonId) -> Result<Vector3> {
        let positions = self.polygon_perimeter_positions(polygon_id)?;
        polygon_normal(&positions).ok_or_else(|| {
            crate::error::TriangulationError::DegenerateContour(format!(
                "polygon {polygon_id} encloses no area"
            ))
            .into()
        })
    }

    /// The area of a polygon's perimeter contour.
    ///
    /// # Errors
    ///
    /// Returns an error if the polygon ID is not allocated or the perimeter
    /// encloses no area.
    pub fn compute_polygon_area(&self, polygon_id: PolygonId) -> Result<f64> {
        let positions = self.polygon_perimeter_positions(polygon_id)?;
        let normal = self.compute_polygon_normal(polygon_id)?;
        Ok(crate::math::polygon_3d::polygon_area_3d(&positions, &normal))
    }

    /// The plane basis a polygon lies in, used for triangulation and
    /// projection queries.
    ///
    /// # Errors
    ///
    /// Returns an error if the polygon ID is not allocated or the perimeter
    /// encloses no area.
    pub fn compute_polygon_plane(
        &self,
        polygon_id: PolygonId,
    ) -> Result<crate::math::polygon_3d::PolygonPlane> {
        let positions = self.polygon_perimeter_positions(polygon_id)?;
        crate::math::polygon_3d::PolygonPlane::from_contour(&positions).ok_or_else(|| {
            crate::error::TriangulationError::DegenerateContour(format!(
                "polygon {polygon_id} encloses no area"
            ))
            .into()
        })
    }

    /// The axis-aligned bounding box of all vertices, as `(min, max)`.
    /// Returns `None` for a mesh with no vertices.
    #[must_use]
    pub fn compute_bounding_box(&self) -> Option<(Point3, Point3)> {
        let mut iter = self.topology.vertices().iter();
        let (_, first) = iter.next()?;
        let mut min = first.position;
        let mut max = first.position;
        for (_, vertex) in iter {
            let p = vertex.position;
            min = Point3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z));
            max = Point3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z));
        }
        Some((min, max))
    }

    pub(crate) fn polygon_perimeter_positions(&self, polygon_id: PolygonId) -> Result<Vec<Point3>> {
        let vertices = self.polygon_perimeter_vertices(polygon_id)?;
        vertices
            .into_iter()
            .map(|vertex_id| Ok(self.topology.vertex(vertex_id)?.position))
            .collect()
    }
}
