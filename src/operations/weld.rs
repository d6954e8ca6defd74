//! Vertex welding.

use crate::error::{OperationError, Result};
use crate::mesh::specs::{PolygonToCreate, VertexAndAttributes, VertexToCreate};
use crate::mesh::EditableMesh;
use crate::topology::{PolygonId, VertexId};

/// Merges vertices into a single vertex, rebuilding every polygon that
/// used one of them.
///
/// Polygons that would degenerate (fewer than three distinct corners after
/// the weld) are deleted rather than rebuilt.
pub struct WeldVertices {
    vertex_ids: Vec<VertexId>,
}

impl WeldVertices {
    /// Creates a new `WeldVertices` operation.
    #[must_use]
    pub fn new(vertex_ids: Vec<VertexId>) -> Self {
        Self { vertex_ids }
    }

    /// Executes the weld, returning the merged vertex.
    ///
    /// The new vertex takes the position of the first vertex in the list.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than two vertices are given, a vertex ID
    /// is not allocated, or no modification session is open.
    pub fn execute(&self, mesh: &mut EditableMesh) -> Result<VertexId> {
        if self.vertex_ids.len() < 2 {
            return Err(
                OperationError::InvalidInput("welding needs at least two vertices".into()).into(),
            );
        }
        for &vertex_id in &self.vertex_ids {
            mesh.topology().vertex(vertex_id)?;
        }

        let position = mesh.topology().vertex(self.vertex_ids[0])?.position;
        let new_vertex_id = mesh.create_vertices(&[VertexToCreate::at_position(position)])?[0];

        // Every polygon touching a welded vertex gets rebuilt
        let mut affected_polygons: Vec<PolygonId> = Vec::new();
        for &vertex_id in &self.vertex_ids {
            for polygon_id in mesh.vertex_connected_polygons(vertex_id) {
                if !affected_polygons.contains(&polygon_id) {
                    affected_polygons.push(polygon_id);
                }
            }
        }

        // Build the replacement contours before anything is deleted. Every
        // corner gets a fresh instance; the old instances die with their
        // polygons.
        let mut replacements: Vec<PolygonToCreate> = Vec::new();
        for &polygon_id in &affected_polygons {
            if let Some(replacement) = self.build_replacement(mesh, polygon_id, new_vertex_id)? {
                replacements.push(replacement);
            }
        }

        // Loose edges (no polygons) attached to welded vertices go away too
        let mut loose_edges = Vec::new();
        for &vertex_id in &self.vertex_ids {
            for edge_id in mesh.vertex_connected_edges(vertex_id)? {
                if mesh.edge_connected_polygons(edge_id)?.is_empty()
                    && !loose_edges.contains(&edge_id)
                {
                    loose_edges.push(edge_id);
                }
            }
        }
        if !loose_edges.is_empty() {
            mesh.delete_edges(&loose_edges, false)?;
        }

        if !affected_polygons.is_empty() {
            mesh.delete_polygons(&affected_polygons, true, false, true, false)?;
        }
        if !replacements.is_empty() {
            mesh.create_polygons(&replacements)?;
        }

        // The welded vertices should be unreferenced now
        let orphans: Vec<VertexId> = self
            .vertex_ids
            .iter()
            .copied()
            .filter(|&vertex_id| mesh.is_orphaned_vertex(vertex_id))
            .collect();
        if !orphans.is_empty() {
            mesh.delete_orphan_vertices(&orphans)?;
        }

        Ok(new_vertex_id)
    }

    /// The polygon's contours with welded corners redirected to the new
    /// vertex and collapsed runs removed, or `None` if it degenerates.
    fn build_replacement(
        &self,
        mesh: &EditableMesh,
        polygon_id: PolygonId,
        new_vertex_id: VertexId,
    ) -> Result<Option<PolygonToCreate>> {
        let topology = mesh.topology();
        let polygon = topology.polygon(polygon_id)?;
        let group = polygon.group;

        let rebuild_contour = |instances: &[crate::topology::VertexInstanceId]| -> Result<Vec<VertexAndAttributes>> {
            let mut corners: Vec<VertexAndAttributes> = Vec::with_capacity(instances.len());
            for &instance_id in instances {
                let instance = topology.vertex_instance(instance_id)?;
                let target_vertex = if self.vertex_ids.contains(&instance.vertex) {
                    new_vertex_id
                } else {
                    instance.vertex
                };
                // Consecutive corners collapsing onto the same vertex merge
                if corners.last().is_some_and(|last| last.vertex_id == target_vertex) {
                    continue;
                }
                let mut corner = VertexAndAttributes::new_instance_of(target_vertex);
                corner.attributes =
                    crate::mesh::attributes::capture_instance_attributes(instance);
                corners.push(corner);
            }
            // The contour is cyclic; the ends may collapse too
            while corners.len() > 1
                && corners[0].vertex_id == corners[corners.len() - 1].vertex_id
            {
                corners.pop();
            }
            Ok(corners)
        };

        let perimeter = rebuild_contour(&polygon.perimeter.vertex_instances)?;
        if perimeter.len() < 3 {
            return Ok(None);
        }
        let mut holes = Vec::new();
        for hole in &polygon.holes {
            let rebuilt = rebuild_contour(&hole.vertex_instances)?;
            if rebuilt.len() >= 3 {
                holes.push(rebuilt);
            }
        }

        let mut replacement = PolygonToCreate::in_group(group, perimeter);
        replacement.holes = holes;
        Ok(Some(replacement))
    }
}
