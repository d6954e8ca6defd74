//! Cascading deletes entered from an edge or a vertex.

use crate::error::Result;
use crate::mesh::EditableMesh;
use crate::topology::{EdgeId, VertexId};

/// Deletes an edge together with every polygon bordering it, optionally
/// cascading to the elements those deletions orphan.
pub struct DeleteEdgeAndConnectedPolygons {
    edge_id: EdgeId,
    delete_orphaned_edges: bool,
    delete_orphaned_vertices: bool,
    delete_orphaned_vertex_instances: bool,
    delete_empty_polygon_groups: bool,
}

impl DeleteEdgeAndConnectedPolygons {
    /// Creates a new `DeleteEdgeAndConnectedPolygons` operation.
    #[must_use]
    pub fn new(
        edge_id: EdgeId,
        delete_orphaned_edges: bool,
        delete_orphaned_vertices: bool,
        delete_orphaned_vertex_instances: bool,
        delete_empty_polygon_groups: bool,
    ) -> Self {
        Self {
            edge_id,
            delete_orphaned_edges,
            delete_orphaned_vertices,
            delete_orphaned_vertex_instances,
            delete_empty_polygon_groups,
        }
    }

    /// Executes the deletion.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge ID is not allocated or no modification
    /// session is open.
    pub fn execute(&self, mesh: &mut EditableMesh) -> Result<()> {
        let connected_polygons = mesh.edge_connected_polygons(self.edge_id)?;
        if !connected_polygons.is_empty() {
            mesh.delete_polygons(
                &connected_polygons,
                self.delete_orphaned_edges,
                self.delete_orphaned_vertices,
                self.delete_orphaned_vertex_instances,
                self.delete_empty_polygon_groups,
            )?;
        }

        // The edge itself may already have gone with the polygon cascade
        if mesh.is_valid_edge(self.edge_id) {
            mesh.delete_edges(&[self.edge_id], self.delete_orphaned_vertices)?;
        }
        Ok(())
    }
}

/// Deletes a vertex together with its connected edges and their polygons.
pub struct DeleteVertexAndConnectedEdgesAndPolygons {
    vertex_id: VertexId,
    delete_orphaned_edges: bool,
    delete_orphaned_vertices: bool,
    delete_orphaned_vertex_instances: bool,
    delete_empty_polygon_groups: bool,
}

impl DeleteVertexAndConnectedEdgesAndPolygons {
    /// Creates a new `DeleteVertexAndConnectedEdgesAndPolygons` operation.
    #[must_use]
    pub fn new(
        vertex_id: VertexId,
        delete_orphaned_edges: bool,
        delete_orphaned_vertices: bool,
        delete_orphaned_vertex_instances: bool,
        delete_empty_polygon_groups: bool,
    ) -> Self {
        Self {
            vertex_id,
            delete_orphaned_edges,
            delete_orphaned_vertices,
            delete_orphaned_vertex_instances,
            delete_empty_polygon_groups,
        }
    }

    /// Executes the deletion.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex ID is not allocated or no
    /// modification session is open.
    pub fn execute(&self, mesh: &mut EditableMesh) -> Result<()> {
        let connected_edges = mesh.vertex_connected_edges(self.vertex_id)?;
        for edge_id in connected_edges {
            // An earlier iteration's polygon cascade may have deleted it
            if mesh.is_valid_edge(edge_id) {
                DeleteEdgeAndConnectedPolygons::new(
                    edge_id,
                    self.delete_orphaned_edges,
                    self.delete_orphaned_vertices,
                    self.delete_orphaned_vertex_instances,
                    self.delete_empty_polygon_groups,
                )
                .execute(mesh)?;
            }
        }

        if mesh.is_valid_vertex(self.vertex_id) && mesh.is_orphaned_vertex(self.vertex_id) {
            mesh.delete_orphan_vertices(&[self.vertex_id])?;
        }
        Ok(())
    }
}
