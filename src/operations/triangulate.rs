//! N-gon to triangle conversion.

use crate::error::Result;
use crate::mesh::specs::{PolygonToCreate, VertexAndAttributes};
use crate::mesh::EditableMesh;
use crate::topology::PolygonId;

/// Replaces polygons with real triangle polygons matching their cached
/// triangulations.
pub struct TriangulatePolygons {
    polygon_ids: Vec<PolygonId>,
}

impl TriangulatePolygons {
    /// Creates a new `TriangulatePolygons` operation.
    #[must_use]
    pub fn new(polygon_ids: Vec<PolygonId>) -> Self {
        Self { polygon_ids }
    }

    /// Executes the conversion, returning the new triangle polygons.
    ///
    /// Polygons that are already triangles are left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if a polygon ID is not allocated or no modification
    /// session is open.
    pub fn execute(&self, mesh: &mut EditableMesh) -> Result<Vec<PolygonId>> {
        let mut new_polygon_ids = Vec::new();

        for &polygon_id in &self.polygon_ids {
            let polygon = mesh.topology().polygon(polygon_id)?;
            if polygon.perimeter.len() == 3 && polygon.holes.is_empty() {
                new_polygon_ids.push(polygon_id);
                continue;
            }
            let group = polygon.group;
            let triangles = mesh.compute_polygon_triangulation(polygon_id)?;

            let specs: Vec<PolygonToCreate> = triangles
                .iter()
                .map(|triangle| {
                    PolygonToCreate::in_group(
                        group,
                        triangle
                            .vertex_instances
                            .iter()
                            .map(|&instance_id| VertexAndAttributes::existing_instance(instance_id))
                            .collect(),
                    )
                })
                .collect();

            // Create the triangles before deleting the source polygon so
            // shared edges and instances never orphan
            let (created, _) = mesh.create_polygons(&specs)?;
            new_polygon_ids.extend(created);

            mesh.delete_polygons(&[polygon_id], false, false, false, false)?;
        }

        Ok(new_polygon_ids)
    }
}
