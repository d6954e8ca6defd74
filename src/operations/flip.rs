//! Winding reversal.

use crate::error::Result;
use crate::mesh::specs::{ChangeVertexInstancesForPolygon, VertexIndexAndInstance};
use crate::mesh::EditableMesh;
use crate::topology::PolygonId;

/// Reverses the winding of polygons by reversing their contours in place.
pub struct FlipPolygons {
    polygon_ids: Vec<PolygonId>,
}

impl FlipPolygons {
    /// Creates a new `FlipPolygons` operation.
    #[must_use]
    pub fn new(polygon_ids: Vec<PolygonId>) -> Self {
        Self { polygon_ids }
    }

    /// Executes the flip.
    ///
    /// # Errors
    ///
    /// Returns an error if a polygon ID is not allocated or no modification
    /// session is open.
    pub fn execute(&self, mesh: &mut EditableMesh) -> Result<()> {
        let mut specs = Vec::with_capacity(self.polygon_ids.len());
        for &polygon_id in &self.polygon_ids {
            let polygon = mesh.topology().polygon(polygon_id)?;

            let reverse_slots = |instances: &[crate::topology::VertexInstanceId]| {
                let count = instances.len();
                (0..count)
                    .map(|i| VertexIndexAndInstance {
                        contour_index: i,
                        vertex_instance_id: instances[count - 1 - i],
                    })
                    .collect::<Vec<_>>()
            };

            specs.push(ChangeVertexInstancesForPolygon {
                polygon_id,
                perimeter: reverse_slots(&polygon.perimeter.vertex_instances),
                holes: polygon
                    .holes
                    .iter()
                    .map(|hole| reverse_slots(&hole.vertex_instances))
                    .collect(),
            });
        }

        mesh.change_polygons_vertex_instances(&specs)
    }
}
