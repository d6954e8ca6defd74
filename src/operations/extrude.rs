//! Polygon extrusion.

use std::collections::HashMap;

use crate::error::Result;
use crate::math::{Vector3, TOLERANCE};
use crate::mesh::attributes::capture_instance_attributes;
use crate::mesh::specs::{PolygonToCreate, VertexAndAttributes, VertexToCreate};
use crate::mesh::EditableMesh;
use crate::topology::{PolygonId, VertexId};

/// Pulls polygons out along their normals, stitching side quads around the
/// selection boundary. The original polygons are replaced by the extruded
/// front polygons.
pub struct ExtrudePolygons {
    polygon_ids: Vec<PolygonId>,
    distance: f64,
    keep_neighbors_together: bool,
}

impl ExtrudePolygons {
    /// Creates a new `ExtrudePolygons` operation.
    #[must_use]
    pub fn new(polygon_ids: Vec<PolygonId>, distance: f64, keep_neighbors_together: bool) -> Self {
        Self {
            polygon_ids,
            distance,
            keep_neighbors_together,
        }
    }

    /// Executes the extrusion, returning the new front polygons.
    ///
    /// # Errors
    ///
    /// Returns an error if a polygon ID is not allocated or no modification
    /// session is open.
    pub fn execute(&self, mesh: &mut EditableMesh) -> Result<Vec<PolygonId>> {
        let mut front_polygon_ids = Vec::with_capacity(self.polygon_ids.len());

        // Neighboring selected polygons either share their extruded
        // vertices or each get their own copies
        let groups: Vec<Vec<PolygonId>> = if self.keep_neighbors_together {
            vec![self.polygon_ids.clone()]
        } else {
            self.polygon_ids.iter().map(|&p| vec![p]).collect()
        };

        for group in groups {
            front_polygon_ids.extend(self.extrude_group(mesh, &group)?);
        }
        Ok(front_polygon_ids)
    }

    fn extrude_group(
        &self,
        mesh: &mut EditableMesh,
        polygon_ids: &[PolygonId],
    ) -> Result<Vec<PolygonId>> {
        // Face normals drive the per-vertex extrusion directions
        let mut normals: HashMap<PolygonId, Vector3> = HashMap::new();
        for &polygon_id in polygon_ids {
            normals.insert(polygon_id, mesh.compute_polygon_normal(polygon_id)?);
        }

        // Accumulate each perimeter vertex's direction over the selected
        // polygons sharing it
        let mut vertex_order: Vec<VertexId> = Vec::new();
        let mut directions: HashMap<VertexId, Vector3> = HashMap::new();
        for &polygon_id in polygon_ids {
            for vertex_id in mesh.polygon_perimeter_vertices(polygon_id)? {
                let entry = directions.entry(vertex_id).or_insert_with(|| {
                    vertex_order.push(vertex_id);
                    Vector3::zeros()
                });
                *entry += normals[&polygon_id];
            }
        }

        // One new vertex per perimeter vertex, pushed out along its
        // accumulated direction
        let vertex_specs: Vec<VertexToCreate> = vertex_order
            .iter()
            .map(|&vertex_id| {
                let direction = directions[&vertex_id];
                let direction = if direction.norm() > TOLERANCE {
                    direction.normalize()
                } else {
                    Vector3::new(0.0, 0.0, 1.0)
                };
                let position = mesh.topology().vertex(vertex_id)?.position;
                Ok(VertexToCreate::at_position(position + direction * self.distance))
            })
            .collect::<Result<_>>()?;
        let new_vertex_ids = mesh.create_vertices(&vertex_specs)?;
        let extruded: HashMap<VertexId, VertexId> = vertex_order
            .iter()
            .copied()
            .zip(new_vertex_ids.iter().copied())
            .collect();

        // Front polygons mirror the originals one extrusion distance out
        let mut front_specs = Vec::with_capacity(polygon_ids.len());
        for &polygon_id in polygon_ids {
            let polygon_group = mesh.topology().polygon(polygon_id)?.group;
            let instances = mesh.polygon_perimeter_vertex_instances(polygon_id)?;
            let mut corners = Vec::with_capacity(instances.len());
            for instance_id in instances {
                let instance = mesh.topology().vertex_instance(instance_id)?;
                let mut corner = VertexAndAttributes::new_instance_of(extruded[&instance.vertex]);
                corner.attributes = capture_instance_attributes(instance);
                corners.push(corner);
            }
            front_specs.push(PolygonToCreate::in_group(polygon_group, corners));
        }
        let (front_polygon_ids, _) = mesh.create_polygons(&front_specs)?;

        // Side quads around the selection boundary: a directed perimeter
        // segment a→b whose edge borders exactly one selected polygon
        let mut side_specs = Vec::new();
        for &polygon_id in polygon_ids {
            let polygon_group = mesh.topology().polygon(polygon_id)?.group;
            let perimeter = mesh.polygon_perimeter_vertices(polygon_id)?;
            let count = perimeter.len();
            for i in 0..count {
                let a = perimeter[i];
                let b = perimeter[(i + 1) % count];
                let Some(edge_id) = mesh.edge_that_connects_vertices(a, b) else {
                    continue;
                };
                let selected_count = mesh
                    .edge_connected_polygons(edge_id)?
                    .iter()
                    .filter(|p| polygon_ids.contains(p))
                    .count();
                if selected_count != 1 {
                    continue;
                }
                side_specs.push(PolygonToCreate::in_group(
                    polygon_group,
                    vec![
                        VertexAndAttributes::new_instance_of(a),
                        VertexAndAttributes::new_instance_of(b),
                        VertexAndAttributes::new_instance_of(extruded[&b]),
                        VertexAndAttributes::new_instance_of(extruded[&a]),
                    ],
                ));
            }
        }
        if !side_specs.is_empty() {
            mesh.create_polygons(&side_specs)?;
        }

        // The originals go away; interior edges and vertices of the
        // selection orphan and follow
        mesh.delete_polygons(polygon_ids, true, true, true, false)?;

        Ok(front_polygon_ids)
    }
}
