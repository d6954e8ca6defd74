//! Shading normal and tangent basis generation.

use std::collections::HashMap;

use crate::attributes::VertexInstanceAttribute;
use crate::error::Result;
use crate::math::polygon_3d::polygon_normal;
use crate::math::{Vector2, Vector3, TOLERANCE};
use crate::mesh::specs::AttributesForVertexInstance;
use crate::mesh::EditableMesh;
use crate::topology::{PolygonId, VertexInstanceId};

impl EditableMesh {
    /// Regenerates the shading normal and tangent basis for the instances
    /// of the given polygons.
    ///
    /// An instance's normal averages the face normals of every polygon
    /// using that instance; hard edges already split instances, so the
    /// averaging never crosses one. Tangents come from the first UV
    /// channel.
    ///
    /// # Errors
    ///
    /// Returns an error if no modification session is open or a polygon ID
    /// is not allocated.
    pub fn generate_tangents_and_normals(&mut self, polygon_ids: &[PolygonId]) -> Result<()> {
        self.require_modifying()?;

        let mut face_bases: HashMap<PolygonId, (Vector3, Vector3)> = HashMap::new();

        // Instances touched by the given polygons, in deterministic order
        let mut instance_ids: Vec<VertexInstanceId> = Vec::new();
        for &polygon_id in polygon_ids {
            let polygon = self.topology.polygon(polygon_id)?;
            for contour in polygon.contours() {
                for &instance_id in &contour.vertex_instances {
                    if !instance_ids.contains(&instance_id) {
                        instance_ids.push(instance_id);
                    }
                }
            }
        }

        let mut writes = Vec::with_capacity(instance_ids.len());
        for instance_id in instance_ids {
            let connected = self
                .topology
                .vertex_instance(instance_id)?
                .connected_polygons
                .clone();

            let mut normal_sum = Vector3::zeros();
            let mut tangent_sum = Vector3::zeros();
            for &polygon_id in &connected {
                let (face_normal, face_tangent) = match face_bases.get(&polygon_id) {
                    Some(basis) => *basis,
                    None => {
                        let basis = self.compute_face_basis(polygon_id)?;
                        face_bases.insert(polygon_id, basis);
                        basis
                    }
                };
                normal_sum += face_normal;
                tangent_sum += face_tangent;
            }

            let normal = if normal_sum.norm() > TOLERANCE {
                normal_sum.normalize()
            } else {
                Vector3::new(0.0, 0.0, 1.0)
            };

            // Gram-Schmidt the averaged tangent against the normal
            let mut tangent = tangent_sum - normal * normal_sum.dot(&tangent_sum);
            tangent = if tangent.norm() > TOLERANCE {
                tangent.normalize()
            } else {
                perpendicular_to(&normal)
            };

            writes.push(AttributesForVertexInstance {
                vertex_instance_id: instance_id,
                attributes: vec![
                    VertexInstanceAttribute::Normal(normal),
                    VertexInstanceAttribute::Tangent(tangent),
                    VertexInstanceAttribute::BinormalSign(1.0),
                ],
            });
        }

        if writes.is_empty() {
            return Ok(());
        }
        self.set_vertex_instances_attributes(&writes)
    }

    /// Face normal plus a UV-aligned tangent for one polygon.
    fn compute_face_basis(&self, polygon_id: PolygonId) -> Result<(Vector3, Vector3)> {
        let positions = self.polygon_perimeter_positions(polygon_id)?;
        let normal = polygon_normal(&positions).unwrap_or_else(|| Vector3::new(0.0, 0.0, 1.0));

        // Derive the tangent from the UV gradient across the first
        // triangle of the cached triangulation
        let polygon = self.topology.polygon(polygon_id)?;
        let tangent = polygon
            .triangles
            .first()
            .and_then(|triangle| self.uv_tangent_for_triangle(triangle).ok().flatten())
            .unwrap_or_else(|| perpendicular_to(&normal));

        Ok((normal, tangent))
    }

    fn uv_tangent_for_triangle(
        &self,
        triangle: &crate::topology::Triangle,
    ) -> Result<Option<Vector3>> {
        let mut positions = [Vector3::zeros(); 3];
        let mut uvs = [Vector2::zeros(); 3];
        for (corner, &instance_id) in triangle.vertex_instances.iter().enumerate() {
            let instance = self.topology.vertex_instance(instance_id)?;
            positions[corner] = self.topology.vertex(instance.vertex)?.position.coords;
            uvs[corner] = instance.uvs.first().copied().unwrap_or_else(Vector2::zeros);
        }

        let edge1 = positions[1] - positions[0];
        let edge2 = positions[2] - positions[0];
        let delta1 = uvs[1] - uvs[0];
        let delta2 = uvs[2] - uvs[0];

        let determinant = delta1.x * delta2.y - delta2.x * delta1.y;
        if determinant.abs() < TOLERANCE {
            return Ok(None);
        }
        let tangent = (edge1 * delta2.y - edge2 * delta1.y) / determinant;
        if tangent.norm() < TOLERANCE {
            return Ok(None);
        }
        Ok(Some(tangent.normalize()))
    }
}

/// Any unit vector perpendicular to `v`.
fn perpendicular_to(v: &Vector3) -> Vector3 {
    let candidate = if v.x.abs() < 0.9 {
        Vector3::new(1.0, 0.0, 0.0)
    } else {
        Vector3::new(0.0, 1.0, 0.0)
    };
    let perpendicular = candidate - v * candidate.dot(v);
    if perpendicular.norm() > TOLERANCE {
        perpendicular.normalize()
    } else {
        Vector3::new(0.0, 0.0, 1.0)
    }
}
