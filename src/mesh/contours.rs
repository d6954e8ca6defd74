//! Contour editing and triangulation upkeep.

use crate::change::MeshChange;
use crate::error::{Result, TopologyError};
use crate::mesh::specs::{
    ChangeVertexInstancesForPolygon, VertexAndAttributes, VerticesForEdge,
};
use crate::mesh::EditableMesh;
use crate::topology::{PolygonId, Triangle, VertexInstanceId};
use crate::triangulate::triangulate_polygon;

impl EditableMesh {
    /// Recomputes the cached triangulation of each polygon.
    ///
    /// Adapters are only notified for polygons whose triangle list actually
    /// changed, vertex for vertex; an unchanged polygon is an expected no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if no modification session is open, a polygon ID is
    /// not allocated, or a contour has degenerated beyond triangulation.
    pub fn retriangulate_polygons(&mut self, polygon_ids: &[PolygonId]) -> Result<()> {
        self.require_modifying()?;

        let mut changed = Vec::new();
        for &polygon_id in polygon_ids {
            let triangles = triangulate_polygon(&self.topology, polygon_id)?;
            let polygon = self.topology.polygon_mut(polygon_id)?;
            if polygon.triangles != triangles {
                polygon.triangles = triangles;
                changed.push(polygon_id);
            }
        }

        if !changed.is_empty() {
            self.notify_adapters(|adapter, mesh| {
                adapter.on_retriangulate_polygons(mesh, &changed);
            });
        }
        Ok(())
    }

    /// Computes a polygon's triangulation without caching it.
    ///
    /// # Errors
    ///
    /// Returns an error if the polygon ID is not allocated or its contours
    /// are degenerate.
    pub fn compute_polygon_triangulation(&self, polygon_id: PolygonId) -> Result<Vec<Triangle>> {
        triangulate_polygon(&self.topology, polygon_id)
    }

    /// Re-points edges at different endpoint vertices, maintaining the
    /// connected-edge lists of the old and new vertices symmetrically.
    ///
    /// # Errors
    ///
    /// Returns an error if no modification session is open or any edge or
    /// vertex ID is not allocated.
    pub fn set_edges_vertices(&mut self, specs: &[VerticesForEdge]) -> Result<()> {
        self.require_modifying()?;

        let mut revert = Vec::with_capacity(specs.len());
        for spec in specs.iter().rev() {
            let edge = self.topology.edge(spec.edge_id)?;
            revert.push(VerticesForEdge {
                edge_id: spec.edge_id,
                new_vertex_id0: edge.vertices[0],
                new_vertex_id1: edge.vertices[1],
            });
        }

        let mut edge_ids = Vec::with_capacity(specs.len());
        for spec in specs {
            self.topology.vertex(spec.new_vertex_id0)?;
            self.topology.vertex(spec.new_vertex_id1)?;

            let old_vertices = self.topology.edge(spec.edge_id)?.vertices;
            for vertex_id in old_vertices {
                let vertex = self.topology.vertex_mut(vertex_id)?;
                let position = vertex
                    .connected_edges
                    .iter()
                    .position(|&e| e == spec.edge_id)
                    .ok_or_else(|| {
                        TopologyError::Inconsistent(format!(
                            "vertex {vertex_id} does not list connected edge {}",
                            spec.edge_id
                        ))
                    })?;
                vertex.connected_edges.remove(position);
            }

            self.topology.edge_mut(spec.edge_id)?.vertices =
                [spec.new_vertex_id0, spec.new_vertex_id1];
            self.topology
                .vertex_mut(spec.new_vertex_id0)?
                .connected_edges
                .push(spec.edge_id);
            self.topology
                .vertex_mut(spec.new_vertex_id1)?
                .connected_edges
                .push(spec.edge_id);

            let affected = self.topology.edge(spec.edge_id)?.connected_polygons.clone();
            self.polygons_pending_triangulation.extend(affected.iter());
            self.polygons_pending_tangent_basis.extend(affected);

            edge_ids.push(spec.edge_id);
        }

        self.notify_adapters(|adapter, mesh| adapter.on_set_edges_vertices(mesh, &edge_ids));

        self.add_undo(MeshChange::SetEdgesVertices {
            vertices_for_edges: revert,
        });
        Ok(())
    }

    /// Splices vertices into a polygon's perimeter before the given contour
    /// position, creating vertex instances for corners that need them.
    ///
    /// Edges along the new perimeter segments are not created here; callers
    /// splicing mid-edge (edge splits) re-point the surrounding edges
    /// themselves.
    ///
    /// # Errors
    ///
    /// Returns an error if no modification session is open, the polygon ID
    /// is not allocated, or the insertion position is out of range.
    pub fn insert_polygon_perimeter_vertices(
        &mut self,
        polygon_id: PolygonId,
        insert_before_vertex_number: usize,
        corners: &[VertexAndAttributes],
    ) -> Result<Vec<VertexInstanceId>> {
        self.require_modifying()?;

        let perimeter_len = self.topology.polygon(polygon_id)?.perimeter.len();
        if insert_before_vertex_number > perimeter_len {
            return Err(crate::error::OperationError::InvalidInput(format!(
                "insert position {insert_before_vertex_number} exceeds perimeter length \
                 {perimeter_len}"
            ))
            .into());
        }

        let instance_ids = self.resolve_contour_instances(corners)?;

        {
            let polygon = self.topology.polygon_mut(polygon_id)?;
            polygon.perimeter.vertex_instances.splice(
                insert_before_vertex_number..insert_before_vertex_number,
                instance_ids.iter().copied(),
            );
        }
        for &instance_id in &instance_ids {
            self.topology
                .vertex_instance_mut(instance_id)?
                .connected_polygons
                .push(polygon_id);
        }

        self.polygons_pending_triangulation.insert(polygon_id);
        self.polygons_pending_tangent_basis.insert(polygon_id);

        self.notify_adapters(|adapter, mesh| {
            adapter.on_change_polygon_vertex_instances(mesh, &[polygon_id]);
        });

        self.add_undo(MeshChange::RemovePolygonPerimeterVertices {
            polygon_id,
            first_vertex_number: insert_before_vertex_number,
            count: corners.len(),
            delete_orphaned_vertex_instances: false,
        });

        Ok(instance_ids)
    }

    /// Removes a run of vertices from a polygon's perimeter contour.
    ///
    /// # Errors
    ///
    /// Returns an error if no modification session is open, the range is
    /// out of bounds, or removal would leave fewer than three perimeter
    /// vertices.
    pub fn remove_polygon_perimeter_vertices(
        &mut self,
        polygon_id: PolygonId,
        first_vertex_number: usize,
        count: usize,
        delete_orphaned_vertex_instances: bool,
    ) -> Result<()> {
        self.require_modifying()?;

        let perimeter_len = self.topology.polygon(polygon_id)?.perimeter.len();
        if first_vertex_number + count > perimeter_len {
            return Err(crate::error::OperationError::InvalidInput(format!(
                "removal range {first_vertex_number}..{} exceeds perimeter length {perimeter_len}",
                first_vertex_number + count
            ))
            .into());
        }
        if perimeter_len - count < 3 {
            return Err(TopologyError::DegeneratePerimeter(perimeter_len - count).into());
        }

        // Back up the removed corners so undo can splice them back in
        let removed: Vec<VertexInstanceId> = self.topology.polygon(polygon_id)?.perimeter
            .vertex_instances[first_vertex_number..first_vertex_number + count]
            .to_vec();
        let mut corners = Vec::with_capacity(count);
        for &instance_id in &removed {
            let instance = self.topology.vertex_instance(instance_id)?;
            corners.push(VertexAndAttributes {
                vertex_instance_id: instance_id,
                vertex_id: instance.vertex,
                attributes: super::attributes::capture_instance_attributes(instance),
            });
        }
        self.add_undo(MeshChange::InsertPolygonPerimeterVertices {
            polygon_id,
            insert_before_vertex_number: first_vertex_number,
            corners,
        });

        {
            let polygon = self.topology.polygon_mut(polygon_id)?;
            polygon
                .perimeter
                .vertex_instances
                .drain(first_vertex_number..first_vertex_number + count);
        }

        let mut orphaned_instances = Vec::new();
        for &instance_id in &removed {
            let instance = self.topology.vertex_instance_mut(instance_id)?;
            let position = instance
                .connected_polygons
                .iter()
                .position(|&p| p == polygon_id)
                .ok_or_else(|| {
                    TopologyError::Inconsistent(format!(
                        "instance {instance_id} does not list connected polygon {polygon_id}"
                    ))
                })?;
            instance.connected_polygons.remove(position);
            if instance.connected_polygons.is_empty()
                && !orphaned_instances.contains(&instance_id)
            {
                orphaned_instances.push(instance_id);
            }
        }
        if delete_orphaned_vertex_instances && !orphaned_instances.is_empty() {
            self.delete_vertex_instances(&orphaned_instances, false)?;
        }

        self.polygons_pending_triangulation.insert(polygon_id);
        self.polygons_pending_tangent_basis.insert(polygon_id);

        self.notify_adapters(|adapter, mesh| {
            adapter.on_change_polygon_vertex_instances(mesh, &[polygon_id]);
        });

        Ok(())
    }

    /// Re-points contour slots of polygons at different vertex instances.
    ///
    /// # Errors
    ///
    /// Returns an error if no modification session is open or any polygon,
    /// contour index, or instance is invalid.
    pub fn change_polygons_vertex_instances(
        &mut self,
        specs: &[ChangeVertexInstancesForPolygon],
    ) -> Result<()> {
        self.require_modifying()?;

        // Capture the instances currently occupying the slots we'll touch
        let mut revert = Vec::with_capacity(specs.len());
        for spec in specs.iter().rev() {
            let polygon = self.topology.polygon(spec.polygon_id)?;
            let capture_slots = |contour: &crate::topology::Contour,
                                 slots: &[crate::mesh::specs::VertexIndexAndInstance]|
             -> Result<Vec<crate::mesh::specs::VertexIndexAndInstance>> {
                slots
                    .iter()
                    .map(|slot| {
                        let current = contour
                            .vertex_instances
                            .get(slot.contour_index)
                            .copied()
                            .ok_or_else(|| {
                                TopologyError::Inconsistent(format!(
                                    "polygon {} has no contour slot {}",
                                    spec.polygon_id, slot.contour_index
                                ))
                            })?;
                        Ok(crate::mesh::specs::VertexIndexAndInstance {
                            contour_index: slot.contour_index,
                            vertex_instance_id: current,
                        })
                    })
                    .collect()
            };

            let perimeter = capture_slots(&polygon.perimeter, &spec.perimeter)?;
            let mut holes = Vec::with_capacity(spec.holes.len());
            for (hole_number, hole_slots) in spec.holes.iter().enumerate() {
                let hole = polygon.holes.get(hole_number).ok_or_else(|| {
                    TopologyError::Inconsistent(format!(
                        "polygon {} has no hole contour {hole_number}",
                        spec.polygon_id
                    ))
                })?;
                holes.push(capture_slots(hole, hole_slots)?);
            }
            revert.push(ChangeVertexInstancesForPolygon {
                polygon_id: spec.polygon_id,
                perimeter,
                holes,
            });
        }
        self.add_undo(MeshChange::ChangePolygonsVertexInstances { changes: revert });

        let mut polygon_ids = Vec::with_capacity(specs.len());
        for spec in specs {
            for (contour_number, slots) in std::iter::once(&spec.perimeter)
                .chain(spec.holes.iter())
                .enumerate()
            {
                for slot in slots {
                    self.topology.vertex_instance(slot.vertex_instance_id)?;

                    let old_instance_id = {
                        let polygon = self.topology.polygon_mut(spec.polygon_id)?;
                        let contour = if contour_number == 0 {
                            &mut polygon.perimeter
                        } else {
                            &mut polygon.holes[contour_number - 1]
                        };
                        let old = contour.vertex_instances[slot.contour_index];
                        contour.vertex_instances[slot.contour_index] = slot.vertex_instance_id;
                        old
                    };

                    let old_instance = self.topology.vertex_instance_mut(old_instance_id)?;
                    if let Some(position) = old_instance
                        .connected_polygons
                        .iter()
                        .position(|&p| p == spec.polygon_id)
                    {
                        old_instance.connected_polygons.remove(position);
                    }
                    self.topology
                        .vertex_instance_mut(slot.vertex_instance_id)?
                        .connected_polygons
                        .push(spec.polygon_id);
                }
            }
            self.polygons_pending_triangulation.insert(spec.polygon_id);
            self.polygons_pending_tangent_basis.insert(spec.polygon_id);
            polygon_ids.push(spec.polygon_id);
        }

        self.notify_adapters(|adapter, mesh| {
            adapter.on_change_polygon_vertex_instances(mesh, &polygon_ids);
        });

        Ok(())
    }
}
