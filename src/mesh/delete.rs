//! Element deletion operations and the orphan cascade.
//!
//! Orphan candidates are collected at the moment a detachment empties a
//! back-reference list (pre-deletion counts), and the cascade re-enters
//! through the public delete operations so every stage records its own undo.

use crate::change::MeshChange;
use crate::error::{Result, TopologyError};
use crate::mesh::specs::{
    EdgeToCreate, PolygonGroupToCreate, PolygonToCreate, VertexAndAttributes,
    VertexInstanceToCreate, VertexToCreate,
};
use crate::mesh::EditableMesh;
use crate::topology::{
    EdgeId, ElementId, PolygonGroupId, PolygonId, VertexId, VertexInstanceId,
};

impl EditableMesh {
    /// Deletes polygons, optionally cascading to elements they orphan.
    ///
    /// Each polygon is detached from its contour edges (an edge whose
    /// connected-polygon list becomes empty is an orphan candidate), its
    /// now-unused vertex instances, and its group; the flags control which
    /// orphans are deleted along the way.
    ///
    /// # Errors
    ///
    /// Returns an error if no modification session is open or a polygon ID
    /// is not allocated.
    pub fn delete_polygons(
        &mut self,
        polygon_ids: &[PolygonId],
        delete_orphaned_edges: bool,
        delete_orphaned_vertices: bool,
        delete_orphaned_vertex_instances: bool,
        delete_empty_polygon_groups: bool,
    ) -> Result<()> {
        self.require_modifying()?;

        // Back everything up, in the opposite order that we delete
        let mut revert = Vec::with_capacity(polygon_ids.len());
        for &polygon_id in polygon_ids.iter().rev() {
            revert.push(self.backup_polygon(polygon_id)?);
        }
        self.add_undo(MeshChange::CreatePolygons { polygons: revert });

        self.notify_adapters(|adapter, mesh| adapter.on_delete_polygons(mesh, polygon_ids));

        for &polygon_id in polygon_ids {
            self.delete_polygon_internal(
                polygon_id,
                delete_orphaned_edges,
                delete_orphaned_vertices,
                delete_orphaned_vertex_instances,
                delete_empty_polygon_groups,
            )?;
        }
        Ok(())
    }

    fn backup_polygon(&self, polygon_id: PolygonId) -> Result<PolygonToCreate> {
        let polygon = self.topology.polygon(polygon_id)?;
        let backup_contour = |contour: &crate::topology::Contour| -> Result<Vec<VertexAndAttributes>> {
            contour
                .vertex_instances
                .iter()
                .map(|&instance_id| {
                    let instance = self.topology.vertex_instance(instance_id)?;
                    Ok(VertexAndAttributes {
                        vertex_instance_id: instance_id,
                        vertex_id: instance.vertex,
                        attributes: super::attributes::capture_instance_attributes(instance),
                    })
                })
                .collect()
        };

        Ok(PolygonToCreate {
            polygon_group_id: polygon.group,
            perimeter: backup_contour(&polygon.perimeter)?,
            holes: polygon
                .holes
                .iter()
                .map(backup_contour)
                .collect::<Result<Vec<_>>>()?,
            edge_hardness: crate::mesh::specs::PolygonEdgeHardness::NewEdgesSoft,
            original_polygon_id: polygon_id,
        })
    }

    fn delete_polygon_internal(
        &mut self,
        polygon_id: PolygonId,
        delete_orphaned_edges: bool,
        delete_orphaned_vertices: bool,
        delete_orphaned_vertex_instances: bool,
        delete_empty_polygon_groups: bool,
    ) -> Result<()> {
        let group_id = self.topology.polygon(polygon_id)?.group;

        // Detach from every contour edge, remembering the edges we orphan
        let mut orphaned_edges: Vec<EdgeId> = Vec::new();
        let contour_count = 1 + self.topology.polygon(polygon_id)?.holes.len();
        for contour_number in 0..contour_count {
            let contour = self.polygon_contour(polygon_id, contour_number)?;
            for edge_id in self.topology.contour_edges(&contour)? {
                let edge = self.topology.edge_mut(edge_id)?;
                let position = edge
                    .connected_polygons
                    .iter()
                    .position(|&p| p == polygon_id)
                    .ok_or_else(|| {
                        TopologyError::Inconsistent(format!(
                            "edge {edge_id} does not list connected polygon {polygon_id}"
                        ))
                    })?;
                edge.connected_polygons.remove(position);
                if edge.is_orphaned() && !orphaned_edges.contains(&edge_id) {
                    orphaned_edges.push(edge_id);
                }
            }
        }

        // Detach from the contour instances; an instance with no other
        // polygon still using it becomes an orphan
        let mut orphaned_instances: Vec<VertexInstanceId> = Vec::new();
        let contour_instances: Vec<VertexInstanceId> = self
            .topology
            .polygon(polygon_id)?
            .contours()
            .flat_map(|contour| contour.vertex_instances.iter().copied())
            .collect();
        for instance_id in contour_instances {
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
            if instance.connected_polygons.is_empty() && !orphaned_instances.contains(&instance_id)
            {
                orphaned_instances.push(instance_id);
            }
        }

        if delete_orphaned_vertex_instances && !orphaned_instances.is_empty() {
            self.delete_vertex_instances(&orphaned_instances, false)?;
        }

        // Remove from the polygon group and delete the polygon record
        // (the cached triangulation goes with it)
        {
            let group = self.topology.polygon_group_mut(group_id)?;
            let position = group
                .polygons
                .iter()
                .position(|&p| p == polygon_id)
                .ok_or_else(|| {
                    TopologyError::Inconsistent(format!(
                        "group {group_id} does not list polygon {polygon_id}"
                    ))
                })?;
            group.polygons.remove(position);
        }
        self.topology.polygons.remove(polygon_id)?;
        self.polygons_pending_triangulation.remove(&polygon_id);
        self.polygons_pending_tangent_basis.remove(&polygon_id);

        // Deleting the orphaned edges may also delete orphaned vertices
        if delete_orphaned_edges && !orphaned_edges.is_empty() {
            self.delete_edges(&orphaned_edges, delete_orphaned_vertices)?;
        }

        if delete_empty_polygon_groups && self.topology.polygon_group(group_id)?.is_empty() {
            self.delete_polygon_groups(&[group_id])?;
        }

        Ok(())
    }

    /// Deletes edges, disconnecting them from their endpoint vertices first.
    ///
    /// Callers are responsible for the contours running along the edges;
    /// the orphan cascades and the undo replay only ever delete edges whose
    /// polygons are gone or about to be reshaped.
    ///
    /// # Errors
    ///
    /// Returns an error if no modification session is open or an edge ID is
    /// not allocated.
    pub fn delete_edges(
        &mut self,
        edge_ids: &[EdgeId],
        delete_orphaned_vertices: bool,
    ) -> Result<()> {
        self.require_modifying()?;

        // Back everything up, in the opposite order that we delete
        let mut revert = Vec::with_capacity(edge_ids.len());
        for &edge_id in edge_ids.iter().rev() {
            let edge = self.topology.edge(edge_id)?;
            revert.push(EdgeToCreate {
                vertex_id0: edge.vertices[0],
                vertex_id1: edge.vertices[1],
                connected_polygons: edge.connected_polygons.clone(),
                is_hard: edge.is_hard,
                crease_sharpness: edge.crease_sharpness,
                original_edge_id: edge_id,
            });
        }
        self.add_undo(MeshChange::CreateEdges { edges: revert });

        self.notify_adapters(|adapter, mesh| adapter.on_delete_edges(mesh, edge_ids));

        // Keep track of any vertices we orphan, so we can delete them after
        // everything is unhooked
        let mut orphaned_vertices: Vec<VertexId> = Vec::new();
        for &edge_id in edge_ids {
            let endpoint_ids = self.topology.edge(edge_id)?.vertices;
            for vertex_id in endpoint_ids {
                let vertex = self.topology.vertex_mut(vertex_id)?;
                let position = vertex
                    .connected_edges
                    .iter()
                    .position(|&e| e == edge_id)
                    .ok_or_else(|| {
                        TopologyError::Inconsistent(format!(
                            "vertex {vertex_id} does not list connected edge {edge_id}"
                        ))
                    })?;
                vertex.connected_edges.remove(position);
                if vertex.is_orphaned() && !orphaned_vertices.contains(&vertex_id) {
                    orphaned_vertices.push(vertex_id);
                }
            }
            self.topology.edges.remove(edge_id)?;
        }

        if delete_orphaned_vertices && !orphaned_vertices.is_empty() {
            self.delete_orphan_vertices(&orphaned_vertices)?;
        }
        Ok(())
    }

    /// Deletes vertex instances, detaching them from their vertices.
    ///
    /// # Errors
    ///
    /// Returns an error if no modification session is open, an instance ID
    /// is not allocated, or an instance is still referenced by a polygon.
    pub fn delete_vertex_instances(
        &mut self,
        instance_ids: &[VertexInstanceId],
        delete_orphaned_vertices: bool,
    ) -> Result<()> {
        self.require_modifying()?;

        let mut revert = Vec::with_capacity(instance_ids.len());
        for &instance_id in instance_ids.iter().rev() {
            let instance = self.topology.vertex_instance(instance_id)?;
            if !instance.is_orphaned() {
                return Err(TopologyError::VertexInstanceNotOrphaned(instance_id.index()).into());
            }
            revert.push(VertexInstanceToCreate {
                vertex_id: instance.vertex,
                attributes: super::attributes::capture_instance_attributes(instance),
                original_vertex_instance_id: instance_id,
            });
        }
        self.add_undo(MeshChange::CreateVertexInstances { instances: revert });

        self.notify_adapters(|adapter, mesh| {
            adapter.on_delete_vertex_instances(mesh, instance_ids);
        });

        let mut orphaned_vertices: Vec<VertexId> = Vec::new();
        for &instance_id in instance_ids {
            let vertex_id = self.topology.vertex_instance(instance_id)?.vertex;
            {
                let vertex = self.topology.vertex_mut(vertex_id)?;
                let position = vertex
                    .vertex_instances
                    .iter()
                    .position(|&i| i == instance_id)
                    .ok_or_else(|| {
                        TopologyError::Inconsistent(format!(
                            "vertex {vertex_id} does not list instance {instance_id}"
                        ))
                    })?;
                vertex.vertex_instances.remove(position);
                if vertex.is_orphaned() && !orphaned_vertices.contains(&vertex_id) {
                    orphaned_vertices.push(vertex_id);
                }
            }
            self.topology.vertex_instances.remove(instance_id)?;
        }

        if delete_orphaned_vertices && !orphaned_vertices.is_empty() {
            self.delete_orphan_vertices(&orphaned_vertices)?;
        }
        Ok(())
    }

    /// Deletes vertices that nothing references any more.
    ///
    /// # Errors
    ///
    /// Returns an error if no modification session is open, a vertex ID is
    /// not allocated, or a vertex still has connected edges or instances.
    pub fn delete_orphan_vertices(&mut self, vertex_ids: &[VertexId]) -> Result<()> {
        self.require_modifying()?;

        // The vertices must truly be orphans: their polygon attributes are
        // gone with the instances and cannot be restored otherwise
        let mut revert = Vec::with_capacity(vertex_ids.len());
        for &vertex_id in vertex_ids.iter().rev() {
            let vertex = self.topology.vertex(vertex_id)?;
            if !vertex.is_orphaned() {
                return Err(TopologyError::VertexNotOrphaned(vertex_id.index()).into());
            }
            revert.push(VertexToCreate {
                position: vertex.position,
                corner_sharpness: vertex.corner_sharpness,
                original_vertex_id: vertex_id,
            });
        }

        self.notify_adapters(|adapter, mesh| adapter.on_delete_orphan_vertices(mesh, vertex_ids));

        for &vertex_id in vertex_ids {
            self.topology.vertices.remove(vertex_id)?;
        }

        self.add_undo(MeshChange::CreateVertices { vertices: revert });
        Ok(())
    }

    /// Deletes polygon groups. A group must be empty to be deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if no modification session is open, a group ID is
    /// not allocated, or a group still contains polygons.
    pub fn delete_polygon_groups(&mut self, group_ids: &[PolygonGroupId]) -> Result<()> {
        self.require_modifying()?;

        let mut revert = Vec::with_capacity(group_ids.len());
        for &group_id in group_ids.iter().rev() {
            let group = self.topology.polygon_group(group_id)?;
            if !group.is_empty() {
                return Err(TopologyError::PolygonGroupNotEmpty(group_id.index()).into());
            }
            revert.push(PolygonGroupToCreate {
                material_asset: group.material_asset.clone(),
                casts_shadow: group.casts_shadow,
                collision_enabled: group.collision_enabled,
                original_polygon_group_id: group_id,
            });
        }
        self.add_undo(MeshChange::CreatePolygonGroups { groups: revert });

        self.notify_adapters(|adapter, mesh| adapter.on_delete_polygon_groups(mesh, group_ids));

        for &group_id in group_ids {
            self.topology.polygon_groups.remove(group_id)?;
        }
        Ok(())
    }
}
