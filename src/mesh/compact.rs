//! Compaction and its inverse.
//!
//! Compacting reclaims the holes deletions leave in the sparse stores,
//! renumbering live elements densely. Every cross-referencing field is
//! rewritten through the remap tables, and the inverse tables are recorded
//! as an Uncompact change so the operation is itself undoable. The tables
//! must be total over live IDs: a missing entry means a store fell out of
//! sync with the others, which has no recovery path.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::change::MeshChange;
use crate::error::Result;
use crate::mesh::EditableMesh;
use crate::store::Remap;
use crate::topology::{EdgeId, PolygonGroupId, PolygonId, VertexId, VertexInstanceId};

/// The remap tables of one compaction (or its inverse), one per store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementIdRemappings {
    pub vertices: Remap<VertexId>,
    pub vertex_instances: Remap<VertexInstanceId>,
    pub edges: Remap<EdgeId>,
    pub polygons: Remap<PolygonId>,
    pub polygon_groups: Remap<PolygonGroupId>,
}

impl ElementIdRemappings {
    /// Builds the inverse tables (new → old).
    #[must_use]
    pub fn invert(&self) -> Self {
        Self {
            vertices: self.vertices.invert(),
            vertex_instances: self.vertex_instances.invert(),
            edges: self.edges.invert(),
            polygons: self.polygons.invert(),
            polygon_groups: self.polygon_groups.invert(),
        }
    }
}

impl EditableMesh {
    /// Compacts the element stores to remove gaps and fixes up every
    /// referenced ID. Records an Uncompact change carrying the inverse
    /// remappings.
    ///
    /// # Errors
    ///
    /// Returns an error if no modification session is open or a
    /// cross-reference falls outside the remap tables.
    pub fn compact(&mut self) -> Result<()> {
        self.require_modifying()?;
        debug!(
            vertices = self.topology.vertices.len(),
            edges = self.topology.edges.len(),
            polygons = self.topology.polygons.len(),
            "compacting element stores"
        );

        let remappings = ElementIdRemappings {
            vertices: self.topology.vertices.compact(),
            vertex_instances: self.topology.vertex_instances.compact(),
            edges: self.topology.edges.compact(),
            polygons: self.topology.polygons.compact(),
            polygon_groups: self.topology.polygon_groups.compact(),
        };

        self.fix_up_element_ids(&remappings)?;

        self.notify_adapters(|adapter, mesh| {
            adapter.on_reindex_elements(mesh, &remappings);
            adapter.on_rebuild_render_mesh(mesh);
        });

        // The reversal is recorded directly: compaction is not expressible
        // as a sequence of ordinary mutating calls
        self.add_undo(MeshChange::Uncompact {
            remappings: remappings.invert(),
        });
        Ok(())
    }

    /// Scatters the element stores back to the IDs named by `remappings`,
    /// undoing a [`compact`](Self::compact). Records a Compact change.
    ///
    /// # Errors
    ///
    /// Returns an error if no modification session is open or the tables
    /// are not total over the live elements.
    pub fn uncompact(&mut self, remappings: &ElementIdRemappings) -> Result<()> {
        self.require_modifying()?;
        debug!("restoring element stores from remap tables");

        self.topology.vertices.uncompact(&remappings.vertices)?;
        self.topology
            .vertex_instances
            .uncompact(&remappings.vertex_instances)?;
        self.topology.edges.uncompact(&remappings.edges)?;
        self.topology.polygons.uncompact(&remappings.polygons)?;
        self.topology
            .polygon_groups
            .uncompact(&remappings.polygon_groups)?;

        self.fix_up_element_ids(remappings)?;

        self.notify_adapters(|adapter, mesh| {
            adapter.on_reindex_elements(mesh, remappings);
            adapter.on_rebuild_render_mesh(mesh);
        });

        self.add_undo(MeshChange::Compact);
        Ok(())
    }

    /// Rewrites every cross-referencing field through the remap tables.
    fn fix_up_element_ids(&mut self, remappings: &ElementIdRemappings) -> Result<()> {
        for (_, vertex) in self.topology.vertices.iter_mut() {
            for edge_id in &mut vertex.connected_edges {
                *edge_id = remappings.edges.get(*edge_id)?;
            }
            for instance_id in &mut vertex.vertex_instances {
                *instance_id = remappings.vertex_instances.get(*instance_id)?;
            }
        }

        for (_, instance) in self.topology.vertex_instances.iter_mut() {
            instance.vertex = remappings.vertices.get(instance.vertex)?;
            for polygon_id in &mut instance.connected_polygons {
                *polygon_id = remappings.polygons.get(*polygon_id)?;
            }
        }

        for (_, edge) in self.topology.edges.iter_mut() {
            for vertex_id in &mut edge.vertices {
                *vertex_id = remappings.vertices.get(*vertex_id)?;
            }
            for polygon_id in &mut edge.connected_polygons {
                *polygon_id = remappings.polygons.get(*polygon_id)?;
            }
        }

        for (_, polygon) in self.topology.polygons.iter_mut() {
            polygon.group = remappings.polygon_groups.get(polygon.group)?;
            for contour in std::iter::once(&mut polygon.perimeter).chain(polygon.holes.iter_mut())
            {
                for instance_id in &mut contour.vertex_instances {
                    *instance_id = remappings.vertex_instances.get(*instance_id)?;
                }
            }
            for triangle in &mut polygon.triangles {
                for instance_id in &mut triangle.vertex_instances {
                    *instance_id = remappings.vertex_instances.get(*instance_id)?;
                }
            }
        }

        for (_, group) in self.topology.polygon_groups.iter_mut() {
            for polygon_id in &mut group.polygons {
                *polygon_id = remappings.polygons.get(*polygon_id)?;
            }
        }

        // The pending work sets reference polygons too
        let pending_triangulation = std::mem::take(&mut self.polygons_pending_triangulation);
        for polygon_id in pending_triangulation {
            self.polygons_pending_triangulation
                .insert(remappings.polygons.get(polygon_id)?);
        }
        let pending_tangents = std::mem::take(&mut self.polygons_pending_tangent_basis);
        for polygon_id in pending_tangents {
            self.polygons_pending_tangent_basis
                .insert(remappings.polygons.get(polygon_id)?);
        }

        Ok(())
    }
}
