//! Reversible change records for undo/redo.
//!
//! Every mutating kernel operation records a change carrying exactly the
//! inputs required to invert that call. Executing a change applies the
//! stored inverse through the ordinary kernel operation — which records its
//! own inverse — and returns that re-inversion. Undo and redo are therefore
//! the same mechanism applied alternately.

use crate::error::Result;
use crate::mesh::compact::ElementIdRemappings;
use crate::mesh::specs::{
    AttributesForEdge, AttributesForPolygonGroup, AttributesForVertex, AttributesForVertexInstance,
    ChangeVertexInstancesForPolygon, EdgeToCreate, PolygonGroupForPolygon, PolygonGroupToCreate,
    PolygonToCreate, VertexAndAttributes, VertexInstanceToCreate, VertexToCreate, VerticesForEdge,
};
use crate::mesh::{EditableMesh, ModificationType, TopologyChange};
use crate::topology::{EdgeId, PolygonGroupId, PolygonId, VertexId, VertexInstanceId};

/// A self-contained, executable inverse operation.
#[derive(Debug)]
pub enum MeshChange {
    /// An ordered batch of changes executed in reverse order, so a
    /// session's edits are undone last-first.
    Compound(Vec<MeshChange>),

    /// Restores the session bracketing itself, so undoing into the middle
    /// of a modification session reopens it.
    StartOrEndModification {
        start: bool,
        modification: ModificationType,
        topology_change: TopologyChange,
    },

    CreateVertices {
        vertices: Vec<VertexToCreate>,
    },
    DeleteOrphanVertices {
        vertex_ids: Vec<VertexId>,
    },
    CreateVertexInstances {
        instances: Vec<VertexInstanceToCreate>,
    },
    DeleteVertexInstances {
        instance_ids: Vec<VertexInstanceId>,
        delete_orphaned_vertices: bool,
    },
    CreateEdges {
        edges: Vec<EdgeToCreate>,
    },
    DeleteEdges {
        edge_ids: Vec<EdgeId>,
        delete_orphaned_vertices: bool,
    },
    CreatePolygons {
        polygons: Vec<PolygonToCreate>,
    },
    DeletePolygons {
        polygon_ids: Vec<PolygonId>,
        delete_orphaned_edges: bool,
        delete_orphaned_vertices: bool,
        delete_orphaned_vertex_instances: bool,
        delete_empty_polygon_groups: bool,
    },
    CreatePolygonGroups {
        groups: Vec<PolygonGroupToCreate>,
    },
    DeletePolygonGroups {
        group_ids: Vec<PolygonGroupId>,
    },

    SetVerticesAttributes {
        attributes: Vec<AttributesForVertex>,
    },
    SetVertexInstancesAttributes {
        attributes: Vec<AttributesForVertexInstance>,
    },
    SetEdgesAttributes {
        attributes: Vec<AttributesForEdge>,
    },
    SetPolygonGroupsAttributes {
        attributes: Vec<AttributesForPolygonGroup>,
    },

    SetEdgesVertices {
        vertices_for_edges: Vec<VerticesForEdge>,
    },
    InsertPolygonPerimeterVertices {
        polygon_id: PolygonId,
        insert_before_vertex_number: usize,
        corners: Vec<VertexAndAttributes>,
    },
    RemovePolygonPerimeterVertices {
        polygon_id: PolygonId,
        first_vertex_number: usize,
        count: usize,
        delete_orphaned_vertex_instances: bool,
    },
    ChangePolygonsVertexInstances {
        changes: Vec<ChangeVertexInstancesForPolygon>,
    },
    AssignPolygonsToPolygonGroups {
        assignments: Vec<PolygonGroupForPolygon>,
        delete_orphaned_polygon_groups: bool,
    },

    SetSubdivisionCount {
        count: u32,
    },
    SetTextureCoordinateCount {
        count: usize,
    },

    /// Re-runs compaction; the inverse of Uncompact.
    Compact,
    /// Restores pre-compaction IDs through the stored inverse tables.
    Uncompact {
        remappings: ElementIdRemappings,
    },
}

impl MeshChange {
    /// A short name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Compound(_) => "Compound",
            Self::StartOrEndModification { .. } => "StartOrEndModification",
            Self::CreateVertices { .. } => "CreateVertices",
            Self::DeleteOrphanVertices { .. } => "DeleteOrphanVertices",
            Self::CreateVertexInstances { .. } => "CreateVertexInstances",
            Self::DeleteVertexInstances { .. } => "DeleteVertexInstances",
            Self::CreateEdges { .. } => "CreateEdges",
            Self::DeleteEdges { .. } => "DeleteEdges",
            Self::CreatePolygons { .. } => "CreatePolygons",
            Self::DeletePolygons { .. } => "DeletePolygons",
            Self::CreatePolygonGroups { .. } => "CreatePolygonGroups",
            Self::DeletePolygonGroups { .. } => "DeletePolygonGroups",
            Self::SetVerticesAttributes { .. } => "SetVerticesAttributes",
            Self::SetVertexInstancesAttributes { .. } => "SetVertexInstancesAttributes",
            Self::SetEdgesAttributes { .. } => "SetEdgesAttributes",
            Self::SetPolygonGroupsAttributes { .. } => "SetPolygonGroupsAttributes",
            Self::SetEdgesVertices { .. } => "SetEdgesVertices",
            Self::InsertPolygonPerimeterVertices { .. } => "InsertPolygonPerimeterVertices",
            Self::RemovePolygonPerimeterVertices { .. } => "RemovePolygonPerimeterVertices",
            Self::ChangePolygonsVertexInstances { .. } => "ChangePolygonsVertexInstances",
            Self::AssignPolygonsToPolygonGroups { .. } => "AssignPolygonsToPolygonGroups",
            Self::SetSubdivisionCount { .. } => "SetSubdivisionCount",
            Self::SetTextureCoordinateCount { .. } => "SetTextureCoordinateCount",
            Self::Compact => "Compact",
            Self::Uncompact { .. } => "Uncompact",
        }
    }

    /// Applies this change to the mesh and returns the change that
    /// re-inverts it.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying kernel operation fails; the mesh
    /// must then be considered corrupt (a change that no longer matches the
    /// mesh state means the undo history diverged from the mesh).
    pub fn execute(self, mesh: &mut EditableMesh) -> Result<MeshChange> {
        tracing::trace!(change = self.name(), "executing change");
        match self {
            Self::Compound(changes) => {
                // Undo the last-performed edit first; collect the
                // re-inversions forward so the next execution reverses
                // them again
                let mut inverted = Vec::with_capacity(changes.len());
                for change in changes.into_iter().rev() {
                    inverted.push(change.execute(mesh)?);
                }
                return Ok(Self::Compound(inverted));
            }

            Self::StartOrEndModification {
                start,
                modification,
                topology_change,
            } => {
                if start {
                    mesh.start_modification(modification, topology_change)?;
                } else {
                    mesh.end_modification(true)?;
                }
            }

            Self::CreateVertices { vertices } => {
                mesh.create_vertices(&vertices)?;
            }
            Self::DeleteOrphanVertices { vertex_ids } => {
                mesh.delete_orphan_vertices(&vertex_ids)?;
            }
            Self::CreateVertexInstances { instances } => {
                mesh.create_vertex_instances(&instances)?;
            }
            Self::DeleteVertexInstances {
                instance_ids,
                delete_orphaned_vertices,
            } => {
                mesh.delete_vertex_instances(&instance_ids, delete_orphaned_vertices)?;
            }
            Self::CreateEdges { edges } => {
                mesh.create_edges(&edges)?;
            }
            Self::DeleteEdges {
                edge_ids,
                delete_orphaned_vertices,
            } => {
                mesh.delete_edges(&edge_ids, delete_orphaned_vertices)?;
            }
            Self::CreatePolygons { polygons } => {
                mesh.create_polygons(&polygons)?;
            }
            Self::DeletePolygons {
                polygon_ids,
                delete_orphaned_edges,
                delete_orphaned_vertices,
                delete_orphaned_vertex_instances,
                delete_empty_polygon_groups,
            } => {
                mesh.delete_polygons(
                    &polygon_ids,
                    delete_orphaned_edges,
                    delete_orphaned_vertices,
                    delete_orphaned_vertex_instances,
                    delete_empty_polygon_groups,
                )?;
            }
            Self::CreatePolygonGroups { groups } => {
                mesh.create_polygon_groups(&groups)?;
            }
            Self::DeletePolygonGroups { group_ids } => {
                mesh.delete_polygon_groups(&group_ids)?;
            }

            Self::SetVerticesAttributes { attributes } => {
                mesh.set_vertices_attributes(&attributes)?;
            }
            Self::SetVertexInstancesAttributes { attributes } => {
                mesh.set_vertex_instances_attributes(&attributes)?;
            }
            Self::SetEdgesAttributes { attributes } => {
                mesh.set_edges_attributes(&attributes)?;
            }
            Self::SetPolygonGroupsAttributes { attributes } => {
                mesh.set_polygon_groups_attributes(&attributes)?;
            }

            Self::SetEdgesVertices { vertices_for_edges } => {
                mesh.set_edges_vertices(&vertices_for_edges)?;
            }
            Self::InsertPolygonPerimeterVertices {
                polygon_id,
                insert_before_vertex_number,
                corners,
            } => {
                mesh.insert_polygon_perimeter_vertices(
                    polygon_id,
                    insert_before_vertex_number,
                    &corners,
                )?;
            }
            Self::RemovePolygonPerimeterVertices {
                polygon_id,
                first_vertex_number,
                count,
                delete_orphaned_vertex_instances,
            } => {
                mesh.remove_polygon_perimeter_vertices(
                    polygon_id,
                    first_vertex_number,
                    count,
                    delete_orphaned_vertex_instances,
                )?;
            }
            Self::ChangePolygonsVertexInstances { changes } => {
                mesh.change_polygons_vertex_instances(&changes)?;
            }
            Self::AssignPolygonsToPolygonGroups {
                assignments,
                delete_orphaned_polygon_groups,
            } => {
                mesh.assign_polygons_to_polygon_groups(
                    &assignments,
                    delete_orphaned_polygon_groups,
                )?;
            }

            Self::SetSubdivisionCount { count } => {
                mesh.set_subdivision_count(count)?;
            }
            Self::SetTextureCoordinateCount { count } => {
                mesh.set_texture_coordinate_count(count)?;
            }

            Self::Compact => {
                mesh.compact()?;
            }
            Self::Uncompact { remappings } => {
                mesh.uncompact(&remappings)?;
            }
        }

        // The operation recorded its own inverse; that is our return value
        Ok(mesh
            .make_undo()
            .unwrap_or_else(|| MeshChange::Compound(Vec::new())))
    }
}
