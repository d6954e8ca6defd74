//! The editable mesh kernel.
//!
//! [`EditableMesh`] owns the topology graph, the attached adapters, the
//! undo record and the modification-session state machine. The low-level
//! operations are split across the submodules by concern; each one mutates
//! the graph, pushes a [`MeshChange`](crate::change::MeshChange) recording
//! how to undo it, and notifies every attached adapter.

pub mod attributes;
pub mod compact;
pub mod contours;
pub mod create;
pub mod delete;
pub mod groups;
pub mod normals;
pub mod queries;
pub mod specs;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::adapter::MeshAdapter;
use crate::change::MeshChange;
use crate::error::{ChangeError, Result};
use crate::subdivision::{LimitSurfaceGenerator, SubdivisionLimitData};
use crate::topology::{MeshTopology, PolygonId};

/// What kind of modification a session performs.
///
/// Interim sessions let adapters do cheap partial rebuilds while the user is
/// mid-interaction; a Final session finalizes everything (bounds, collision,
/// lighting equivalents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModificationType {
    /// The first interim change since the last final one.
    FirstInterim,
    /// Mid-interaction; more changes to come.
    Interim,
    /// The interaction is over; finalize everything.
    Final,
}

/// Whether a session may change mesh topology or only attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TopologyChange {
    NoTopologyChange,
    TopologyChange,
}

/// Data is compacted after this many topology-modifying final sessions.
pub const COMPACT_FREQUENCY: u32 = 50;

/// An editable polygonal mesh with transactional undo.
pub struct EditableMesh {
    pub(crate) topology: MeshTopology,
    adapters: Vec<Box<dyn MeshAdapter>>,

    /// The number of UV channels stored on vertex instances.
    texture_coordinate_count: usize,

    /// Subdivision levels; zero disables subdivision preview.
    subdivision_count: u32,
    limit_surface_generator: Option<Box<dyn LimitSurfaceGenerator>>,
    subdivision_limit_data: SubdivisionLimitData,

    /// Undo records accumulated since the last `make_undo`.
    pending_changes: Vec<MeshChange>,
    allow_undo: bool,
    allow_compact: bool,

    is_being_modified: bool,
    current_modification_type: ModificationType,
    current_topology_change: TopologyChange,
    pending_compact_counter: u32,

    /// Polygons whose cached triangulation must be recomputed at session end.
    pub(crate) polygons_pending_triangulation: BTreeSet<PolygonId>,
    /// Polygons whose instances need a new tangent basis at session end.
    pub(crate) polygons_pending_tangent_basis: BTreeSet<PolygonId>,
}

impl Default for EditableMesh {
    fn default() -> Self {
        Self::new()
    }
}

impl EditableMesh {
    /// Creates a new, empty mesh with one UV channel.
    #[must_use]
    pub fn new() -> Self {
        Self::with_topology(MeshTopology::new())
    }

    /// Creates a mesh around an existing topology (e.g. one deserialized
    /// from storage or built by an adapter from a source asset).
    #[must_use]
    pub fn with_topology(topology: MeshTopology) -> Self {
        Self {
            topology,
            adapters: Vec::new(),
            texture_coordinate_count: 1,
            subdivision_count: 0,
            limit_surface_generator: None,
            subdivision_limit_data: SubdivisionLimitData::default(),
            pending_changes: Vec::new(),
            allow_undo: true,
            allow_compact: true,
            is_being_modified: false,
            current_modification_type: ModificationType::Final,
            current_topology_change: TopologyChange::TopologyChange,
            pending_compact_counter: 0,
            polygons_pending_triangulation: BTreeSet::new(),
            polygons_pending_tangent_basis: BTreeSet::new(),
        }
    }

    /// The topology graph.
    #[must_use]
    pub fn topology(&self) -> &MeshTopology {
        &self.topology
    }

    /// Attaches an adapter. Adapters are notified in attachment order.
    pub fn add_adapter(&mut self, adapter: Box<dyn MeshAdapter>) {
        self.adapters.push(adapter);
    }

    /// Installs the external subdivision limit-surface collaborator.
    pub fn set_limit_surface_generator(&mut self, generator: Box<dyn LimitSurfaceGenerator>) {
        self.limit_surface_generator = Some(generator);
    }

    /// The most recently generated subdivision limit surface.
    #[must_use]
    pub fn subdivision_limit_data(&self) -> &SubdivisionLimitData {
        &self.subdivision_limit_data
    }

    #[must_use]
    pub fn subdivision_count(&self) -> u32 {
        self.subdivision_count
    }

    #[must_use]
    pub fn is_previewing_subdivisions(&self) -> bool {
        self.subdivision_count > 0
    }

    #[must_use]
    pub fn texture_coordinate_count(&self) -> usize {
        self.texture_coordinate_count
    }

    /// Returns `true` if a modification session is open.
    #[must_use]
    pub fn is_being_modified(&self) -> bool {
        self.is_being_modified
    }

    /// Returns `true` if undo tracking is enabled.
    #[must_use]
    pub fn is_undo_allowed(&self) -> bool {
        self.allow_undo
    }

    /// Enables or disables undo tracking. [`EditableMesh::make_undo`] only
    /// returns a change while this is enabled.
    pub fn set_allow_undo(&mut self, allow_undo: bool) {
        self.allow_undo = allow_undo;
    }

    /// Returns `true` if sporadic compaction is enabled.
    #[must_use]
    pub fn is_compact_allowed(&self) -> bool {
        self.allow_compact
    }

    /// Enables or disables sporadic compaction at session end.
    pub fn set_allow_compact(&mut self, allow_compact: bool) {
        self.allow_compact = allow_compact;
    }

    /// Returns `true` if there are recorded changes waiting to be collected.
    #[must_use]
    pub fn any_changes_to_undo(&self) -> bool {
        !self.pending_changes.is_empty()
    }

    /// Takes ownership of the accumulated undo records, wrapped in a single
    /// compound change that reverts everything since the last call.
    ///
    /// Returns `None` if undo is disabled or nothing was recorded.
    pub fn make_undo(&mut self) -> Option<MeshChange> {
        if !self.allow_undo || self.pending_changes.is_empty() {
            self.pending_changes.clear();
            return None;
        }
        let changes = std::mem::take(&mut self.pending_changes);
        debug!(sub_changes = changes.len(), "captured undo record");
        Some(MeshChange::Compound(changes))
    }

    /// Records an undo step for a mutation that just happened. No-op while
    /// undo is disabled.
    pub(crate) fn add_undo(&mut self, change: MeshChange) {
        if self.allow_undo {
            self.pending_changes.push(change);
        }
    }

    /// Runs `f` for every attached adapter, in attachment order.
    ///
    /// The adapter list is detached while iterating so hooks can borrow the
    /// mesh; a hook attaching adapters from inside a notification would see
    /// them dropped, which is one more reason hooks must not re-enter.
    pub(crate) fn notify_adapters(&mut self, mut f: impl FnMut(&mut dyn MeshAdapter, &Self)) {
        let mut adapters = std::mem::take(&mut self.adapters);
        for adapter in &mut adapters {
            f(adapter.as_mut(), self);
        }
        self.adapters = adapters;
    }

    /// Errors unless a modification session is open.
    pub(crate) fn require_modifying(&self) -> Result<()> {
        if self.is_being_modified {
            Ok(())
        } else {
            Err(ChangeError::NotModifying.into())
        }
    }

    /// Opens a modification session.
    ///
    /// # Errors
    ///
    /// Returns [`ChangeError::AlreadyModifying`] if a session is already
    /// open; sessions never nest.
    pub fn start_modification(
        &mut self,
        modification: ModificationType,
        topology_change: TopologyChange,
    ) -> Result<()> {
        if self.is_being_modified {
            return Err(ChangeError::AlreadyModifying.into());
        }
        debug!(?modification, ?topology_change, "start modification");

        self.add_undo(MeshChange::StartOrEndModification {
            start: false,
            modification,
            topology_change,
        });

        self.is_being_modified = true;
        self.current_modification_type = modification;
        self.current_topology_change = topology_change;

        let invalidate_lighting = matches!(
            modification,
            ModificationType::FirstInterim | ModificationType::Final
        );
        self.notify_adapters(|adapter, mesh| {
            adapter.on_start_modification(mesh, modification, topology_change);
            adapter.on_rebuild_render_mesh_start(mesh, invalidate_lighting);
        });

        Ok(())
    }

    /// Closes the current modification session.
    ///
    /// Regenerates pending derived state (triangulations, tangent bases),
    /// refreshes the subdivision limit surface, runs the sporadic-compaction
    /// counter (never during undo/redo replay) and notifies adapters.
    ///
    /// # Errors
    ///
    /// Returns [`ChangeError::NotModifying`] if no session is open.
    pub fn end_modification(&mut self, from_undo: bool) -> Result<()> {
        if !self.is_being_modified {
            return Err(ChangeError::NotModifying.into());
        }
        let modification = self.current_modification_type;
        let topology_change = self.current_topology_change;
        debug!(?modification, from_undo, "end modification");

        let is_final = modification == ModificationType::Final;

        // Derived state first, so adapters see the finished mesh
        let pending_triangulation: Vec<PolygonId> =
            std::mem::take(&mut self.polygons_pending_triangulation)
                .into_iter()
                .collect();
        if !pending_triangulation.is_empty() {
            self.retriangulate_polygons(&pending_triangulation)?;
        }

        let pending_tangents: Vec<PolygonId> =
            std::mem::take(&mut self.polygons_pending_tangent_basis)
                .into_iter()
                .collect();
        if (is_final || !from_undo) && !pending_tangents.is_empty() {
            self.generate_tangents_and_normals(&pending_tangents)?;
        }

        if (is_final || !from_undo) && self.subdivision_count > 0 {
            self.refresh_limit_surface(topology_change);
        }

        // Every so often, compact the data. Only when actions are performed,
        // not when they are being undone or redone.
        if self.allow_compact
            && is_final
            && topology_change == TopologyChange::TopologyChange
            && !from_undo
        {
            self.pending_compact_counter += 1;
            if self.pending_compact_counter == COMPACT_FREQUENCY {
                self.pending_compact_counter = 0;
                self.compact()?;
            }
        }

        self.notify_adapters(|adapter, mesh| {
            adapter.on_rebuild_render_mesh_finish(mesh, is_final);
            adapter.on_end_modification(mesh);
        });

        self.add_undo(MeshChange::StartOrEndModification {
            start: true,
            modification,
            topology_change,
        });

        self.is_being_modified = false;
        Ok(())
    }

    fn refresh_limit_surface(&mut self, topology_change: TopologyChange) {
        if let Some(mut generator) = self.limit_surface_generator.take() {
            self.subdivision_limit_data = match topology_change {
                TopologyChange::TopologyChange => generator.refresh_topology(self),
                TopologyChange::NoTopologyChange => generator.refresh_geometry(self),
            };
            self.limit_surface_generator = Some(generator);
        }
    }

    /// Sets the subdivision level. Zero disables subdivision preview.
    ///
    /// The limit surface itself is regenerated on the next final
    /// end-of-modification.
    ///
    /// # Errors
    ///
    /// Returns an error if no modification session is open.
    pub fn set_subdivision_count(&mut self, count: u32) -> Result<()> {
        self.require_modifying()?;
        let previous = self.subdivision_count;
        self.subdivision_count = count;
        if previous > 0 && count == 0 {
            self.subdivision_limit_data = SubdivisionLimitData::default();
            self.notify_adapters(|adapter, mesh| adapter.on_rebuild_render_mesh(mesh));
        }
        self.add_undo(MeshChange::SetSubdivisionCount { count: previous });
        Ok(())
    }

    /// Sets the number of UV channels stored on vertex instances.
    ///
    /// Existing instances are resized; channels beyond the new count are
    /// discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if no modification session is open.
    pub fn set_texture_coordinate_count(&mut self, count: usize) -> Result<()> {
        self.require_modifying()?;
        let previous = self.texture_coordinate_count;
        self.texture_coordinate_count = count;
        for (_, instance) in self.topology.vertex_instances.iter_mut() {
            instance.uvs.resize(count, crate::math::Vector2::zeros());
        }
        self.add_undo(MeshChange::SetTextureCoordinateCount { count: previous });
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::adapter::{AdapterEvent, RecordingAdapter};
    use crate::math::Point3;
    use crate::mesh::specs::{
        PolygonGroupForPolygon, PolygonGroupToCreate, PolygonToCreate, VertexAndAttributes,
        VertexToCreate, VertexToMove,
    };
    use crate::topology::{ElementId, PolygonGroupId, PolygonId, VertexId};

    fn square_corners() -> Vec<Point3> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    /// One polygon group, four vertices, one quad polygon.
    fn quad_mesh() -> (EditableMesh, PolygonGroupId, Vec<VertexId>, PolygonId) {
        let mut mesh = EditableMesh::new();
        mesh.start_modification(ModificationType::Final, TopologyChange::TopologyChange)
            .unwrap();

        let group = mesh
            .create_polygon_groups(&[PolygonGroupToCreate::with_material("M_Default")])
            .unwrap()[0];
        let specs: Vec<VertexToCreate> = square_corners()
            .into_iter()
            .map(VertexToCreate::at_position)
            .collect();
        let vertices = mesh.create_vertices(&specs).unwrap();
        let corners: Vec<VertexAndAttributes> = vertices
            .iter()
            .map(|&v| VertexAndAttributes::new_instance_of(v))
            .collect();
        let (polygons, new_edges) = mesh
            .create_polygons(&[PolygonToCreate::in_group(group, corners)])
            .unwrap();
        assert_eq!(new_edges.len(), 4);

        mesh.end_modification(false).unwrap();
        (mesh, group, vertices, polygons[0])
    }

    #[test]
    fn quad_creation_matches_expected_counts() {
        let (mesh, _, _, polygon) = quad_mesh();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.vertex_instance_count(), 4);
        assert_eq!(mesh.edge_count(), 4);
        assert_eq!(mesh.polygon_count(), 1);
        assert_eq!(mesh.polygon_group_count(), 1);
        assert_eq!(mesh.topology().polygon(polygon).unwrap().triangles.len(), 2);
        mesh.topology().validate().unwrap();
    }

    #[test]
    fn adjacency_is_symmetric_after_edits() {
        let (mut mesh, group, vertices, _) = quad_mesh();

        mesh.start_modification(ModificationType::Final, TopologyChange::TopologyChange)
            .unwrap();
        let v4 = mesh
            .create_vertices(&[VertexToCreate::at_position(Point3::new(2.0, 0.0, 0.0))])
            .unwrap()[0];
        mesh.create_polygons(&[PolygonToCreate::in_group(
            group,
            vec![
                VertexAndAttributes::new_instance_of(vertices[1]),
                VertexAndAttributes::new_instance_of(v4),
                VertexAndAttributes::new_instance_of(vertices[2]),
            ],
        )])
        .unwrap();
        mesh.end_modification(false).unwrap();

        // Shared edge now borders two polygons
        let shared = mesh
            .edge_that_connects_vertices(vertices[1], vertices[2])
            .unwrap();
        assert_eq!(mesh.edge_connected_polygons(shared).unwrap().len(), 2);
        mesh.topology().validate().unwrap();
    }

    #[test]
    fn nested_start_modification_is_rejected() {
        let mut mesh = EditableMesh::new();
        mesh.start_modification(ModificationType::Final, TopologyChange::TopologyChange)
            .unwrap();
        assert!(mesh
            .start_modification(ModificationType::Final, TopologyChange::TopologyChange)
            .is_err());
    }

    #[test]
    fn mutating_outside_a_session_is_rejected() {
        let mut mesh = EditableMesh::new();
        assert!(mesh.create_empty_vertex_range(1).is_err());
    }

    #[test]
    fn id_stability_under_non_compacting_edits() {
        let (mut mesh, _, vertices, _) = quad_mesh();
        mesh.set_allow_compact(false);

        mesh.start_modification(ModificationType::Final, TopologyChange::TopologyChange)
            .unwrap();
        let loose = mesh.create_empty_vertex_range(3).unwrap();
        mesh.delete_orphan_vertices(&[loose[1]]).unwrap();
        mesh.end_modification(false).unwrap();

        // Deleting one vertex moved nobody else
        for &v in vertices.iter().chain([loose[0], loose[2]].iter()) {
            assert!(mesh.is_valid_vertex(v));
        }
        assert!(!mesh.is_valid_vertex(loose[1]));

        // The freed slot is reused only on explicit creation
        mesh.start_modification(ModificationType::Final, TopologyChange::TopologyChange)
            .unwrap();
        let reused = mesh.create_empty_vertex_range(1).unwrap();
        mesh.end_modification(false).unwrap();
        assert_eq!(reused[0], loose[1]);
    }

    #[test]
    fn orphan_cascade_deletes_everything() {
        let (mut mesh, _, _, polygon) = quad_mesh();

        mesh.start_modification(ModificationType::Final, TopologyChange::TopologyChange)
            .unwrap();
        mesh.delete_polygons(&[polygon], true, true, true, true).unwrap();
        mesh.end_modification(false).unwrap();

        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.vertex_instance_count(), 0);
        assert_eq!(mesh.edge_count(), 0);
        assert_eq!(mesh.polygon_count(), 0);
        assert_eq!(mesh.polygon_group_count(), 0);
    }

    #[test]
    fn undo_and_redo_round_trip() {
        let mut mesh = EditableMesh::new();
        mesh.start_modification(ModificationType::Final, TopologyChange::TopologyChange)
            .unwrap();
        let group = mesh
            .create_polygon_groups(&[PolygonGroupToCreate::with_material("M_Default")])
            .unwrap()[0];
        let specs: Vec<VertexToCreate> = square_corners()
            .into_iter()
            .map(VertexToCreate::at_position)
            .collect();
        let vertices = mesh.create_vertices(&specs).unwrap();
        let corners: Vec<VertexAndAttributes> = vertices
            .iter()
            .map(|&v| VertexAndAttributes::new_instance_of(v))
            .collect();
        let (polygons, _) = mesh
            .create_polygons(&[PolygonToCreate::in_group(group, corners)])
            .unwrap();
        let polygon = polygons[0];
        mesh.end_modification(false).unwrap();

        let undo = mesh.make_undo().unwrap();

        // Undo: back to the empty mesh
        let redo = undo.execute(&mut mesh).unwrap();
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.edge_count(), 0);
        assert_eq!(mesh.polygon_count(), 0);
        assert_eq!(mesh.polygon_group_count(), 0);
        assert!(!mesh.is_being_modified());

        // Redo: the quad is back, at its original IDs
        let undo_again = redo.execute(&mut mesh).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.edge_count(), 4);
        assert!(mesh.is_valid_polygon(polygon));
        for &v in &vertices {
            assert!(mesh.is_valid_vertex(v));
        }
        assert_eq!(mesh.topology().polygon(polygon).unwrap().triangles.len(), 2);
        mesh.topology().validate().unwrap();

        // A second full cycle reproduces both states again
        let redo_again = undo_again.execute(&mut mesh).unwrap();
        assert_eq!(mesh.polygon_count(), 0);
        redo_again.execute(&mut mesh).unwrap();
        assert!(mesh.is_valid_polygon(polygon));
        mesh.topology().validate().unwrap();
    }

    #[test]
    fn undo_restores_moved_vertices() {
        let (mut mesh, _, vertices, _) = quad_mesh();
        mesh.make_undo();

        mesh.start_modification(ModificationType::Final, TopologyChange::NoTopologyChange)
            .unwrap();
        mesh.move_vertices(&[VertexToMove {
            vertex_id: vertices[0],
            new_position: Point3::new(-1.0, -1.0, 0.0),
        }])
        .unwrap();
        mesh.end_modification(false).unwrap();

        assert_eq!(
            mesh.topology().vertex(vertices[0]).unwrap().position,
            Point3::new(-1.0, -1.0, 0.0)
        );

        let undo = mesh.make_undo().unwrap();
        let redo = undo.execute(&mut mesh).unwrap();
        assert_eq!(
            mesh.topology().vertex(vertices[0]).unwrap().position,
            Point3::new(0.0, 0.0, 0.0)
        );
        redo.execute(&mut mesh).unwrap();
        assert_eq!(
            mesh.topology().vertex(vertices[0]).unwrap().position,
            Point3::new(-1.0, -1.0, 0.0)
        );
    }

    #[test]
    fn make_undo_returns_none_when_disabled_or_empty() {
        let mut mesh = EditableMesh::new();
        assert!(mesh.make_undo().is_none());

        mesh.set_allow_undo(false);
        mesh.start_modification(ModificationType::Final, TopologyChange::TopologyChange)
            .unwrap();
        mesh.create_empty_vertex_range(1).unwrap();
        mesh.end_modification(false).unwrap();
        assert!(mesh.make_undo().is_none());
    }

    #[test]
    fn compact_then_undo_restores_original_ids() {
        let (mut mesh, _, _, _) = quad_mesh();
        mesh.make_undo();

        // Punch holes into the vertex store
        mesh.start_modification(ModificationType::Final, TopologyChange::TopologyChange)
            .unwrap();
        let loose = mesh.create_empty_vertex_range(3).unwrap();
        mesh.delete_orphan_vertices(&[loose[0], loose[1]]).unwrap();
        mesh.end_modification(false).unwrap();
        mesh.make_undo();

        let survivor = loose[2];
        assert_eq!(survivor.index(), 6);

        mesh.start_modification(ModificationType::Final, TopologyChange::TopologyChange)
            .unwrap();
        mesh.compact().unwrap();
        mesh.end_modification(false).unwrap();

        // Dense again: the survivor moved into the first hole
        assert_eq!(mesh.vertex_count(), 5);
        assert!(mesh.is_valid_vertex(VertexId::new(4)));
        assert!(!mesh.is_valid_vertex(survivor));
        mesh.topology().validate().unwrap();

        // Undoing the compaction brings the old IDs back
        let undo = mesh.make_undo().unwrap();
        let redo = undo.execute(&mut mesh).unwrap();
        assert!(mesh.is_valid_vertex(survivor));
        assert!(!mesh.is_valid_vertex(VertexId::new(4)));
        mesh.topology().validate().unwrap();

        // And redo compacts again
        redo.execute(&mut mesh).unwrap();
        assert!(mesh.is_valid_vertex(VertexId::new(4)));
        assert!(!mesh.is_valid_vertex(survivor));
        mesh.topology().validate().unwrap();
    }

    #[test]
    fn retriangulation_is_deterministic_and_quiet() {
        let (mut mesh, _, _, polygon) = quad_mesh();

        let adapter = RecordingAdapter::new();
        let log = adapter.log();
        mesh.add_adapter(Box::new(adapter));

        mesh.start_modification(ModificationType::Final, TopologyChange::NoTopologyChange)
            .unwrap();
        mesh.retriangulate_polygons(&[polygon]).unwrap();
        mesh.retriangulate_polygons(&[polygon]).unwrap();
        let first = mesh.topology().polygon(polygon).unwrap().triangles.clone();
        mesh.retriangulate_polygons(&[polygon]).unwrap();
        let second = mesh.topology().polygon(polygon).unwrap().triangles.clone();
        mesh.end_modification(false).unwrap();

        assert_eq!(first, second);
        let retriangulations = log
            .borrow()
            .iter()
            .filter(|event| matches!(event, AdapterEvent::RetriangulatePolygons(_)))
            .count();
        assert_eq!(retriangulations, 0, "unchanged triangulation must not notify");
    }

    #[test]
    fn adapters_see_creation_and_deletion() {
        let mut mesh = EditableMesh::new();
        let adapter = RecordingAdapter::new();
        let log = adapter.log();
        mesh.add_adapter(Box::new(adapter));

        mesh.start_modification(ModificationType::Final, TopologyChange::TopologyChange)
            .unwrap();
        let group = mesh
            .create_polygon_groups(&[PolygonGroupToCreate::with_material("M_Default")])
            .unwrap()[0];
        let vertices = mesh
            .create_vertices(
                &square_corners()
                    .into_iter()
                    .map(VertexToCreate::at_position)
                    .collect::<Vec<_>>(),
            )
            .unwrap();
        let corners: Vec<VertexAndAttributes> = vertices
            .iter()
            .map(|&v| VertexAndAttributes::new_instance_of(v))
            .collect();
        let (polygons, _) = mesh
            .create_polygons(&[PolygonToCreate::in_group(group, corners)])
            .unwrap();
        mesh.delete_polygons(&polygons, true, true, true, true).unwrap();
        mesh.end_modification(false).unwrap();

        let events = log.borrow();
        assert!(events.contains(&AdapterEvent::StartModification));
        assert!(events.contains(&AdapterEvent::CreatePolygonGroups(vec![group])));
        assert!(events.contains(&AdapterEvent::CreateVertices(vertices.clone())));
        assert!(events.contains(&AdapterEvent::CreatePolygons(polygons.clone())));
        assert!(events.contains(&AdapterEvent::DeletePolygons(polygons.clone())));
        assert!(events.contains(&AdapterEvent::EndModification));
    }

    #[test]
    fn polygon_group_reassignment_keeps_both_sides_consistent() {
        let (mut mesh, group, _, polygon) = quad_mesh();

        mesh.start_modification(ModificationType::Final, TopologyChange::TopologyChange)
            .unwrap();
        let other = mesh
            .create_polygon_groups(&[PolygonGroupToCreate::with_material("M_Other")])
            .unwrap()[0];
        mesh.assign_polygons_to_polygon_groups(
            &[PolygonGroupForPolygon {
                polygon_id: polygon,
                polygon_group_id: other,
            }],
            true,
        )
        .unwrap();
        mesh.end_modification(false).unwrap();

        assert_eq!(mesh.topology().polygon(polygon).unwrap().group, other);
        assert!(
            !mesh.is_valid_polygon_group(group),
            "emptied group should have been deleted"
        );
        mesh.topology().validate().unwrap();
    }

    #[test]
    fn deleting_a_non_empty_group_is_rejected() {
        let (mut mesh, group, _, _) = quad_mesh();
        mesh.start_modification(ModificationType::Final, TopologyChange::TopologyChange)
            .unwrap();
        assert!(mesh.delete_polygon_groups(&[group]).is_err());
    }

    #[test]
    fn vertices_with_edges_cannot_be_deleted_as_orphans() {
        let (mut mesh, _, vertices, _) = quad_mesh();
        mesh.start_modification(ModificationType::Final, TopologyChange::TopologyChange)
            .unwrap();
        assert!(mesh.delete_orphan_vertices(&[vertices[0]]).is_err());
    }

    #[test]
    fn serde_round_trip_preserves_identity() {
        let (mut mesh, _, vertices, polygon) = quad_mesh();

        // Leave a hole so sparseness is actually exercised
        mesh.start_modification(ModificationType::Final, TopologyChange::TopologyChange)
            .unwrap();
        let loose = mesh.create_empty_vertex_range(2).unwrap();
        mesh.delete_orphan_vertices(&[loose[0]]).unwrap();
        mesh.end_modification(false).unwrap();

        let json = serde_json::to_string(mesh.topology()).unwrap();
        let restored: crate::topology::MeshTopology = serde_json::from_str(&json).unwrap();

        assert!(restored.vertices().is_allocated(vertices[3]));
        assert!(!restored.vertices().is_allocated(loose[0]));
        assert!(restored.vertices().is_allocated(loose[1]));
        assert!(restored.polygons().is_allocated(polygon));
        assert_eq!(
            restored.polygon(polygon).unwrap().triangles,
            mesh.topology().polygon(polygon).unwrap().triangles
        );
        restored.validate().unwrap();
    }

    #[test]
    fn polygon_with_hole_triangulates_the_ring() {
        let mut mesh = EditableMesh::new();
        mesh.start_modification(ModificationType::Final, TopologyChange::TopologyChange)
            .unwrap();
        let group = mesh
            .create_polygon_groups(&[PolygonGroupToCreate::with_material("M_Default")])
            .unwrap()[0];

        let outer = mesh
            .create_vertices(&[
                VertexToCreate::at_position(Point3::new(0.0, 0.0, 0.0)),
                VertexToCreate::at_position(Point3::new(3.0, 0.0, 0.0)),
                VertexToCreate::at_position(Point3::new(3.0, 3.0, 0.0)),
                VertexToCreate::at_position(Point3::new(0.0, 3.0, 0.0)),
            ])
            .unwrap();
        let inner = mesh
            .create_vertices(&[
                VertexToCreate::at_position(Point3::new(1.0, 1.0, 0.0)),
                VertexToCreate::at_position(Point3::new(2.0, 1.0, 0.0)),
                VertexToCreate::at_position(Point3::new(2.0, 2.0, 0.0)),
                VertexToCreate::at_position(Point3::new(1.0, 2.0, 0.0)),
            ])
            .unwrap();

        let mut spec = PolygonToCreate::in_group(
            group,
            outer
                .iter()
                .map(|&v| VertexAndAttributes::new_instance_of(v))
                .collect(),
        );
        spec.holes = vec![inner
            .iter()
            .map(|&v| VertexAndAttributes::new_instance_of(v))
            .collect()];
        let (polygons, new_edges) = mesh.create_polygons(&[spec]).unwrap();
        mesh.end_modification(false).unwrap();

        // Perimeter and hole each contribute four edges; a ring over eight
        // vertices always triangulates into eight triangles
        assert_eq!(new_edges.len(), 8);
        assert_eq!(mesh.topology().polygon(polygons[0]).unwrap().triangles.len(), 8);
        mesh.topology().validate().unwrap();
    }

    #[test]
    fn subdivision_count_is_undoable() {
        let (mut mesh, _, _, _) = quad_mesh();
        mesh.make_undo();

        mesh.start_modification(ModificationType::Final, TopologyChange::NoTopologyChange)
            .unwrap();
        mesh.set_subdivision_count(2).unwrap();
        mesh.end_modification(false).unwrap();
        assert!(mesh.is_previewing_subdivisions());

        let undo = mesh.make_undo().unwrap();
        let redo = undo.execute(&mut mesh).unwrap();
        assert_eq!(mesh.subdivision_count(), 0);
        redo.execute(&mut mesh).unwrap();
        assert_eq!(mesh.subdivision_count(), 2);
    }
}
