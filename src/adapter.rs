//! The notification contract between the kernel and its backing
//! representations.
//!
//! Every kernel mutation calls the matching hook on every attached adapter,
//! in attachment order, after the topology graph has been updated. Adapters
//! mirror kernel state into a renderable form (vertex/index buffers, a
//! geometry collection, ...). Hooks receive the mesh read-only and must not
//! re-enter the kernel to mutate it — the in-flight undo record would be
//! corrupted.

use crate::attributes::{
    EdgeAttribute, PolygonGroupAttribute, VertexAttribute, VertexInstanceAttribute,
};
use crate::mesh::compact::ElementIdRemappings;
use crate::mesh::specs::PolygonGroupForPolygon;
use crate::mesh::{EditableMesh, ModificationType, TopologyChange};
use crate::topology::{EdgeId, PolygonGroupId, PolygonId, VertexId, VertexInstanceId};

/// A backing representation kept in sync with the kernel.
///
/// Every hook has a no-op default; adapters implement the ones their
/// representation cares about.
#[allow(unused_variables)]
pub trait MeshAdapter {
    // --- Modification session bracketing ---

    fn on_start_modification(
        &mut self,
        mesh: &EditableMesh,
        modification: ModificationType,
        topology_change: TopologyChange,
    ) {
    }

    fn on_end_modification(&mut self, mesh: &EditableMesh) {}

    // --- Render mesh rebuild bracketing ---

    fn on_rebuild_render_mesh_start(&mut self, mesh: &EditableMesh, invalidate_lighting: bool) {}

    fn on_rebuild_render_mesh(&mut self, mesh: &EditableMesh) {}

    fn on_rebuild_render_mesh_finish(&mut self, mesh: &EditableMesh, rebuild_collision: bool) {}

    // --- Element creation ---

    fn on_create_vertices(&mut self, mesh: &EditableMesh, vertex_ids: &[VertexId]) {}

    fn on_create_vertex_instances(
        &mut self,
        mesh: &EditableMesh,
        instance_ids: &[VertexInstanceId],
    ) {
    }

    fn on_create_edges(&mut self, mesh: &EditableMesh, edge_ids: &[EdgeId]) {}

    fn on_create_polygons(&mut self, mesh: &EditableMesh, polygon_ids: &[PolygonId]) {}

    fn on_create_polygon_groups(&mut self, mesh: &EditableMesh, group_ids: &[PolygonGroupId]) {}

    // --- Element deletion (fired before the elements are removed) ---

    fn on_delete_vertex_instances(
        &mut self,
        mesh: &EditableMesh,
        instance_ids: &[VertexInstanceId],
    ) {
    }

    fn on_delete_orphan_vertices(&mut self, mesh: &EditableMesh, vertex_ids: &[VertexId]) {}

    fn on_delete_edges(&mut self, mesh: &EditableMesh, edge_ids: &[EdgeId]) {}

    fn on_delete_polygons(&mut self, mesh: &EditableMesh, polygon_ids: &[PolygonId]) {}

    fn on_delete_polygon_groups(&mut self, mesh: &EditableMesh, group_ids: &[PolygonGroupId]) {}

    // --- Attribute writes ---

    fn on_set_vertex_attribute(
        &mut self,
        mesh: &EditableMesh,
        vertex_id: VertexId,
        attribute: &VertexAttribute,
    ) {
    }

    fn on_set_vertex_instance_attribute(
        &mut self,
        mesh: &EditableMesh,
        instance_id: VertexInstanceId,
        attribute: &VertexInstanceAttribute,
    ) {
    }

    fn on_set_edge_attribute(
        &mut self,
        mesh: &EditableMesh,
        edge_id: EdgeId,
        attribute: &EdgeAttribute,
    ) {
    }

    fn on_set_polygon_group_attribute(
        &mut self,
        mesh: &EditableMesh,
        group_id: PolygonGroupId,
        attribute: &PolygonGroupAttribute,
    ) {
    }

    // --- Topology rewires ---

    fn on_set_edges_vertices(&mut self, mesh: &EditableMesh, edge_ids: &[EdgeId]) {}

    fn on_change_polygon_vertex_instances(&mut self, mesh: &EditableMesh, polygon_ids: &[PolygonId]) {
    }

    fn on_assign_polygons_to_polygon_groups(
        &mut self,
        mesh: &EditableMesh,
        assignments: &[PolygonGroupForPolygon],
    ) {
    }

    fn on_retriangulate_polygons(&mut self, mesh: &EditableMesh, polygon_ids: &[PolygonId]) {}

    fn on_reindex_elements(&mut self, mesh: &EditableMesh, remappings: &ElementIdRemappings) {}

    // --- Asset lifecycle ---

    fn is_committed(&self, mesh: &EditableMesh) -> bool {
        false
    }

    fn is_committed_as_instance(&self, mesh: &EditableMesh) -> bool {
        false
    }

    fn on_commit(&mut self, mesh: &EditableMesh) {}

    fn on_commit_instance(&mut self, mesh: &EditableMesh) {}

    fn on_revert(&mut self, mesh: &EditableMesh) {}

    fn on_revert_instance(&mut self, mesh: &EditableMesh) {}

    fn on_propagate_instance_changes(&mut self, mesh: &EditableMesh) {}
}

/// The notifications a [`RecordingAdapter`] captures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterEvent {
    StartModification,
    EndModification,
    RebuildRenderMeshStart,
    RebuildRenderMesh,
    RebuildRenderMeshFinish,
    CreateVertices(Vec<VertexId>),
    CreateVertexInstances(Vec<VertexInstanceId>),
    CreateEdges(Vec<EdgeId>),
    CreatePolygons(Vec<PolygonId>),
    CreatePolygonGroups(Vec<PolygonGroupId>),
    DeleteVertexInstances(Vec<VertexInstanceId>),
    DeleteOrphanVertices(Vec<VertexId>),
    DeleteEdges(Vec<EdgeId>),
    DeletePolygons(Vec<PolygonId>),
    DeletePolygonGroups(Vec<PolygonGroupId>),
    SetVertexAttribute(VertexId),
    SetVertexInstanceAttribute(VertexInstanceId),
    SetEdgeAttribute(EdgeId),
    SetPolygonGroupAttribute(PolygonGroupId),
    SetEdgesVertices(Vec<EdgeId>),
    ChangePolygonVertexInstances(Vec<PolygonId>),
    AssignPolygonsToPolygonGroups(Vec<PolygonId>),
    RetriangulatePolygons(Vec<PolygonId>),
    ReindexElements,
}

/// An adapter that records every notification it receives. Test support.
///
/// The log is shared: clone a handle with [`RecordingAdapter::log`] before
/// attaching the adapter to a mesh, then assert on the events afterwards.
#[derive(Debug, Default)]
pub struct RecordingAdapter {
    events: EventLog,
}

/// Shared handle to a [`RecordingAdapter`]'s event list.
pub type EventLog = std::rc::Rc<std::cell::RefCell<Vec<AdapterEvent>>>;

impl RecordingAdapter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle to the event log.
    #[must_use]
    pub fn log(&self) -> EventLog {
        std::rc::Rc::clone(&self.events)
    }

    fn push(&self, event: AdapterEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl MeshAdapter for RecordingAdapter {
    fn on_start_modification(
        &mut self,
        _mesh: &EditableMesh,
        _modification: ModificationType,
        _topology_change: TopologyChange,
    ) {
        self.push(AdapterEvent::StartModification);
    }

    fn on_end_modification(&mut self, _mesh: &EditableMesh) {
        self.push(AdapterEvent::EndModification);
    }

    fn on_rebuild_render_mesh_start(&mut self, _mesh: &EditableMesh, _invalidate_lighting: bool) {
        self.push(AdapterEvent::RebuildRenderMeshStart);
    }

    fn on_rebuild_render_mesh(&mut self, _mesh: &EditableMesh) {
        self.push(AdapterEvent::RebuildRenderMesh);
    }

    fn on_rebuild_render_mesh_finish(&mut self, _mesh: &EditableMesh, _rebuild_collision: bool) {
        self.push(AdapterEvent::RebuildRenderMeshFinish);
    }

    fn on_create_vertices(&mut self, _mesh: &EditableMesh, vertex_ids: &[VertexId]) {
        self.push(AdapterEvent::CreateVertices(vertex_ids.to_vec()));
    }

    fn on_create_vertex_instances(
        &mut self,
        _mesh: &EditableMesh,
        instance_ids: &[VertexInstanceId],
    ) {
        self.push(AdapterEvent::CreateVertexInstances(instance_ids.to_vec()));
    }

    fn on_create_edges(&mut self, _mesh: &EditableMesh, edge_ids: &[EdgeId]) {
        self.push(AdapterEvent::CreateEdges(edge_ids.to_vec()));
    }

    fn on_create_polygons(&mut self, _mesh: &EditableMesh, polygon_ids: &[PolygonId]) {
        self.push(AdapterEvent::CreatePolygons(polygon_ids.to_vec()));
    }

    fn on_create_polygon_groups(&mut self, _mesh: &EditableMesh, group_ids: &[PolygonGroupId]) {
        self.push(AdapterEvent::CreatePolygonGroups(group_ids.to_vec()));
    }

    fn on_delete_vertex_instances(
        &mut self,
        _mesh: &EditableMesh,
        instance_ids: &[VertexInstanceId],
    ) {
        self.push(AdapterEvent::DeleteVertexInstances(instance_ids.to_vec()));
    }

    fn on_delete_orphan_vertices(&mut self, _mesh: &EditableMesh, vertex_ids: &[VertexId]) {
        self.push(AdapterEvent::DeleteOrphanVertices(vertex_ids.to_vec()));
    }

    fn on_delete_edges(&mut self, _mesh: &EditableMesh, edge_ids: &[EdgeId]) {
        self.push(AdapterEvent::DeleteEdges(edge_ids.to_vec()));
    }

    fn on_delete_polygons(&mut self, _mesh: &EditableMesh, polygon_ids: &[PolygonId]) {
        self.push(AdapterEvent::DeletePolygons(polygon_ids.to_vec()));
    }

    fn on_delete_polygon_groups(&mut self, _mesh: &EditableMesh, group_ids: &[PolygonGroupId]) {
        self.push(AdapterEvent::DeletePolygonGroups(group_ids.to_vec()));
    }

    fn on_set_vertex_attribute(
        &mut self,
        _mesh: &EditableMesh,
        vertex_id: VertexId,
        _attribute: &VertexAttribute,
    ) {
        self.push(AdapterEvent::SetVertexAttribute(vertex_id));
    }

    fn on_set_vertex_instance_attribute(
        &mut self,
        _mesh: &EditableMesh,
        instance_id: VertexInstanceId,
        _attribute: &VertexInstanceAttribute,
    ) {
        self.push(AdapterEvent::SetVertexInstanceAttribute(instance_id));
    }

    fn on_set_edge_attribute(
        &mut self,
        _mesh: &EditableMesh,
        edge_id: EdgeId,
        _attribute: &EdgeAttribute,
    ) {
        self.push(AdapterEvent::SetEdgeAttribute(edge_id));
    }

    fn on_set_polygon_group_attribute(
        &mut self,
        _mesh: &EditableMesh,
        group_id: PolygonGroupId,
        _attribute: &PolygonGroupAttribute,
    ) {
        self.push(AdapterEvent::SetPolygonGroupAttribute(group_id));
    }

    fn on_set_edges_vertices(&mut self, _mesh: &EditableMesh, edge_ids: &[EdgeId]) {
        self.push(AdapterEvent::SetEdgesVertices(edge_ids.to_vec()));
    }

    fn on_change_polygon_vertex_instances(
        &mut self,
        _mesh: &EditableMesh,
        polygon_ids: &[PolygonId],
    ) {
        self.push(AdapterEvent::ChangePolygonVertexInstances(
            polygon_ids.to_vec(),
        ));
    }

    fn on_assign_polygons_to_polygon_groups(
        &mut self,
        _mesh: &EditableMesh,
        assignments: &[PolygonGroupForPolygon],
    ) {
        self.push(AdapterEvent::AssignPolygonsToPolygonGroups(
            assignments.iter().map(|a| a.polygon_id).collect(),
        ));
    }

    fn on_retriangulate_polygons(&mut self, _mesh: &EditableMesh, polygon_ids: &[PolygonId]) {
        self.push(AdapterEvent::RetriangulatePolygons(polygon_ids.to_vec()));
    }

    fn on_reindex_elements(&mut self, _mesh: &EditableMesh, _remappings: &ElementIdRemappings) {
        self.push(AdapterEvent::ReindexElements);
    }
}
