//! Element creation operations.

use crate::change::MeshChange;
use crate::error::Result;
use crate::mesh::specs::{
    EdgeToCreate, PolygonEdgeHardness, PolygonToCreate, VertexAndAttributes,
    VertexInstanceToCreate, VertexToCreate,
};
use crate::attributes::EdgeAttribute;
use crate::mesh::specs::AttributesForEdge;
use crate::mesh::EditableMesh;
use crate::topology::{
    Contour, Edge, EdgeId, ElementId, Polygon, PolygonId, Vertex, VertexId, VertexInstance,
    VertexInstanceId,
};

impl EditableMesh {
    /// Creates `count` vertices at the origin, with default attributes.
    ///
    /// # Errors
    ///
    /// Returns an error if no modification session is open.
    pub fn create_empty_vertex_range(&mut self, count: usize) -> Result<Vec<VertexId>> {
        let specs = vec![VertexToCreate::at_position(crate::math::Point3::origin()); count];
        self.create_vertices(&specs)
    }

    /// Creates vertices. New vertices are connected to nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if no modification session is open, or an
    /// `original_vertex_id` names a slot that is already allocated.
    pub fn create_vertices(&mut self, specs: &[VertexToCreate]) -> Result<Vec<VertexId>> {
        self.require_modifying()?;

        let mut vertex_ids = Vec::with_capacity(specs.len());
        for spec in specs {
            let mut vertex = Vertex::new(spec.position);
            vertex.corner_sharpness = spec.corner_sharpness;

            let vertex_id = if spec.original_vertex_id.is_valid() {
                self.topology.vertices.insert(spec.original_vertex_id, vertex)?;
                spec.original_vertex_id
            } else {
                self.topology.vertices.add(vertex)
            };
            vertex_ids.push(vertex_id);
        }

        self.notify_adapters(|adapter, mesh| adapter.on_create_vertices(mesh, &vertex_ids));

        // Delete in the opposite order that we added
        self.add_undo(MeshChange::DeleteOrphanVertices {
            vertex_ids: vertex_ids.iter().rev().copied().collect(),
        });

        Ok(vertex_ids)
    }

    /// Creates vertex instances and registers them on their vertices.
    ///
    /// # Errors
    ///
    /// Returns an error if no modification session is open or a referenced
    /// vertex is not allocated.
    pub fn create_vertex_instances(
        &mut self,
        specs: &[VertexInstanceToCreate],
    ) -> Result<Vec<VertexInstanceId>> {
        self.require_modifying()?;

        let uv_channels = self.texture_coordinate_count();
        let mut instance_ids = Vec::with_capacity(specs.len());
        for spec in specs {
            self.topology.vertex(spec.vertex_id)?;

            let mut instance = VertexInstance::new(spec.vertex_id, uv_channels);
            for attribute in &spec.attributes {
                super::attributes::apply_instance_attribute(&mut instance, attribute);
            }

            let instance_id = if spec.original_vertex_instance_id.is_valid() {
                self.topology
                    .vertex_instances
                    .insert(spec.original_vertex_instance_id, instance)?;
                spec.original_vertex_instance_id
            } else {
                self.topology.vertex_instances.add(instance)
            };

            self.topology
                .vertex_mut(spec.vertex_id)?
                .vertex_instances
                .push(instance_id);
            instance_ids.push(instance_id);
        }

        self.notify_adapters(|adapter, mesh| {
            adapter.on_create_vertex_instances(mesh, &instance_ids);
        });

        self.add_undo(MeshChange::DeleteVertexInstances {
            instance_ids: instance_ids.iter().rev().copied().collect(),
            delete_orphaned_vertices: false,
        });

        Ok(instance_ids)
    }

    /// Creates edges and registers them on both endpoint vertices.
    ///
    /// # Errors
    ///
    /// Returns an error if no modification session is open or either
    /// endpoint vertex is not allocated.
    pub fn create_edges(&mut self, specs: &[EdgeToCreate]) -> Result<Vec<EdgeId>> {
        self.require_modifying()?;

        let mut edge_ids = Vec::with_capacity(specs.len());
        for spec in specs {
            self.topology.vertex(spec.vertex_id0)?;
            self.topology.vertex(spec.vertex_id1)?;

            let mut edge = Edge::new(spec.vertex_id0, spec.vertex_id1);
            edge.is_hard = spec.is_hard;
            edge.crease_sharpness = spec.crease_sharpness;
            edge.connected_polygons = spec.connected_polygons.clone();

            let edge_id = if spec.original_edge_id.is_valid() {
                self.topology.edges.insert(spec.original_edge_id, edge)?;
                spec.original_edge_id
            } else {
                self.topology.edges.add(edge)
            };

            // Connect the edge to its vertices
            self.topology
                .vertex_mut(spec.vertex_id0)?
                .connected_edges
                .push(edge_id);
            self.topology
                .vertex_mut(spec.vertex_id1)?
                .connected_edges
                .push(edge_id);

            edge_ids.push(edge_id);
        }

        self.notify_adapters(|adapter, mesh| adapter.on_create_edges(mesh, &edge_ids));

        self.add_undo(MeshChange::DeleteEdges {
            edge_ids: edge_ids.iter().rev().copied().collect(),
            delete_orphaned_vertices: false,
        });

        Ok(edge_ids)
    }

    /// Creates polygons, along with any vertex instances and edges their
    /// contours need, and triangulates them.
    ///
    /// Returns the new polygon IDs plus the IDs of any edges that had to be
    /// created for the contours.
    ///
    /// # Errors
    ///
    /// Returns an error if no modification session is open, a perimeter has
    /// fewer than three vertices, or a referenced element is not allocated.
    pub fn create_polygons(
        &mut self,
        specs: &[PolygonToCreate],
    ) -> Result<(Vec<PolygonId>, Vec<EdgeId>)> {
        self.require_modifying()?;

        let mut polygon_ids = Vec::with_capacity(specs.len());
        let mut new_edge_ids = Vec::new();

        for spec in specs {
            if spec.perimeter.len() < 3 {
                return Err(crate::error::TopologyError::DegeneratePerimeter(
                    spec.perimeter.len(),
                )
                .into());
            }
            self.topology.polygon_group(spec.polygon_group_id)?;

            // Resolve or create the contour instances before the polygon
            // record exists; attachment happens below.
            let perimeter_instances = self.resolve_contour_instances(&spec.perimeter)?;
            let mut hole_instances = Vec::with_capacity(spec.holes.len());
            for hole in &spec.holes {
                hole_instances.push(self.resolve_contour_instances(hole)?);
            }

            let mut polygon = Polygon::new(spec.polygon_group_id);
            polygon.perimeter = Contour::new(perimeter_instances);
            polygon.holes = hole_instances.into_iter().map(Contour::new).collect();

            let polygon_id = if spec.original_polygon_id.is_valid() {
                self.topology.polygons.insert(spec.original_polygon_id, polygon)?;
                spec.original_polygon_id
            } else {
                self.topology.polygons.add(polygon)
            };
            polygon_ids.push(polygon_id);

            // Tell every contour instance it is now used by this polygon
            let contour_instances: Vec<VertexInstanceId> = self
                .topology
                .polygon(polygon_id)?
                .contours()
                .flat_map(|contour| contour.vertex_instances.iter().copied())
                .collect();
            for instance_id in contour_instances {
                self.topology
                    .vertex_instance_mut(instance_id)?
                    .connected_polygons
                    .push(polygon_id);
            }

            // Make sure we have edges connecting the contour vertices,
            // creating any that are missing
            let new_edges_hard = matches!(
                spec.edge_hardness,
                PolygonEdgeHardness::NewEdgesHard | PolygonEdgeHardness::AllEdgesHard
            );
            let contour_count = 1 + self.topology.polygon(polygon_id)?.holes.len();
            let mut all_contour_edges = Vec::new();
            for contour_number in 0..contour_count {
                let contour = self.polygon_contour(polygon_id, contour_number)?;
                let created =
                    self.create_missing_contour_edges(&contour, new_edges_hard)?;
                new_edge_ids.extend_from_slice(&created);

                let contour = self.polygon_contour(polygon_id, contour_number)?;
                let contour_edges = self.topology.contour_edges(&contour)?;
                for &edge_id in &contour_edges {
                    self.topology
                        .edge_mut(edge_id)?
                        .connected_polygons
                        .push(polygon_id);
                }
                all_contour_edges.extend(contour_edges);
            }

            // Attach to the polygon group
            self.topology
                .polygon_group_mut(spec.polygon_group_id)?
                .polygons
                .push(polygon_id);

            // Hardness overrides for pre-existing edges
            if matches!(
                spec.edge_hardness,
                PolygonEdgeHardness::AllEdgesSoft | PolygonEdgeHardness::AllEdgesHard
            ) {
                let hard = spec.edge_hardness == PolygonEdgeHardness::AllEdgesHard;
                let overrides: Vec<AttributesForEdge> = all_contour_edges
                    .iter()
                    .map(|&edge_id| AttributesForEdge {
                        edge_id,
                        attributes: vec![EdgeAttribute::IsHard(hard)],
                    })
                    .collect();
                self.set_edges_attributes(&overrides)?;
            }
        }

        self.notify_adapters(|adapter, mesh| adapter.on_create_polygons(mesh, &polygon_ids));

        // Triangulation-dependent state is finalized after the creation
        // notification
        self.retriangulate_polygons(&polygon_ids)?;
        self.polygons_pending_tangent_basis.extend(polygon_ids.iter());

        self.add_undo(MeshChange::DeletePolygons {
            polygon_ids: polygon_ids.iter().rev().copied().collect(),
            delete_orphaned_edges: false,
            delete_orphaned_vertices: false,
            delete_orphaned_vertex_instances: false,
            delete_empty_polygon_groups: false,
        });

        Ok((polygon_ids, new_edge_ids))
    }

    /// Resolves polygon corners to instance IDs, creating instances where a
    /// corner does not name an existing one.
    pub(crate) fn resolve_contour_instances(
        &mut self,
        corners: &[VertexAndAttributes],
    ) -> Result<Vec<VertexInstanceId>> {
        let mut instance_ids = Vec::with_capacity(corners.len());
        for corner in corners {
            if corner.vertex_instance_id.is_valid() {
                self.topology.vertex_instance(corner.vertex_instance_id)?;
                instance_ids.push(corner.vertex_instance_id);
            } else {
                let created = self.create_vertex_instances(&[VertexInstanceToCreate {
                    vertex_id: corner.vertex_id,
                    attributes: corner.attributes.clone(),
                    original_vertex_instance_id: VertexInstanceId::INVALID,
                }])?;
                instance_ids.push(created[0]);
            }
        }
        Ok(instance_ids)
    }

    /// Returns a clone of the polygon's contour number `contour_number`,
    /// where 0 is the perimeter and `n + 1` is hole `n`.
    pub(crate) fn polygon_contour(
        &self,
        polygon_id: PolygonId,
        contour_number: usize,
    ) -> Result<Contour> {
        let polygon = self.topology.polygon(polygon_id)?;
        let contour = if contour_number == 0 {
            &polygon.perimeter
        } else {
            polygon.holes.get(contour_number - 1).ok_or_else(|| {
                crate::error::TopologyError::Inconsistent(format!(
                    "polygon {polygon_id} has no hole contour {}",
                    contour_number - 1
                ))
            })?
        };
        Ok(contour.clone())
    }

    /// Creates edges for every contour segment that does not have one yet.
    fn create_missing_contour_edges(
        &mut self,
        contour: &Contour,
        hard: bool,
    ) -> Result<Vec<EdgeId>> {
        let vertices = self.topology.contour_vertices(contour)?;
        let count = vertices.len();
        let mut new_edge_ids = Vec::new();
        for i in 0..count {
            let vertex0 = vertices[i];
            let vertex1 = vertices[(i + 1) % count];
            if self
                .topology
                .edge_that_connects_vertices(vertex0, vertex1)
                .is_none()
            {
                let mut spec = EdgeToCreate::between(vertex0, vertex1);
                spec.is_hard = hard;
                let created = self.create_edges(&[spec])?;
                new_edge_ids.extend(created);
            }
        }
        Ok(new_edge_ids)
    }
}
