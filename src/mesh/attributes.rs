//! Attribute write operations.

use crate::attributes::{
    EdgeAttribute, PolygonGroupAttribute, VertexAttribute, VertexInstanceAttribute,
};
use crate::change::MeshChange;
use crate::error::Result;
use crate::math::Vector2;
use crate::mesh::specs::{
    AttributesForEdge, AttributesForPolygonGroup, AttributesForVertex, AttributesForVertexInstance,
    VertexToMove,
};
use crate::mesh::EditableMesh;
use crate::topology::{EdgeId, VertexId, VertexInstance};

/// Writes one attribute into a vertex instance record.
pub(crate) fn apply_instance_attribute(
    instance: &mut VertexInstance,
    attribute: &VertexInstanceAttribute,
) {
    match attribute {
        VertexInstanceAttribute::Normal(normal) => instance.normal = *normal,
        VertexInstanceAttribute::Tangent(tangent) => instance.tangent = *tangent,
        VertexInstanceAttribute::BinormalSign(sign) => instance.binormal_sign = *sign,
        VertexInstanceAttribute::Uv { channel, value } => {
            if instance.uvs.len() <= *channel {
                instance.uvs.resize(*channel + 1, Vector2::zeros());
            }
            instance.uvs[*channel] = *value;
        }
        VertexInstanceAttribute::Color(color) => instance.color = *color,
    }
}

/// Captures every attribute of a vertex instance, for undo records.
pub(crate) fn capture_instance_attributes(instance: &VertexInstance) -> Vec<VertexInstanceAttribute> {
    let mut attributes = vec![
        VertexInstanceAttribute::Normal(instance.normal),
        VertexInstanceAttribute::Tangent(instance.tangent),
        VertexInstanceAttribute::BinormalSign(instance.binormal_sign),
        VertexInstanceAttribute::Color(instance.color),
    ];
    for (channel, &value) in instance.uvs.iter().enumerate() {
        attributes.push(VertexInstanceAttribute::Uv { channel, value });
    }
    attributes
}

impl EditableMesh {
    /// Sets attributes on vertices.
    ///
    /// # Errors
    ///
    /// Returns an error if no modification session is open or a vertex ID
    /// is not allocated.
    pub fn set_vertices_attributes(&mut self, specs: &[AttributesForVertex]) -> Result<()> {
        self.require_modifying()?;

        // Back up the current value of every attribute kind we are about to
        // overwrite, in reverse order
        let mut revert = Vec::with_capacity(specs.len());
        for spec in specs.iter().rev() {
            let vertex = self.topology.vertex(spec.vertex_id)?;
            let attributes = spec
                .attributes
                .iter()
                .map(|attribute| match attribute {
                    VertexAttribute::Position(_) => VertexAttribute::Position(vertex.position),
                    VertexAttribute::CornerSharpness(_) => {
                        VertexAttribute::CornerSharpness(vertex.corner_sharpness)
                    }
                })
                .collect();
            revert.push(AttributesForVertex {
                vertex_id: spec.vertex_id,
                attributes,
            });
        }

        let mut writes = Vec::new();
        for spec in specs {
            let mut moved = false;
            {
                let vertex = self.topology.vertex_mut(spec.vertex_id)?;
                for attribute in &spec.attributes {
                    match attribute {
                        VertexAttribute::Position(position) => {
                            moved |= vertex.position != *position;
                            vertex.position = *position;
                        }
                        VertexAttribute::CornerSharpness(sharpness) => {
                            vertex.corner_sharpness = *sharpness;
                        }
                    }
                    writes.push((spec.vertex_id, attribute.clone()));
                }
            }
            // A moved vertex invalidates the triangulation and tangent
            // basis of every polygon built on it, on redo and undo alike
            if moved {
                let affected = self.topology.vertex_connected_polygons(spec.vertex_id);
                self.polygons_pending_triangulation.extend(affected.iter());
                self.polygons_pending_tangent_basis.extend(affected);
            }
        }

        self.notify_adapters(|adapter, mesh| {
            for (vertex_id, attribute) in &writes {
                adapter.on_set_vertex_attribute(mesh, *vertex_id, attribute);
            }
        });

        self.add_undo(MeshChange::SetVerticesAttributes { attributes: revert });
        Ok(())
    }

    /// Sets attributes on vertex instances.
    ///
    /// # Errors
    ///
    /// Returns an error if no modification session is open or an instance
    /// ID is not allocated.
    pub fn set_vertex_instances_attributes(
        &mut self,
        specs: &[AttributesForVertexInstance],
    ) -> Result<()> {
        self.require_modifying()?;

        let mut revert = Vec::with_capacity(specs.len());
        for spec in specs.iter().rev() {
            let instance = self.topology.vertex_instance(spec.vertex_instance_id)?;
            let attributes = spec
                .attributes
                .iter()
                .map(|attribute| match attribute {
                    VertexInstanceAttribute::Normal(_) => {
                        VertexInstanceAttribute::Normal(instance.normal)
                    }
                    VertexInstanceAttribute::Tangent(_) => {
                        VertexInstanceAttribute::Tangent(instance.tangent)
                    }
                    VertexInstanceAttribute::BinormalSign(_) => {
                        VertexInstanceAttribute::BinormalSign(instance.binormal_sign)
                    }
                    VertexInstanceAttribute::Uv { channel, .. } => VertexInstanceAttribute::Uv {
                        channel: *channel,
                        value: instance.uvs.get(*channel).copied().unwrap_or_else(Vector2::zeros),
                    },
                    VertexInstanceAttribute::Color(_) => {
                        VertexInstanceAttribute::Color(instance.color)
                    }
                })
                .collect();
            revert.push(AttributesForVertexInstance {
                vertex_instance_id: spec.vertex_instance_id,
                attributes,
            });
        }

        let mut writes = Vec::new();
        for spec in specs {
            let instance = self.topology.vertex_instance_mut(spec.vertex_instance_id)?;
            for attribute in &spec.attributes {
                apply_instance_attribute(instance, attribute);
                writes.push((spec.vertex_instance_id, attribute.clone()));
            }
        }

        self.notify_adapters(|adapter, mesh| {
            for (instance_id, attribute) in &writes {
                adapter.on_set_vertex_instance_attribute(mesh, *instance_id, attribute);
            }
        });

        self.add_undo(MeshChange::SetVertexInstancesAttributes { attributes: revert });
        Ok(())
    }

    /// Sets attributes on edges.
    ///
    /// Changing hardness schedules a new tangent basis for the polygons
    /// bordering the edge.
    ///
    /// # Errors
    ///
    /// Returns an error if no modification session is open or an edge ID is
    /// not allocated.
    pub fn set_edges_attributes(&mut self, specs: &[AttributesForEdge]) -> Result<()> {
        self.require_modifying()?;

        let mut revert = Vec::with_capacity(specs.len());
        for spec in specs.iter().rev() {
            let edge = self.topology.edge(spec.edge_id)?;
            let attributes = spec
                .attributes
                .iter()
                .map(|attribute| match attribute {
                    EdgeAttribute::IsHard(_) => EdgeAttribute::IsHard(edge.is_hard),
                    EdgeAttribute::CreaseSharpness(_) => {
                        EdgeAttribute::CreaseSharpness(edge.crease_sharpness)
                    }
                })
                .collect();
            revert.push(AttributesForEdge {
                edge_id: spec.edge_id,
                attributes,
            });
        }

        let mut writes = Vec::new();
        for spec in specs {
            let edge = self.topology.edge_mut(spec.edge_id)?;
            let mut hardness_changed = false;
            for attribute in &spec.attributes {
                match attribute {
                    EdgeAttribute::IsHard(hard) => {
                        hardness_changed |= edge.is_hard != *hard;
                        edge.is_hard = *hard;
                    }
                    EdgeAttribute::CreaseSharpness(sharpness) => {
                        edge.crease_sharpness = *sharpness;
                    }
                }
                writes.push((spec.edge_id, attribute.clone()));
            }
            if hardness_changed {
                let connected = edge.connected_polygons.clone();
                self.polygons_pending_tangent_basis.extend(connected);
            }
        }

        self.notify_adapters(|adapter, mesh| {
            for (edge_id, attribute) in &writes {
                adapter.on_set_edge_attribute(mesh, *edge_id, attribute);
            }
        });

        self.add_undo(MeshChange::SetEdgesAttributes { attributes: revert });
        Ok(())
    }

    /// Sets attributes on polygon groups.
    ///
    /// # Errors
    ///
    /// Returns an error if no modification session is open or a group ID is
    /// not allocated.
    pub fn set_polygon_groups_attributes(
        &mut self,
        specs: &[AttributesForPolygonGroup],
    ) -> Result<()> {
        self.require_modifying()?;

        let mut revert = Vec::with_capacity(specs.len());
        for spec in specs.iter().rev() {
            let group = self.topology.polygon_group(spec.polygon_group_id)?;
            let attributes = spec
                .attributes
                .iter()
                .map(|attribute| match attribute {
                    PolygonGroupAttribute::MaterialAsset(_) => {
                        PolygonGroupAttribute::MaterialAsset(group.material_asset.clone())
                    }
                    PolygonGroupAttribute::CastsShadow(_) => {
                        PolygonGroupAttribute::CastsShadow(group.casts_shadow)
                    }
                    PolygonGroupAttribute::CollisionEnabled(_) => {
                        PolygonGroupAttribute::CollisionEnabled(group.collision_enabled)
                    }
                })
                .collect();
            revert.push(AttributesForPolygonGroup {
                polygon_group_id: spec.polygon_group_id,
                attributes,
            });
        }

        let mut writes = Vec::new();
        for spec in specs {
            let group = self.topology.polygon_group_mut(spec.polygon_group_id)?;
            for attribute in &spec.attributes {
                match attribute {
                    PolygonGroupAttribute::MaterialAsset(material) => {
                        group.material_asset = material.clone();
                    }
                    PolygonGroupAttribute::CastsShadow(casts) => group.casts_shadow = *casts,
                    PolygonGroupAttribute::CollisionEnabled(enabled) => {
                        group.collision_enabled = *enabled;
                    }
                }
                writes.push((spec.polygon_group_id, attribute.clone()));
            }
        }

        self.notify_adapters(|adapter, mesh| {
            for (group_id, attribute) in &writes {
                adapter.on_set_polygon_group_attribute(mesh, *group_id, attribute);
            }
        });

        self.add_undo(MeshChange::SetPolygonGroupsAttributes { attributes: revert });
        Ok(())
    }

    /// Moves vertices to new positions.
    ///
    /// Unchanged positions are skipped. Every polygon sharing a moved
    /// vertex is scheduled for retriangulation and a new tangent basis at
    /// the end of the session, since convexity may have changed.
    ///
    /// # Errors
    ///
    /// Returns an error if no modification session is open or a vertex ID
    /// is not allocated.
    pub fn move_vertices(&mut self, specs: &[VertexToMove]) -> Result<()> {
        self.require_modifying()?;

        let mut attribute_writes = Vec::new();
        for spec in specs {
            let current = self.topology.vertex(spec.vertex_id)?.position;
            if current == spec.new_position {
                continue;
            }
            attribute_writes.push(AttributesForVertex {
                vertex_id: spec.vertex_id,
                attributes: vec![VertexAttribute::Position(spec.new_position)],
            });
        }

        if attribute_writes.is_empty() {
            return Ok(());
        }
        self.set_vertices_attributes(&attribute_writes)
    }

    /// Sets corner sharpness on vertices, for subdivision surfaces.
    ///
    /// # Errors
    ///
    /// Returns an error if no modification session is open, a vertex ID is
    /// not allocated, or the two slices differ in length.
    pub fn set_vertices_corner_sharpness(
        &mut self,
        vertex_ids: &[VertexId],
        sharpness: &[f64],
    ) -> Result<()> {
        if vertex_ids.len() != sharpness.len() {
            return Err(crate::error::OperationError::InvalidInput(
                "one sharpness value per vertex required".into(),
            )
            .into());
        }
        let specs: Vec<AttributesForVertex> = vertex_ids
            .iter()
            .zip(sharpness)
            .map(|(&vertex_id, &value)| AttributesForVertex {
                vertex_id,
                attributes: vec![VertexAttribute::CornerSharpness(value)],
            })
            .collect();
        self.set_vertices_attributes(&specs)
    }

    /// Sets crease sharpness on edges, for subdivision surfaces.
    ///
    /// # Errors
    ///
    /// Returns an error if no modification session is open, an edge ID is
    /// not allocated, or the two slices differ in length.
    pub fn set_edges_crease_sharpness(
        &mut self,
        edge_ids: &[EdgeId],
        sharpness: &[f64],
    ) -> Result<()> {
        if edge_ids.len() != sharpness.len() {
            return Err(crate::error::OperationError::InvalidInput(
                "one sharpness value per edge required".into(),
            )
            .into());
        }
        let specs: Vec<AttributesForEdge> = edge_ids
            .iter()
            .zip(sharpness)
            .map(|(&edge_id, &value)| AttributesForEdge {
                edge_id,
                attributes: vec![EdgeAttribute::CreaseSharpness(value)],
            })
            .collect();
        self.set_edges_attributes(&specs)
    }

    /// Sets hardness on edges.
    ///
    /// # Errors
    ///
    /// Returns an error if no modification session is open, an edge ID is
    /// not allocated, or the two slices differ in length.
    pub fn set_edges_hardness(&mut self, edge_ids: &[EdgeId], hardness: &[bool]) -> Result<()> {
        if edge_ids.len() != hardness.len() {
            return Err(crate::error::OperationError::InvalidInput(
                "one hardness value per edge required".into(),
            )
            .into());
        }
        let specs: Vec<AttributesForEdge> = edge_ids
            .iter()
            .zip(hardness)
            .map(|(&edge_id, &value)| AttributesForEdge {
                edge_id,
                attributes: vec![EdgeAttribute::IsHard(value)],
            })
            .collect();
        self.set_edges_attributes(&specs)
    }
}
