//! Polygon group operations.

use crate::change::MeshChange;
use crate::error::{Result, TopologyError};
use crate::mesh::specs::{PolygonGroupForPolygon, PolygonGroupToCreate};
use crate::mesh::EditableMesh;
use crate::topology::{ElementId, PolygonGroup, PolygonGroupId};

impl EditableMesh {
    /// Creates polygon groups.
    ///
    /// # Errors
    ///
    /// Returns an error if no modification session is open or an
    /// `original_polygon_group_id` names a slot that is already allocated.
    pub fn create_polygon_groups(
        &mut self,
        specs: &[PolygonGroupToCreate],
    ) -> Result<Vec<PolygonGroupId>> {
        self.require_modifying()?;

        let mut group_ids = Vec::with_capacity(specs.len());
        for spec in specs {
            let mut group = PolygonGroup::new(spec.material_asset.clone());
            group.casts_shadow = spec.casts_shadow;
            group.collision_enabled = spec.collision_enabled;

            let group_id = if spec.original_polygon_group_id.is_valid() {
                self.topology
                    .polygon_groups
                    .insert(spec.original_polygon_group_id, group)?;
                spec.original_polygon_group_id
            } else {
                self.topology.polygon_groups.add(group)
            };
            group_ids.push(group_id);
        }

        self.notify_adapters(|adapter, mesh| adapter.on_create_polygon_groups(mesh, &group_ids));

        self.add_undo(MeshChange::DeletePolygonGroups {
            group_ids: group_ids.iter().rev().copied().collect(),
        });

        Ok(group_ids)
    }

    /// Moves polygons between groups, keeping both sides of the
    /// polygon/group relationship consistent.
    ///
    /// # Errors
    ///
    /// Returns an error if no modification session is open or any polygon
    /// or group ID is not allocated.
    pub fn assign_polygons_to_polygon_groups(
        &mut self,
        assignments: &[PolygonGroupForPolygon],
        delete_orphaned_polygon_groups: bool,
    ) -> Result<()> {
        self.require_modifying()?;

        let mut revert = Vec::with_capacity(assignments.len());
        for assignment in assignments.iter().rev() {
            revert.push(PolygonGroupForPolygon {
                polygon_id: assignment.polygon_id,
                polygon_group_id: self.topology.polygon(assignment.polygon_id)?.group,
            });
        }
        self.add_undo(MeshChange::AssignPolygonsToPolygonGroups {
            assignments: revert,
            delete_orphaned_polygon_groups: false,
        });

        let mut emptied_groups = Vec::new();
        for assignment in assignments {
            self.topology.polygon_group(assignment.polygon_group_id)?;
            let old_group_id = self.topology.polygon(assignment.polygon_id)?.group;
            if old_group_id == assignment.polygon_group_id {
                continue;
            }

            {
                let old_group = self.topology.polygon_group_mut(old_group_id)?;
                let position = old_group
                    .polygons
                    .iter()
                    .position(|&p| p == assignment.polygon_id)
                    .ok_or_else(|| {
                        TopologyError::Inconsistent(format!(
                            "group {old_group_id} does not list polygon {}",
                            assignment.polygon_id
                        ))
                    })?;
                old_group.polygons.remove(position);
            }

            self.topology.polygon_mut(assignment.polygon_id)?.group =
                assignment.polygon_group_id;
            self.topology
                .polygon_group_mut(assignment.polygon_group_id)?
                .polygons
                .push(assignment.polygon_id);

            if self.topology.polygon_group(old_group_id)?.is_empty()
                && !emptied_groups.contains(&old_group_id)
            {
                emptied_groups.push(old_group_id);
            }
        }

        self.notify_adapters(|adapter, mesh| {
            adapter.on_assign_polygons_to_polygon_groups(mesh, assignments);
        });

        if delete_orphaned_polygon_groups {
            // A group emptied earlier may have been refilled by a later
            // assignment in the same batch
            let still_empty: Vec<PolygonGroupId> = emptied_groups
                .into_iter()
                .filter(|&group_id| {
                    self.topology
                        .polygon_group(group_id)
                        .is_ok_and(PolygonGroup::is_empty)
                })
                .collect();
            if !still_empty.is_empty() {
                self.delete_polygon_groups(&still_empty)?;
            }
        }

        Ok(())
    }

    /// Returns the first allocated polygon group, if any.
    #[must_use]
    pub fn first_valid_polygon_group(&self) -> Option<PolygonGroupId> {
        self.topology.polygon_groups.ids().next()
    }
}
