//! Polygon insetting and beveling.

use crate::error::Result;
use crate::math::{Point3, TOLERANCE};
use crate::mesh::attributes::capture_instance_attributes;
use crate::mesh::specs::{PolygonToCreate, VertexAndAttributes, VertexToCreate};
use crate::mesh::EditableMesh;
use crate::topology::PolygonId;

/// Which polygons an inset produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsetMode {
    /// Center polygon plus the ring of side polygons.
    All,
    /// Only the shrunken center polygon.
    CenterPolygonOnly,
    /// Only the ring of side polygons.
    SidePolygonsOnly,
}

/// Shrinks polygons toward their centers, ringing each with side polygons.
pub struct InsetPolygons {
    polygon_ids: Vec<PolygonId>,
    fixed_distance: f64,
    progress_toward_center: f64,
    mode: InsetMode,
}

impl InsetPolygons {
    /// Creates a new `InsetPolygons` operation.
    #[must_use]
    pub fn new(
        polygon_ids: Vec<PolygonId>,
        fixed_distance: f64,
        progress_toward_center: f64,
        mode: InsetMode,
    ) -> Self {
        Self {
            polygon_ids,
            fixed_distance,
            progress_toward_center,
            mode,
        }
    }

    /// Executes the inset, returning `(center, side)` polygon IDs.
    ///
    /// # Errors
    ///
    /// Returns an error if a polygon ID is not allocated or no modification
    /// session is open.
    pub fn execute(&self, mesh: &mut EditableMesh) -> Result<(Vec<PolygonId>, Vec<PolygonId>)> {
        bevel_or_inset(
            mesh,
            &self.polygon_ids,
            self.fixed_distance,
            self.progress_toward_center,
            self.mode,
            false,
        )
    }
}

/// Insets polygons and raises the center along the polygon normal,
/// producing slanted side polygons.
pub struct BevelPolygons {
    polygon_ids: Vec<PolygonId>,
    fixed_distance: f64,
    progress_toward_center: f64,
}

impl BevelPolygons {
    /// Creates a new `BevelPolygons` operation.
    #[must_use]
    pub fn new(polygon_ids: Vec<PolygonId>, fixed_distance: f64, progress_toward_center: f64) -> Self {
        Self {
            polygon_ids,
            fixed_distance,
            progress_toward_center,
        }
    }

    /// Executes the bevel, returning `(center, side)` polygon IDs.
    ///
    /// # Errors
    ///
    /// Returns an error if a polygon ID is not allocated or no modification
    /// session is open.
    pub fn execute(&self, mesh: &mut EditableMesh) -> Result<(Vec<PolygonId>, Vec<PolygonId>)> {
        bevel_or_inset(
            mesh,
            &self.polygon_ids,
            self.fixed_distance,
            self.progress_toward_center,
            InsetMode::All,
            true,
        )
    }
}

fn bevel_or_inset(
    mesh: &mut EditableMesh,
    polygon_ids: &[PolygonId],
    fixed_distance: f64,
    progress_toward_center: f64,
    mode: InsetMode,
    should_bevel: bool,
) -> Result<(Vec<PolygonId>, Vec<PolygonId>)> {
    let mut center_polygon_ids = Vec::new();
    let mut side_polygon_ids = Vec::new();

    for &polygon_id in polygon_ids {
        let polygon_group = mesh.topology().polygon(polygon_id)?.group;
        let center = mesh.compute_polygon_center(polygon_id)?;
        let normal = mesh.compute_polygon_normal(polygon_id)?;
        let instances = mesh.polygon_perimeter_vertex_instances(polygon_id)?;
        let vertices = mesh.polygon_perimeter_vertices(polygon_id)?;

        // New vertices pulled toward the polygon center (and out along the
        // normal when beveling)
        let mut inset_specs = Vec::with_capacity(vertices.len());
        for &vertex_id in &vertices {
            let position = mesh.topology().vertex(vertex_id)?.position;
            let toward_center = center - position;
            let offset = if toward_center.norm() > TOLERANCE {
                toward_center * progress_toward_center
                    + toward_center.normalize() * fixed_distance
            } else {
                toward_center * progress_toward_center
            };
            let mut inset_position: Point3 = position + offset;
            if should_bevel {
                inset_position += normal * fixed_distance;
            }
            inset_specs.push(VertexToCreate::at_position(inset_position));
        }
        let inset_vertex_ids = mesh.create_vertices(&inset_specs)?;

        // Center polygon mirrors the original winding on the new ring
        if mode != InsetMode::SidePolygonsOnly {
            let mut corners = Vec::with_capacity(instances.len());
            for (corner_number, &instance_id) in instances.iter().enumerate() {
                let instance = mesh.topology().vertex_instance(instance_id)?;
                let mut corner =
                    VertexAndAttributes::new_instance_of(inset_vertex_ids[corner_number]);
                corner.attributes = capture_instance_attributes(instance);
                corners.push(corner);
            }
            let (created, _) =
                mesh.create_polygons(&[PolygonToCreate::in_group(polygon_group, corners)])?;
            center_polygon_ids.extend(created);
        }

        // One side quad per perimeter segment
        if mode != InsetMode::CenterPolygonOnly {
            let count = vertices.len();
            let mut side_specs = Vec::with_capacity(count);
            for i in 0..count {
                let next = (i + 1) % count;
                side_specs.push(PolygonToCreate::in_group(
                    polygon_group,
                    vec![
                        VertexAndAttributes::new_instance_of(vertices[i]),
                        VertexAndAttributes::new_instance_of(vertices[next]),
                        VertexAndAttributes::new_instance_of(inset_vertex_ids[next]),
                        VertexAndAttributes::new_instance_of(inset_vertex_ids[i]),
                    ],
                ));
            }
            let (created, _) = mesh.create_polygons(&side_specs)?;
            side_polygon_ids.extend(created);
        }

        mesh.delete_polygons(&[polygon_id], true, true, true, false)?;
    }

    Ok((center_polygon_ids, side_polygon_ids))
}
