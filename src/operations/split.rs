//! Edge and polygon splitting.

use crate::attributes::VertexInstanceAttribute;
use crate::error::{OperationError, Result};
use crate::math::Point3;
use crate::mesh::specs::{
    EdgeToCreate, PolygonToCreate, PolygonToSplit, VertexAndAttributes, VertexToCreate,
    VerticesForEdge,
};
use crate::mesh::EditableMesh;
use crate::topology::{EdgeId, PolygonId, VertexId, VertexInstanceId};

/// Splits an edge at parametric positions, splicing the new vertices into
/// every polygon that shares the edge.
///
/// Split values are fractions along the edge from its first vertex toward
/// its second; the order does not matter (they are sorted).
pub struct SplitEdge {
    edge_id: EdgeId,
    splits: Vec<f64>,
}

impl SplitEdge {
    /// Creates a new `SplitEdge` operation.
    #[must_use]
    pub fn new(edge_id: EdgeId, splits: Vec<f64>) -> Self {
        Self { edge_id, splits }
    }

    /// Executes the split, returning the new vertices in order along the
    /// edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the splits are empty or out of `(0, 1)`, or the
    /// edge ID is not allocated.
    pub fn execute(&self, mesh: &mut EditableMesh) -> Result<Vec<VertexId>> {
        if self.splits.is_empty() {
            return Err(OperationError::InvalidInput("no split positions given".into()).into());
        }
        let mut sorted_splits = self.splits.clone();
        sorted_splits.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        if sorted_splits
            .iter()
            .any(|&split| !(0.0..=1.0).contains(&split))
        {
            return Err(OperationError::InvalidInput(
                "split positions must lie in [0, 1]".into(),
            )
            .into());
        }

        let [vertex0, vertex1] = mesh.edge_vertices(self.edge_id)?;
        let position0 = mesh.topology().vertex(vertex0)?.position;
        let position1 = mesh.topology().vertex(vertex1)?.position;

        // New vertices along the edge, closest to vertex0 first
        let vertex_specs: Vec<VertexToCreate> = sorted_splits
            .iter()
            .map(|&split| {
                VertexToCreate::at_position(Point3::from(
                    position0.coords * (1.0 - split) + position1.coords * split,
                ))
            })
            .collect();
        let new_vertex_ids = mesh.create_vertices(&vertex_specs)?;

        // Splice the new vertices into each connected polygon's perimeter
        let connected_polygons = mesh.edge_connected_polygons(self.edge_id)?;
        for &polygon_id in &connected_polygons {
            splice_vertices_into_perimeter(
                mesh,
                polygon_id,
                vertex0,
                vertex1,
                &new_vertex_ids,
                &sorted_splits,
            )?;
        }

        // Chain the edges: the original edge keeps the span from vertex0 to
        // the first new vertex, new edges cover the rest
        let mut edge_specs = Vec::with_capacity(new_vertex_ids.len());
        let mut chain_vertex = new_vertex_ids[0];
        for i in 0..new_vertex_ids.len() {
            let next_vertex = if i + 1 < new_vertex_ids.len() {
                new_vertex_ids[i + 1]
            } else {
                vertex1
            };
            let mut spec = EdgeToCreate::between(chain_vertex, next_vertex);
            spec.connected_polygons = connected_polygons.clone();
            edge_specs.push(spec);
            chain_vertex = next_vertex;
        }
        mesh.create_edges(&edge_specs)?;

        mesh.set_edges_vertices(&[VerticesForEdge {
            edge_id: self.edge_id,
            new_vertex_id0: vertex0,
            new_vertex_id1: new_vertex_ids[0],
        }])?;

        Ok(new_vertex_ids)
    }
}

/// Inserts `new_vertex_ids` into the polygon's perimeter between `vertex0`
/// and `vertex1`, respecting the polygon's winding direction, with corner
/// attributes interpolated from the two surrounding corners.
fn splice_vertices_into_perimeter(
    mesh: &mut EditableMesh,
    polygon_id: PolygonId,
    vertex0: VertexId,
    vertex1: VertexId,
    new_vertex_ids: &[VertexId],
    splits: &[f64],
) -> Result<()> {
    let perimeter_vertices = mesh.polygon_perimeter_vertices(polygon_id)?;
    let count = perimeter_vertices.len();

    let mut insert_at = None;
    let mut reversed = false;
    for i in 0..count {
        let a = perimeter_vertices[i];
        let b = perimeter_vertices[(i + 1) % count];
        if a == vertex0 && b == vertex1 {
            insert_at = Some(i + 1);
            break;
        }
        if a == vertex1 && b == vertex0 {
            insert_at = Some(i + 1);
            reversed = true;
            break;
        }
    }
    let insert_at = insert_at.ok_or_else(|| {
        OperationError::Failed(format!(
            "polygon {polygon_id} does not run along the split edge"
        ))
    })?;

    let instances = mesh.polygon_perimeter_vertex_instances(polygon_id)?;
    let instance_before = instances[insert_at - 1];
    let instance_after = instances[insert_at % instances.len()];

    let mut corners = Vec::with_capacity(new_vertex_ids.len());
    let ordered: Vec<(usize, f64)> = if reversed {
        (0..new_vertex_ids.len()).rev().map(|i| (i, 1.0 - splits[i])).collect()
    } else {
        (0..new_vertex_ids.len()).map(|i| (i, splits[i])).collect()
    };
    for (index, t) in ordered {
        let mut corner = VertexAndAttributes::new_instance_of(new_vertex_ids[index]);
        corner.attributes =
            interpolate_corner_attributes(mesh, instance_before, instance_after, t)?;
        corners.push(corner);
    }

    mesh.insert_polygon_perimeter_vertices(polygon_id, insert_at, &corners)?;
    Ok(())
}

/// Lerps the UVs and color of two corner instances.
fn interpolate_corner_attributes(
    mesh: &EditableMesh,
    instance0: VertexInstanceId,
    instance1: VertexInstanceId,
    t: f64,
) -> Result<Vec<VertexInstanceAttribute>> {
    let a = mesh.topology().vertex_instance(instance0)?;
    let b = mesh.topology().vertex_instance(instance1)?;

    let mut attributes = Vec::with_capacity(a.uvs.len() + 1);
    for (channel, &uv_a) in a.uvs.iter().enumerate() {
        let uv_b = b.uvs.get(channel).copied().unwrap_or(uv_a);
        attributes.push(VertexInstanceAttribute::Uv {
            channel,
            value: uv_a * (1.0 - t) + uv_b * t,
        });
    }
    attributes.push(VertexInstanceAttribute::Color(
        a.color * (1.0 - t) + b.color * t,
    ));
    Ok(attributes)
}

/// Splits an edge and propagates the split across the quad strip it starts,
/// forming an edge loop.
///
/// The loop walk crosses each four-sided polygon to the opposite edge and
/// stops at a boundary, a non-quad polygon, or when it returns to the
/// starting edge.
pub struct InsertEdgeLoop {
    edge_id: EdgeId,
    splits: Vec<f64>,
}

impl InsertEdgeLoop {
    /// Creates a new `InsertEdgeLoop` operation.
    #[must_use]
    pub fn new(edge_id: EdgeId, splits: Vec<f64>) -> Self {
        Self { edge_id, splits }
    }

    /// Executes the loop insertion, returning the new connecting edges.
    ///
    /// # Errors
    ///
    /// Returns an error if the splits are invalid or the starting edge is
    /// not allocated.
    pub fn execute(&self, mesh: &mut EditableMesh) -> Result<Vec<EdgeId>> {
        // Walk the strip, recording each loop edge oriented in walk
        // direction (the recorded vertex is the edge's entry endpoint)
        let mut loop_edges: Vec<(EdgeId, VertexId)> = Vec::new();
        let mut crossed_polygons: Vec<PolygonId> = Vec::new();

        let [start_v0, _] = mesh.edge_vertices(self.edge_id)?;
        let mut current_edge = self.edge_id;
        let mut current_entry = start_v0;
        loop {
            loop_edges.push((current_edge, current_entry));

            let connected = mesh.edge_connected_polygons(current_edge)?;
            let next_polygon = connected
                .iter()
                .copied()
                .find(|polygon_id| !crossed_polygons.contains(polygon_id));
            let Some(polygon_id) = next_polygon else {
                break;
            };
            let perimeter = mesh.polygon_perimeter_vertices(polygon_id)?;
            if perimeter.len() != 4 {
                break;
            }
            crossed_polygons.push(polygon_id);

            // Find the slot where the current edge runs along the quad
            // perimeter; the opposite edge is two corners away
            let [v0, v1] = mesh.edge_vertices(current_edge)?;
            let slot = (0..4).find(|&i| {
                let a = perimeter[i];
                let b = perimeter[(i + 1) % 4];
                (a == v0 && b == v1) || (a == v1 && b == v0)
            });
            let Some(slot) = slot else {
                break;
            };
            let near_first = perimeter[slot];
            let opposite_0 = perimeter[(slot + 2) % 4];
            let opposite_1 = perimeter[(slot + 3) % 4];
            let Some(opposite) = mesh.edge_that_connects_vertices(opposite_0, opposite_1) else {
                break;
            };
            if opposite == self.edge_id {
                break;
            }

            // Keep orientation: the side edge from this edge's entry corner
            // leads to the opposite edge's entry corner. The quad runs
            // [near_first, near_second, opposite_0, opposite_1], so
            // near_first pairs with opposite_1 and near_second with
            // opposite_0.
            let entry = if current_entry == near_first {
                opposite_1
            } else {
                opposite_0
            };

            current_edge = opposite;
            current_entry = entry;
        }

        // Split every loop edge, orienting the split fractions by the walk
        // direction so corresponding vertices pair up
        let mut new_vertices_per_edge: Vec<Vec<VertexId>> = Vec::with_capacity(loop_edges.len());
        for &(edge_id, entry_vertex) in &loop_edges {
            let [v0, _] = mesh.edge_vertices(edge_id)?;
            let oriented_splits: Vec<f64> = if v0 == entry_vertex {
                self.splits.clone()
            } else {
                self.splits.iter().map(|&t| 1.0 - t).collect()
            };
            let mut new_vertices = SplitEdge::new(edge_id, oriented_splits).execute(mesh)?;
            if v0 != entry_vertex {
                new_vertices.reverse();
            }
            new_vertices_per_edge.push(new_vertices);
        }

        // Connect corresponding new vertices across each crossed polygon
        let mut new_edge_ids = Vec::new();
        for (strip_index, &polygon_id) in crossed_polygons.iter().enumerate() {
            let near = &new_vertices_per_edge[strip_index];
            let far = &new_vertices_per_edge[(strip_index + 1) % new_vertices_per_edge.len()];
            let pairs: Vec<(VertexId, VertexId)> = near
                .iter()
                .zip(far.iter())
                .map(|(&a, &b)| (a, b))
                .collect();
            let split_spec = PolygonToSplit {
                polygon_id,
                vertex_pairs: pairs,
            };
            let created = SplitPolygons::new(vec![split_spec]).execute(mesh)?;
            new_edge_ids.extend(created);
        }

        Ok(new_edge_ids)
    }
}

/// Splits polygons along pairs of perimeter vertices, creating a new edge
/// and two smaller polygons for each pair.
pub struct SplitPolygons {
    specs: Vec<PolygonToSplit>,
}

impl SplitPolygons {
    /// Creates a new `SplitPolygons` operation.
    #[must_use]
    pub fn new(specs: Vec<PolygonToSplit>) -> Self {
        Self { specs }
    }

    /// Executes the splits, returning the new edges.
    ///
    /// # Errors
    ///
    /// Returns an error if a named vertex is not on its polygon's
    /// perimeter or a split would produce a degenerate polygon.
    pub fn execute(&self, mesh: &mut EditableMesh) -> Result<Vec<EdgeId>> {
        let mut new_edge_ids = Vec::new();

        for spec in &self.specs {
            let mut pending: Vec<PolygonId> = vec![spec.polygon_id];

            for &(vertex_a, vertex_b) in &spec.vertex_pairs {
                // The pair may apply to the original polygon or one of the
                // fragments produced by an earlier pair
                let target = pending
                    .iter()
                    .copied()
                    .find(|&polygon_id| {
                        mesh.polygon_perimeter_vertices(polygon_id)
                            .is_ok_and(|vertices| {
                                vertices.contains(&vertex_a) && vertices.contains(&vertex_b)
                            })
                    })
                    .ok_or_else(|| {
                        OperationError::Failed(format!(
                            "no polygon fragment contains both split vertices \
                             {vertex_a} and {vertex_b}"
                        ))
                    })?;

                let (fragments, created_edges) =
                    split_polygon_at(mesh, target, vertex_a, vertex_b)?;
                pending.retain(|&p| p != target);
                pending.extend(fragments);
                new_edge_ids.extend(created_edges);
            }
        }

        Ok(new_edge_ids)
    }
}

/// Splits one polygon along the chord between two perimeter vertices.
fn split_polygon_at(
    mesh: &mut EditableMesh,
    polygon_id: PolygonId,
    vertex_a: VertexId,
    vertex_b: VertexId,
) -> Result<(Vec<PolygonId>, Vec<EdgeId>)> {
    let perimeter_vertices = mesh.polygon_perimeter_vertices(polygon_id)?;
    let instances = mesh.polygon_perimeter_vertex_instances(polygon_id)?;
    let count = perimeter_vertices.len();

    let index_a = perimeter_vertices
        .iter()
        .position(|&v| v == vertex_a)
        .ok_or_else(|| {
            OperationError::Failed(format!(
                "vertex {vertex_a} is not on the perimeter of polygon {polygon_id}"
            ))
        })?;
    let index_b = perimeter_vertices
        .iter()
        .position(|&v| v == vertex_b)
        .ok_or_else(|| {
            OperationError::Failed(format!(
                "vertex {vertex_b} is not on the perimeter of polygon {polygon_id}"
            ))
        })?;

    // Walk from a to b (inclusive) for one side, b to a for the other
    let side = |from: usize, to: usize| -> Vec<VertexInstanceId> {
        let mut contour = Vec::new();
        let mut i = from;
        loop {
            contour.push(instances[i]);
            if i == to {
                break;
            }
            i = (i + 1) % count;
        }
        contour
    };
    let contour_a = side(index_a, index_b);
    let contour_b = side(index_b, index_a);
    if contour_a.len() < 3 || contour_b.len() < 3 {
        return Err(OperationError::Failed(
            "split would produce a polygon with fewer than 3 vertices".into(),
        )
        .into());
    }

    let group = mesh.topology().polygon(polygon_id)?.group;
    let to_corners = |contour: &[VertexInstanceId]| -> Vec<VertexAndAttributes> {
        contour
            .iter()
            .map(|&instance_id| VertexAndAttributes::existing_instance(instance_id))
            .collect()
    };

    let (new_polygon_ids, new_edge_ids) = mesh.create_polygons(&[
        PolygonToCreate::in_group(group, to_corners(&contour_a)),
        PolygonToCreate::in_group(group, to_corners(&contour_b)),
    ])?;

    // The fragments own the contours now; the original goes away without
    // cascading (its edges and instances are all still in use)
    mesh.delete_polygons(&[polygon_id], false, false, false, false)?;

    Ok((new_polygon_ids, new_edge_ids))
}
