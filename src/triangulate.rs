//! Polygon triangulation.
//!
//! Contours are projected into the polygon plane and run through a
//! constrained Delaunay triangulation; a flood-fill over the constraint
//! edges discards the triangles inside holes. The result names the
//! polygon's own vertex instances, so it is always a subset of the contour
//! instances, and identical input produces identical output.

use std::collections::{HashMap, HashSet, VecDeque};

use spade::handles::FixedFaceHandle;
use spade::{
    ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation,
};

use crate::error::{Result, TriangulationError};
use crate::math::polygon_3d::PolygonPlane;
use crate::math::Point3;
use crate::topology::{ElementId, MeshTopology, PolygonId, Triangle, VertexInstanceId};

/// Computes the triangulation of a polygon's contours.
///
/// # Errors
///
/// Returns an error if the perimeter is degenerate (no definable plane) or
/// a contour point cannot be inserted into the triangulation.
pub fn triangulate_polygon(topology: &MeshTopology, polygon_id: PolygonId) -> Result<Vec<Triangle>> {
    let polygon = topology.polygon(polygon_id)?;

    let perimeter = &polygon.perimeter.vertex_instances;

    // A triangle is its own triangulation
    if perimeter.len() == 3 && polygon.holes.is_empty() {
        return Ok(vec![Triangle::new(perimeter[0], perimeter[1], perimeter[2])]);
    }

    let perimeter_points = contour_positions(topology, perimeter)?;
    let plane = PolygonPlane::from_contour(&perimeter_points).ok_or_else(|| {
        TriangulationError::DegenerateContour(format!(
            "polygon {polygon_id} encloses no area"
        ))
    })?;

    let mut cdt = ConstrainedDelaunayTriangulation::<SpadePoint2<f64>>::new();
    let mut instance_for_handle: HashMap<usize, VertexInstanceId> = HashMap::new();

    insert_constraint_loop(
        &mut cdt,
        &mut instance_for_handle,
        &plane,
        &perimeter_points,
        perimeter,
    )?;
    for hole in &polygon.holes {
        let hole_points = contour_positions(topology, &hole.vertex_instances)?;
        insert_constraint_loop(
            &mut cdt,
            &mut instance_for_handle,
            &plane,
            &hole_points,
            &hole.vertex_instances,
        )?;
    }

    let interior_faces = classify_interior_faces(&cdt);

    let mut triangles = Vec::new();
    for face_handle in cdt.inner_faces() {
        if !interior_faces.contains(&face_handle.fix().index()) {
            continue;
        }
        let vertices = face_handle.vertices();
        let mut corners = [VertexInstanceId::INVALID; 3];
        for (corner, vertex_handle) in corners.iter_mut().zip(vertices.iter()) {
            *corner = *instance_for_handle
                .get(&vertex_handle.fix().index())
                .ok_or_else(|| {
                    TriangulationError::Failed(format!(
                        "triangulation of polygon {polygon_id} produced an unknown vertex"
                    ))
                })?;
        }
        triangles.push(Triangle::new(corners[0], corners[1], corners[2]));
    }

    if triangles.is_empty() {
        return Err(TriangulationError::DegenerateContour(format!(
            "polygon {polygon_id} produced no interior triangles"
        ))
        .into());
    }

    Ok(triangles)
}

fn contour_positions(
    topology: &MeshTopology,
    instances: &[VertexInstanceId],
) -> Result<Vec<Point3>> {
    instances
        .iter()
        .map(|&instance_id| {
            let instance = topology.vertex_instance(instance_id)?;
            Ok(topology.vertex(instance.vertex)?.position)
        })
        .collect()
}

/// Inserts a closed contour as constraint edges, recording which vertex
/// instance each triangulation vertex came from.
fn insert_constraint_loop(
    cdt: &mut ConstrainedDelaunayTriangulation<SpadePoint2<f64>>,
    instance_for_handle: &mut HashMap<usize, VertexInstanceId>,
    plane: &PolygonPlane,
    points: &[Point3],
    instances: &[VertexInstanceId],
) -> Result<()> {
    if points.len() < 3 {
        return Err(TriangulationError::DegenerateContour(
            "constraint loop needs at least 3 points".into(),
        )
        .into());
    }

    let mut handles = Vec::with_capacity(points.len());
    for (point, &instance_id) in points.iter().zip(instances) {
        let uv = plane.project(point);
        let handle = cdt
            .insert(SpadePoint2::new(uv.x, uv.y))
            .map_err(|e: InsertionError| {
                TriangulationError::Failed(format!("CDT insert: {e}"))
            })?;
        instance_for_handle
            .entry(handle.index())
            .or_insert(instance_id);
        handles.push(handle);
    }

    for i in 0..handles.len() {
        let from = handles[i];
        let to = handles[(i + 1) % handles.len()];
        if from != to {
            cdt.add_constraint(from, to);
        }
    }

    Ok(())
}

/// Flood-fills the CDT to decide which inner faces lie inside the polygon.
///
/// The fill starts outside (at the faces touching the infinite outer face)
/// and toggles an inside/outside flag every time it crosses a constraint
/// edge — the perimeter flips it on, a hole boundary flips it off again.
fn classify_interior_faces(
    cdt: &ConstrainedDelaunayTriangulation<SpadePoint2<f64>>,
) -> HashSet<usize> {
    let mut interior = HashSet::new();
    let mut visited: HashSet<usize> = HashSet::new();
    let mut queue: VecDeque<(FixedFaceHandle<spade::handles::InnerTag>, bool)> = VecDeque::new();

    let outer_fix = cdt.outer_face().fix();

    // Seed with the inner faces bordering the outer face
    for edge in cdt.directed_edges() {
        if edge.face().fix() != outer_fix {
            continue;
        }
        if let Some(inner) = edge.rev().face().as_inner() {
            let index = inner.fix().index();
            if visited.insert(index) {
                let inside = cdt.is_constraint_edge(edge.as_undirected().fix());
                if inside {
                    interior.insert(index);
                }
                queue.push_back((inner.fix(), inside));
            }
        }
    }

    while let Some((face_fix, inside)) = queue.pop_front() {
        for edge in cdt.face(face_fix).adjacent_edges() {
            if let Some(neighbor) = edge.rev().face().as_inner() {
                let index = neighbor.fix().index();
                if !visited.insert(index) {
                    continue;
                }
                let neighbor_inside =
                    inside != cdt.is_constraint_edge(edge.as_undirected().fix());
                if neighbor_inside {
                    interior.insert(index);
                }
                queue.push_back((neighbor.fix(), neighbor_inside));
            }
        }
    }

    interior
}
