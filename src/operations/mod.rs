//! High-level editing operations.
//!
//! Each operation is a struct configured up front and applied with
//! `execute(&mut mesh)`. Operations are built entirely from the kernel's
//! low-level surface, so every one of them is undoable through the mesh's
//! ordinary change record; callers bracket them in a modification session.

pub mod bevel;
pub mod delete;
pub mod extrude;
pub mod flip;
pub mod split;
pub mod triangulate;
pub mod weld;

pub use bevel::{BevelPolygons, InsetMode, InsetPolygons};
pub use delete::{DeleteEdgeAndConnectedPolygons, DeleteVertexAndConnectedEdgesAndPolygons};
pub use extrude::ExtrudePolygons;
pub use flip::FlipPolygons;
pub use split::{InsertEdgeLoop, SplitEdge, SplitPolygons};
pub use triangulate::TriangulatePolygons;
pub use weld::WeldVertices;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{Point3, TOLERANCE};
    use crate::mesh::specs::{
        PolygonGroupToCreate, PolygonToCreate, PolygonToSplit, VertexAndAttributes, VertexToCreate,
    };
    use crate::mesh::{EditableMesh, ModificationType, TopologyChange};
    use crate::topology::{PolygonGroupId, PolygonId, VertexId};

    fn quad_mesh() -> (EditableMesh, PolygonGroupId, Vec<VertexId>, PolygonId) {
        let mut mesh = EditableMesh::new();
        mesh.start_modification(ModificationType::Final, TopologyChange::TopologyChange)
            .unwrap();
        let group = mesh
            .create_polygon_groups(&[PolygonGroupToCreate::with_material("M_Default")])
            .unwrap()[0];
        let corners = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let vertices = mesh
            .create_vertices(
                &corners
                    .iter()
                    .map(|&p| VertexToCreate::at_position(p))
                    .collect::<Vec<_>>(),
            )
            .unwrap();
        let (polygons, _) = mesh
            .create_polygons(&[PolygonToCreate::in_group(
                group,
                vertices
                    .iter()
                    .map(|&v| VertexAndAttributes::new_instance_of(v))
                    .collect(),
            )])
            .unwrap();
        mesh.end_modification(false).unwrap();
        (mesh, group, vertices, polygons[0])
    }

    fn in_session<T>(
        mesh: &mut EditableMesh,
        f: impl FnOnce(&mut EditableMesh) -> crate::error::Result<T>,
    ) -> T {
        mesh.start_modification(ModificationType::Final, TopologyChange::TopologyChange)
            .unwrap();
        let value = f(mesh).unwrap();
        mesh.end_modification(false).unwrap();
        value
    }

    #[test]
    fn split_edge_splices_every_connected_polygon() {
        let (mut mesh, _, vertices, polygon) = quad_mesh();
        let edge = mesh
            .edge_that_connects_vertices(vertices[0], vertices[1])
            .unwrap();

        let new_vertices = in_session(&mut mesh, |mesh| {
            SplitEdge::new(edge, vec![0.5]).execute(mesh)
        });

        assert_eq!(new_vertices.len(), 1);
        assert_eq!(mesh.vertex_count(), 5);
        assert_eq!(mesh.edge_count(), 5);
        assert_eq!(mesh.polygon_perimeter_vertices(polygon).unwrap().len(), 5);
        let midpoint = mesh.topology().vertex(new_vertices[0]).unwrap().position;
        assert!((midpoint - Point3::new(0.5, 0.0, 0.0)).norm() < TOLERANCE);
        mesh.topology().validate().unwrap();
    }

    #[test]
    fn split_edge_round_trips_through_undo() {
        let (mut mesh, _, vertices, polygon) = quad_mesh();
        mesh.make_undo();
        let edge = mesh
            .edge_that_connects_vertices(vertices[0], vertices[1])
            .unwrap();

        in_session(&mut mesh, |mesh| SplitEdge::new(edge, vec![0.25, 0.75]).execute(mesh));
        assert_eq!(mesh.vertex_count(), 6);

        let undo = mesh.make_undo().unwrap();
        let redo = undo.execute(&mut mesh).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.edge_count(), 4);
        assert_eq!(mesh.polygon_perimeter_vertices(polygon).unwrap().len(), 4);
        mesh.topology().validate().unwrap();

        redo.execute(&mut mesh).unwrap();
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.polygon_perimeter_vertices(polygon).unwrap().len(), 6);
        mesh.topology().validate().unwrap();
    }

    #[test]
    fn split_polygon_along_a_chord() {
        let (mut mesh, _, vertices, polygon) = quad_mesh();

        let new_edges = in_session(&mut mesh, |mesh| {
            SplitPolygons::new(vec![PolygonToSplit {
                polygon_id: polygon,
                vertex_pairs: vec![(vertices[0], vertices[2])],
            }])
            .execute(mesh)
        });

        assert_eq!(new_edges.len(), 1);
        assert_eq!(mesh.polygon_count(), 2);
        assert_eq!(mesh.edge_count(), 5);
        assert!(!mesh.is_valid_polygon(polygon));
        mesh.topology().validate().unwrap();
    }

    #[test]
    fn insert_edge_loop_across_a_quad() {
        let (mut mesh, _, vertices, _) = quad_mesh();
        let edge = mesh
            .edge_that_connects_vertices(vertices[0], vertices[1])
            .unwrap();

        let new_edges = in_session(&mut mesh, |mesh| {
            InsertEdgeLoop::new(edge, vec![0.5]).execute(mesh)
        });

        assert_eq!(new_edges.len(), 1);
        assert_eq!(mesh.polygon_count(), 2);
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.edge_count(), 7);
        mesh.topology().validate().unwrap();

        // The loop cut both opposing edges at their midpoints
        let [a, b] = mesh.edge_vertices(new_edges[0]).unwrap();
        let pa = mesh.topology().vertex(a).unwrap().position;
        let pb = mesh.topology().vertex(b).unwrap().position;
        let mut ys = [pa.y, pb.y];
        ys.sort_by(f64::total_cmp);
        assert!((pa.x - 0.5).abs() < TOLERANCE && (pb.x - 0.5).abs() < TOLERANCE);
        assert!((ys[0] - 0.0).abs() < TOLERANCE && (ys[1] - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn flip_reverses_winding() {
        let (mut mesh, _, _, polygon) = quad_mesh();
        let before = mesh.compute_polygon_normal(polygon).unwrap();

        in_session(&mut mesh, |mesh| {
            FlipPolygons::new(vec![polygon]).execute(mesh)
        });

        let after = mesh.compute_polygon_normal(polygon).unwrap();
        assert!((before + after).norm() < TOLERANCE);
        mesh.topology().validate().unwrap();
    }

    #[test]
    fn triangulate_replaces_quad_with_two_triangles() {
        let (mut mesh, _, _, polygon) = quad_mesh();

        let triangles = in_session(&mut mesh, |mesh| {
            TriangulatePolygons::new(vec![polygon]).execute(mesh)
        });

        assert_eq!(triangles.len(), 2);
        assert_eq!(mesh.polygon_count(), 2);
        assert_eq!(mesh.edge_count(), 5);
        assert!(!mesh.is_valid_polygon(polygon));
        for triangle in triangles {
            assert_eq!(mesh.polygon_perimeter_vertices(triangle).unwrap().len(), 3);
        }
        mesh.topology().validate().unwrap();
    }

    #[test]
    fn weld_collapses_an_edge_of_a_quad() {
        let (mut mesh, _, vertices, _) = quad_mesh();

        let welded = in_session(&mut mesh, |mesh| {
            WeldVertices::new(vec![vertices[0], vertices[1]]).execute(mesh)
        });

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.polygon_count(), 1);
        assert_eq!(mesh.edge_count(), 3);
        assert!(mesh.is_valid_vertex(welded));
        assert!(!mesh.is_valid_vertex(vertices[0]));
        assert!(!mesh.is_valid_vertex(vertices[1]));
        let position = mesh.topology().vertex(welded).unwrap().position;
        assert!((position - Point3::new(0.0, 0.0, 0.0)).norm() < TOLERANCE);
        mesh.topology().validate().unwrap();
    }

    #[test]
    fn extrude_builds_front_and_side_polygons() {
        let (mut mesh, _, _, polygon) = quad_mesh();

        let fronts = in_session(&mut mesh, |mesh| {
            ExtrudePolygons::new(vec![polygon], 1.0, true).execute(mesh)
        });

        assert_eq!(fronts.len(), 1);
        assert_eq!(mesh.polygon_count(), 5);
        assert_eq!(mesh.vertex_count(), 8);
        assert!(!mesh.is_valid_polygon(polygon));

        // The front polygon sits one unit along the original normal
        let front_center = mesh.compute_polygon_center(fronts[0]).unwrap();
        assert!((front_center - Point3::new(0.5, 0.5, 1.0)).norm() < TOLERANCE);
        mesh.topology().validate().unwrap();
    }

    #[test]
    fn inset_builds_center_and_ring() {
        let (mut mesh, _, _, polygon) = quad_mesh();

        let (centers, sides) = in_session(&mut mesh, |mesh| {
            InsetPolygons::new(vec![polygon], 0.0, 0.5, InsetMode::All).execute(mesh)
        });

        assert_eq!(centers.len(), 1);
        assert_eq!(sides.len(), 4);
        assert_eq!(mesh.polygon_count(), 5);
        assert_eq!(mesh.vertex_count(), 8);

        let center_center = mesh.compute_polygon_center(centers[0]).unwrap();
        assert!((center_center - Point3::new(0.5, 0.5, 0.0)).norm() < TOLERANCE);
        mesh.topology().validate().unwrap();
    }

    #[test]
    fn delete_vertex_cascades_through_edges_and_polygons() {
        let (mut mesh, _, vertices, _) = quad_mesh();

        in_session(&mut mesh, |mesh| {
            DeleteVertexAndConnectedEdgesAndPolygons::new(vertices[0], true, true, true, true)
                .execute(mesh)
        });

        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.edge_count(), 0);
        assert_eq!(mesh.polygon_count(), 0);
        assert_eq!(mesh.polygon_group_count(), 0);
    }
}
