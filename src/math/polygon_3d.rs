use super::{Point2, Point3, Vector3, TOLERANCE};

/// Orthonormal basis of the plane a polygon lies in.
///
/// Built from the polygon normal; `u_dir` and `v_dir` span the plane so
/// that `(u, v, normal)` forms a right-handed frame. Counter-clockwise
/// contours project to counter-clockwise 2D loops.
#[derive(Debug, Clone)]
pub struct PolygonPlane {
    pub origin: Point3,
    pub normal: Vector3,
    pub u_dir: Vector3,
    pub v_dir: Vector3,
}

impl PolygonPlane {
    /// Builds the plane basis for a contour of coplanar points.
    ///
    /// Returns `None` for contours too degenerate to define a normal.
    #[must_use]
    pub fn from_contour(points: &[Point3]) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }
        let normal = polygon_normal(points)?;
        let origin = polygon_center(points);

        // Pick the world axis least aligned with the normal to seed the basis
        let seed = if normal.x.abs() < normal.y.abs() && normal.x.abs() < normal.z.abs() {
            Vector3::new(1.0, 0.0, 0.0)
        } else if normal.y.abs() < normal.z.abs() {
            Vector3::new(0.0, 1.0, 0.0)
        } else {
            Vector3::new(0.0, 0.0, 1.0)
        };

        let u_dir = seed.cross(&normal).normalize();
        let v_dir = normal.cross(&u_dir);

        Some(Self {
            origin,
            normal,
            u_dir,
            v_dir,
        })
    }

    /// Projects a 3D point into this plane's `(u, v)` coordinates.
    #[must_use]
    pub fn project(&self, point: &Point3) -> Point2 {
        let d = point - self.origin;
        Point2::new(d.dot(&self.u_dir), d.dot(&self.v_dir))
    }
}

/// Computes the unit normal of a polygon contour using Newell's method.
///
/// Robust for non-convex and slightly non-planar contours. Returns `None`
/// when the contour encloses no area (collinear or duplicate points).
#[must_use]
pub fn polygon_normal(points: &[Point3]) -> Option<Vector3> {
    let n = points.len();
    if n < 3 {
        return None;
    }
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let a = &points[i];
        let b = &points[(i + 1) % n];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    let len = normal.norm();
    if len < TOLERANCE {
        return None;
    }
    Some(normal / len)
}

/// Computes the average of a polygon's contour points.
#[must_use]
pub fn polygon_center(points: &[Point3]) -> Point3 {
    let mut sum = Vector3::zeros();
    for p in points {
        sum += p.coords;
    }
    Point3::from(sum / points.len() as f64)
}

/// Computes the area of a 3D polygon (coplanar points).
///
/// Uses the cross-product summation method projected along the polygon normal.
#[must_use]
pub fn polygon_area_3d(points: &[Point3], normal: &Vector3) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let n = points.len();
    let mut cross_sum = Vector3::zeros();
    let o = &points[0];
    for i in 1..n {
        let a = points[i] - o;
        let b = points[(i + 1) % n] - o;
        cross_sum += a.cross(&b);
    }
    0.5 * cross_sum.dot(normal).abs()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn unit_square() -> Vec<Point3> {
        vec![
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn ccw_square_normal_points_up() {
        let normal = polygon_normal(&unit_square()).unwrap();
        assert!((normal - Vector3::new(0.0, 0.0, 1.0)).norm() < TOLERANCE);
    }

    #[test]
    fn cw_square_normal_points_down() {
        let mut points = unit_square();
        points.reverse();
        let normal = polygon_normal(&points).unwrap();
        assert!((normal - Vector3::new(0.0, 0.0, -1.0)).norm() < TOLERANCE);
    }

    #[test]
    fn collinear_contour_has_no_normal() {
        let points = vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0)];
        assert!(polygon_normal(&points).is_none());
    }

    #[test]
    fn ccw_contour_projects_ccw() {
        let plane = PolygonPlane::from_contour(&unit_square()).unwrap();
        let uvs: Vec<Point2> = unit_square().iter().map(|pt| plane.project(pt)).collect();
        let mut area = 0.0;
        for i in 0..uvs.len() {
            let a = &uvs[i];
            let b = &uvs[(i + 1) % uvs.len()];
            area += a.x * b.y - b.x * a.y;
        }
        assert!(area > 0.0, "projected area = {area}, expected positive");
    }

    #[test]
    fn unit_square_area() {
        let area = polygon_area_3d(&unit_square(), &Vector3::new(0.0, 0.0, 1.0));
        assert!((area - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn triangle_area() {
        let tri = vec![p(0.0, 0.0, 0.0), p(4.0, 0.0, 0.0), p(0.0, 3.0, 0.0)];
        let area = polygon_area_3d(&tri, &Vector3::new(0.0, 0.0, 1.0));
        assert!((area - 6.0).abs() < TOLERANCE);
    }

    #[test]
    fn center_of_square() {
        let center = polygon_center(&unit_square());
        assert!((center - p(0.5, 0.5, 0.0)).norm() < TOLERANCE);
    }
}
