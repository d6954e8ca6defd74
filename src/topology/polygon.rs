use serde::{Deserialize, Serialize};

use super::{PolygonGroupId, VertexInstanceId};

/// An ordered, counter-clockwise loop of vertex instances.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Contour {
    pub vertex_instances: Vec<VertexInstanceId>,
}

impl Contour {
    #[must_use]
    pub fn new(vertex_instances: Vec<VertexInstanceId>) -> Self {
        Self { vertex_instances }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vertex_instances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertex_instances.is_empty()
    }
}

/// One triangle of a polygon's cached triangulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triangle {
    pub vertex_instances: [VertexInstanceId; 3],
}

impl Triangle {
    #[must_use]
    pub fn new(a: VertexInstanceId, b: VertexInstanceId, c: VertexInstanceId) -> Self {
        Self {
            vertex_instances: [a, b, c],
        }
    }
}

/// A polygon: a perimeter contour, optional hole contours, and a cached
/// triangulation used for rendering and geometric queries.
///
/// The triangulation's vertex instances are always a subset of the contour
/// instances (perimeter plus holes). A polygon belongs to exactly one group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Polygon {
    /// The group (rendering section) this polygon belongs to.
    pub group: PolygonGroupId,

    /// The outer boundary, wound counter-clockwise.
    pub perimeter: Contour,

    /// Inner hole boundaries.
    pub holes: Vec<Contour>,

    /// Cached triangulation of the contours.
    pub triangles: Vec<Triangle>,
}

impl Polygon {
    #[must_use]
    pub fn new(group: PolygonGroupId) -> Self {
        Self {
            group,
            perimeter: Contour::default(),
            holes: Vec::new(),
            triangles: Vec::new(),
        }
    }

    /// Iterates the perimeter contour followed by every hole contour.
    pub fn contours(&self) -> impl Iterator<Item = &Contour> {
        std::iter::once(&self.perimeter).chain(self.holes.iter())
    }

    /// Returns `true` if any contour references `instance`.
    #[must_use]
    pub fn references_instance(&self, instance: VertexInstanceId) -> bool {
        self.contours()
            .any(|contour| contour.vertex_instances.contains(&instance))
    }
}
