use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// The kinds of element a mesh is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Vertex,
    VertexInstance,
    Edge,
    Polygon,
    PolygonGroup,
}

/// Common interface of the typed element ID newtypes.
///
/// An ID is a plain index into one specific sparse store. IDs of different
/// element kinds share the representation but are distinct types; the
/// `INVALID` sentinel is the all-ones index.
pub trait ElementId: Copy + Eq + Ord + Hash + fmt::Debug {
    const KIND: ElementKind;
    const INVALID: Self;

    fn new(index: u32) -> Self;

    fn index(self) -> u32;

    #[must_use]
    fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

macro_rules! define_element_id {
    ($(#[$meta:meta])* $name:ident, $kind:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(u32);

        impl ElementId for $name {
            const KIND: ElementKind = ElementKind::$kind;
            const INVALID: Self = Self(u32::MAX);

            fn new(index: u32) -> Self {
                Self(index)
            }

            fn index(self) -> u32 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.0 == u32::MAX {
                    write!(f, concat!(stringify!($name), "(invalid)"))
                } else {
                    write!(f, concat!(stringify!($name), "({})"), self.0)
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.0 == u32::MAX {
                    write!(f, "invalid")
                } else {
                    write!(f, "{}", self.0)
                }
            }
        }
    };
}

define_element_id! {
    /// Unique identifier for a vertex.
    VertexId, Vertex
}

define_element_id! {
    /// Unique identifier for a vertex instance (one polygon corner's use of a vertex).
    VertexInstanceId, VertexInstance
}

define_element_id! {
    /// Unique identifier for an edge.
    EdgeId, Edge
}

define_element_id! {
    /// Unique identifier for a polygon.
    PolygonId, Polygon
}

define_element_id! {
    /// Unique identifier for a polygon group (a material/rendering section).
    PolygonGroupId, PolygonGroup
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_sentinel_is_not_valid() {
        assert!(!VertexId::INVALID.is_valid());
        assert!(VertexId::new(0).is_valid());
    }

    #[test]
    fn ids_are_ordered_by_index() {
        assert!(EdgeId::new(1) < EdgeId::new(2));
        assert!(EdgeId::new(7) < EdgeId::INVALID);
    }

    #[test]
    fn debug_formats_index() {
        assert_eq!(format!("{:?}", PolygonId::new(3)), "PolygonId(3)");
        assert_eq!(format!("{:?}", PolygonId::INVALID), "PolygonId(invalid)");
    }
}
