//! Statically typed element attributes.
//!
//! Attribute writes travel through these enums — one variant per attribute
//! kind, with a typed payload — so undo records, adapter notifications and
//! the kernel all agree on what an attribute value is.

use serde::{Deserialize, Serialize};

use crate::math::{Point3, Vector2, Vector3, Vector4};

/// An attribute carried by a vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VertexAttribute {
    Position(Point3),
    CornerSharpness(f64),
}

/// An attribute carried by a vertex instance (a polygon corner).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VertexInstanceAttribute {
    Normal(Vector3),
    Tangent(Vector3),
    BinormalSign(f64),
    Uv { channel: usize, value: Vector2 },
    Color(Vector4),
}

/// An attribute carried by an edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EdgeAttribute {
    IsHard(bool),
    CreaseSharpness(f64),
}

/// An attribute carried by a polygon group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PolygonGroupAttribute {
    MaterialAsset(String),
    CastsShadow(bool),
    CollisionEnabled(bool),
}
