use serde::{Deserialize, Serialize};

use super::PolygonId;

/// The analogue of a material/rendering section.
///
/// The polygon list and every member polygon's `group` field agree at all
/// times outside a modification session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolygonGroup {
    /// Path or name of the material asset applied to this group.
    pub material_asset: String,

    /// Whether this group's polygons cast shadows.
    pub casts_shadow: bool,

    /// Whether this group's polygons participate in collision.
    pub collision_enabled: bool,

    /// Polygons assigned to this group.
    pub polygons: Vec<PolygonId>,
}

impl PolygonGroup {
    #[must_use]
    pub fn new(material_asset: String) -> Self {
        Self {
            material_asset,
            casts_shadow: true,
            collision_enabled: true,
            polygons: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }
}
