//! Viewport containment

use serde::{Deserialize, Serialize};

/// Element rectangle in viewport pixel coordinates, as reported by
/// `getBoundingClientRect()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub top: f64,
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

/// A bounding box sampled together with the viewport it was measured in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    #[serde(flatten)]
    pub rect: BoundingBox,
    pub viewport_height: f64,
}

impl Placement {
    pub fn in_viewport(&self) -> bool {
        is_in_viewport(&self.rect, self.viewport_height)
    }
}

/// An element counts as in the viewport when its top edge lies within
/// `[0, viewport_height]`. The bottom edge and horizontal axis are ignored.
pub fn is_in_viewport(rect: &BoundingBox, viewport_height: f64) -> bool {
    rect.top >= 0.0 && rect.top <= viewport_height
}
