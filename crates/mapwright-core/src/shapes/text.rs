//! Text label shape.

use super::ShapeProps;
use crate::geom::GlobalPoint;
use crate::protocol::ShapePatch;
use crate::snap::snap_to_grid;
use serde::{Deserialize, Serialize};

/// Average glyph advance relative to font size, for rough label bounds.
const GLYPH_ASPECT: f64 = 0.6;

/// A text label anchored at its top-left reference point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub props: ShapeProps,
    pub ref_point: GlobalPoint,
    pub text: String,
    /// Font size in world units.
    pub font_size: f64,
}

impl Text {
    pub fn new(
        uuid: super::ShapeId,
        layer: &str,
        ref_point: GlobalPoint,
        text: String,
        font_size: f64,
    ) -> Self {
        Self::with_props(ShapeProps::new(uuid, layer), ref_point, text, font_size)
    }

    pub(crate) fn with_props(
        props: ShapeProps,
        ref_point: GlobalPoint,
        text: String,
        font_size: f64,
    ) -> Self {
        Self {
            props,
            ref_point,
            text,
            font_size,
        }
    }

    /// Approximate bounds; exact metrics belong to the rendering collaborator.
    pub fn bounds(&self) -> kurbo::Rect {
        let width = self.text.chars().count() as f64 * self.font_size * GLYPH_ASPECT;
        kurbo::Rect::new(
            self.ref_point.x,
            self.ref_point.y,
            self.ref_point.x + width,
            self.ref_point.y + self.font_size,
        )
    }

    /// Labels snap by reference point only; their size follows the font.
    pub fn snap_to_grid(&mut self, grid_size: f64) {
        self.ref_point = snap_to_grid(self.ref_point, grid_size);
    }

    pub(crate) fn apply_patch(&mut self, patch: &ShapePatch) {
        self.props.apply_patch(patch);
        if let Some(x) = patch.x {
            self.ref_point.x = x;
        }
        if let Some(y) = patch.y {
            self.ref_point.y = y;
        }
        if let Some(text) = &patch.text {
            self.text = text.clone();
        }
        if let Some(fs) = patch.font_size {
            self.font_size = fs;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_patch_text() {
        let uuid = Uuid::new_v4();
        let mut label = Text::new(uuid, "notes", GlobalPoint::ZERO, "old".to_string(), 20.0);
        let mut patch = ShapePatch::empty(uuid, "notes");
        patch.text = Some("new".to_string());
        label.apply_patch(&patch);
        assert_eq!(label.text, "new");
        assert!((label.font_size - 20.0).abs() < f64::EPSILON);
    }
}
