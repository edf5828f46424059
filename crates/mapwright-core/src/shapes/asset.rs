//! Image asset shape (tokens, maps).

use super::ShapeProps;
use crate::geom::GlobalPoint;
use crate::protocol::ShapePatch;
use crate::snap::{snap_extent, snap_to_grid};
use serde::{Deserialize, Serialize};

/// An image placed on the board, anchored at its top-left corner.
///
/// The core only tracks the source URL; decoding and drawing are the
/// rendering collaborator's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub props: ShapeProps,
    pub ref_point: GlobalPoint,
    pub w: f64,
    pub h: f64,
    pub src: String,
}

impl Asset {
    pub fn new(
        uuid: super::ShapeId,
        layer: &str,
        ref_point: GlobalPoint,
        w: f64,
        h: f64,
        src: String,
    ) -> Self {
        Self::with_props(ShapeProps::new(uuid, layer), ref_point, w, h, src)
    }

    pub(crate) fn with_props(
        props: ShapeProps,
        ref_point: GlobalPoint,
        w: f64,
        h: f64,
        src: String,
    ) -> Self {
        Self {
            props,
            ref_point,
            w,
            h,
            src,
        }
    }

    pub fn bounds(&self) -> kurbo::Rect {
        kurbo::Rect::new(
            self.ref_point.x,
            self.ref_point.y,
            self.ref_point.x + self.w,
            self.ref_point.y + self.h,
        )
    }

    pub fn snap_to_grid(&mut self, grid_size: f64) {
        self.ref_point = snap_to_grid(self.ref_point, grid_size);
        self.w = snap_extent(self.w, grid_size);
        self.h = snap_extent(self.h, grid_size);
    }

    pub(crate) fn apply_patch(&mut self, patch: &ShapePatch) {
        self.props.apply_patch(patch);
        if let Some(x) = patch.x {
            self.ref_point.x = x;
        }
        if let Some(y) = patch.y {
            self.ref_point.y = y;
        }
        if let Some(w) = patch.w {
            self.w = w;
        }
        if let Some(h) = patch.h {
            self.h = h;
        }
        if let Some(src) = &patch.src {
            self.src = src.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_token_drop_snap() {
        // A 70x38 token dropped near a cell corner lands on the grid at
        // token scale: position rounded, size at least one cell.
        let mut token = Asset::new(
            Uuid::new_v4(),
            "tokens",
            GlobalPoint::new(48.0, 53.0),
            70.0,
            38.0,
            "goblin.png".to_string(),
        );
        token.snap_to_grid(50.0);
        assert_eq!(token.ref_point, GlobalPoint::new(50.0, 50.0));
        assert!((token.w - 50.0).abs() < f64::EPSILON);
        assert!((token.h - 50.0).abs() < f64::EPSILON);
    }
}
