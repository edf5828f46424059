//! Axis-aligned rectangle shape.

use super::ShapeProps;
use crate::geom::GlobalPoint;
use crate::protocol::ShapePatch;
use crate::snap::{snap_extent, snap_to_grid};
use serde::{Deserialize, Serialize};

/// A rectangle anchored at its top-left reference point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub props: ShapeProps,
    /// Top-left corner in world units.
    pub ref_point: GlobalPoint,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(uuid: super::ShapeId, layer: &str, ref_point: GlobalPoint, w: f64, h: f64) -> Self {
        Self::with_props(ShapeProps::new(uuid, layer), ref_point, w, h)
    }

    pub(crate) fn with_props(props: ShapeProps, ref_point: GlobalPoint, w: f64, h: f64) -> Self {
        Self {
            props,
            ref_point,
            w,
            h,
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
    }
}
