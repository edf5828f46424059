//! Line segment shape.

use super::ShapeProps;
use crate::geom::GlobalPoint;
use crate::protocol::ShapePatch;
use crate::snap::snap_to_grid;
use serde::{Deserialize, Serialize};

/// A line segment between two world points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub props: ShapeProps,
    pub ref_point: GlobalPoint,
    pub end_point: GlobalPoint,
}

impl Line {
    pub fn new(
        uuid: super::ShapeId,
        layer: &str,
        ref_point: GlobalPoint,
        end_point: GlobalPoint,
    ) -> Self {
        Self::with_props(ShapeProps::new(uuid, layer), ref_point, end_point)
    }

    pub(crate) fn with_props(
        props: ShapeProps,
        ref_point: GlobalPoint,
        end_point: GlobalPoint,
    ) -> Self {
        Self {
            props,
            ref_point,
            end_point,
        }
    }

    pub fn length(&self) -> f64 {
        self.ref_point.distance(self.end_point)
    }

    pub fn bounds(&self) -> kurbo::Rect {
        kurbo::Rect::new(
            self.ref_point.x.min(self.end_point.x),
            self.ref_point.y.min(self.end_point.y),
            self.ref_point.x.max(self.end_point.x),
            self.ref_point.y.max(self.end_point.y),
        )
    }

    /// Snaps both endpoints to grid intersections.
    pub fn snap_to_grid(&mut self, grid_size: f64) {
        self.ref_point = snap_to_grid(self.ref_point, grid_size);
        self.end_point = snap_to_grid(self.end_point, grid_size);
    }

    pub(crate) fn apply_patch(&mut self, patch: &ShapePatch) {
        self.props.apply_patch(patch);
        if let Some(x) = patch.x {
            self.ref_point.x = x;
        }
        if let Some(y) = patch.y {
            self.ref_point.y = y;
        }
        if let Some(x2) = patch.x2 {
            self.end_point.x = x2;
        }
        if let Some(y2) = patch.y2 {
            self.end_point.y = y2;
        }
    }
}
