//! Circle shape.

use super::ShapeProps;
use crate::geom::GlobalPoint;
use crate::protocol::ShapePatch;
use crate::snap::{snap_radius, snap_to_grid};
use serde::{Deserialize, Serialize};

/// A circle; the reference point is its center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub props: ShapeProps,
    pub center: GlobalPoint,
    pub r: f64,
}

impl Circle {
    pub fn new(uuid: super::ShapeId, layer: &str, center: GlobalPoint, r: f64) -> Self {
        Self::with_props(ShapeProps::new(uuid, layer), center, r)
    }

    pub(crate) fn with_props(props: ShapeProps, center: GlobalPoint, r: f64) -> Self {
        Self { props, center, r }
    }

    pub fn bounds(&self) -> kurbo::Rect {
        kurbo::Rect::new(
            self.center.x - self.r,
            self.center.y - self.r,
            self.center.x + self.r,
            self.center.y + self.r,
        )
    }

    /// Snaps the center to the grid and the radius to half cells, so the
    /// snapped diameter spans a whole number of cells (at least one).
    pub fn snap_to_grid(&mut self, grid_size: f64) {
        self.center = snap_to_grid(self.center, grid_size);
        self.r = snap_radius(self.r, grid_size);
    }

    pub(crate) fn apply_patch(&mut self, patch: &ShapePatch) {
        self.props.apply_patch(patch);
        if let Some(x) = patch.x {
            self.center.x = x;
        }
        if let Some(y) = patch.y {
            self.center.y = y;
        }
        if let Some(r) = patch.r {
            self.r = r;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_snap() {
        let mut circle = Circle::new(Uuid::new_v4(), "map", GlobalPoint::new(47.0, 52.0), 4.0);
        circle.snap_to_grid(50.0);
        assert_eq!(circle.center, GlobalPoint::new(50.0, 50.0));
        assert!((circle.r - 25.0).abs() < f64::EPSILON);
    }
}
