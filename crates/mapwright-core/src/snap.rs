//! Grid snapping for shape placement.

use crate::geom::GlobalPoint;

/// Snap a world point to the nearest grid intersection.
pub fn snap_to_grid(point: GlobalPoint, grid_size: f64) -> GlobalPoint {
    GlobalPoint::new(
        (point.x / grid_size).round() * grid_size,
        (point.y / grid_size).round() * grid_size,
    )
}

/// Snap an extent (width/height) to the nearest whole number of cells,
/// never below one cell.
pub fn snap_extent(extent: f64, grid_size: f64) -> f64 {
    ((extent / grid_size).round() * grid_size).max(grid_size)
}

/// Snap a radius to the nearest half cell, never below half a cell, so a
/// snapped circle spans a whole number of cells.
pub fn snap_radius(radius: f64, grid_size: f64) -> f64 {
    let half = grid_size / 2.0;
    ((radius / half).round() * half).max(half)
}
