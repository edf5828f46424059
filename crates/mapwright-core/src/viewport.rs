//! Viewport state and the global/local coordinate transform.
//!
//! The viewport holds everything a client needs to project the shared world
//! onto its own screen: pan offset, zoom factor, grid metrics and the fog
//! display options. All transform functions are pure in `&self`, so a
//! snapshot of the viewport fully determines the mapping and the functions
//! can be unit-tested without a live view.
//!
//! The mapping is `local = (global + pan) * zoom` per axis; distances scale
//! by the zoom factor alone (pan cancels out).

use crate::geom::{GlobalPoint, LocalPoint, Ray};
use serde::{Deserialize, Serialize};

/// Default grid cell size in world units (pixels at zoom 1).
pub const DEFAULT_GRID_SIZE: f64 = 50.0;

/// Default real-world span of one grid cell (e.g. 5 ft).
pub const DEFAULT_UNIT_SIZE: f64 = 5.0;

/// Smallest zoom factor the setters will accept.
///
/// The transform itself does not validate zoom (a zero would produce
/// infinities); clamping happens at every mutation boundary instead.
pub const MIN_ZOOM: f64 = 0.01;

/// Per-client view parameters for the current board.
///
/// Owned by the [`Board`](crate::Board); mutated only through board setters
/// or server option pushes, both of which clamp out-of-range values rather
/// than store them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Zoom factor; strictly positive.
    pub zoom_factor: f64,
    /// Pan offset along x, in world units.
    pub pan_x: f64,
    /// Pan offset along y, in world units.
    pub pan_y: f64,
    /// Grid cell size in world units; strictly positive.
    pub grid_size: f64,
    /// Real-world span of one grid cell; strictly positive.
    pub unit_size: f64,
    /// Whether grid snapping is active.
    pub use_grid: bool,
    /// Whether the whole board starts fogged.
    pub full_fow: bool,
    /// Fog opacity, kept in `[0, 1]`.
    pub fow_opacity: f64,
    /// Grid line colour (CSS colour string, as carried on the wire).
    pub grid_colour: String,
    /// Fog fill colour (CSS colour string).
    pub fow_colour: String,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom_factor: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            grid_size: DEFAULT_GRID_SIZE,
            unit_size: DEFAULT_UNIT_SIZE,
            use_grid: true,
            full_fow: false,
            fow_opacity: 0.3,
            grid_colour: "rgba(255, 0, 0, 0.5)".to_string(),
            fow_colour: "rgb(82, 81, 81)".to_string(),
        }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Project a world point into view pixels.
    pub fn g2l(&self, p: GlobalPoint) -> LocalPoint {
        LocalPoint::new(
            (p.x + self.pan_x) * self.zoom_factor,
            (p.y + self.pan_y) * self.zoom_factor,
        )
    }

    /// Project a view pixel back into world space. Inverse of [`g2l`](Self::g2l).
    pub fn l2g(&self, p: LocalPoint) -> GlobalPoint {
        GlobalPoint::new(
            p.x / self.zoom_factor - self.pan_x,
            p.y / self.zoom_factor - self.pan_y,
        )
    }

    /// Single-axis variant of [`g2l`](Self::g2l) for x.
    pub fn g2lx(&self, x: f64) -> f64 {
        self.g2l(GlobalPoint::new(x, 0.0)).x
    }

    /// Single-axis variant of [`g2l`](Self::g2l) for y.
    pub fn g2ly(&self, y: f64) -> f64 {
        self.g2l(GlobalPoint::new(0.0, y)).y
    }

    /// Scale a bare world distance into view pixels. Pan does not apply.
    pub fn g2lz(&self, d: f64) -> f64 {
        d * self.zoom_factor
    }

    /// Single-axis variant of [`l2g`](Self::l2g) for x.
    pub fn l2gx(&self, x: f64) -> f64 {
        self.l2g(LocalPoint::new(x, 0.0)).x
    }

    /// Single-axis variant of [`l2g`](Self::l2g) for y.
    pub fn l2gy(&self, y: f64) -> f64 {
        self.l2g(LocalPoint::new(0.0, y)).y
    }

    /// Scale a bare view distance back into world units.
    pub fn l2gz(&self, d: f64) -> f64 {
        d / self.zoom_factor
    }

    /// Convert a measurement in real-world units (e.g. feet) into board
    /// grid distance. Ruler-style tools use this so reported distances do
    /// not depend on zoom.
    pub fn unit_distance(&self, r: f64) -> f64 {
        (r / self.unit_size) * self.grid_size
    }

    /// Real-world radius to view pixels.
    pub fn g2lr(&self, r: f64) -> f64 {
        self.g2lz(self.unit_distance(r))
    }

    /// Real-world radius to world units.
    pub fn l2gr(&self, r: f64) -> f64 {
        self.l2gz(self.unit_distance(r))
    }

    /// Project a world-space ray into view space: the origin transforms as a
    /// point, the direction scales by the zoom factor, `t_max` is untouched.
    pub fn g2l_ray(&self, ray: Ray<GlobalPoint>) -> Ray<LocalPoint> {
        Ray::new(
            self.g2l(ray.origin),
            ray.direction * self.zoom_factor,
            ray.t_max,
        )
    }

    /// Project a view-space ray into world space.
    pub fn l2g_ray(&self, ray: Ray<LocalPoint>) -> Ray<GlobalPoint> {
        Ray::new(
            self.l2g(ray.origin),
            ray.direction * (1.0 / self.zoom_factor),
            ray.t_max,
        )
    }

    /// Value the zoom slider should show for the current zoom factor.
    pub fn zoom_slider_value(&self) -> f64 {
        1.0 / self.zoom_factor
    }
}
