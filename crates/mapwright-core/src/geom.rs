//! Space-tagged geometry primitives.
//!
//! Board coordinates come in two flavours: *global* (world units, shared by
//! every client, independent of the viewport) and *local* (device pixels on
//! this client's screen, pan/zoom applied). Mixing them up is the classic
//! tabletop-client bug, so the two spaces get distinct types and the only way
//! to cross between them is an explicit [`Viewport`](crate::Viewport) call.

use kurbo::Vec2;
use serde::{Deserialize, Serialize};

/// A world-space coordinate, independent of pan and zoom.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GlobalPoint {
    pub x: f64,
    pub y: f64,
}

/// A view-space coordinate in device pixels under the current pan/zoom.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LocalPoint {
    pub x: f64,
    pub y: f64,
}

/// Shared constructor/accessor surface for both coordinate spaces.
///
/// Exists so [`Ray`] can be generic over its space without erasing it.
pub trait SpacePoint: Copy {
    fn from_xy(x: f64, y: f64) -> Self;
    fn x(&self) -> f64;
    fn y(&self) -> f64;
}

macro_rules! space_point {
    ($ty:ident) => {
        impl $ty {
            pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

            pub fn new(x: f64, y: f64) -> Self {
                Self { x, y }
            }

            /// Offset this point by a vector in the same space.
            pub fn add(&self, v: Vec2) -> Self {
                Self::new(self.x + v.x, self.y + v.y)
            }

            /// Vector from `other` to `self`.
            pub fn subtract(&self, other: Self) -> Vec2 {
                Vec2::new(self.x - other.x, self.y - other.y)
            }

            /// Euclidean distance to another point in the same space.
            pub fn distance(&self, other: Self) -> f64 {
                self.subtract(other).hypot()
            }
        }

        impl SpacePoint for $ty {
            fn from_xy(x: f64, y: f64) -> Self {
                Self::new(x, y)
            }
            fn x(&self) -> f64 {
                self.x
            }
            fn y(&self) -> f64 {
                self.y
            }
        }
    };
}

space_point!(GlobalPoint);
space_point!(LocalPoint);

/// A half-line with a travel limit, generic over coordinate space.
///
/// `t_max` carries caller-defined semantics (it is usually already expressed
/// in the target space) and is never touched by viewport transforms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray<P> {
    pub origin: P,
    pub direction: Vec2,
    pub t_max: f64,
}

impl<P: SpacePoint> Ray<P> {
    pub fn new(origin: P, direction: Vec2, t_max: f64) -> Self {
        Self {
            origin,
            direction,
            t_max,
        }
    }

    /// Ray through two points, with `t_max` defaulting to infinity.
    pub fn from_points(origin: P, through: P) -> Self {
        let direction = Vec2::new(through.x() - origin.x(), through.y() - origin.y());
        Self::new(origin, direction, f64::INFINITY)
    }

    /// Point at parameter `t` along the ray.
    pub fn at(&self, t: f64) -> P {
        P::from_xy(
            self.origin.x() + t * self.direction.x,
            self.origin.y() + t * self.direction.y,
        )
    }
}
