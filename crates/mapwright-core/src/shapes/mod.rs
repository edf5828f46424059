//! Shape definitions for the board.
//!
//! Shapes are identified by a stable, server-assigned UUID and belong to
//! exactly one layer at a time; the `layer` field in [`ShapeProps`] always
//! names the layer whose z-order physically holds the shape. Construction
//! from and conversion to the wire form goes through
//! [`ShapeSnapshot`](crate::protocol::ShapeSnapshot); partial server payloads
//! are merged with an explicit per-field [`apply_patch`](Shape::apply_patch)
//! so schema growth can never silently merge unintended fields.

mod asset;
mod circle;
mod line;
mod rect;
mod text;

pub use asset::Asset;
pub use circle::Circle;
pub use line::Line;
pub use rect::Rect;
pub use text::Text;

use crate::geom::GlobalPoint;
use crate::protocol::{GeometrySpec, ShapePatch, ShapeSnapshot};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for shapes, assigned by the server.
pub type ShapeId = Uuid;

/// A light-emission record attached to a shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aura {
    #[serde(default)]
    pub name: String,
    /// Bright radius in real-world units.
    pub value: f64,
    /// Additional dim radius in real-world units.
    #[serde(default)]
    pub dim: f64,
    pub colour: String,
    /// Whether this aura contributes to the board's light sources.
    #[serde(default)]
    pub light_source: bool,
}

/// Properties common to every shape type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeProps {
    pub uuid: ShapeId,
    /// Name of the owning layer.
    pub layer: String,
    /// Fill colour (CSS colour string, as carried on the wire).
    pub fill: Option<String>,
    pub movement_obstruction: bool,
    pub vision_obstruction: bool,
    pub auras: Vec<Aura>,
}

impl ShapeProps {
    pub fn new(uuid: ShapeId, layer: &str) -> Self {
        Self {
            uuid,
            layer: layer.to_string(),
            fill: None,
            movement_obstruction: false,
            vision_obstruction: false,
            auras: Vec::new(),
        }
    }

    fn from_snapshot(snapshot: &ShapeSnapshot) -> Self {
        Self {
            uuid: snapshot.uuid,
            layer: snapshot.layer.clone(),
            fill: snapshot.fill.clone(),
            movement_obstruction: snapshot.movement_obstruction,
            vision_obstruction: snapshot.vision_obstruction,
            auras: snapshot.auras.clone(),
        }
    }

    /// Merge the common fields of a partial payload. Absent fields keep
    /// their prior value; `layer` is always present on the wire and is
    /// always taken (physical layer membership is reconciled by the engine).
    fn apply_patch(&mut self, patch: &ShapePatch) {
        self.layer = patch.layer.clone();
        if let Some(fill) = &patch.fill {
            self.fill = Some(fill.clone());
        }
        if let Some(mo) = patch.movement_obstruction {
            self.movement_obstruction = mo;
        }
        if let Some(vo) = patch.vision_obstruction {
            self.vision_obstruction = vo;
        }
        if let Some(auras) = &patch.auras {
            self.auras = auras.clone();
        }
    }
}

/// Enum wrapper over all concrete shape types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Rect(Rect),
    Circle(Circle),
    Line(Line),
    Text(Text),
    Asset(Asset),
}

impl Shape {
    /// Construct a concrete shape from its wire form.
    pub fn from_snapshot(snapshot: &ShapeSnapshot) -> Self {
        let props = ShapeProps::from_snapshot(snapshot);
        match snapshot.geometry {
            GeometrySpec::Rect { x, y, w, h } => {
                Shape::Rect(Rect::with_props(props, GlobalPoint::new(x, y), w, h))
            }
            GeometrySpec::Circle { x, y, r } => {
                Shape::Circle(Circle::with_props(props, GlobalPoint::new(x, y), r))
            }
            GeometrySpec::Line { x, y, x2, y2 } => Shape::Line(Line::with_props(
                props,
                GlobalPoint::new(x, y),
                GlobalPoint::new(x2, y2),
            )),
            GeometrySpec::Text {
                x,
                y,
                ref text,
                font_size,
            } => Shape::Text(Text::with_props(
                props,
                GlobalPoint::new(x, y),
                text.clone(),
                font_size,
            )),
            GeometrySpec::Asset {
                x,
                y,
                w,
                h,
                ref src,
            } => Shape::Asset(Asset::with_props(
                props,
                GlobalPoint::new(x, y),
                w,
                h,
                src.clone(),
            )),
        }
    }

    /// The wire form of this shape.
    pub fn snapshot(&self) -> ShapeSnapshot {
        let props = self.props();
        ShapeSnapshot {
            uuid: props.uuid,
            layer: props.layer.clone(),
            fill: props.fill.clone(),
            movement_obstruction: props.movement_obstruction,
            vision_obstruction: props.vision_obstruction,
            auras: props.auras.clone(),
            geometry: self.geometry(),
        }
    }

    fn geometry(&self) -> GeometrySpec {
        match self {
            Shape::Rect(s) => GeometrySpec::Rect {
                x: s.ref_point.x,
                y: s.ref_point.y,
                w: s.w,
                h: s.h,
            },
            Shape::Circle(s) => GeometrySpec::Circle {
                x: s.center.x,
                y: s.center.y,
                r: s.r,
            },
            Shape::Line(s) => GeometrySpec::Line {
                x: s.ref_point.x,
                y: s.ref_point.y,
                x2: s.end_point.x,
                y2: s.end_point.y,
            },
            Shape::Text(s) => GeometrySpec::Text {
                x: s.ref_point.x,
                y: s.ref_point.y,
                text: s.text.clone(),
                font_size: s.font_size,
            },
            Shape::Asset(s) => GeometrySpec::Asset {
                x: s.ref_point.x,
                y: s.ref_point.y,
                w: s.w,
                h: s.h,
                src: s.src.clone(),
            },
        }
    }

    pub fn uuid(&self) -> ShapeId {
        self.props().uuid
    }

    /// Name of the layer this shape belongs to.
    pub fn layer(&self) -> &str {
        &self.props().layer
    }

    pub(crate) fn set_layer(&mut self, layer: &str) {
        self.props_mut().layer = layer.to_string();
    }

    pub fn props(&self) -> &ShapeProps {
        match self {
            Shape::Rect(s) => &s.props,
            Shape::Circle(s) => &s.props,
            Shape::Line(s) => &s.props,
            Shape::Text(s) => &s.props,
            Shape::Asset(s) => &s.props,
        }
    }

    pub fn props_mut(&mut self) -> &mut ShapeProps {
        match self {
            Shape::Rect(s) => &mut s.props,
            Shape::Circle(s) => &mut s.props,
            Shape::Line(s) => &mut s.props,
            Shape::Text(s) => &mut s.props,
            Shape::Asset(s) => &mut s.props,
        }
    }

    /// The shape's reference point in world space.
    pub fn ref_point(&self) -> GlobalPoint {
        match self {
            Shape::Rect(s) => s.ref_point,
            Shape::Circle(s) => s.center,
            Shape::Line(s) => s.ref_point,
            Shape::Text(s) => s.ref_point,
            Shape::Asset(s) => s.ref_point,
        }
    }

    /// Axis-aligned bounding box in world units.
    pub fn bounds(&self) -> kurbo::Rect {
        match self {
            Shape::Rect(s) => s.bounds(),
            Shape::Circle(s) => s.bounds(),
            Shape::Line(s) => s.bounds(),
            Shape::Text(s) => s.bounds(),
            Shape::Asset(s) => s.bounds(),
        }
    }

    /// Round the reference point and size to the grid, size clamped to at
    /// least one cell.
    pub fn snap_to_grid(&mut self, grid_size: f64) {
        match self {
            Shape::Rect(s) => s.snap_to_grid(grid_size),
            Shape::Circle(s) => s.snap_to_grid(grid_size),
            Shape::Line(s) => s.snap_to_grid(grid_size),
            Shape::Text(s) => s.snap_to_grid(grid_size),
            Shape::Asset(s) => s.snap_to_grid(grid_size),
        }
    }

    /// Merge a partial server payload into this shape, field by field.
    /// Fields absent from the payload are retained; fields that do not
    /// apply to this shape type are ignored.
    pub fn apply_patch(&mut self, patch: &ShapePatch) {
        match self {
            Shape::Rect(s) => s.apply_patch(patch),
            Shape::Circle(s) => s.apply_patch(patch),
            Shape::Line(s) => s.apply_patch(patch),
            Shape::Text(s) => s.apply_patch(patch),
            Shape::Asset(s) => s.apply_patch(patch),
        }
    }
}
