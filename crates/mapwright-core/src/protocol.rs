//! Wire event types for a board session.
//!
//! The transport itself (socket wiring, reconnects) is an external
//! collaborator; this module only defines the payloads. The transport is
//! assumed to deliver events ordered and reliably per connection — in
//! particular, events for the same shape UUID are never reordered. The
//! reconciliation engine relies on that precondition instead of defending
//! against it.

use crate::initiative::InitiativeEntry;
use crate::shapes::Aura;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Server-provided description of one layer, delivered during board setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerDescriptor {
    pub name: String,
    #[serde(default)]
    pub selectable: bool,
    #[serde(default)]
    pub player_editable: bool,
    /// Marks the grid layer; `size` carries its cell size.
    #[serde(default)]
    pub grid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default)]
    pub shapes: Vec<ShapeSnapshot>,
}

/// Type discriminator plus type-specific geometry for a full shape payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum GeometrySpec {
    Rect { x: f64, y: f64, w: f64, h: f64 },
    Circle { x: f64, y: f64, r: f64 },
    Line { x: f64, y: f64, x2: f64, y2: f64 },
    Text { x: f64, y: f64, text: String, font_size: f64 },
    Asset { x: f64, y: f64, w: f64, h: f64, src: String },
}

/// A complete shape as carried on the wire (create events, board setup).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeSnapshot {
    pub uuid: Uuid,
    pub layer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(default)]
    pub movement_obstruction: bool,
    #[serde(default)]
    pub vision_obstruction: bool,
    #[serde(default)]
    pub auras: Vec<Aura>,
    #[serde(flatten)]
    pub geometry: GeometrySpec,
}

/// A partial shape payload for move/update events.
///
/// Every field except `uuid` and `layer` is optional: fields absent from
/// the payload are retained from the shape's prior state. Fields that do
/// not apply to the target shape's type are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapePatch {
    pub uuid: Uuid,
    pub layer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movement_obstruction: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vision_obstruction: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auras: Option<Vec<Aura>>,
}

impl ShapePatch {
    /// A patch that names a shape and layer but changes nothing.
    pub fn empty(uuid: Uuid, layer: &str) -> Self {
        Self {
            uuid,
            layer: layer.to_string(),
            ..Self::default()
        }
    }
}

/// Sparse per-client display options. Unrecognized keys on the wire are
/// ignored by deserialization; each present key applies independently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_colour: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fow_colour: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom_factor: Option<f64>,
}

/// Sparse per-location options, shared by every client at the location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationOptionsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_grid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_fow: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fow_opacity: Option<f64>,
}

/// Authoritative events pushed by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Wholesale board (re)construction for the current location.
    BoardSetup {
        layers: Vec<LayerDescriptor>,
        locations: Vec<String>,
    },
    ShapeCreated {
        shape: ShapeSnapshot,
    },
    ShapeMoved {
        shape: ShapePatch,
    },
    ShapeUpdated {
        shape: ShapePatch,
        redraw: bool,
    },
    ShapeRemoved {
        uuid: Uuid,
        layer: String,
    },
    InitiativeSet {
        entries: Vec<InitiativeEntry>,
    },
    ClientOptions {
        options: OptionsPatch,
    },
}

/// Events this client sends to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    SetClientOptions { options: OptionsPatch },
    SetGridsize { size: u32 },
    SetLocationOptions { options: LocationOptionsPatch },
    NewLocation { name: String },
    ChangeLocation { name: String },
    RemoveShape { uuid: Uuid, layer: String },
    RemoveInitiative { uuid: Uuid },
}
