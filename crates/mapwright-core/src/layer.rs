//! Layers and the rendering-collaborator contract.
//!
//! A layer owns an ordered sequence of shape ids (z-order = insertion
//! order), a selection, and a [`Surface`]. The core never draws: state
//! mutations call [`Layer::invalidate`] and the external renderer polls
//! [`Surface::take_redraw`] to learn what needs repainting.

use crate::shapes::{Shape, ShapeId};
use serde::{Deserialize, Serialize};

/// What kind of content a layer renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerKind {
    /// Ordinary shape layer (map, tokens, drawings).
    Shapes,
    /// The grid overlay.
    Grid,
    /// Fog of war.
    Fow,
}

/// A redraw request accumulated on a surface since the last poll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RedrawRequest {
    /// Whether the surface should be cleared before repainting.
    pub clear: bool,
    /// World-space region that changed, when the damage is known to be
    /// local (incremental move). `None` means repaint everything.
    pub region: Option<kurbo::Rect>,
}

/// The backing canvas of a layer, as seen from the core: dimensions plus
/// accumulated damage flags. Pixels live with the rendering collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub width: u32,
    pub height: u32,
    dirty: bool,
    clear_requested: bool,
    #[serde(skip)]
    dirty_region: Option<kurbo::Rect>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            dirty: true,
            clear_requested: true,
            dirty_region: None,
        }
    }

    /// Resize the backing canvas. Resizing damages everything.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.invalidate(true);
    }

    /// Mark the surface dirty. A `clear_first` request is sticky until the
    /// next poll and widens any pending incremental damage to a full repaint.
    pub fn invalidate(&mut self, clear_first: bool) {
        self.dirty = true;
        self.clear_requested |= clear_first;
        self.dirty_region = None;
    }

    /// Record local damage without forcing a full repaint. A pending full
    /// repaint is not narrowed back down.
    pub fn mark_region(&mut self, region: kurbo::Rect) {
        if self.dirty && self.dirty_region.is_none() {
            return;
        }
        self.dirty_region = Some(match self.dirty_region {
            Some(existing) => existing.union(region),
            None => region,
        });
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Consume the accumulated damage, if any. Called by the renderer once
    /// per frame.
    pub fn take_redraw(&mut self) -> Option<RedrawRequest> {
        if !self.dirty {
            return None;
        }
        let request = RedrawRequest {
            clear: self.clear_requested,
            region: self.dirty_region,
        };
        self.dirty = false;
        self.clear_requested = false;
        self.dirty_region = None;
        Some(request)
    }
}

/// A named, ordered collection of shapes rendered on its own surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    pub kind: LayerKind,
    pub surface: Surface,
    /// Whether this layer can be the active layer.
    pub selectable: bool,
    /// Whether non-DM players may edit shapes on this layer.
    pub player_editable: bool,
    /// Shape ids back-to-front; the shapes themselves live in the registry.
    z_order: Vec<ShapeId>,
    selection: Vec<ShapeId>,
}

impl Layer {
    pub fn new(name: &str, kind: LayerKind, width: u32, height: u32) -> Self {
        Self {
            name: name.to_string(),
            kind,
            surface: Surface::new(width, height),
            selectable: false,
            player_editable: false,
            z_order: Vec::new(),
            selection: Vec::new(),
        }
    }

    /// Shape ids in z-order (back to front).
    pub fn shapes(&self) -> &[ShapeId] {
        &self.z_order
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.z_order.contains(&id)
    }

    pub(crate) fn push_shape(&mut self, id: ShapeId) {
        self.z_order.push(id);
    }

    /// Drop a shape id from the z-order and selection. Returns whether the
    /// id was present.
    pub(crate) fn remove_shape_id(&mut self, id: ShapeId) -> bool {
        let before = self.z_order.len();
        self.z_order.retain(|&other| other != id);
        self.selection.retain(|&other| other != id);
        self.z_order.len() != before
    }

    /// Mark all of this layer dirty.
    pub fn invalidate(&mut self, clear_first: bool) {
        self.surface.invalidate(clear_first);
    }

    /// A shape on this layer moved: record its damage incrementally rather
    /// than forcing a full clear, so renderers that support it can redraw
    /// just the moved token.
    pub fn on_shape_move(&mut self, shape: &Shape) {
        self.surface.mark_region(shape.bounds());
    }

    // --- Selection ---

    pub fn selection(&self) -> &[ShapeId] {
        &self.selection
    }

    pub fn is_selected(&self, id: ShapeId) -> bool {
        self.selection.contains(&id)
    }

    /// Add a shape to the selection; ids not on this layer are ignored.
    pub fn add_to_selection(&mut self, id: ShapeId) {
        if self.contains(id) && !self.selection.contains(&id) {
            self.selection.push(id);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }
}
