//! Board state: the ordered layer collection, the shape registry and the
//! viewport, with every view-state mutation funnelled through one place.

use crate::error::SyncError;
use crate::layer::{Layer, LayerKind};
use crate::registry::ShapeRegistry;
use crate::shapes::{Shape, ShapeId};
use crate::viewport::{MIN_ZOOM, Viewport};

/// Default canvas dimensions before the host window reports a size.
const DEFAULT_WIDTH: u32 = 800;
const DEFAULT_HEIGHT: u32 = 600;

/// The client's view of one location: layers, shapes and view state.
///
/// Built wholesale from server descriptors at board setup and replaced
/// wholesale when the client changes location.
#[derive(Debug, Clone)]
pub struct Board {
    layers: Vec<Layer>,
    selected_layer: Option<String>,
    pub viewport: Viewport,
    registry: ShapeRegistry,
    width: u32,
    height: u32,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self::with_size(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }

    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            layers: Vec::new(),
            selected_layer: None,
            viewport: Viewport::new(),
            registry: ShapeRegistry::new(),
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    // --- Layer collection ---

    /// Append a layer. Layer names are unique keys.
    pub fn add_layer(&mut self, layer: Layer) -> Result<(), SyncError> {
        if self.has_layer(&layer.name) {
            return Err(SyncError::DuplicateLayer(layer.name.clone()));
        }
        self.layers.push(layer);
        Ok(())
    }

    pub fn has_layer(&self, name: &str) -> bool {
        self.layer_index(name).is_some()
    }

    fn layer_index(&self, name: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.name == name)
    }

    /// Named layer, or the currently selected layer when `name` is `None`.
    /// Returns `None` while the board is uninitialised or for unknown names.
    pub fn get_layer(&self, name: Option<&str>) -> Option<&Layer> {
        let name = name.or(self.selected_layer.as_deref())?;
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn layer_mut(&mut self, name: &str) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.name == name)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn selected_layer(&self) -> Option<&str> {
        self.selected_layer.as_deref()
    }

    /// Switch the active layer. All layers re-render their opacity and
    /// interactivity relative to the new active layer, so everything is
    /// invalidated.
    pub fn set_layer(&mut self, name: &str) -> bool {
        if !self.has_layer(name) {
            return false;
        }
        self.selected_layer = Some(name.to_string());
        self.invalidate(true);
        true
    }

    /// The grid overlay layer, if this board has one.
    pub fn grid_layer(&self) -> Option<&Layer> {
        self.layers.iter().find(|l| l.kind == LayerKind::Grid)
    }

    pub fn grid_layer_mut(&mut self) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.kind == LayerKind::Grid)
    }

    /// The fog-of-war layer, if this board has one.
    pub fn fow_layer(&self) -> Option<&Layer> {
        self.layers.iter().find(|l| l.kind == LayerKind::Fow)
    }

    pub fn fow_layer_mut(&mut self) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.kind == LayerKind::Fow)
    }

    // --- View state ---

    /// Mark all layers dirty.
    pub fn invalidate(&mut self, clear_first: bool) {
        for layer in &mut self.layers {
            layer.invalidate(clear_first);
        }
    }

    pub fn set_grid_size(&mut self, size: f64) {
        if size <= 0.0 {
            log::warn!("rejecting non-positive grid size {size}");
            return;
        }
        self.viewport.grid_size = size;
        if let Some(grid) = self.grid_layer_mut() {
            grid.invalidate(true);
        }
    }

    pub fn set_unit_size(&mut self, size: f64) {
        if size <= 0.0 {
            log::warn!("rejecting non-positive unit size {size}");
            return;
        }
        // Unit size only changes what rulers report; no layer to redraw.
        self.viewport.unit_size = size;
    }

    pub fn set_use_grid(&mut self, use_grid: bool) {
        self.viewport.use_grid = use_grid;
        if let Some(grid) = self.grid_layer_mut() {
            grid.invalidate(true);
        }
    }

    pub fn set_full_fow(&mut self, full_fow: bool) {
        self.viewport.full_fow = full_fow;
        if let Some(fow) = self.fow_layer_mut() {
            fow.invalidate(true);
        }
    }

    /// Set fog opacity, clamped into `[0, 1]` rather than stored verbatim.
    pub fn set_fow_opacity(&mut self, opacity: f64) {
        self.viewport.fow_opacity = opacity.clamp(0.0, 1.0);
        if let Some(fow) = self.fow_layer_mut() {
            fow.invalidate(true);
        }
    }

    /// Set the zoom factor, clamped away from zero.
    pub fn set_zoom_factor(&mut self, zoom: f64) {
        self.viewport.zoom_factor = zoom.max(MIN_ZOOM);
        self.invalidate(true);
    }

    pub fn set_pan(&mut self, pan_x: f64, pan_y: f64) {
        self.viewport.pan_x = pan_x;
        self.viewport.pan_y = pan_y;
        self.invalidate(true);
    }

    /// Resize the backing canvases. Pan and zoom are left untouched, so a
    /// window resize never recenters the view.
    pub fn set_width(&mut self, width: u32) {
        self.width = width;
        for layer in &mut self.layers {
            let height = layer.surface.height;
            layer.surface.resize(width, height);
        }
    }

    pub fn set_height(&mut self, height: u32) {
        self.height = height;
        for layer in &mut self.layers {
            let width = layer.surface.width;
            layer.surface.resize(width, height);
        }
    }

    // --- Shape membership ---

    pub fn registry(&self) -> &ShapeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ShapeRegistry {
        &mut self.registry
    }

    /// Register a shape and append it to its layer's z-order.
    pub fn add_shape(&mut self, shape: Shape) -> Result<(), SyncError> {
        let layer_name = shape.layer().to_string();
        let Some(layer) = self.layer_mut(&layer_name) else {
            return Err(SyncError::UnknownLayer(layer_name));
        };
        layer.push_shape(shape.uuid());
        self.registry.insert(shape);
        Ok(())
    }

    /// Remove a shape from its layer's z-order, its layer's selection and
    /// the registry in one step, returning the removed shape.
    pub fn remove_shape(&mut self, uuid: ShapeId) -> Option<Shape> {
        let shape = self.registry.remove(uuid)?;
        if let Some(layer) = self.layer_mut(shape.layer()) {
            layer.remove_shape_id(uuid);
            layer.invalidate(true);
        }
        Some(shape)
    }

    /// Relocate a shape to another layer, keeping its `layer` field in step
    /// with the z-order that physically holds it.
    pub fn move_shape_to_layer(&mut self, uuid: ShapeId, target: &str) -> Result<(), SyncError> {
        if !self.has_layer(target) {
            return Err(SyncError::UnknownLayer(target.to_string()));
        }
        let Some(shape) = self.registry.get_mut(uuid) else {
            return Err(SyncError::UnknownShape(uuid));
        };
        let source = shape.layer().to_string();
        if source == target {
            return Ok(());
        }
        shape.set_layer(target);
        self.relocate_id(uuid, &source, target);
        Ok(())
    }

    /// Move an id between two layers' z-orders. The caller has already
    /// updated the shape's `layer` field.
    pub(crate) fn relocate_id(&mut self, uuid: ShapeId, from: &str, to: &str) {
        if let Some(layer) = self.layer_mut(from) {
            layer.remove_shape_id(uuid);
            layer.invalidate(true);
        }
        if let Some(layer) = self.layer_mut(to) {
            layer.push_shape(uuid);
            layer.invalidate(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::GlobalPoint;
    use crate::shapes::Rect;
    use uuid::Uuid;

    fn board_with_layers(names: &[&str]) -> Board {
        let mut board = Board::new();
        for name in names {
            board
                .add_layer(Layer::new(name, LayerKind::Shapes, 800, 600))
                .unwrap();
        }
        board
    }

    fn rect_on(layer: &str) -> Shape {
        Shape::Rect(Rect::new(
            Uuid::new_v4(),
            layer,
            GlobalPoint::ZERO,
            50.0,
            50.0,
        ))
    }

    #[test]
    fn test_duplicate_layer_rejected() {
        let mut board = board_with_layers(&["map"]);
        let err = board
            .add_layer(Layer::new("map", LayerKind::Shapes, 800, 600))
            .unwrap_err();
        assert_eq!(err, SyncError::DuplicateLayer("map".to_string()));
    }

    #[test]
    fn test_get_layer_selected_fallback() {
        let mut board = board_with_layers(&["map", "tokens"]);
        // No selection yet: the board is not initialised from a caller's
        // point of view.
        assert!(board.get_layer(None).is_none());

        assert!(board.set_layer("tokens"));
        assert_eq!(board.get_layer(None).unwrap().name, "tokens");
        assert_eq!(board.get_layer(Some("map")).unwrap().name, "map");
        assert!(board.get_layer(Some("nope")).is_none());
    }

    #[test]
    fn test_fow_opacity_clamped() {
        let mut board = board_with_layers(&[]);
        board.set_fow_opacity(1.7);
        assert!((board.viewport.fow_opacity - 1.0).abs() < f64::EPSILON);
        board.set_fow_opacity(-0.2);
        assert!(board.viewport.fow_opacity.abs() < f64::EPSILON);
    }

    #[test]
    fn test_non_positive_grid_size_kept_out() {
        let mut board = board_with_layers(&[]);
        board.set_grid_size(0.0);
        assert!(board.viewport.grid_size > 0.0);
    }

    #[test]
    fn test_resize_keeps_pan_and_zoom() {
        let mut board = board_with_layers(&["map"]);
        board.set_pan(33.0, -12.0);
        board.set_zoom_factor(2.0);
        board.set_width(1920);
        board.set_height(1080);
        assert!((board.viewport.pan_x - 33.0).abs() < f64::EPSILON);
        assert!((board.viewport.zoom_factor - 2.0).abs() < f64::EPSILON);
        assert_eq!(board.get_layer(Some("map")).unwrap().surface.width, 1920);
        assert_eq!(board.get_layer(Some("map")).unwrap().surface.height, 1080);
    }

    #[test]
    fn test_add_and_remove_shape_atomic() {
        let mut board = board_with_layers(&["tokens"]);
        let shape = rect_on("tokens");
        let uuid = shape.uuid();
        board.add_shape(shape).unwrap();
        assert!(board.registry().contains(uuid));
        assert!(board.get_layer(Some("tokens")).unwrap().contains(uuid));

        let removed = board.remove_shape(uuid).unwrap();
        assert_eq!(removed.uuid(), uuid);
        assert!(!board.registry().contains(uuid));
        assert!(!board.get_layer(Some("tokens")).unwrap().contains(uuid));
    }

    #[test]
    fn test_add_shape_unknown_layer() {
        let mut board = board_with_layers(&["tokens"]);
        let err = board.add_shape(rect_on("ghosts")).unwrap_err();
        assert_eq!(err, SyncError::UnknownLayer("ghosts".to_string()));
    }

    #[test]
    fn test_move_shape_between_layers() {
        let mut board = board_with_layers(&["map", "tokens"]);
        let shape = rect_on("map");
        let uuid = shape.uuid();
        board.add_shape(shape).unwrap();

        board.move_shape_to_layer(uuid, "tokens").unwrap();
        assert_eq!(board.registry().get(uuid).unwrap().layer(), "tokens");
        assert!(!board.get_layer(Some("map")).unwrap().contains(uuid));
        assert!(board.get_layer(Some("tokens")).unwrap().contains(uuid));
    }
}
