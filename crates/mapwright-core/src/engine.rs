//! Server-event reconciliation and the per-session context object.
//!
//! The server is the single source of truth; this engine applies its event
//! stream to local state idempotently. The guiding policy is graceful
//! degradation: a malformed or late event (unknown layer, unregistered
//! UUID) is logged and dropped, never fatal — a later corrective event
//! (typically a full board setup) is the recovery path, and no retry
//! happens here.
//!
//! Local changes are optimistic: they mutate local state immediately and
//! queue an outbound event; the server's echo reconciles through the same
//! move/update path. Everything runs on one logical thread — handlers run
//! to completion, so each one is effectively a transaction.

use crate::board::Board;
use crate::error::SyncError;
use crate::initiative::InitiativeTracker;
use crate::layer::{Layer, LayerKind};
use crate::protocol::{
    ClientEvent, LayerDescriptor, LocationOptionsPatch, OptionsPatch, ServerEvent, ShapePatch,
    ShapeSnapshot,
};
use crate::shapes::{Shape, ShapeId};
use crate::tools::{PointerEvent, ToolDispatch};
use crate::viewport::MIN_ZOOM;

/// Which subsystems a client-options patch touched. The caller (UI glue)
/// reflects these; state mutation itself stays presentation-free.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AppliedOptions {
    /// Every layer needs a repaint.
    pub redraw_all: bool,
    /// The grid layer needs a repaint.
    pub redraw_grid: bool,
    /// New value the zoom slider should show, when zoom changed.
    pub zoom_slider: Option<f64>,
}

/// The session context: board, initiative, tools and reconciliation state.
///
/// Explicitly constructed and passed to handlers — created on board load,
/// replaced wholesale on location change, discarded on teardown. There is
/// deliberately no process-wide instance.
pub struct SyncEngine {
    pub board: Board,
    pub initiative: InitiativeTracker,
    pub tools: ToolDispatch,
    pub is_dm: bool,
    pub username: String,
    initialised: bool,
    locations: Vec<String>,
    /// (shape, aura index) pairs currently emitting light.
    light_sources: Vec<(ShapeId, usize)>,
    light_blockers: Vec<ShapeId>,
    movement_blockers: Vec<ShapeId>,
    outgoing: Vec<ClientEvent>,
}

impl Default for SyncEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncEngine {
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            initiative: InitiativeTracker::new(),
            tools: ToolDispatch::new(),
            is_dm: false,
            username: String::new(),
            initialised: false,
            locations: Vec::new(),
            light_sources: Vec::new(),
            light_blockers: Vec::new(),
            movement_blockers: Vec::new(),
            outgoing: Vec::new(),
        }
    }

    /// Whether board setup has completed. Pointer events are not routed
    /// before this.
    pub fn is_initialised(&self) -> bool {
        self.initialised
    }

    /// Location names known for the current room.
    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    pub fn light_sources(&self) -> &[(ShapeId, usize)] {
        &self.light_sources
    }

    pub fn light_blockers(&self) -> &[ShapeId] {
        &self.light_blockers
    }

    pub fn movement_blockers(&self) -> &[ShapeId] {
        &self.movement_blockers
    }

    // --- Inbound reconciliation ---

    /// Apply one server event. Failures are logged and swallowed: the
    /// session outlives any single malformed or late event.
    pub fn apply(&mut self, event: ServerEvent) {
        let result = match event {
            ServerEvent::BoardSetup { layers, locations } => self.setup_board(layers, locations),
            ServerEvent::ShapeCreated { shape } => self.shape_created(shape),
            ServerEvent::ShapeMoved { shape } => self.shape_moved(shape),
            ServerEvent::ShapeUpdated { shape, redraw } => self.shape_updated(shape, redraw),
            ServerEvent::ShapeRemoved { uuid, .. } => self.remove_shape(uuid, false),
            ServerEvent::InitiativeSet { entries } => {
                self.initiative.set_initiative(entries);
                Ok(())
            }
            ServerEvent::ClientOptions { options } => {
                self.apply_client_options(&options);
                Ok(())
            }
        };
        if let Err(err) = result {
            log::warn!("dropping server event: {err}");
        }
    }

    /// Rebuild the board wholesale from server layer descriptors. The old
    /// board (and its shapes, selection and derived state) is discarded;
    /// canvas dimensions and viewport survive only via the new descriptors.
    pub fn setup_board(
        &mut self,
        layers: Vec<LayerDescriptor>,
        locations: Vec<String>,
    ) -> Result<(), SyncError> {
        let mut board = Board::with_size(self.board.width(), self.board.height());

        for descriptor in layers {
            let kind = if descriptor.grid {
                LayerKind::Grid
            } else if descriptor.name == "fow" {
                LayerKind::Fow
            } else {
                LayerKind::Shapes
            };
            let mut layer = Layer::new(&descriptor.name, kind, board.width(), board.height());
            layer.selectable = descriptor.selectable;
            layer.player_editable = descriptor.player_editable;
            if let Err(err) = board.add_layer(layer) {
                log::warn!("skipping layer during board setup: {err}");
                continue;
            }
            if kind == LayerKind::Grid {
                if let Some(size) = descriptor.size {
                    board.set_grid_size(size);
                }
            }
            for snapshot in &descriptor.shapes {
                let mut shape = Shape::from_snapshot(snapshot);
                // Setup shapes always land on the layer that carried them.
                shape.set_layer(&descriptor.name);
                if let Err(err) = board.add_shape(shape) {
                    log::warn!("skipping shape during board setup: {err}");
                }
            }
        }

        // Force the correct opacity render relative to the active layer.
        if let Some(name) = board
            .layers()
            .iter()
            .find(|l| l.selectable)
            .map(|l| l.name.clone())
        {
            board.set_layer(&name);
        }

        self.board = board;
        self.light_sources.clear();
        self.light_blockers.clear();
        self.movement_blockers.clear();
        let uuids: Vec<ShapeId> = self.board.registry().iter().map(Shape::uuid).collect();
        for uuid in uuids {
            self.refresh_shape_flags(uuid);
        }
        self.locations = locations;
        self.initialised = true;
        Ok(())
    }

    fn shape_created(&mut self, snapshot: ShapeSnapshot) -> Result<(), SyncError> {
        if !self.board.has_layer(&snapshot.layer) {
            return Err(SyncError::UnknownLayer(snapshot.layer));
        }
        if self.board.registry().contains(snapshot.uuid) {
            // At-least-once delivery: a replayed create is a no-op.
            log::debug!("ignoring duplicate create for shape {}", snapshot.uuid);
            return Ok(());
        }
        let shape = Shape::from_snapshot(&snapshot);
        let uuid = shape.uuid();
        self.board.add_shape(shape)?;
        self.refresh_shape_flags(uuid);
        if let Some(layer) = self.board.layer_mut(&snapshot.layer) {
            layer.invalidate(false);
        }
        Ok(())
    }

    fn shape_moved(&mut self, patch: ShapePatch) -> Result<(), SyncError> {
        self.merge_patch(&patch)?;
        self.refresh_shape_flags(patch.uuid);
        // Position changes are drawn incrementally where the renderer
        // supports it; only the moved shape's region is damaged.
        if let Some(shape) = self.board.registry().get(patch.uuid).cloned() {
            if let Some(layer) = self.board.layer_mut(shape.layer()) {
                layer.on_shape_move(&shape);
            }
        }
        Ok(())
    }

    fn shape_updated(&mut self, patch: ShapePatch, redraw: bool) -> Result<(), SyncError> {
        self.merge_patch(&patch)?;
        self.refresh_shape_flags(patch.uuid);
        if redraw {
            if let Some(layer) = self.board.layer_mut(&patch.layer) {
                layer.invalidate(false);
            }
        }
        Ok(())
    }

    /// Field-level merge of a partial payload into the registered shape,
    /// relocating it physically when the payload names a different layer.
    fn merge_patch(&mut self, patch: &ShapePatch) -> Result<(), SyncError> {
        if !self.board.has_layer(&patch.layer) {
            return Err(SyncError::UnknownLayer(patch.layer.clone()));
        }
        let Some(shape) = self.board.registry_mut().get_mut(patch.uuid) else {
            return Err(SyncError::UnknownShape(patch.uuid));
        };
        let old_layer = shape.layer().to_string();
        shape.apply_patch(patch);
        if patch.layer != old_layer {
            self.board.relocate_id(patch.uuid, &old_layer, &patch.layer);
        }
        Ok(())
    }

    /// Remove a shape, cascading to the initiative tracker. `sync` is true
    /// for locally initiated removals (which must notify the server) and
    /// false for server-initiated ones (replying would echo forever).
    pub fn remove_shape(&mut self, uuid: ShapeId, sync: bool) -> Result<(), SyncError> {
        let Some(shape) = self.board.remove_shape(uuid) else {
            return Err(SyncError::UnknownShape(uuid));
        };
        self.prune_shape_flags(uuid);
        let had_initiative = self.initiative.remove(uuid);
        if sync {
            self.outgoing.push(ClientEvent::RemoveShape {
                uuid,
                layer: shape.layer().to_string(),
            });
            if had_initiative {
                self.outgoing.push(ClientEvent::RemoveInitiative { uuid });
            }
        }
        Ok(())
    }

    /// Delete every selected shape on the active layer, notifying the
    /// server for each.
    pub fn delete_selection(&mut self) {
        let selected: Vec<ShapeId> = self
            .board
            .get_layer(None)
            .map(|layer| layer.selection().to_vec())
            .unwrap_or_default();
        for uuid in selected {
            if let Err(err) = self.remove_shape(uuid, true) {
                log::warn!("delete selection: {err}");
            }
        }
    }

    // --- Client options ---

    /// Apply a sparse client-options patch. Every present key applies
    /// independently; one key never blocks another, and unknown keys were
    /// already discarded at deserialization.
    pub fn apply_client_options(&mut self, options: &OptionsPatch) -> AppliedOptions {
        let mut applied = AppliedOptions::default();
        if let Some(colour) = &options.grid_colour {
            self.board.viewport.grid_colour = colour.clone();
            if let Some(grid) = self.board.grid_layer_mut() {
                grid.invalidate(true);
            }
            applied.redraw_grid = true;
        }
        if let Some(colour) = &options.fow_colour {
            let colour = colour.clone();
            self.board.viewport.fow_colour = colour.clone();
            self.restyle_fow_shapes(&colour);
            self.board.invalidate(false);
            applied.redraw_all = true;
        }
        if let Some(pan_x) = options.pan_x {
            self.board.viewport.pan_x = pan_x;
            self.board.invalidate(true);
            applied.redraw_all = true;
        }
        if let Some(pan_y) = options.pan_y {
            self.board.viewport.pan_y = pan_y;
            self.board.invalidate(true);
            applied.redraw_all = true;
        }
        if let Some(zoom) = options.zoom_factor {
            self.board.set_zoom_factor(zoom);
            applied.zoom_slider = Some(self.board.viewport.zoom_slider_value());
            applied.redraw_grid = true;
            applied.redraw_all = true;
        }
        applied
    }

    /// Repaint fog shapes in the new fog colour.
    fn restyle_fow_shapes(&mut self, colour: &str) {
        let ids: Vec<ShapeId> = self
            .board
            .fow_layer()
            .map(|layer| layer.shapes().to_vec())
            .unwrap_or_default();
        for uuid in ids {
            if let Some(shape) = self.board.registry_mut().get_mut(uuid) {
                shape.props_mut().fill = Some(colour.to_string());
            }
        }
    }

    // --- Local-first mutations (optimistic, queue an outbound event) ---

    pub fn set_grid_size(&mut self, size: u32) {
        self.board.set_grid_size(size as f64);
        self.outgoing.push(ClientEvent::SetGridsize { size });
    }

    pub fn set_unit_size(&mut self, size: f64) {
        self.board.set_unit_size(size);
        self.push_location_options(LocationOptionsPatch {
            unit_size: Some(self.board.viewport.unit_size),
            ..LocationOptionsPatch::default()
        });
    }

    pub fn set_use_grid(&mut self, use_grid: bool) {
        self.board.set_use_grid(use_grid);
        self.push_location_options(LocationOptionsPatch {
            use_grid: Some(use_grid),
            ..LocationOptionsPatch::default()
        });
    }

    pub fn set_full_fow(&mut self, full_fow: bool) {
        self.board.set_full_fow(full_fow);
        self.push_location_options(LocationOptionsPatch {
            full_fow: Some(full_fow),
            ..LocationOptionsPatch::default()
        });
    }

    pub fn set_fow_opacity(&mut self, opacity: f64) {
        self.board.set_fow_opacity(opacity);
        // Send the clamped value, not the raw input.
        self.push_location_options(LocationOptionsPatch {
            fow_opacity: Some(self.board.viewport.fow_opacity),
            ..LocationOptionsPatch::default()
        });
    }

    fn push_location_options(&mut self, options: LocationOptionsPatch) {
        self.outgoing
            .push(ClientEvent::SetLocationOptions { options });
    }

    /// Zoom from the UI slider (slider value = reciprocal zoom), keeping
    /// the view centre fixed by compensating the pan for the change in
    /// visible world extent.
    pub fn zoom_with_slider(&mut self, slider_value: f64) {
        let new_zoom = (1.0 / slider_value.max(MIN_ZOOM)).max(MIN_ZOOM);
        let old_zoom = self.board.viewport.zoom_factor;
        let width = f64::from(self.board.width());
        let height = f64::from(self.board.height());
        self.board.viewport.pan_x -= (width / old_zoom - width / new_zoom) / 2.0;
        self.board.viewport.pan_y -= (height / old_zoom - height / new_zoom) / 2.0;
        self.board.viewport.zoom_factor = new_zoom;
        self.board.invalidate(true);
        self.outgoing.push(ClientEvent::SetClientOptions {
            options: OptionsPatch {
                zoom_factor: Some(new_zoom),
                pan_x: Some(self.board.viewport.pan_x),
                pan_y: Some(self.board.viewport.pan_y),
                ..OptionsPatch::default()
            },
        });
    }

    /// Pan the view by a world-space delta (pan tool drag).
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.board.viewport.pan_x += dx;
        self.board.viewport.pan_y += dy;
        self.board.invalidate(true);
        self.outgoing.push(ClientEvent::SetClientOptions {
            options: OptionsPatch {
                pan_x: Some(self.board.viewport.pan_x),
                pan_y: Some(self.board.viewport.pan_y),
                ..OptionsPatch::default()
            },
        });
    }

    pub fn new_location(&mut self, name: &str) {
        self.outgoing.push(ClientEvent::NewLocation {
            name: name.to_string(),
        });
    }

    pub fn change_location(&mut self, name: &str) {
        self.outgoing.push(ClientEvent::ChangeLocation {
            name: name.to_string(),
        });
    }

    /// Drain queued outbound events for the transport.
    pub fn take_outgoing(&mut self) -> Vec<ClientEvent> {
        std::mem::take(&mut self.outgoing)
    }

    pub fn has_outgoing(&self) -> bool {
        !self.outgoing.is_empty()
    }

    /// Whether the current user may edit shapes on the given layer. The DM
    /// edits everything; players only layers marked editable for them.
    pub fn can_edit(&self, layer: &Layer) -> bool {
        self.is_dm || layer.player_editable
    }

    // --- Pointer routing ---

    /// Route a pointer event to the active tool. Nothing is routed until
    /// board setup completes.
    pub fn on_pointer_event(&mut self, event: &PointerEvent) {
        if !self.initialised {
            return;
        }
        self.tools.dispatch(event);
    }

    // --- Derived state ---

    /// Recompute light-source/obstruction membership for one shape from its
    /// current flags. Called after every create and merge.
    fn refresh_shape_flags(&mut self, uuid: ShapeId) {
        let Some(shape) = self.board.registry().get(uuid) else {
            return;
        };
        let props = shape.props();
        let lit: Vec<usize> = props
            .auras
            .iter()
            .enumerate()
            .filter(|(_, aura)| aura.light_source)
            .map(|(index, _)| index)
            .collect();
        let vision = props.vision_obstruction;
        let movement = props.movement_obstruction;

        self.light_sources.retain(|(id, _)| *id != uuid);
        self.light_sources.extend(lit.into_iter().map(|i| (uuid, i)));
        self.light_blockers.retain(|id| *id != uuid);
        if vision {
            self.light_blockers.push(uuid);
        }
        self.movement_blockers.retain(|id| *id != uuid);
        if movement {
            self.movement_blockers.push(uuid);
        }
    }

    fn prune_shape_flags(&mut self, uuid: ShapeId) {
        self.light_sources.retain(|(id, _)| *id != uuid);
        self.light_blockers.retain(|id| *id != uuid);
        self.movement_blockers.retain(|id| *id != uuid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::initiative::InitiativeEntry;
    use crate::protocol::GeometrySpec;
    use crate::shapes::Aura;
    use uuid::Uuid;

    fn descriptor(name: &str, selectable: bool) -> LayerDescriptor {
        LayerDescriptor {
            name: name.to_string(),
            selectable,
            player_editable: false,
            grid: false,
            size: None,
            shapes: Vec::new(),
        }
    }

    fn grid_descriptor(size: f64) -> LayerDescriptor {
        LayerDescriptor {
            name: "grid".to_string(),
            selectable: false,
            player_editable: false,
            grid: true,
            size: Some(size),
            shapes: Vec::new(),
        }
    }

    fn fow_descriptor() -> LayerDescriptor {
        descriptor("fow", false)
    }

    fn engine() -> SyncEngine {
        let mut engine = SyncEngine::new();
        engine
            .setup_board(
                vec![
                    descriptor("map", true),
                    grid_descriptor(60.0),
                    descriptor("tokens", true),
                    fow_descriptor(),
                ],
                vec!["start".to_string(), "dungeon".to_string()],
            )
            .unwrap();
        engine
    }

    fn rect_snapshot(uuid: Uuid, layer: &str, x: f64, y: f64) -> ShapeSnapshot {
        ShapeSnapshot {
            uuid,
            layer: layer.to_string(),
            fill: None,
            movement_obstruction: false,
            vision_obstruction: false,
            auras: Vec::new(),
            geometry: GeometrySpec::Rect {
                x,
                y,
                w: 50.0,
                h: 50.0,
            },
        }
    }

    #[test]
    fn test_setup_board() {
        let engine = engine();
        assert!(engine.is_initialised());
        assert_eq!(engine.locations(), ["start", "dungeon"]);
        // First selectable layer is active.
        assert_eq!(engine.board.selected_layer(), Some("map"));
        assert!((engine.board.viewport.grid_size - 60.0).abs() < f64::EPSILON);
        assert_eq!(engine.board.fow_layer().unwrap().name, "fow");
    }

    #[test]
    fn test_setup_board_replaces_previous() {
        let mut engine = engine();
        let uuid = Uuid::new_v4();
        engine.apply(ServerEvent::ShapeCreated {
            shape: rect_snapshot(uuid, "tokens", 0.0, 0.0),
        });
        assert!(engine.board.registry().contains(uuid));

        engine
            .setup_board(vec![descriptor("other", true)], Vec::new())
            .unwrap();
        assert!(!engine.board.registry().contains(uuid));
        assert!(!engine.board.has_layer("tokens"));
        assert_eq!(engine.board.selected_layer(), Some("other"));
    }

    #[test]
    fn test_create_on_unknown_layer_changes_nothing() {
        let mut engine = engine();
        let before_len = engine.board.registry().len();
        engine.apply(ServerEvent::ShapeCreated {
            shape: rect_snapshot(Uuid::new_v4(), "ghosts", 0.0, 0.0),
        });
        assert_eq!(engine.board.registry().len(), before_len);
        for layer in engine.board.layers() {
            assert!(layer.shapes().is_empty());
        }
    }

    #[test]
    fn test_duplicate_create_is_noop() {
        let mut engine = engine();
        let uuid = Uuid::new_v4();
        engine.apply(ServerEvent::ShapeCreated {
            shape: rect_snapshot(uuid, "tokens", 0.0, 0.0),
        });
        engine.apply(ServerEvent::ShapeCreated {
            shape: rect_snapshot(uuid, "tokens", 999.0, 999.0),
        });
        assert_eq!(engine.board.registry().len(), 1);
        // The replay did not clobber the original position.
        let shape = engine.board.registry().get(uuid).unwrap();
        assert!(shape.ref_point().x.abs() < f64::EPSILON);
        assert_eq!(engine.board.get_layer(Some("tokens")).unwrap().shapes().len(), 1);
    }

    #[test]
    fn test_move_unknown_uuid_leaves_layer_untouched() {
        let mut engine = engine();
        for i in 0..3 {
            engine.apply(ServerEvent::ShapeCreated {
                shape: rect_snapshot(Uuid::new_v4(), "tokens", f64::from(i) * 100.0, 0.0),
            });
        }
        let before: Vec<ShapeId> = engine
            .board
            .get_layer(Some("tokens"))
            .unwrap()
            .shapes()
            .to_vec();

        engine.apply(ServerEvent::ShapeMoved {
            shape: ShapePatch {
                x: Some(500.0),
                ..ShapePatch::empty(Uuid::new_v4(), "tokens")
            },
        });

        let layer = engine.board.get_layer(Some("tokens")).unwrap();
        assert_eq!(layer.shapes().len(), 3);
        assert_eq!(layer.shapes(), before.as_slice());
    }

    #[test]
    fn test_move_merges_and_retains_absent_fields() {
        let mut engine = engine();
        let uuid = Uuid::new_v4();
        let mut snapshot = rect_snapshot(uuid, "tokens", 10.0, 20.0);
        snapshot.fill = Some("rgb(1, 2, 3)".to_string());
        engine.apply(ServerEvent::ShapeCreated { shape: snapshot });

        engine.apply(ServerEvent::ShapeMoved {
            shape: ShapePatch {
                x: Some(150.0),
                ..ShapePatch::empty(uuid, "tokens")
            },
        });

        let shape = engine.board.registry().get(uuid).unwrap();
        assert!((shape.ref_point().x - 150.0).abs() < f64::EPSILON);
        assert!((shape.ref_point().y - 20.0).abs() < f64::EPSILON);
        assert_eq!(shape.props().fill.as_deref(), Some("rgb(1, 2, 3)"));
    }

    #[test]
    fn test_move_relocates_between_layers() {
        let mut engine = engine();
        let uuid = Uuid::new_v4();
        engine.apply(ServerEvent::ShapeCreated {
            shape: rect_snapshot(uuid, "map", 0.0, 0.0),
        });

        engine.apply(ServerEvent::ShapeMoved {
            shape: ShapePatch::empty(uuid, "tokens"),
        });

        assert_eq!(engine.board.registry().get(uuid).unwrap().layer(), "tokens");
        assert!(!engine.board.get_layer(Some("map")).unwrap().contains(uuid));
        assert!(engine.board.get_layer(Some("tokens")).unwrap().contains(uuid));
    }

    #[test]
    fn test_update_idempotent() {
        let mut engine = engine();
        let uuid = Uuid::new_v4();
        engine.apply(ServerEvent::ShapeCreated {
            shape: rect_snapshot(uuid, "tokens", 0.0, 0.0),
        });

        let patch = ShapePatch {
            x: Some(42.0),
            w: Some(100.0),
            movement_obstruction: Some(true),
            ..ShapePatch::empty(uuid, "tokens")
        };
        engine.apply(ServerEvent::ShapeUpdated {
            shape: patch.clone(),
            redraw: true,
        });
        let once = engine.board.registry().get(uuid).unwrap().clone();
        let blockers_once = engine.movement_blockers().to_vec();

        engine.apply(ServerEvent::ShapeUpdated {
            shape: patch,
            redraw: true,
        });
        assert_eq!(engine.board.registry().get(uuid).unwrap(), &once);
        assert_eq!(engine.movement_blockers(), blockers_once.as_slice());
    }

    #[test]
    fn test_update_recomputes_derived_flags() {
        let mut engine = engine();
        let uuid = Uuid::new_v4();
        let mut snapshot = rect_snapshot(uuid, "tokens", 0.0, 0.0);
        snapshot.movement_obstruction = true;
        snapshot.auras = vec![Aura {
            name: "torch".to_string(),
            value: 20.0,
            dim: 20.0,
            colour: "rgb(255, 200, 0)".to_string(),
            light_source: true,
        }];
        engine.apply(ServerEvent::ShapeCreated { shape: snapshot });
        assert_eq!(engine.movement_blockers(), [uuid]);
        assert_eq!(engine.light_sources(), [(uuid, 0)]);

        engine.apply(ServerEvent::ShapeUpdated {
            shape: ShapePatch {
                movement_obstruction: Some(false),
                auras: Some(Vec::new()),
                ..ShapePatch::empty(uuid, "tokens")
            },
            redraw: false,
        });
        assert!(engine.movement_blockers().is_empty());
        assert!(engine.light_sources().is_empty());
    }

    #[test]
    fn test_removal_cascades() {
        let mut engine = engine();
        let uuid = Uuid::new_v4();
        engine.apply(ServerEvent::ShapeCreated {
            shape: rect_snapshot(uuid, "tokens", 0.0, 0.0),
        });
        engine.apply(ServerEvent::InitiativeSet {
            entries: vec![InitiativeEntry {
                uuid,
                initiative: 12,
            }],
        });
        assert!(engine.initiative.is_visible());

        engine.apply(ServerEvent::ShapeRemoved {
            uuid,
            layer: "tokens".to_string(),
        });

        assert!(engine.board.registry().get(uuid).is_none());
        assert!(!engine.board.get_layer(Some("tokens")).unwrap().contains(uuid));
        assert!(!engine.initiative.contains(uuid));
        // Server-initiated removal must not echo back.
        assert!(!engine.has_outgoing());
    }

    #[test]
    fn test_local_removal_notifies_server() {
        let mut engine = engine();
        let uuid = Uuid::new_v4();
        engine.apply(ServerEvent::ShapeCreated {
            shape: rect_snapshot(uuid, "tokens", 0.0, 0.0),
        });
        engine.apply(ServerEvent::InitiativeSet {
            entries: vec![InitiativeEntry {
                uuid,
                initiative: 5,
            }],
        });

        engine.remove_shape(uuid, true).unwrap();
        let outgoing = engine.take_outgoing();
        assert_eq!(
            outgoing,
            vec![
                ClientEvent::RemoveShape {
                    uuid,
                    layer: "tokens".to_string()
                },
                ClientEvent::RemoveInitiative { uuid },
            ]
        );
    }

    #[test]
    fn test_delete_selection() {
        let mut engine = engine();
        let uuid = Uuid::new_v4();
        engine.apply(ServerEvent::ShapeCreated {
            shape: rect_snapshot(uuid, "map", 0.0, 0.0),
        });
        engine
            .board
            .layer_mut("map")
            .unwrap()
            .add_to_selection(uuid);

        engine.delete_selection();
        assert!(engine.board.registry().is_empty());
        assert!(engine.has_outgoing());
    }

    #[test]
    fn test_client_options_apply_independently() {
        let mut engine = engine();
        let applied = engine.apply_client_options(&OptionsPatch {
            grid_colour: Some("rgb(0, 0, 0)".to_string()),
            zoom_factor: Some(2.0),
            ..OptionsPatch::default()
        });
        assert_eq!(engine.board.viewport.grid_colour, "rgb(0, 0, 0)");
        assert!((engine.board.viewport.zoom_factor - 2.0).abs() < f64::EPSILON);
        assert!(applied.redraw_grid);
        assert_eq!(applied.zoom_slider, Some(0.5));
    }

    #[test]
    fn test_client_options_clamp_zoom() {
        let mut engine = engine();
        engine.apply_client_options(&OptionsPatch {
            zoom_factor: Some(0.0),
            ..OptionsPatch::default()
        });
        assert!(engine.board.viewport.zoom_factor > 0.0);
    }

    #[test]
    fn test_fow_colour_restyles_fog_shapes_only() {
        let mut engine = engine();
        let fog_uuid = Uuid::new_v4();
        let token_uuid = Uuid::new_v4();
        engine.apply(ServerEvent::ShapeCreated {
            shape: rect_snapshot(fog_uuid, "fow", 0.0, 0.0),
        });
        engine.apply(ServerEvent::ShapeCreated {
            shape: rect_snapshot(token_uuid, "tokens", 0.0, 0.0),
        });

        engine.apply_client_options(&OptionsPatch {
            fow_colour: Some("rgb(10, 10, 10)".to_string()),
            ..OptionsPatch::default()
        });

        let fog = engine.board.registry().get(fog_uuid).unwrap();
        assert_eq!(fog.props().fill.as_deref(), Some("rgb(10, 10, 10)"));
        let token = engine.board.registry().get(token_uuid).unwrap();
        assert_eq!(token.props().fill, None);
    }

    #[test]
    fn test_zoom_with_slider_recenters_and_notifies() {
        let mut engine = engine();
        engine.zoom_with_slider(0.5); // zoom factor 2

        assert!((engine.board.viewport.zoom_factor - 2.0).abs() < f64::EPSILON);
        // 800x600 canvas: visible world shrinks from 800x600 to 400x300,
        // pan compensates by half the difference.
        assert!((engine.board.viewport.pan_x + 200.0).abs() < f64::EPSILON);
        assert!((engine.board.viewport.pan_y + 150.0).abs() < f64::EPSILON);

        let outgoing = engine.take_outgoing();
        assert!(matches!(
            outgoing.as_slice(),
            [ClientEvent::SetClientOptions { options }]
                if options.zoom_factor == Some(2.0) && options.pan_x == Some(-200.0)
        ));
    }

    #[test]
    fn test_location_option_setters_queue_clamped_values() {
        let mut engine = engine();
        engine.set_fow_opacity(2.5);
        assert!((engine.board.viewport.fow_opacity - 1.0).abs() < f64::EPSILON);
        let outgoing = engine.take_outgoing();
        assert!(matches!(
            outgoing.as_slice(),
            [ClientEvent::SetLocationOptions { options }]
                if options.fow_opacity == Some(1.0)
        ));

        engine.set_grid_size(70);
        assert!((engine.board.viewport.grid_size - 70.0).abs() < f64::EPSILON);
        assert_eq!(
            engine.take_outgoing(),
            vec![ClientEvent::SetGridsize { size: 70 }]
        );
    }

    #[test]
    fn test_dm_edits_everything_players_only_editable_layers() {
        let mut engine = engine();
        let mut tokens = descriptor("tokens2", true);
        tokens.player_editable = true;
        engine
            .setup_board(vec![descriptor("dm", true), tokens], Vec::new())
            .unwrap();

        let dm_layer = engine.board.get_layer(Some("dm")).unwrap().clone();
        let token_layer = engine.board.get_layer(Some("tokens2")).unwrap().clone();

        assert!(!engine.can_edit(&dm_layer));
        assert!(engine.can_edit(&token_layer));

        engine.is_dm = true;
        assert!(engine.can_edit(&dm_layer));
    }

    #[test]
    fn test_pointer_events_gated_on_setup() {
        use crate::geom::LocalPoint;
        use crate::tools::{MouseButton, Tool};
        use std::cell::RefCell;
        use std::rc::Rc;

        struct Probe(Rc<RefCell<usize>>);
        impl Tool for Probe {
            fn name(&self) -> &str {
                "probe"
            }
            fn on_mouse_down(&mut self, _event: &PointerEvent) {
                *self.0.borrow_mut() += 1;
            }
        }

        let hits = Rc::new(RefCell::new(0));
        let mut engine = SyncEngine::new();
        engine.tools.register(Box::new(Probe(hits.clone())));

        let event = PointerEvent::Down {
            position: LocalPoint::ZERO,
            button: MouseButton::Left,
        };
        engine.on_pointer_event(&event);
        assert_eq!(*hits.borrow(), 0);

        engine
            .setup_board(vec![descriptor("map", true)], Vec::new())
            .unwrap();
        engine.on_pointer_event(&event);
        assert_eq!(*hits.borrow(), 1);
    }
}
