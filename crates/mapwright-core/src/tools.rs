//! Pointer-event routing to the active tool.
//!
//! The core owns tool selection and routing only; what a tool does with an
//! event (drawing, measuring, fog editing) is the tool collaborator's
//! business.

use crate::geom::LocalPoint;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Pointer event in view coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down {
        position: LocalPoint,
        button: MouseButton,
    },
    Move {
        position: LocalPoint,
    },
    Up {
        position: LocalPoint,
        button: MouseButton,
    },
    ContextMenu {
        position: LocalPoint,
    },
}

/// A tool that can receive routed pointer events. All handlers default to
/// no-ops so tools implement only what they care about.
pub trait Tool {
    fn name(&self) -> &str;

    fn on_mouse_down(&mut self, _event: &PointerEvent) {}
    fn on_mouse_move(&mut self, _event: &PointerEvent) {}
    fn on_mouse_up(&mut self, _event: &PointerEvent) {}
    fn on_context_menu(&mut self, _event: &PointerEvent) {}
}

/// Ordered tool registry plus the active selection.
#[derive(Default)]
pub struct ToolDispatch {
    tools: Vec<Box<dyn Tool>>,
    selected: usize,
}

impl ToolDispatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, returning its index in the ordered registry.
    pub fn register(&mut self, tool: Box<dyn Tool>) -> usize {
        self.tools.push(tool);
        self.tools.len() - 1
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_name(&self) -> Option<&str> {
        self.tools.get(self.selected).map(|t| t.name())
    }

    pub fn select(&mut self, index: usize) -> bool {
        if index < self.tools.len() {
            self.selected = index;
            true
        } else {
            false
        }
    }

    pub fn select_by_name(&mut self, name: &str) -> bool {
        match self.tools.iter().position(|t| t.name() == name) {
            Some(index) => {
                self.selected = index;
                true
            }
            None => false,
        }
    }

    /// Route a pointer event to the selected tool. Down/up events only
    /// route for the left or middle button; context menu for the right.
    pub fn dispatch(&mut self, event: &PointerEvent) {
        let Some(tool) = self.tools.get_mut(self.selected) else {
            return;
        };
        match event {
            PointerEvent::Down { button, .. } => {
                if matches!(button, MouseButton::Left | MouseButton::Middle) {
                    tool.on_mouse_down(event);
                }
            }
            PointerEvent::Move { .. } => tool.on_mouse_move(event),
            PointerEvent::Up { button, .. } => {
                if matches!(button, MouseButton::Left | MouseButton::Middle) {
                    tool.on_mouse_up(event);
                }
            }
            PointerEvent::ContextMenu { .. } => tool.on_context_menu(event),
        }
    }
}

impl std::fmt::Debug for ToolDispatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDispatch")
            .field("tools", &self.tools.iter().map(|t| t.name()).collect::<Vec<_>>())
            .field("selected", &self.selected)
            .finish()
    }
}
