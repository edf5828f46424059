//! Global shape index, shared across all layers.

use crate::shapes::{Shape, ShapeId};
use std::collections::HashMap;

/// UUID → shape index. Layers hold ids; this registry holds the shapes, so
/// cross-layer lookups never need to know which layer owns a shape. A UUID
/// maps to at most one live shape at any time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeRegistry {
    shapes: HashMap<ShapeId, Shape>,
}

impl ShapeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.shapes.contains_key(&id)
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.get_mut(&id)
    }

    pub(crate) fn insert(&mut self, shape: Shape) {
        self.shapes.insert(shape.uuid(), shape);
    }

    pub(crate) fn remove(&mut self, id: ShapeId) -> Option<Shape> {
        self.shapes.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.values()
    }
}
