//! Side-table between transient surface handles and stable shape ids.

use std::collections::HashMap;

use crate::shapes::ShapeId;
use crate::surface::ObjectHandle;

/// Bidirectional handle <-> shapeId map.
///
/// Surface objects never carry their `shapeId`; this table is the only place
/// the association lives.
#[derive(Debug, Default, Clone)]
pub struct IdentityTable {
    by_handle: HashMap<ObjectHandle, ShapeId>,
    by_shape: HashMap<ShapeId, ObjectHandle>,
}

impl IdentityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `handle` with `id`, dropping any previous pairing of either.
    pub fn bind(&mut self, handle: ObjectHandle, id: ShapeId) {
        if let Some(old_id) = self.by_handle.insert(handle, id) {
            self.by_shape.remove(&old_id);
        }
        if let Some(old_handle) = self.by_shape.insert(id, handle) {
            if old_handle != handle {
                self.by_handle.remove(&old_handle);
            }
        }
    }

    pub fn unbind(&mut self, handle: ObjectHandle) -> Option<ShapeId> {
        let id = self.by_handle.remove(&handle)?;
        self.by_shape.remove(&id);
        Some(id)
    }

    pub fn shape_of(&self, handle: ObjectHandle) -> Option<ShapeId> {
        self.by_handle.get(&handle).copied()
    }

    pub fn handle_of(&self, id: &ShapeId) -> Option<ObjectHandle> {
        self.by_shape.get(id).copied()
    }

    /// Keep only the pairings whose handle satisfies `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(ObjectHandle, ShapeId) -> bool) {
        let by_shape = &mut self.by_shape;
        self.by_handle.retain(|handle, id| {
            let kept = keep(*handle, *id);
            if !kept {
                by_shape.remove(id);
            }
            kept
        });
    }

    pub fn clear(&mut self) {
        self.by_handle.clear();
        self.by_shape.clear();
    }

    pub fn len(&self) -> usize {
        self.by_handle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_handle.is_empty()
    }
}
