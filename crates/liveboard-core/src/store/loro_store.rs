//! Loro-backed shared store.

use loro::{ExportMode, LoroDoc, LoroMap, LoroValue, UndoManager, VersionVector};

use super::convert::{loro_to_json, write_record};
use super::{SharedStore, ShapeTxn, StoreListener, SubscriptionId, TxnBuffer, TxnOp};
use crate::codec::{ShapeMap, ShapeRecord};
use crate::config::SessionConfig;
use crate::error::{StoreError, StoreResult};
use crate::shapes::ShapeId;

/// Key for the shapes map in the document.
pub const SHAPES_KEY: &str = "shapes";

const DEFAULT_MAX_UNDO_STEPS: usize = 100;

/// A [`SharedStore`] replicated through a Loro CRDT document.
///
/// Each record lives in its own `LoroMap` under [`SHAPES_KEY`]; overwriting a
/// record replaces the whole container, so concurrent writes to one shape
/// converge to a single writer's version. Undo and redo only revert changes
/// made by this peer.
pub struct LoroShapeStore {
    doc: LoroDoc,
    undo_manager: UndoManager,
    listeners: Vec<(SubscriptionId, StoreListener)>,
    next_subscription: u64,
}

impl LoroShapeStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::with_undo_limits(DEFAULT_MAX_UNDO_STEPS, 0)
    }

    /// Create a store with the given undo depth and merge interval (ms).
    pub fn with_undo_limits(max_undo_steps: usize, merge_interval_ms: i64) -> Self {
        Self::from_doc(LoroDoc::new(), max_undo_steps, merge_interval_ms)
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::with_undo_limits(config.max_undo_steps, config.undo_merge_interval_ms)
    }

    /// Create a store from a snapshot exported by another peer.
    pub fn from_snapshot(bytes: &[u8]) -> StoreResult<Self> {
        let doc = LoroDoc::new();
        doc.import(bytes)?;
        Ok(Self::from_doc(doc, DEFAULT_MAX_UNDO_STEPS, 0))
    }

    fn from_doc(doc: LoroDoc, max_undo_steps: usize, merge_interval_ms: i64) -> Self {
        let mut undo_manager = UndoManager::new(&doc);
        undo_manager.set_max_undo_steps(max_undo_steps);
        undo_manager.set_merge_interval(merge_interval_ms);
        Self {
            doc,
            undo_manager,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Get the underlying LoroDoc.
    pub fn loro_doc(&self) -> &LoroDoc {
        &self.doc
    }

    fn shapes_map(&self) -> LoroMap {
        self.doc.get_map(SHAPES_KEY)
    }

    /// Export the document as a snapshot (full state).
    pub fn export_snapshot(&self) -> Vec<u8> {
        self.doc.export(ExportMode::Snapshot).unwrap_or_default()
    }

    /// Export incremental updates since a version.
    pub fn export_updates(&self, since: &VersionVector) -> Vec<u8> {
        self.doc.export(ExportMode::updates(since)).unwrap_or_default()
    }

    /// Merge updates from another peer and notify subscribers.
    pub fn import(&mut self, bytes: &[u8]) -> StoreResult<()> {
        self.doc.import(bytes)?;
        log::debug!("Imported {} bytes of remote updates", bytes.len());
        self.notify();
        Ok(())
    }

    /// Get the current version vector.
    pub fn version(&self) -> VersionVector {
        self.doc.oplog_vv()
    }

    pub fn peer_id(&self) -> u64 {
        self.doc.peer_id()
    }

    /// Write buffered ops as one Loro commit and one undo step.
    ///
    /// Loro cannot discard pending ops, so every condition that would make an
    /// op fail is checked before the first one is written.
    fn apply(&mut self, ops: Vec<TxnOp>) -> StoreResult<()> {
        if self.doc.is_detached() {
            return Err(StoreError::Detached);
        }
        let shapes = self.shapes_map();
        for op in ops {
            match op {
                TxnOp::Put(id, record) => {
                    let key = id.to_string();
                    shapes.delete(&key)?;
                    let shape_map = shapes.insert_container(&key, LoroMap::new())?;
                    write_record(&shape_map, record.fields())?;
                }
                TxnOp::Remove(id) => shapes.delete(&id.to_string())?,
            }
        }
        self.doc.commit();
        self.undo_manager.record_new_checkpoint()?;
        Ok(())
    }

    fn notify(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        let records = self.records();
        for (_, listener) in &mut self.listeners {
            listener(&records);
        }
    }
}

impl Default for LoroShapeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedStore for LoroShapeStore {
    fn records(&self) -> ShapeMap {
        let LoroValue::Map(map) = self.shapes_map().get_deep_value() else {
            return ShapeMap::new();
        };
        let mut records = ShapeMap::new();
        for (key, value) in map.iter() {
            let Ok(id) = ShapeId::parse_str(key) else {
                log::warn!("Ignoring store entry with non-UUID key {key:?}");
                continue;
            };
            match loro_to_json(value) {
                serde_json::Value::Object(fields) => {
                    records.insert(id, ShapeRecord::new(fields));
                }
                other => log::warn!("Ignoring non-map store entry {key}: {other}"),
            }
        }
        records
    }

    fn get(&self, id: &ShapeId) -> Option<ShapeRecord> {
        let LoroValue::Map(map) = self.shapes_map().get_deep_value() else {
            return None;
        };
        match loro_to_json(map.get(&id.to_string())?) {
            serde_json::Value::Object(fields) => Some(ShapeRecord::new(fields)),
            _ => None,
        }
    }

    fn len(&self) -> usize {
        self.shapes_map().len()
    }

    fn transact<R>(
        &mut self,
        f: impl FnOnce(&mut dyn ShapeTxn) -> StoreResult<R>,
    ) -> StoreResult<R> {
        let mut txn = TxnBuffer::new(self.records());
        let result = f(&mut txn)?;
        let ops = txn.into_ops();
        if !ops.is_empty() {
            log::debug!("Committing {} store writes", ops.len());
            self.apply(ops)?;
            self.notify();
        }
        Ok(result)
    }

    fn subscribe(&mut self, listener: StoreListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, listener));
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    fn undo(&mut self) -> StoreResult<bool> {
        let changed = self.undo_manager.undo()?;
        if changed {
            self.notify();
        }
        Ok(changed)
    }

    fn redo(&mut self) -> StoreResult<bool> {
        let changed = self.undo_manager.redo()?;
        if changed {
            self.notify();
        }
        Ok(changed)
    }

    fn can_undo(&self) -> bool {
        self.undo_manager.can_undo()
    }

    fn can_redo(&self) -> bool {
        self.undo_manager.can_redo()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::error::StoreError;
    use crate::shapes::{Drawable, Rectangle};
    use kurbo::Point;
    use std::cell::RefCell;
    use std::rc::Rc;
    use uuid::Uuid;

    fn rect_record(id: ShapeId, x: f64) -> ShapeRecord {
        let rect = Drawable::Rectangle(Rectangle::new(Point::new(x, 0.0), 10.0, 10.0));
        codec::encode(Some(&rect), id).unwrap()
    }

    #[test]
    fn test_set_get_delete() {
        let mut store = LoroShapeStore::new();
        let id = Uuid::new_v4();
        store.set(id, rect_record(id, 5.0)).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&id), Some(rect_record(id, 5.0)));

        store.set(id, rect_record(id, 7.0)).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.records()[&id], rect_record(id, 7.0));

        assert!(store.delete(&id).unwrap());
        assert!(!store.delete(&id).unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn test_failed_transaction_writes_nothing() {
        let mut store = LoroShapeStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let result = store.transact(|txn| {
            txn.set(a, rect_record(a, 0.0))?;
            txn.set(b, rect_record(a, 0.0))
        });
        assert!(matches!(result, Err(StoreError::IdMismatch { .. })));
        assert!(store.is_empty());
    }

    #[test]
    fn test_checked_out_doc_rejects_writes_without_pending_ops() {
        let mut store = LoroShapeStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        store.set(a, rect_record(a, 0.0)).unwrap();
        let one_shape = store.loro_doc().state_frontiers();
        store.set(b, rect_record(b, 1.0)).unwrap();
        store.loro_doc().checkout(&one_shape).unwrap();

        let c = Uuid::new_v4();
        let result = store.transact(|txn| {
            txn.delete(&a);
            txn.set(c, rect_record(c, 2.0))
        });
        assert!(matches!(result, Err(StoreError::Detached)));

        store.loro_doc().checkout_to_latest();
        store.set(b, rect_record(b, 3.0)).unwrap();
        let records = store.records();
        assert_eq!(records.len(), 2);
        assert!(records.contains_key(&a));
        assert!(!records.contains_key(&c));
    }

    #[test]
    fn test_subscribers_see_every_commit() {
        let mut store = LoroShapeStore::new();
        let seen: Rc<RefCell<Vec<usize>>> = Rc::default();
        let sink = Rc::clone(&seen);
        let sub = store.subscribe(Box::new(move |map| sink.borrow_mut().push(map.len())));

        let id = Uuid::new_v4();
        store.set(id, rect_record(id, 0.0)).unwrap();
        store.delete(&id).unwrap();
        // No-op delete publishes nothing.
        store.delete(&id).unwrap();
        assert_eq!(*seen.borrow(), vec![1, 0]);

        assert!(store.unsubscribe(sub));
        assert!(!store.unsubscribe(sub));
        store.set(id, rect_record(id, 0.0)).unwrap();
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_undo_redo_notifies() {
        let mut store = LoroShapeStore::new();
        let count = Rc::new(RefCell::new(0usize));
        let sink = Rc::clone(&count);
        store.subscribe(Box::new(move |map| *sink.borrow_mut() = map.len()));

        let id = Uuid::new_v4();
        store.set(id, rect_record(id, 0.0)).unwrap();
        assert!(store.can_undo());
        assert!(store.undo().unwrap());
        assert_eq!(*count.borrow(), 0);
        assert!(store.get(&id).is_none());

        assert!(store.can_redo());
        assert!(store.redo().unwrap());
        assert_eq!(*count.borrow(), 1);
        assert_eq!(store.get(&id), Some(rect_record(id, 0.0)));
    }

    #[test]
    fn test_sync_between_peers() {
        let mut a = LoroShapeStore::new();
        let mut b = LoroShapeStore::new();
        let id = Uuid::new_v4();
        a.set(id, rect_record(id, 3.0)).unwrap();

        b.import(&a.export_snapshot()).unwrap();
        assert_eq!(b.get(&id), Some(rect_record(id, 3.0)));

        let since = a.version();
        b.set(id, rect_record(id, 9.0)).unwrap();
        a.import(&b.export_updates(&since)).unwrap();
        assert_eq!(a.records(), b.records());
        assert_eq!(a.get(&id), Some(rect_record(id, 9.0)));
    }

    #[test]
    fn test_from_snapshot() {
        let mut a = LoroShapeStore::new();
        let id = Uuid::new_v4();
        a.set(id, rect_record(id, 1.0)).unwrap();
        let b = LoroShapeStore::from_snapshot(&a.export_snapshot()).unwrap();
        assert_eq!(b.records(), a.records());
        assert!(!b.can_undo());
    }
}
