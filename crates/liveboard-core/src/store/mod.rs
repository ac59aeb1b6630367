//! Shared shape store contract.
//!
//! The store maps `shapeId` to [`ShapeRecord`]. Mutations run inside
//! [`SharedStore::transact`]: the closure sees a consistent view, its writes are
//! buffered, and they are published atomically only when it returns `Ok`.
//! Every published mutation (local write, remote import, undo, redo) notifies
//! all subscribers with the full current mapping.
//!
//! # Loro schema
//!
//! ```text
//! LoroDoc
//! └── "shapes": LoroMap<ShapeId, LoroMap> (one container per record)
//! ```

mod convert;
mod loro_store;

pub use loro_store::{LoroShapeStore, SHAPES_KEY};
pub use convert::{loro_to_json, write_record};

use crate::codec::{ShapeMap, ShapeRecord};
use crate::error::{StoreError, StoreResult};
use crate::shapes::ShapeId;

/// Callback invoked with the full mapping after every committed change.
pub type StoreListener = Box<dyn FnMut(&ShapeMap)>;

/// Handle returned by [`SharedStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Exclusive view of the mapping inside a transaction.
pub trait ShapeTxn {
    /// Read a record, including writes made earlier in this transaction.
    fn get(&self, id: &ShapeId) -> Option<ShapeRecord>;

    /// All keys as seen by this transaction.
    fn keys(&self) -> Vec<ShapeId>;

    /// Insert or overwrite a record. The record's `shapeId` must equal `id`.
    fn set(&mut self, id: ShapeId, record: ShapeRecord) -> StoreResult<()>;

    /// Remove a record. Returns whether it existed.
    fn delete(&mut self, id: &ShapeId) -> bool;

    fn len(&self) -> usize {
        self.keys().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A replicated mapping from shape identifier to shape record.
pub trait SharedStore {
    /// Full mapping read.
    fn records(&self) -> ShapeMap;

    fn get(&self, id: &ShapeId) -> Option<ShapeRecord> {
        self.records().remove(id)
    }

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `f` with exclusive access; publish its writes only if it succeeds.
    fn transact<R>(
        &mut self,
        f: impl FnOnce(&mut dyn ShapeTxn) -> StoreResult<R>,
    ) -> StoreResult<R>;

    fn set(&mut self, id: ShapeId, record: ShapeRecord) -> StoreResult<()> {
        self.transact(|txn| txn.set(id, record))
    }

    fn delete(&mut self, id: &ShapeId) -> StoreResult<bool> {
        self.transact(|txn| Ok(txn.delete(id)))
    }

    fn subscribe(&mut self, listener: StoreListener) -> SubscriptionId;

    /// Detach a listener. Returns whether it was attached.
    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;

    /// Revert this client's most recent change. Returns whether anything changed.
    fn undo(&mut self) -> StoreResult<bool>;

    fn redo(&mut self) -> StoreResult<bool>;

    fn can_undo(&self) -> bool;

    fn can_redo(&self) -> bool;
}

/// One buffered write.
#[derive(Debug, Clone, PartialEq)]
pub enum TxnOp {
    Put(ShapeId, ShapeRecord),
    Remove(ShapeId),
}

/// Copy-on-write transaction over a snapshot of the mapping.
///
/// Backends hand this to the closure, then replay [`TxnBuffer::into_ops`]
/// against their storage when the closure succeeds.
#[derive(Debug)]
pub struct TxnBuffer {
    view: ShapeMap,
    ops: Vec<TxnOp>,
}

impl TxnBuffer {
    pub fn new(snapshot: ShapeMap) -> Self {
        Self {
            view: snapshot,
            ops: Vec::new(),
        }
    }

    pub fn into_ops(self) -> Vec<TxnOp> {
        self.ops
    }
}

impl ShapeTxn for TxnBuffer {
    fn get(&self, id: &ShapeId) -> Option<ShapeRecord> {
        self.view.get(id).cloned()
    }

    fn keys(&self) -> Vec<ShapeId> {
        self.view.keys().copied().collect()
    }

    fn set(&mut self, id: ShapeId, record: ShapeRecord) -> StoreResult<()> {
        match record.shape_id() {
            None => return Err(StoreError::MissingId(id)),
            Some(found) if found != id => return Err(StoreError::IdMismatch { key: id, found }),
            Some(_) => {}
        }
        self.view.insert(id, record.clone());
        self.ops.push(TxnOp::Put(id, record));
        Ok(())
    }

    fn delete(&mut self, id: &ShapeId) -> bool {
        if self.view.remove(id).is_some() {
            self.ops.push(TxnOp::Remove(*id));
            true
        } else {
            false
        }
    }

    fn len(&self) -> usize {
        self.view.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use serde_json::{Map, json};
    use uuid::Uuid;

    fn record(id: ShapeId) -> ShapeRecord {
        let mut r = ShapeRecord::new(Map::new());
        r.insert("kind", json!("rectangle"));
        codec::inject_id(&mut r, id);
        r
    }

    #[test]
    fn test_buffer_reads_its_own_writes() {
        let id = Uuid::new_v4();
        let mut txn = TxnBuffer::new(ShapeMap::new());
        txn.set(id, record(id)).unwrap();
        assert_eq!(txn.get(&id), Some(record(id)));
        assert_eq!(txn.len(), 1);
        assert!(txn.delete(&id));
        assert!(!txn.delete(&id));
        assert!(txn.is_empty());
        assert_eq!(txn.into_ops(), vec![TxnOp::Put(id, record(id)), TxnOp::Remove(id)]);
    }

    #[test]
    fn test_buffer_rejects_mismatched_id() {
        let key = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut txn = TxnBuffer::new(ShapeMap::new());
        assert!(matches!(
            txn.set(key, record(other)),
            Err(StoreError::IdMismatch { found, .. }) if found == other
        ));
        let bare = ShapeRecord::new(Map::new());
        assert!(matches!(txn.set(key, bare), Err(StoreError::MissingId(k)) if k == key));
        assert!(txn.into_ops().is_empty());
    }

    #[test]
    fn test_delete_missing_records_nothing() {
        let mut txn = TxnBuffer::new(ShapeMap::new());
        assert!(!txn.delete(&Uuid::new_v4()));
        assert!(txn.into_ops().is_empty());
    }
}
