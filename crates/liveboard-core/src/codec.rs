//! Conversion between surface objects and shape records.
//!
//! A [`ShapeRecord`] is the plain JSON object stored in the shared store. The
//! surface object does not know its own `shapeId`, so [`encode`] stamps it on
//! after serialization.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::shapes::{Drawable, ShapeId, ShapeKind};

/// Record key holding the shape identifier.
pub const SHAPE_ID_KEY: &str = "shapeId";
/// Record key holding the kind discriminant.
pub const KIND_KEY: &str = "kind";

/// Full record set, keyed by shape identifier.
pub type ShapeMap = BTreeMap<ShapeId, ShapeRecord>;

/// Serializable description of one shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShapeRecord(Map<String, Value>);

impl ShapeRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// The stamped identifier, if present and well formed.
    pub fn shape_id(&self) -> Option<ShapeId> {
        self.0
            .get(SHAPE_ID_KEY)
            .and_then(Value::as_str)
            .and_then(|s| ShapeId::parse_str(s).ok())
    }

    /// The raw `kind` string.
    pub fn kind_str(&self) -> Option<&str> {
        self.0.get(KIND_KEY).and_then(Value::as_str)
    }

    /// The `kind` if it is one this engine knows how to render.
    pub fn kind(&self) -> Option<ShapeKind> {
        self.kind_str().and_then(ShapeKind::parse)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for ShapeRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl From<ShapeRecord> for Value {
    fn from(record: ShapeRecord) -> Self {
        Value::Object(record.0)
    }
}

/// Serialize a surface object into a record without an identifier.
///
/// Absent and degenerate objects yield `None`. Never panics.
pub fn serialize(object: Option<&Drawable>) -> Option<ShapeRecord> {
    let object = object?;
    if object.is_degenerate() {
        log::debug!("Skipping degenerate {} object", object.kind());
        return None;
    }
    match serde_json::to_value(object) {
        Ok(Value::Object(fields)) => Some(ShapeRecord(fields)),
        Ok(other) => {
            log::warn!("{} serialized to non-object {other}", object.kind());
            None
        }
        Err(e) => {
            log::warn!("Failed to serialize {} object: {e}", object.kind());
            None
        }
    }
}

/// Stamp `shapeId` onto a serialized record.
pub fn inject_id(record: &mut ShapeRecord, id: ShapeId) {
    record.0.insert(SHAPE_ID_KEY.to_string(), Value::String(id.to_string()));
}

/// Serialize and stamp in one step.
pub fn encode(object: Option<&Drawable>, id: ShapeId) -> Option<ShapeRecord> {
    let mut record = serialize(object)?;
    inject_id(&mut record, id);
    Some(record)
}

/// Rebuild a surface object from a record.
///
/// Unknown kinds and malformed fields are logged and skipped.
pub fn deserialize(record: &ShapeRecord) -> Option<Drawable> {
    let id = record
        .shape_id()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "<no id>".to_string());
    match record.kind_str() {
        None => {
            log::warn!("Record {id} has no kind, skipping");
            return None;
        }
        Some(kind) if ShapeKind::parse(kind).is_none() => {
            log::warn!("Record {id} has unknown kind {kind:?}, skipping");
            return None;
        }
        Some(_) => {}
    }
    match serde_json::from_value::<Drawable>(Value::Object(record.0.clone())) {
        Ok(drawable) => Some(drawable),
        Err(e) => {
            log::warn!("Record {id} is malformed, skipping: {e}");
            None
        }
    }
}
