//! Conversion between JSON records and Loro containers/values.

use loro::{LoroList, LoroMap, LoroResult, LoroValue};
use serde_json::{Map, Number, Value};

/// Write every field of a JSON object into `map`.
///
/// Nested objects and arrays become child containers.
pub fn write_record(map: &LoroMap, fields: &Map<String, Value>) -> LoroResult<()> {
    for (key, value) in fields {
        write_entry(map, key, value)?;
    }
    Ok(())
}

fn write_entry(map: &LoroMap, key: &str, value: &Value) -> LoroResult<()> {
    match value {
        Value::Object(obj) => {
            let child = map.insert_container(key, LoroMap::new())?;
            write_record(&child, obj)
        }
        Value::Array(items) => {
            let list = map.insert_container(key, LoroList::new())?;
            write_items(&list, items)
        }
        Value::Null => map.insert(key, LoroValue::Null),
        Value::Bool(b) => map.insert(key, *b),
        Value::Number(n) => map.insert(key, number_to_loro(n)),
        Value::String(s) => map.insert(key, s.as_str()),
    }
}

fn write_items(list: &LoroList, items: &[Value]) -> LoroResult<()> {
    for item in items {
        match item {
            Value::Object(obj) => {
                let child = list.insert_container(list.len(), LoroMap::new())?;
                write_record(&child, obj)?;
            }
            Value::Array(inner) => {
                let child = list.insert_container(list.len(), LoroList::new())?;
                write_items(&child, inner)?;
            }
            Value::Null => list.push(LoroValue::Null)?,
            Value::Bool(b) => list.push(*b)?,
            Value::Number(n) => list.push(number_to_loro(n))?,
            Value::String(s) => list.push(s.as_str())?,
        }
    }
    Ok(())
}

/// Integers stay integers; everything else is stored as a double.
fn number_to_loro(n: &Number) -> LoroValue {
    match n.as_i64() {
        Some(i) => LoroValue::I64(i),
        None => LoroValue::Double(n.as_f64().unwrap_or_default()),
    }
}

/// Convert a deep Loro value back into JSON.
pub fn loro_to_json(value: &LoroValue) -> Value {
    match value {
        LoroValue::Null => Value::Null,
        LoroValue::Bool(b) => Value::Bool(*b),
        LoroValue::Double(d) => Number::from_f64(*d).map(Value::Number).unwrap_or(Value::Null),
        LoroValue::I64(i) => Value::from(*i),
        LoroValue::String(s) => Value::String(s.to_string()),
        LoroValue::List(items) => Value::Array(items.iter().map(loro_to_json).collect()),
        LoroValue::Map(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.to_string(), loro_to_json(v)))
                .collect(),
        ),
        // Binary blobs and unresolved container ids never appear in records.
        _ => Value::Null,
    }
}
