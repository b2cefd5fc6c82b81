//! Payroll record stores.
//!
//! One record per (user, period, pay type), merge-upserted: properties not
//! named by the incoming record survive on the stored entity. The partition
//! key is the user id, the row key `"{year:04}-{month:02}:{pay_type}"`.

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use serde_json::{Map, Value};

use crate::error::StoreError;
use crate::models::record::PayrollRecord;

/// Persistence seam for payroll records.
pub trait PayrollStore {
    /// Merge-upsert one record.
    fn upsert(&mut self, record: &PayrollRecord) -> Result<(), StoreError>;
}

/// Flat storage key: partition and row joined.
pub(crate) fn entity_key(record: &PayrollRecord) -> String {
    format!("{}/{}", record.user_id, record.row_key())
}

/// Serialize the record and merge it over whatever the entity already holds.
pub(crate) fn merge_entity(
    existing: Option<Value>,
    record: &PayrollRecord,
) -> Result<Value, StoreError> {
    let incoming = match serde_json::to_value(record)? {
        Value::Object(map) => map,
        // PayrollRecord always serializes to an object.
        other => return Ok(other),
    };

    let mut merged = match existing {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };
    for (key, value) in incoming {
        merged.insert(key, value);
    }
    Ok(Value::Object(merged))
}
