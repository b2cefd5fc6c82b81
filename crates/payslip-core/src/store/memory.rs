//! In-memory store for tests and embedding.

use std::collections::HashMap;

use serde_json::Value;

use super::{entity_key, merge_entity, PayrollStore};
use crate::error::StoreError;
use crate::models::record::PayrollRecord;

/// Store backed by a plain map of entity key to JSON entity.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entities: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entity by its `"{user_id}/{row_key}"` key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entities.get(key)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl PayrollStore for MemoryStore {
    fn upsert(&mut self, record: &PayrollRecord) -> Result<(), StoreError> {
        let key = entity_key(record);
        let existing = self.entities.remove(&key);
        self.entities.insert(key, merge_entity(existing, record)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::{PayType, RecordStatus};
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn record(user_id: &str, month: u8, transfer: i64) -> PayrollRecord {
        PayrollRecord {
            user_id: user_id.to_string(),
            year: 2025,
            month,
            pay_type: PayType::Salary,
            source_blob_path: "payslips/in.pdf".to_string(),
            filename: "in.pdf".to_string(),
            ingested_at_utc: Utc::now(),
            status: RecordStatus::Parsed,
            total_gross: 0,
            total_deduction: 0,
            other_payment: 0,
            transfer_amount: transfer,
        }
    }

    #[test]
    fn test_upsert_overwrites_same_key() {
        let mut store = MemoryStore::new();
        store.upsert(&record("0121", 10, 100)).unwrap();
        store.upsert(&record("0121", 10, 200)).unwrap();

        assert_eq!(store.len(), 1);
        let entity = store.get("0121/2025-10:salary").unwrap();
        assert_eq!(entity["transferAmount"], 200);
    }

    #[test]
    fn test_distinct_periods_get_distinct_rows() {
        let mut store = MemoryStore::new();
        store.upsert(&record("0121", 10, 100)).unwrap();
        store.upsert(&record("0121", 11, 100)).unwrap();
        assert_eq!(store.len(), 2);
    }
}
