//! JSON-file-backed store for local operation.
//!
//! The whole table lives in one JSON document mapping entity keys to
//! entities. Every upsert loads, merges, and rewrites the file; throughput
//! does not matter for a per-document trigger pipeline.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use super::{entity_key, merge_entity, PayrollStore};
use crate::error::StoreError;
use crate::models::record::PayrollRecord;

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, Value>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, entities: &BTreeMap<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(entities)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl PayrollStore for JsonFileStore {
    fn upsert(&mut self, record: &PayrollRecord) -> Result<(), StoreError> {
        let mut entities = self.load()?;
        let key = entity_key(record);
        let existing = entities.remove(&key);
        entities.insert(key.clone(), merge_entity(existing, record)?);
        self.save(&entities)?;
        debug!(key = %key, path = %self.path.display(), "payroll record upserted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::{PayType, RecordStatus};
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn record(month: u8, gross: i64) -> PayrollRecord {
        PayrollRecord {
            user_id: "0121".to_string(),
            year: 2025,
            month,
            pay_type: PayType::Salary,
            source_blob_path: "payslips/in.pdf".to_string(),
            filename: "in.pdf".to_string(),
            ingested_at_utc: Utc::now(),
            status: RecordStatus::Parsed,
            total_gross: gross,
            total_deduction: 0,
            other_payment: 0,
            transfer_amount: gross,
        }
    }

    #[test]
    fn test_upsert_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("payroll.json"));

        store.upsert(&record(10, 250_000)).unwrap();
        store.upsert(&record(11, 260_000)).unwrap();

        let entities = store.load().unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities["0121/2025-10:salary"]["totalGross"], 250_000);
        assert_eq!(entities["0121/2025-11:salary"]["totalGross"], 260_000);
    }

    #[test]
    fn test_upsert_merges_over_existing_entity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payroll.json");

        // Pre-seed an entity carrying a property this schema does not write.
        let seeded = serde_json::json!({
            "0121/2025-10:salary": {"operatorNote": "checked by hand", "totalGross": 1}
        });
        std::fs::write(&path, serde_json::to_string(&seeded).unwrap()).unwrap();

        let mut store = JsonFileStore::new(&path);
        store.upsert(&record(10, 250_000)).unwrap();

        let entities = store.load().unwrap();
        let entity = &entities["0121/2025-10:salary"];
        assert_eq!(entity["totalGross"], 250_000);
        assert_eq!(entity["operatorNote"], "checked by hand");
    }

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("absent.json"));
        assert!(store.load().unwrap().is_empty());
    }
}
