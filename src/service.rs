use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};

use crate::cache::SheetCache;
use crate::mapper::{self, Record};
use crate::signature::content_signature;
use crate::store::{SheetInfo, SheetStore, StoreError};

/// Sheet reads and writes composed with the process-wide cache.
///
/// Reads memoize per sheet for the life of the process; no write path
/// invalidates the cache. Callers needing fresh data after a write clear
/// explicitly.
pub struct SheetService {
    store: Arc<dyn SheetStore>,
    cache: SheetCache,
    protected: Vec<String>,
    /// Per-sheet id counter, seeded from the memoized record count the first
    /// time a sheet takes a create. Advances across creates even though the
    /// memoized records stay stale, so back-to-back creates never collide.
    next_ids: Mutex<HashMap<String, u64>>,
}

impl SheetService {
    pub fn new(store: Arc<dyn SheetStore>, mut protected: Vec<String>) -> Self {
        // apiusers holds API credentials and is protected unconditionally
        if !protected.iter().any(|name| name == "apiusers") {
            protected.push("apiusers".to_string());
        }
        Self {
            store,
            cache: SheetCache::new(),
            protected,
            next_ids: Mutex::new(HashMap::new()),
        }
    }

    /// Records of a sheet, memoized under the sheet name.
    pub fn sheet_values(&self, name: &str) -> Result<Vec<Record>, StoreError> {
        if let Some(Value::Array(cached)) = self.cache.get(name, None) {
            return Ok(cached
                .into_iter()
                .filter_map(|value| value.as_object().cloned())
                .collect());
        }
        let grid = self.store.read_grid(name)?;
        let records = mapper::grid_to_records(&grid);
        self.cache.set(
            name,
            Value::Array(records.iter().cloned().map(Value::Object).collect()),
        );
        Ok(records)
    }

    /// Header list of a sheet, memoized under `"heading" + name`.
    pub fn sheet_headers(&self, name: &str) -> Result<Vec<String>, StoreError> {
        let key = format!("heading{}", name);
        if let Some(Value::Array(cached)) = self.cache.get(&key, None) {
            return Ok(cached
                .into_iter()
                .filter_map(|value| value.as_str().map(str::to_string))
                .collect());
        }
        let grid = self.store.read_grid(name)?;
        let headers = mapper::grid_headers(&grid);
        self.cache.set(
            &key,
            Value::Array(headers.iter().cloned().map(Value::String).collect()),
        );
        Ok(headers)
    }

    /// Persist one record at its `_id` row. A record without a truthy `_id`
    /// is skipped; the return value says whether a write happened.
    pub fn save_row(&self, sheet: &str, record: &Record) -> Result<bool, StoreError> {
        let Some(row) = mapper::target_row(record) else {
            return Ok(false);
        };
        let headers = self.sheet_headers(sheet)?;
        let grid = self.store.read_grid(sheet)?;
        let current = grid.get(row - 1).cloned().unwrap_or_default();
        let Some(write) = mapper::record_to_row(record, &headers, &current) else {
            return Ok(false);
        };
        self.store
            .write_row(sheet, write.row, write.column_count, &write.values)?;
        Ok(true)
    }

    /// New row under the next sequential `_id`; the returned record carries
    /// the assigned id.
    pub fn create_row(&self, sheet: &str, mut record: Record) -> Result<Record, StoreError> {
        let next_id = self.advance_next_id(sheet)?;
        record.insert("_id".to_string(), Value::from(next_id));
        self.save_row(sheet, &record)?;
        Ok(record)
    }

    fn advance_next_id(&self, sheet: &str) -> Result<u64, StoreError> {
        let seed = self.sheet_values(sheet)?.len() as u64 + 1;
        let mut ids = self.next_ids.lock().expect("id counter poisoned");
        let next = ids.entry(sheet.to_string()).or_insert(seed);
        let id = *next;
        *next += 1;
        Ok(id)
    }

    /// Union of every unprotected sheet's records, keyed by sheet name, plus
    /// a change-detection `hash` computed over the payload.
    pub fn all_data(&self) -> Result<Value, StoreError> {
        let mut payload = Map::new();
        for info in self.unprotected_sheets()? {
            let records = self.sheet_values(&info.name)?;
            payload.insert(
                info.name,
                Value::Array(records.into_iter().map(Value::Object).collect()),
            );
        }
        let hash = content_signature(&Value::Object(payload.clone()).to_string());
        payload.insert("hash".to_string(), Value::String(hash));
        Ok(Value::Object(payload))
    }

    /// Drop every memoized sheet and header list. The id counters reset with
    /// the cache; the next create re-seeds from a fresh read.
    pub fn clear_cache(&self) {
        self.cache.clear();
        self.next_ids.lock().expect("id counter poisoned").clear();
    }

    fn unprotected_sheets(&self) -> Result<Vec<SheetInfo>, StoreError> {
        Ok(self
            .store
            .list_sheets()?
            .into_iter()
            .filter(|info| !self.protected.iter().any(|name| name == &info.name))
            .collect())
    }
}
