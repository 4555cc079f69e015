use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use serde_json::Value;

use super::{write_into, SheetInfo, SheetStore, StoreError};

/// Sheet grids persisted as a single JSON document of the shape
/// `{ "<sheet>": [[cell, ...], ...], ... }`. The document loads once at open;
/// every row write rewrites the file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    grids: Mutex<BTreeMap<String, Vec<Vec<Value>>>>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let text = std::fs::read_to_string(&path)?;
        let grids: BTreeMap<String, Vec<Vec<Value>>> = serde_json::from_str(&text)?;
        Ok(Self {
            path,
            grids: Mutex::new(grids),
        })
    }

    fn persist(&self, grids: &BTreeMap<String, Vec<Vec<Value>>>) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(grids)?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }
}

impl SheetStore for JsonFileStore {
    fn list_sheets(&self) -> Result<Vec<SheetInfo>, StoreError> {
        Ok(self
            .grids
            .lock()
            .expect("store poisoned")
            .keys()
            .map(|name| SheetInfo { name: name.clone() })
            .collect())
    }

    fn read_grid(&self, sheet: &str) -> Result<Vec<Vec<Value>>, StoreError> {
        self.grids
            .lock()
            .expect("store poisoned")
            .get(sheet)
            .cloned()
            .ok_or_else(|| StoreError::SheetNotFound(sheet.to_string()))
    }

    fn write_row(
        &self,
        sheet: &str,
        row: usize,
        column_count: usize,
        values: &[Value],
    ) -> Result<(), StoreError> {
        let mut grids = self.grids.lock().expect("store poisoned");
        let grid = grids
            .get_mut(sheet)
            .ok_or_else(|| StoreError::SheetNotFound(sheet.to_string()))?;
        write_into(grid, sheet, row, column_count, values)?;
        self.persist(&grids)
    }
}
