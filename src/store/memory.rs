use std::collections::BTreeMap;
use std::sync::RwLock;

use serde_json::Value;

use super::{write_into, SheetInfo, SheetStore, StoreError};

/// In-memory store used by tests and demos.
#[derive(Debug, Default)]
pub struct MemoryStore {
    grids: RwLock<BTreeMap<String, Vec<Vec<Value>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style sheet seeding.
    pub fn with_sheet(self, name: &str, grid: Vec<Vec<Value>>) -> Self {
        {
            let mut grids = self.grids.write().expect("store poisoned");
            grids.insert(name.to_string(), grid);
        }
        self
    }

    /// Raw grid snapshot, for assertions on written state.
    pub fn grid_snapshot(&self, name: &str) -> Option<Vec<Vec<Value>>> {
        self.grids.read().expect("store poisoned").get(name).cloned()
    }
}

impl SheetStore for MemoryStore {
    fn list_sheets(&self) -> Result<Vec<SheetInfo>, StoreError> {
        Ok(self
            .grids
            .read()
            .expect("store poisoned")
            .keys()
            .map(|name| SheetInfo { name: name.clone() })
            .collect())
    }

    fn read_grid(&self, sheet: &str) -> Result<Vec<Vec<Value>>, StoreError> {
        self.grids
            .read()
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
        let mut grids = self.grids.write().expect("store poisoned");
        let grid = grids
            .get_mut(sheet)
            .ok_or_else(|| StoreError::SheetNotFound(sheet.to_string()))?;
        write_into(grid, sheet, row, column_count, values)
    }
}
