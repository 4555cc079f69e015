use serde_json::Value;

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// A named tabular resource the store exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetInfo {
    pub name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sheet '{0}' not found")]
    SheetNotFound(String),
    #[error("row {row} is out of range for sheet '{sheet}'")]
    RowOutOfRange { sheet: String, row: usize },
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage format error: {0}")]
    Format(#[from] serde_json::Error),
}

/// Narrow contract over the external tabular store: full-grid reads and
/// positional single-row writes. Failures propagate to the caller untouched
/// (no retry, no timeout, no recovery).
pub trait SheetStore: Send + Sync {
    fn list_sheets(&self) -> Result<Vec<SheetInfo>, StoreError>;

    /// The sheet's full value grid, header row included.
    fn read_grid(&self, sheet: &str) -> Result<Vec<Vec<Value>>, StoreError>;

    /// Positional overwrite of one row range. `row` is the 1-based grid row;
    /// `column_count` the declared width. A values array one cell wider than
    /// the declared width is tolerated, and a write one row past the end
    /// appends to the grid.
    fn write_row(
        &self,
        sheet: &str,
        row: usize,
        column_count: usize,
        values: &[Value],
    ) -> Result<(), StoreError>;
}

/// Shared row-write semantics for the grid-backed stores.
pub(crate) fn write_into(
    grid: &mut Vec<Vec<Value>>,
    sheet: &str,
    row: usize,
    column_count: usize,
    values: &[Value],
) -> Result<(), StoreError> {
    if row == 0 || row > grid.len() + 1 {
        return Err(StoreError::RowOutOfRange {
            sheet: sheet.to_string(),
            row,
        });
    }
    if row == grid.len() + 1 {
        grid.push(Vec::new());
    }

    // One extra cell beyond the declared range is accepted
    let width = values.len().min(column_count + 1);
    let target = &mut grid[row - 1];
    if target.len() < width {
        target.resize(width, Value::Null);
    }
    for (i, value) in values.iter().take(width).enumerate() {
        target[i] = value.clone();
    }
    Ok(())
}
