use serde_json::{Map, Value};

use crate::signature::content_signature;

/// One parsed data row, keyed by the sheet's header fields plus the
/// positional `_id`.
pub type Record = Map<String, Value>;

/// A positional write derived from one record.
#[derive(Debug, Clone, PartialEq)]
pub struct RowWrite {
    /// 1-based grid row (the record's `_id` plus the header row).
    pub row: usize,
    /// Declared width of the write range, one short of the header count.
    /// The values array stays full-width; the store tolerates the extra cell.
    pub column_count: usize,
    /// Column-ordered cell values, one per header field.
    pub values: Vec<Value>,
}

/// Attempt structured parsing of a raw cell; a failed parse keeps the raw
/// value unchanged. Never errors.
pub fn parse_cell(raw: &Value) -> Value {
    match raw {
        Value::String(s) => serde_json::from_str(s).unwrap_or_else(|_| raw.clone()),
        other => other.clone(),
    }
}

/// Header list: the field names in grid row 0.
pub fn grid_headers(grid: &[Vec<Value>]) -> Vec<String> {
    grid.first()
        .map(|row| row.iter().map(cell_to_key).collect())
        .unwrap_or_default()
}

/// Convert a raw grid into records. Row 0 is the header; the data row at
/// 1-based position `i` becomes a record carrying `_id = i`.
pub fn grid_to_records(grid: &[Vec<Value>]) -> Vec<Record> {
    let keys = grid_headers(grid);
    grid.iter()
        .skip(1)
        .enumerate()
        .map(|(i, row)| {
            let mut record = Record::new();
            record.insert("_id".to_string(), Value::from(i as u64 + 1));
            for (k, key) in keys.iter().enumerate() {
                let cell = row.get(k).cloned().unwrap_or(Value::Null);
                record.insert(key.clone(), parse_cell(&cell));
            }
            record
        })
        .collect()
}

/// Grid row a record writes to, or `None` when the record has no truthy `_id`.
pub fn target_row(record: &Record) -> Option<usize> {
    record.get("_id").and_then(record_id).map(|id| id as usize + 1)
}

/// Truthy numeric `_id`. String ids parse; zero and everything else is
/// rejected, which makes the save a silent no-op upstream.
pub fn record_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().filter(|id| *id > 0),
        Value::String(s) => s.parse::<u64>().ok().filter(|id| *id > 0),
        _ => None,
    }
}

/// Inverse mapping of one record into a column-ordered positional write.
///
/// The `_id` column is never written (its slot keeps the current cell).
/// `_hash` is zeroed first and, once every other column is filled, recomputed
/// as the content signature of the whole row. Header fields absent from the
/// record are written as explicit nulls. Returns `None` without building a
/// write when the record lacks a truthy `_id`.
pub fn record_to_row(record: &Record, headers: &[String], current: &[Value]) -> Option<RowWrite> {
    let row = target_row(record)?;

    let mut values = vec![Value::Null; headers.len()];
    let mut hash_slot = None;
    for (i, header) in headers.iter().enumerate() {
        if header == "_id" {
            values[i] = current.get(i).cloned().unwrap_or(Value::Null);
        } else if header == "_hash" {
            values[i] = Value::String(String::new());
            hash_slot = Some(i);
        } else {
            values[i] = record.get(header).cloned().unwrap_or(Value::Null);
        }
    }

    if let Some(i) = hash_slot {
        let serialized = serde_json::to_string(&values).unwrap_or_default();
        values[i] = Value::String(content_signature(&serialized));
    }

    Some(RowWrite {
        row,
        column_count: headers.len().saturating_sub(1),
        values,
    })
}

fn cell_to_key(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
