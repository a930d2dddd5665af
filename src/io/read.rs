use std::collections::HashMap;
use std::path::Path;

use log::info;
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// RawTable – reader output before role binding
// ---------------------------------------------------------------------------

/// An ordered sequence of string rows plus an optional header, as read
/// from disk. Rows may be ragged; rectangularity is enforced later when
/// the format adapter builds a `Frame`.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    header: Option<Vec<String>>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new() -> Self {
        RawTable::default()
    }

    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    pub fn set_header(&mut self, header: Vec<String>) {
        self.header = Some(header);
    }

    /// The header, or stringified column positions when there is none.
    pub fn header_or_indices(&self) -> Vec<String> {
        match &self.header {
            Some(header) => header.clone(),
            None => {
                let width = self.rows.first().map_or(0, Vec::len);
                (0..width).map(|i| i.to_string()).collect()
            }
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append another table's rows (e.g. pre-split train and test files),
    /// keeping this table's header.
    pub fn concat(mut self, other: RawTable) -> RawTable {
        self.rows.extend(other.rows);
        self
    }
}

// ---------------------------------------------------------------------------
// Delimited readers
// ---------------------------------------------------------------------------

/// Read a delimited file, one record per line. `header` names the row
/// holding the column labels, if any; every other row becomes data.
pub fn read_tabular(path: &Path, delimiter: u8, header: Option<usize>) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)?;

    let mut raw = RawTable::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let fields: Vec<String> = record.iter().map(str::to_string).collect();
        match header {
            Some(row) if row == index => raw.set_header(fields),
            _ => raw.push_row(fields),
        }
    }
    info!("read {} row(s) from '{}'", raw.len(), path.display());
    Ok(raw)
}

/// Tab-separated convenience wrapper.
pub fn read_tsv(path: &Path, header: Option<usize>) -> Result<RawTable> {
    read_tabular(path, b'\t', header)
}

/// Space-separated convenience wrapper (the usual inline-adjacency
/// format).
pub fn read_txt(path: &Path, header: Option<usize>) -> Result<RawTable> {
    read_tabular(path, b' ', header)
}

// ---------------------------------------------------------------------------
// JSON records reader
// ---------------------------------------------------------------------------

/// Read an array of flat JSON objects, one record each. Keys become
/// columns in first-seen order; keys missing from a record yield empty
/// fields.
pub fn read_json_records(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path)?;
    let root: JsonValue = serde_json::from_str(&text)?;
    let records = root
        .as_array()
        .ok_or_else(|| Error::JsonShape("expected a top-level array".to_string()))?;

    let mut columns: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut objects = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let object = record
            .as_object()
            .ok_or_else(|| Error::JsonShape(format!("record {index} is not an object")))?;
        for key in object.keys() {
            if !positions.contains_key(key) {
                positions.insert(key.clone(), columns.len());
                columns.push(key.clone());
            }
        }
        objects.push(object);
    }

    let mut raw = RawTable::new();
    raw.set_header(columns.clone());
    for object in objects {
        let mut row = vec![String::new(); columns.len()];
        for (key, value) in object {
            row[positions[key]] = json_field(value);
        }
        raw.push_row(row);
    }
    info!("read {} JSON record(s) from '{}'", raw.len(), path.display());
    Ok(raw)
}

fn json_field(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}
