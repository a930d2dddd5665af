use std::collections::HashSet;

use crate::data::value::Value;
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Frame – the rectangular record table
// ---------------------------------------------------------------------------

/// An owned table of named columns. Every row is exactly as wide as the
/// header; row order is preserved by all operations so that seeded sampling
/// stays reproducible.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Frame {
    /// An empty table with the given column names.
    pub fn new(columns: Vec<String>) -> Self {
        Frame {
            columns,
            rows: Vec::new(),
        }
    }

    /// A table built from pre-validated rows.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut frame = Frame::new(columns);
        for row in rows {
            frame.push_row(row)?;
        }
        Ok(frame)
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Index of the first column with the given name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Append a row, checking its arity against the header.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::ArityMismatch {
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Iterate over the cells of the column at `index`.
    pub fn column(&self, index: usize) -> impl Iterator<Item = &Value> {
        self.rows.iter().map(move |r| &r[index])
    }

    /// Mutable iteration over the cells of the column at `index`.
    pub fn column_mut(&mut self, index: usize) -> impl Iterator<Item = &mut Value> {
        self.rows.iter_mut().map(move |r| &mut r[index])
    }

    /// Rename the column at `index`.
    pub fn rename_column(&mut self, index: usize, to: &str) {
        self.columns[index] = to.to_string();
    }

    /// Append a new column with one value per existing row.
    pub fn add_column(&mut self, name: &str, values: Vec<Value>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(Error::ArityMismatch {
                expected: self.rows.len(),
                found: values.len(),
            });
        }
        self.columns.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(())
    }

    /// Remove the column at `index` from the header and every row.
    pub fn drop_column(&mut self, index: usize) {
        self.columns.remove(index);
        for row in &mut self.rows {
            row.remove(index);
        }
    }

    /// Distinct values of the column at `index`, in first-seen order.
    pub fn distinct(&self, index: usize) -> Vec<Value> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for value in self.column(index) {
            if seen.insert(value.clone()) {
                out.push(value.clone());
            }
        }
        out
    }

    /// A new table holding copies of the rows at `indices`, in that order.
    pub fn select_rows(&self, indices: &[usize]) -> Frame {
        Frame {
            columns: self.columns.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }
}
