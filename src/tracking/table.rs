//! Tabular payload logged to the tracker.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{Result, TrackingError};

/// Column-named rows of JSON cells, serialized as `{"_type": "table", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type", rename = "table", try_from = "RawTable")]
pub struct Table {
    columns: Vec<String>,
    data: Vec<Vec<Value>>,
}

/// Unchecked wire form; rows are validated on the way into [`Table`].
#[derive(Deserialize)]
#[serde(tag = "_type", rename = "table")]
struct RawTable {
    columns: Vec<String>,
    data: Vec<Vec<Value>>,
}

impl TryFrom<RawTable> for Table {
    type Error = TrackingError;

    fn try_from(raw: RawTable) -> Result<Self> {
        let mut table = Table::new(raw.columns);
        for row in raw.data {
            table.add_row(row)?;
        }
        Ok(table)
    }
}

impl Table {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            data: Vec::new(),
        }
    }

    /// Append a row; it must have exactly one cell per column.
    pub fn add_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(TrackingError::RowWidth {
                expected: self.columns.len(),
                got: row.len(),
            });
        }
        self.data.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Cells of the named column, top to bottom.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value> + '_> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.data.iter().filter_map(move |row| row.get(idx)))
    }
}
