//! Row records

use crate::cell::CellValue;
use std::collections::HashMap;

/// A row record: column id to cell value
///
/// Missing keys read as absent values.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Row {
    cells: HashMap<String, CellValue>,
}

impl Row {
    /// Create an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with<K: Into<String>, V: Into<CellValue>>(mut self, column_id: K, value: V) -> Self {
        self.set(column_id, value);
        self
    }

    /// Get the value stored under a column id
    pub fn get(&self, column_id: &str) -> Option<&CellValue> {
        self.cells.get(column_id)
    }

    /// Store a value under a column id, returning the previous one
    pub fn set<K: Into<String>, V: Into<CellValue>>(
        &mut self,
        column_id: K,
        value: V,
    ) -> Option<CellValue> {
        self.cells.insert(column_id.into(), value.into())
    }

    /// Remove the value stored under a column id
    pub fn remove(&mut self, column_id: &str) -> Option<CellValue> {
        self.cells.remove(column_id)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate over stored (column id, value) pairs in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
