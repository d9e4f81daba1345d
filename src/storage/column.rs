//! Columnar storage using `Vec<Value>`.

use serde::{Deserialize, Serialize};

use crate::types::Value;

/// Physical value array backing one batch column.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStorage {
    data: Vec<Value>,
}

impl ColumnStorage {
    /// Creates a new empty column.
    #[must_use]
    pub fn new() -> Self {
        ColumnStorage { data: Vec::new() }
    }

    /// Appends a value to the column.
    pub fn push(&mut self, value: Value) {
        self.data.push(value);
    }

    /// Gets a value by physical row index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.data.get(index)
    }

    /// Returns the number of values in the column.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the column is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the values in physical order.
    #[must_use]
    pub fn as_slice(&self) -> &[Value] {
        &self.data
    }
}

impl From<Vec<Value>> for ColumnStorage {
    fn from(data: Vec<Value>) -> Self {
        ColumnStorage { data }
    }
}

impl FromIterator<Value> for ColumnStorage {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        ColumnStorage {
            data: iter.into_iter().collect(),
        }
    }
}
