//! Columnar batch with a row-sequence index.

use serde::{Deserialize, Serialize};

use crate::error::{ReduceError, Result};
use crate::storage::ColumnStorage;
use crate::types::{DataType, Value};

/// Named, typed column descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Column data type.
    pub data_type: DataType,
}

impl Column {
    /// Creates a new column descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Column {
            name: name.into(),
            data_type,
        }
    }
}

/// Ordered physical row positions defining a batch's logical row order.
///
/// Reordering or filtering a batch only rewrites this index; the column
/// values stay where they are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowSequence {
    /// Physical indices in logical order.
    pub indices: Vec<usize>,
}

impl RowSequence {
    /// Creates a row sequence with the given physical indices.
    #[must_use]
    pub fn new(indices: Vec<usize>) -> Self {
        RowSequence { indices }
    }

    /// Creates the identity sequence `0..count`.
    #[must_use]
    pub fn identity(count: usize) -> Self {
        RowSequence {
            indices: (0..count).collect(),
        }
    }

    /// Returns the number of logical rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns true if there are no logical rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Returns the physical index of the given logical row.
    #[must_use]
    pub fn get(&self, pos: usize) -> Option<usize> {
        self.indices.get(pos).copied()
    }

    /// Returns the physical index of the last logical row.
    #[must_use]
    pub fn last(&self) -> Option<usize> {
        self.indices.last().copied()
    }
}

/// Materialized batch of rows stored column-wise.
#[derive(Debug, Clone)]
pub struct Batch {
    columns: Vec<Column>,
    values: Vec<ColumnStorage>,
    seqs: RowSequence,
    /// Physical row count shared by every value array.
    physical_rows: usize,
}

impl Batch {
    /// Creates an empty batch with the given schema.
    #[must_use]
    pub fn new(columns: Vec<Column>) -> Self {
        let values = columns.iter().map(|_| ColumnStorage::new()).collect();
        Batch {
            columns,
            values,
            seqs: RowSequence::default(),
            physical_rows: 0,
        }
    }

    /// Creates a batch from a schema and one value array per column.
    ///
    /// The logical row order is the physical order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBatch` if the number of arrays differs from the number
    /// of columns or the arrays have different lengths.
    pub fn from_columns(columns: Vec<Column>, values: Vec<ColumnStorage>) -> Result<Self> {
        if columns.len() != values.len() {
            return Err(ReduceError::InvalidBatch(format!(
                "{} columns but {} value arrays",
                columns.len(),
                values.len()
            )));
        }
        let physical_rows = values.first().map_or(0, ColumnStorage::len);
        if let Some((i, array)) = values
            .iter()
            .enumerate()
            .find(|(_, array)| array.len() != physical_rows)
        {
            return Err(ReduceError::InvalidBatch(format!(
                "column '{}' has {} values, expected {physical_rows}",
                columns[i].name,
                array.len()
            )));
        }
        Ok(Batch {
            columns,
            values,
            seqs: RowSequence::identity(physical_rows),
            physical_rows,
        })
    }

    /// Creates a batch from a schema and row-major values.
    ///
    /// # Errors
    ///
    /// Returns `RowArity` if any row's length differs from the column count.
    pub fn from_rows(columns: Vec<Column>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut batch = Batch::new(columns);
        for row in rows {
            batch.write_row(row)?;
        }
        Ok(batch)
    }

    /// Replaces the row-sequence index.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBatch` if any index is outside the physical row range.
    pub fn with_row_sequence(mut self, seqs: RowSequence) -> Result<Self> {
        if let Some(bad) = seqs.indices.iter().find(|&&i| i >= self.physical_rows) {
            return Err(ReduceError::InvalidBatch(format!(
                "row index {bad} out of bounds for {} physical rows",
                self.physical_rows
            )));
        }
        self.seqs = seqs;
        Ok(self)
    }

    /// Appends one row, in column order, as the new last logical row.
    ///
    /// # Errors
    ///
    /// Returns `RowArity` if the row's length differs from the column count.
    pub fn write_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(ReduceError::RowArity {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        for (array, value) in self.values.iter_mut().zip(row) {
            array.push(value);
        }
        self.seqs.indices.push(self.physical_rows);
        self.physical_rows += 1;
        Ok(())
    }

    /// Returns the number of logical rows.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.seqs.len()
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Returns the schema.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the row-sequence index.
    #[must_use]
    pub fn row_sequence(&self) -> &RowSequence {
        &self.seqs
    }

    /// Returns the value array of the column at `index`.
    #[must_use]
    pub fn column_values(&self, index: usize) -> Option<&ColumnStorage> {
        self.values.get(index)
    }

    /// Returns the position of the first column with the given name.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Returns the descriptor of the first column with the given name.
    #[must_use]
    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.position(name).map(|i| &self.columns[i])
    }

    /// Returns the value at a logical row of a column.
    #[must_use]
    pub fn value(&self, row: usize, column: usize) -> Option<&Value> {
        let physical = self.seqs.get(row)?;
        self.values.get(column)?.get(physical)
    }

    /// Returns the value of a column at the last logical row.
    #[must_use]
    pub fn last_value(&self, column: usize) -> Option<&Value> {
        let physical = self.seqs.last()?;
        self.values.get(column)?.get(physical)
    }

    /// Returns all rows in logical order.
    #[must_use]
    pub fn rows(&self) -> Vec<Vec<Value>> {
        self.seqs
            .indices
            .iter()
            .map(|&physical| {
                self.values
                    .iter()
                    .map(|array| array.as_slice()[physical].clone())
                    .collect()
            })
            .collect()
    }
}
