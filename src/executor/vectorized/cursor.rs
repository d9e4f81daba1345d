//! Lazy row cursor over a projected subset of batch columns.

use crate::error::{ReduceError, Result};
use crate::types::{Row, Value};

use super::batch::{Batch, Column};

/// Iterates a batch's logical rows, yielding the values of the projected
/// columns for each row.
///
/// The cursor only reads the batch, so any number of cursors over the same
/// batch can be consumed concurrently.
#[derive(Debug, Clone)]
pub struct RowCursor<'a> {
    batch: &'a Batch,
    positions: Vec<usize>,
    columns: Vec<Column>,
    next_row: usize,
}

impl Batch {
    /// Opens a cursor over the named columns, in the given order.
    ///
    /// # Errors
    ///
    /// Returns `UnknownColumn` if a name is not in the batch schema.
    pub fn cursor<I, S>(&self, names: I) -> Result<RowCursor<'_>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut positions = Vec::new();
        let mut columns = Vec::new();
        for name in names {
            let name = name.as_ref();
            let pos = self
                .position(name)
                .ok_or_else(|| ReduceError::UnknownColumn(name.to_string()))?;
            positions.push(pos);
            columns.push(self.columns()[pos].clone());
        }
        Ok(RowCursor {
            batch: self,
            positions,
            columns,
            next_row: 0,
        })
    }
}

impl<'a> RowCursor<'a> {
    /// Returns the descriptors of the projected columns.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the descriptor of the `index`-th projected column.
    #[must_use]
    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Pairs a yielded tuple with the projected column names.
    #[must_use]
    pub fn row(&self, values: Vec<Value>) -> Row {
        self.columns
            .iter()
            .map(|c| c.name.clone())
            .zip(values)
            .collect()
    }

    /// Restarts iteration from the first logical row.
    pub fn rewind(&mut self) {
        self.next_row = 0;
    }
}

impl<'a> Iterator for RowCursor<'a> {
    type Item = Vec<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        let physical = self.batch.row_sequence().get(self.next_row)?;
        self.next_row += 1;
        let tuple = self
            .positions
            .iter()
            .map(|&col| {
                self.batch
                    .column_values(col)
                    .and_then(|array| array.get(physical))
                    .cloned()
                    .unwrap_or(Value::Null)
            })
            .collect();
        Some(tuple)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.batch.num_rows().saturating_sub(self.next_row);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RowCursor<'_> {}
