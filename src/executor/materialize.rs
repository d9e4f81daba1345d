//! Output batch construction.

use crate::error::{ReduceError, Result};
use crate::executor::reduce::Slot;
use crate::executor::vectorized::{Batch, Column};
use crate::expression::BoxedExpression;
use crate::types::DataType;

/// Builds the zero-row result for an empty input: one `STRING` column per
/// expression, named by its identity.
#[must_use]
pub fn header_only(exprs: &[BoxedExpression]) -> Batch {
    let columns = exprs
        .iter()
        .map(|expr| Column::new(expr.identity(), DataType::String))
        .collect();
    Batch::new(columns)
}

/// Builds the single-row result once every computed expression has folded
/// the input.
///
/// Pass-through slots read the source column at the last logical row;
/// computed slots are finalized and typed from their value.
///
/// # Errors
///
/// Returns the first `finalize` failure, or `RowArity` if the assembled row
/// does not fit the assembled schema.
pub fn materialize(source: &Batch, exprs: &[BoxedExpression], slots: &[Slot]) -> Result<Batch> {
    let mut columns = Vec::with_capacity(exprs.len());
    let mut row = Vec::with_capacity(exprs.len());

    for (expr, slot) in exprs.iter().zip(slots) {
        match *slot {
            Slot::PassThrough(index) => {
                let value = source.last_value(index).cloned().ok_or_else(|| {
                    ReduceError::InvalidBatch(format!(
                        "no last row for column '{}'",
                        source.columns()[index].name
                    ))
                })?;
                columns.push(Column::new(
                    expr.identity(),
                    source.columns()[index].data_type,
                ));
                row.push(value);
            }
            Slot::Computed => {
                let value = expr.finalize()?;
                let data_type = DataType::try_from_value(&value)?;
                columns.push(Column::new(expr.identity(), data_type));
                row.push(value);
            }
        }
    }

    let mut result = Batch::new(columns);
    result.write_row(row)?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::{Alias, ColumnRef, Constant};
    use crate::executor::vectorized::RowSequence;
    use crate::types::Value;

    #[test]
    fn test_header_only() {
        let exprs: Vec<BoxedExpression> = vec![
            Box::new(ColumnRef::new("a")),
            Box::new(Constant::new(Value::Int64(1))),
        ];
        let batch = header_only(&exprs);
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(
            batch.columns(),
            &[
                Column::new("a", DataType::String),
                Column::new("1", DataType::String)
            ]
        );
    }

    #[test]
    fn test_pass_through_reads_last_logical_row() {
        let source = Batch::from_rows(
            vec![Column::new("a", DataType::Int64)],
            vec![
                vec![Value::Int64(10)],
                vec![Value::Int64(20)],
                vec![Value::Int64(30)],
            ],
        )
        .unwrap()
        .with_row_sequence(RowSequence::new(vec![2, 0, 1]))
        .unwrap();
        let exprs: Vec<BoxedExpression> = vec![
            Box::new(ColumnRef::new("a")),
            Box::new(Alias::new(Box::new(ColumnRef::new("a")), "last_a")),
        ];
        let slots = vec![Slot::PassThrough(0), Slot::PassThrough(0)];
        let out = materialize(&source, &exprs, &slots).unwrap();
        assert_eq!(out.rows(), vec![vec![Value::Int64(20), Value::Int64(20)]]);
        assert_eq!(out.columns()[1], Column::new("last_a", DataType::Int64));
    }

    #[test]
    fn test_computed_type_is_inferred() {
        let source = Batch::from_rows(
            vec![Column::new("a", DataType::Int64)],
            vec![vec![Value::Int64(1)]],
        )
        .unwrap();
        let exprs: Vec<BoxedExpression> = vec![
            Box::new(Constant::new(Value::Float64(2.5))),
            Box::new(Constant::new(Value::Null)),
        ];
        let out = materialize(&source, &exprs, &[Slot::Computed, Slot::Computed]).unwrap();
        assert_eq!(out.columns()[0].data_type, DataType::Float64);
        assert_eq!(out.columns()[1].data_type, DataType::Null);
        assert_eq!(out.num_rows(), 1);
    }
}
