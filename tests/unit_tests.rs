//! Unit tests for colfold's public types.

use colfold::expression::{AggregateExpr, ColumnRef, Expression};
use colfold::storage::ColumnStorage;
use colfold::{Batch, Column, DataType, EvalError, ReduceError, Row, RowSequence, Value};

// =============================================================================
// Error Tests
// =============================================================================

mod error_tests {
    use super::*;

    #[test]
    fn test_compile_error_display() {
        let err = ReduceError::Compile("unknown function 'FOO'".into());
        assert!(err.to_string().contains("Compile error"));
        assert!(err.to_string().contains("FOO"));
    }

    #[test]
    fn test_unknown_column_display() {
        let err = ReduceError::UnknownColumn("p.age".into());
        assert_eq!(err.to_string(), "Unknown column: p.age");
    }

    #[test]
    fn test_row_arity_display() {
        let err = ReduceError::RowArity {
            expected: 3,
            actual: 2,
        };
        assert!(err.to_string().contains("expected 3"));
        assert!(err.to_string().contains("got 2"));
    }

    #[test]
    fn test_eval_error_wraps() {
        let err: ReduceError = EvalError::type_mismatch("INT64", "STRING").into();
        assert!(err.to_string().contains("Evaluation error"));
        assert!(err.to_string().contains("expected INT64, got STRING"));
        assert!(matches!(err, ReduceError::Eval(EvalError::TypeMismatch { .. })));
    }

    #[test]
    fn test_division_by_zero_display() {
        assert_eq!(EvalError::DivisionByZero.to_string(), "Division by zero");
    }
}

// =============================================================================
// Value Tests
// =============================================================================

mod value_tests {
    use super::*;

    #[test]
    fn test_data_type_names() {
        assert_eq!(DataType::Int64.name(), "INT64");
        assert_eq!(DataType::Null.to_string(), "NULL");
        assert!(DataType::Float32.is_numeric());
        assert!(!DataType::Bool.is_orderable());
    }

    #[test]
    fn test_value_display_as_literal() {
        assert_eq!(Value::Int64(7).to_string(), "7");
        assert_eq!(Value::Float64(2.0).to_string(), "2.0");
        assert_eq!(Value::Bool(true).to_string(), "TRUE");
        assert_eq!(Value::String("it's".into()).to_string(), "'it''s'");
        assert_eq!(Value::Null.to_string(), "NULL");
        assert!(Value::Null.is_null());
    }

    #[test]
    fn test_value_data_type() {
        assert_eq!(Value::Date(1).data_type(), DataType::Date);
        assert_eq!(Value::Timestamp(1).type_name(), "TIMESTAMP");
    }
}

// =============================================================================
// Batch Tests
// =============================================================================

mod batch_tests {
    use super::*;

    #[test]
    fn test_from_columns_identity_order() {
        let batch = Batch::from_columns(
            vec![Column::new("a", DataType::Int64)],
            vec![ColumnStorage::from(vec![Value::Int64(5), Value::Int64(6)])],
        )
        .unwrap();
        assert_eq!(batch.row_sequence(), &RowSequence::identity(2));
        assert_eq!(batch.column_by_name("a").unwrap().data_type, DataType::Int64);
    }

    #[test]
    fn test_from_columns_count_mismatch() {
        let err = Batch::from_columns(vec![Column::new("a", DataType::Int64)], vec![]).unwrap_err();
        assert!(matches!(err, ReduceError::InvalidBatch(_)));
    }

    #[test]
    fn test_concurrent_cursors() {
        let batch = Batch::from_rows(
            vec![Column::new("x", DataType::Int64)],
            (0..100).map(|i| vec![Value::Int64(i)]).collect(),
        )
        .unwrap();

        let totals: Vec<i64> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    s.spawn(|| {
                        batch
                            .cursor(["x"])
                            .unwrap()
                            .filter_map(|t| match t[0] {
                                Value::Int64(v) => Some(v),
                                _ => None,
                            })
                            .sum::<i64>()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(totals.iter().all(|&t| t == 4950));
    }
}

// =============================================================================
// Expression Tests
// =============================================================================

mod expression_tests {
    use super::*;

    #[test]
    fn test_update_is_repeatable() {
        let mut count = AggregateExpr::count_star();
        let row = Row::default();
        for _ in 0..5 {
            count.update(&row).unwrap();
        }
        assert_eq!(count.finalize().unwrap(), Value::Int64(5));
    }

    #[test]
    fn test_identity_is_deterministic() {
        let a = ColumnRef::new("p.name");
        let b = ColumnRef::new("p.name");
        assert_eq!(a.identity(), b.identity());
        assert_eq!(a.key(), b.key());
    }
}
