//! Aggregate expressions and their accumulators.

use std::collections::BTreeSet;

use crate::error::EvalError;
use crate::types::{Row, Value};

use super::ops::{promote, AggregateFunction};
use super::{evaluate_row, BoxedExpression, ExprKey, Expression};

/// Running SUM state.
#[derive(Debug, Clone, Copy, PartialEq)]
enum SumState {
    Empty,
    Int(i64),
    /// `float32` stays set while every input has been `Float32`.
    Float { total: f64, float32: bool },
}

/// Per-function accumulation state.
#[derive(Debug, Clone, PartialEq)]
enum Accumulator {
    Count(i64),
    Sum(SumState),
    Avg { total: f64, count: i64 },
    Min(Option<Value>),
    Max(Option<Value>),
}

impl Accumulator {
    fn new(function: AggregateFunction) -> Self {
        match function {
            AggregateFunction::Count => Accumulator::Count(0),
            AggregateFunction::Sum => Accumulator::Sum(SumState::Empty),
            AggregateFunction::Avg => Accumulator::Avg { total: 0.0, count: 0 },
            AggregateFunction::Min => Accumulator::Min(None),
            AggregateFunction::Max => Accumulator::Max(None),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn fold(&mut self, value: Value) -> Result<(), EvalError> {
        match self {
            Accumulator::Count(n) => {
                if !value.is_null() {
                    *n += 1;
                }
            }
            Accumulator::Sum(state) => *state = fold_sum(*state, &value)?,
            Accumulator::Avg { total, count } => {
                let x = match value {
                    Value::Null => return Ok(()),
                    Value::Int64(i) => i as f64,
                    Value::Float32(f) => f64::from(f),
                    Value::Float64(f) => f,
                    other => return Err(EvalError::type_mismatch("numeric", other.type_name())),
                };
                *total += x;
                *count += 1;
            }
            Accumulator::Min(best) => fold_extreme(best, value, std::cmp::Ordering::Less)?,
            Accumulator::Max(best) => fold_extreme(best, value, std::cmp::Ordering::Greater)?,
        }
        Ok(())
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    fn result(&self) -> Value {
        match self {
            Accumulator::Count(n) => Value::Int64(*n),
            Accumulator::Sum(SumState::Empty) => Value::Null,
            Accumulator::Sum(SumState::Int(i)) => Value::Int64(*i),
            Accumulator::Sum(SumState::Float { total, float32: true }) => {
                Value::Float32(*total as f32)
            }
            Accumulator::Sum(SumState::Float { total, .. }) => Value::Float64(*total),
            Accumulator::Avg { count: 0, .. } => Value::Null,
            Accumulator::Avg { total, count } => Value::Float64(*total / *count as f64),
            Accumulator::Min(best) | Accumulator::Max(best) => {
                best.clone().unwrap_or(Value::Null)
            }
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn fold_sum(state: SumState, value: &Value) -> Result<SumState, EvalError> {
    let next = match (state, value) {
        (_, Value::Null) => state,
        (SumState::Empty, Value::Int64(i)) => SumState::Int(*i),
        (SumState::Empty, Value::Float32(f)) => SumState::Float {
            total: f64::from(*f),
            float32: true,
        },
        (SumState::Empty, Value::Float64(f)) => SumState::Float {
            total: *f,
            float32: false,
        },
        (SumState::Int(a), Value::Int64(b)) => SumState::Int(
            a.checked_add(*b)
                .ok_or_else(|| EvalError::Overflow(format!("SUM {a} + {b}")))?,
        ),
        (SumState::Int(a), Value::Float32(f)) => SumState::Float {
            total: a as f64 + f64::from(*f),
            float32: false,
        },
        (SumState::Int(a), Value::Float64(f)) => SumState::Float {
            total: a as f64 + f,
            float32: false,
        },
        (SumState::Float { total, .. }, Value::Int64(i)) => SumState::Float {
            total: total + *i as f64,
            float32: false,
        },
        (SumState::Float { total, float32 }, Value::Float32(f)) => SumState::Float {
            total: total + f64::from(*f),
            float32,
        },
        (SumState::Float { total, .. }, Value::Float64(f)) => SumState::Float {
            total: total + f,
            float32: false,
        },
        (_, other) => return Err(EvalError::type_mismatch("numeric", other.type_name())),
    };
    Ok(next)
}

/// Keeps the smaller or larger of the running extreme and `value`. Mixed
/// numeric inputs are compared, and kept, as `FLOAT64`.
fn fold_extreme(
    best: &mut Option<Value>,
    value: Value,
    keep_when: std::cmp::Ordering,
) -> Result<(), EvalError> {
    if value.is_null() {
        return Ok(());
    }
    if !value.data_type().is_orderable() {
        return Err(EvalError::type_mismatch("orderable", value.type_name()));
    }
    match best {
        None => *best = Some(value),
        Some(current) => {
            let (held, next) = if current.data_type() == value.data_type() {
                (current.clone(), value)
            } else if current.data_type().is_numeric() && value.data_type().is_numeric() {
                promote(current, &value)
            } else {
                return Err(EvalError::type_mismatch(
                    current.type_name(),
                    value.type_name(),
                ));
            };
            *current = if next.compare(&held) == Some(keep_when) {
                next
            } else {
                held
            };
        }
    }
    Ok(())
}

/// Aggregate function node. `arg` is `None` only for `COUNT(*)`.
#[derive(Debug)]
pub struct AggregateExpr {
    function: AggregateFunction,
    arg: Option<BoxedExpression>,
    acc: Accumulator,
}

impl AggregateExpr {
    /// Creates an aggregate over `arg`.
    #[must_use]
    pub fn new(function: AggregateFunction, arg: Option<BoxedExpression>) -> Self {
        AggregateExpr {
            function,
            arg,
            acc: Accumulator::new(function),
        }
    }

    /// Creates `COUNT(*)`.
    #[must_use]
    pub fn count_star() -> Self {
        Self::new(AggregateFunction::Count, None)
    }

    /// Returns the aggregate function.
    #[must_use]
    pub fn function(&self) -> AggregateFunction {
        self.function
    }
}

impl Expression for AggregateExpr {
    fn identity(&self) -> String {
        match &self.arg {
            Some(arg) => format!("{}({})", self.function.name(), arg.identity()),
            None => format!("{}(*)", self.function.name()),
        }
    }

    fn key(&self) -> ExprKey {
        match &self.arg {
            Some(arg) => ExprKey::new(format!("{}({})", self.function.name(), arg.key())),
            None => ExprKey::new(format!("{}(*)", self.function.name())),
        }
    }

    fn update(&mut self, row: &Row) -> Result<(), EvalError> {
        // COUNT(*) counts every row, NULL or not.
        let value = match &mut self.arg {
            Some(arg) => evaluate_row(arg.as_mut(), row)?,
            None => Value::Bool(true),
        };
        self.acc.fold(value)
    }

    fn finalize(&self) -> Result<Value, EvalError> {
        Ok(self.acc.result())
    }

    fn collect_columns(&self, out: &mut BTreeSet<String>) {
        if let Some(arg) = &self.arg {
            arg.collect_columns(out);
        }
    }

    fn contains_aggregate(&self) -> bool {
        true
    }
}
