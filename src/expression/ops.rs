//! Operators, functions and their scalar evaluation rules.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::EvalError;
use crate::types::Value;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    /// Equal (=).
    Eq,
    /// Not equal (<>).
    Neq,
    /// Less than (<).
    Lt,
    /// Less than or equal (<=).
    Lte,
    /// Greater than (>).
    Gt,
    /// Greater than or equal (>=).
    Gte,
    And,
    Or,
}

impl BinaryOp {
    /// Returns the string representation of this operator.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "=",
            BinaryOp::Neq => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::Lte => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Gte => ">=",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
        }
    }

    /// Returns whether this is a comparison operator.
    #[must_use]
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::Neq
                | BinaryOp::Lt
                | BinaryOp::Lte
                | BinaryOp::Gt
                | BinaryOp::Gte
        )
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
    Neg,
}

/// Aggregate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregateFunction {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunction {
    /// Returns the name of this aggregate function.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Avg => "AVG",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
        }
    }
}

/// Row-level scalar functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarFunction {
    Abs,
    Upper,
    Lower,
    Length,
    Coalesce,
}

impl ScalarFunction {
    /// Looks up a function by case-insensitive name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "ABS" => Some(ScalarFunction::Abs),
            "UPPER" => Some(ScalarFunction::Upper),
            "LOWER" => Some(ScalarFunction::Lower),
            "LENGTH" => Some(ScalarFunction::Length),
            "COALESCE" => Some(ScalarFunction::Coalesce),
            _ => None,
        }
    }

    /// Returns the canonical name of this function.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ScalarFunction::Abs => "ABS",
            ScalarFunction::Upper => "UPPER",
            ScalarFunction::Lower => "LOWER",
            ScalarFunction::Length => "LENGTH",
            ScalarFunction::Coalesce => "COALESCE",
        }
    }

    /// Returns true if `count` arguments are accepted.
    #[must_use]
    pub fn accepts_arity(&self, count: usize) -> bool {
        match self {
            ScalarFunction::Coalesce => count >= 1,
            _ => count == 1,
        }
    }

    /// Applies the function to evaluated arguments.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` for arguments of the wrong type and `Overflow`
    /// for `ABS(i64::MIN)`.
    pub fn apply(&self, args: &[Value]) -> Result<Value, EvalError> {
        if *self == ScalarFunction::Coalesce {
            return Ok(args
                .iter()
                .find(|v| !v.is_null())
                .cloned()
                .unwrap_or(Value::Null));
        }
        let arg = args.first().unwrap_or(&Value::Null);
        match (self, arg) {
            (_, Value::Null) => Ok(Value::Null),
            (ScalarFunction::Abs, Value::Int64(i)) => i
                .checked_abs()
                .map(Value::Int64)
                .ok_or_else(|| EvalError::Overflow(format!("ABS({i})"))),
            (ScalarFunction::Abs, Value::Float32(f)) => Ok(Value::Float32(f.abs())),
            (ScalarFunction::Abs, Value::Float64(f)) => Ok(Value::Float64(f.abs())),
            (ScalarFunction::Upper, Value::String(s)) => Ok(Value::String(s.to_uppercase())),
            (ScalarFunction::Lower, Value::String(s)) => Ok(Value::String(s.to_lowercase())),
            (ScalarFunction::Length, Value::String(s)) => {
                Ok(Value::Int64(s.chars().count() as i64))
            }
            (ScalarFunction::Abs, other) => {
                Err(EvalError::type_mismatch("numeric", other.type_name()))
            }
            (_, other) => Err(EvalError::type_mismatch("STRING", other.type_name())),
        }
    }
}

/// Promotes a mixed numeric pair to a common type.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn promote(a: &Value, b: &Value) -> (Value, Value) {
    match (a, b) {
        (Value::Int64(n), Value::Float64(_)) => (Value::Float64(*n as f64), b.clone()),
        (Value::Float64(_), Value::Int64(n)) => (a.clone(), Value::Float64(*n as f64)),
        (Value::Int64(n), Value::Float32(f)) => {
            (Value::Float64(*n as f64), Value::Float64(f64::from(*f)))
        }
        (Value::Float32(f), Value::Int64(n)) => {
            (Value::Float64(f64::from(*f)), Value::Float64(*n as f64))
        }
        (Value::Float32(f), Value::Float64(_)) => (Value::Float64(f64::from(*f)), b.clone()),
        (Value::Float64(_), Value::Float32(f)) => (a.clone(), Value::Float64(f64::from(*f))),
        _ => (a.clone(), b.clone()),
    }
}

/// Evaluates a binary operator over two scalar values.
///
/// # Errors
///
/// Returns `TypeMismatch`, `Overflow` or `DivisionByZero`.
pub fn eval_binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    match op {
        BinaryOp::And | BinaryOp::Or => eval_logical(op, left, right),
        _ if left.is_null() || right.is_null() => Ok(Value::Null),
        _ if op.is_comparison() => eval_comparison(op, left, right),
        _ => eval_arithmetic(op, left, right),
    }
}

fn as_tristate(value: &Value) -> Result<Option<bool>, EvalError> {
    match value {
        Value::Bool(b) => Ok(Some(*b)),
        Value::Null => Ok(None),
        other => Err(EvalError::type_mismatch("BOOL", other.type_name())),
    }
}

fn eval_logical(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let l = as_tristate(left)?;
    let r = as_tristate(right)?;
    let result = match op {
        BinaryOp::And => match (l, r) {
            (Some(false), _) | (_, Some(false)) => Some(false),
            (Some(true), Some(true)) => Some(true),
            _ => None,
        },
        _ => match (l, r) {
            (Some(true), _) | (_, Some(true)) => Some(true),
            (Some(false), Some(false)) => Some(false),
            _ => None,
        },
    };
    Ok(result.map_or(Value::Null, Value::Bool))
}

fn eval_comparison(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let (l, r) = promote(left, right);
    if l.data_type() != r.data_type() {
        return Err(EvalError::type_mismatch(l.type_name(), r.type_name()));
    }
    let result = match l.compare(&r) {
        // NaN
        None => op == BinaryOp::Neq,
        Some(ordering) => match op {
            BinaryOp::Eq => ordering == Ordering::Equal,
            BinaryOp::Neq => ordering != Ordering::Equal,
            BinaryOp::Lt => ordering == Ordering::Less,
            BinaryOp::Lte => ordering != Ordering::Greater,
            BinaryOp::Gt => ordering == Ordering::Greater,
            _ => ordering != Ordering::Less,
        },
    };
    Ok(Value::Bool(result))
}

fn eval_arithmetic(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let overflow = |a: &i64, b: &i64| EvalError::Overflow(format!("{a} {} {b}", op.as_str()));
    match promote(left, right) {
        (Value::Int64(a), Value::Int64(b)) => {
            let result = match op {
                BinaryOp::Add => a.checked_add(b),
                BinaryOp::Sub => a.checked_sub(b),
                BinaryOp::Mul => a.checked_mul(b),
                BinaryOp::Div | BinaryOp::Mod if b == 0 => {
                    return Err(EvalError::DivisionByZero)
                }
                BinaryOp::Div => a.checked_div(b),
                _ => a.checked_rem(b),
            };
            result.map(Value::Int64).ok_or_else(|| overflow(&a, &b))
        }
        (Value::Float64(a), Value::Float64(b)) => Ok(Value::Float64(match op {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            _ => a % b,
        })),
        (Value::Float32(a), Value::Float32(b)) => Ok(Value::Float32(match op {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            _ => a % b,
        })),
        (l, r) => {
            let bad = if l.data_type().is_numeric() { r } else { l };
            Err(EvalError::type_mismatch("numeric", bad.type_name()))
        }
    }
}

/// Evaluates a unary operator.
///
/// # Errors
///
/// Returns `TypeMismatch` or `Overflow`.
pub fn eval_unary(op: UnaryOp, operand: &Value) -> Result<Value, EvalError> {
    match (op, operand) {
        (_, Value::Null) => Ok(Value::Null),
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryOp::Not, other) => Err(EvalError::type_mismatch("BOOL", other.type_name())),
        (UnaryOp::Neg, Value::Int64(i)) => i
            .checked_neg()
            .map(Value::Int64)
            .ok_or_else(|| EvalError::Overflow(format!("-({i})"))),
        (UnaryOp::Neg, Value::Float32(f)) => Ok(Value::Float32(-f)),
        (UnaryOp::Neg, Value::Float64(f)) => Ok(Value::Float64(-f)),
        (UnaryOp::Neg, other) => Err(EvalError::type_mismatch("numeric", other.type_name())),
    }
}
