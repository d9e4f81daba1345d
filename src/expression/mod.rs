//! Stateful evaluation nodes.
//!
//! An [`Expression`] folds the rows of a batch one at a time through
//! [`Expression::update`] and produces its result with
//! [`Expression::finalize`]. Aggregates keep running state between calls;
//! every other node remembers the value computed from the last row it saw.
//!
//! Each node has two names:
//!
//! - [`Expression::identity`], the display text used to name output columns;
//! - [`Expression::key`], the structural key compared against existing
//!   column names to detect expressions that are already materialized.
//!
//! They only differ when an alias is involved.

mod aggregate;
mod alias;
mod column;
mod constant;
pub mod ops;
mod scalar;

use std::collections::BTreeSet;
use std::fmt;

use crate::error::EvalError;
use crate::types::{Row, Value};

pub use aggregate::AggregateExpr;
pub use alias::Alias;
pub use column::ColumnRef;
pub use constant::Constant;
pub use ops::{AggregateFunction, BinaryOp, ScalarFunction, UnaryOp};
pub use scalar::{BinaryExpr, FunctionExpr, UnaryExpr};

/// Boxed expression as produced by the plan compiler.
pub type BoxedExpression = Box<dyn Expression>;

/// Structural identity of an expression, independent of aliases.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprKey(String);

impl ExprKey {
    /// Creates a key from its canonical text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        ExprKey(text.into())
    }

    /// Returns the canonical text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExprKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A polymorphic evaluation node.
///
/// Instances are owned by exactly one evaluation task at a time, so
/// implementations only need to be `Send`.
pub trait Expression: Send + fmt::Debug {
    /// Returns the display text of the expression.
    ///
    /// Structurally equal expressions render identically.
    fn identity(&self) -> String;

    /// Returns the structural key of the expression.
    fn key(&self) -> ExprKey;

    /// Folds one input row into the expression state.
    ///
    /// # Errors
    ///
    /// Returns an [`EvalError`] on type mismatch, arithmetic fault or a
    /// referenced column missing from `row`.
    fn update(&mut self, row: &Row) -> Result<(), EvalError>;

    /// Returns the result of all rows folded so far.
    ///
    /// Legal before any `update`: aggregates then return their empty-input
    /// value (`0` for `COUNT`, NULL otherwise) and column references NULL.
    ///
    /// # Errors
    ///
    /// Returns an [`EvalError`] if the final computation fails.
    fn finalize(&self) -> Result<Value, EvalError>;

    /// Adds every column name referenced by this expression to `out`.
    fn collect_columns(&self, out: &mut BTreeSet<String>);

    /// Returns true if this expression or any child aggregates rows.
    fn contains_aggregate(&self) -> bool {
        false
    }
}

/// Feeds one row to `expr` and returns its value for that row.
pub(crate) fn evaluate_row(expr: &mut dyn Expression, row: &Row) -> Result<Value, EvalError> {
    expr.update(row)?;
    expr.finalize()
}

/// Joins the identities of `args` with `", "`.
pub(crate) fn join_identities(args: &[BoxedExpression]) -> String {
    args.iter()
        .map(|a| a.identity())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Joins the keys of `args` with `", "`.
pub(crate) fn join_keys(args: &[BoxedExpression]) -> String {
    args.iter()
        .map(|a| a.key().0)
        .collect::<Vec<_>>()
        .join(", ")
}
