//! Row-level operators and functions.
//!
//! These nodes forward every row to their children. A node over plain
//! columns re-evaluates on each row and keeps the result of the last one. A
//! node with an aggregate below it only evaluates in `finalize`, so a tree
//! such as `SUM(x) + 1` finalizes to the operator applied to the aggregate's
//! final value and never sees a running total.

use std::collections::BTreeSet;

use crate::error::EvalError;
use crate::types::{Row, Value};

use super::ops::{eval_binary, eval_unary, BinaryOp, ScalarFunction, UnaryOp};
use super::{join_identities, join_keys, BoxedExpression, ExprKey, Expression};

/// Binary operator node.
#[derive(Debug)]
pub struct BinaryExpr {
    left: BoxedExpression,
    op: BinaryOp,
    right: BoxedExpression,
    deferred: bool,
    current: Option<Value>,
}

impl BinaryExpr {
    /// Creates a binary operator node.
    #[must_use]
    pub fn new(left: BoxedExpression, op: BinaryOp, right: BoxedExpression) -> Self {
        let deferred = left.contains_aggregate() || right.contains_aggregate();
        BinaryExpr {
            left,
            op,
            right,
            deferred,
            current: None,
        }
    }

    fn evaluate(&self) -> Result<Value, EvalError> {
        eval_binary(self.op, &self.left.finalize()?, &self.right.finalize()?)
    }
}

impl Expression for BinaryExpr {
    fn identity(&self) -> String {
        format!(
            "({} {} {})",
            self.left.identity(),
            self.op.as_str(),
            self.right.identity()
        )
    }

    fn key(&self) -> ExprKey {
        ExprKey::new(format!(
            "({} {} {})",
            self.left.key(),
            self.op.as_str(),
            self.right.key()
        ))
    }

    fn update(&mut self, row: &Row) -> Result<(), EvalError> {
        self.left.update(row)?;
        self.right.update(row)?;
        if !self.deferred {
            self.current = Some(self.evaluate()?);
        }
        Ok(())
    }

    fn finalize(&self) -> Result<Value, EvalError> {
        match &self.current {
            Some(value) => Ok(value.clone()),
            None => self.evaluate(),
        }
    }

    fn collect_columns(&self, out: &mut BTreeSet<String>) {
        self.left.collect_columns(out);
        self.right.collect_columns(out);
    }

    fn contains_aggregate(&self) -> bool {
        self.deferred
    }
}

/// Unary operator node.
#[derive(Debug)]
pub struct UnaryExpr {
    op: UnaryOp,
    operand: BoxedExpression,
    deferred: bool,
    current: Option<Value>,
}

impl UnaryExpr {
    /// Creates a unary operator node.
    #[must_use]
    pub fn new(op: UnaryOp, operand: BoxedExpression) -> Self {
        UnaryExpr {
            op,
            deferred: operand.contains_aggregate(),
            operand,
            current: None,
        }
    }

    fn render(&self, inner: &str) -> String {
        match self.op {
            UnaryOp::Not => format!("(NOT {inner})"),
            UnaryOp::Neg => format!("(-{inner})"),
        }
    }
}

impl Expression for UnaryExpr {
    fn identity(&self) -> String {
        self.render(&self.operand.identity())
    }

    fn key(&self) -> ExprKey {
        ExprKey::new(self.render(self.operand.key().as_str()))
    }

    fn update(&mut self, row: &Row) -> Result<(), EvalError> {
        self.operand.update(row)?;
        if !self.deferred {
            self.current = Some(eval_unary(self.op, &self.operand.finalize()?)?);
        }
        Ok(())
    }

    fn finalize(&self) -> Result<Value, EvalError> {
        match &self.current {
            Some(value) => Ok(value.clone()),
            None => eval_unary(self.op, &self.operand.finalize()?),
        }
    }

    fn collect_columns(&self, out: &mut BTreeSet<String>) {
        self.operand.collect_columns(out);
    }

    fn contains_aggregate(&self) -> bool {
        self.deferred
    }
}

/// Scalar function call node.
#[derive(Debug)]
pub struct FunctionExpr {
    function: ScalarFunction,
    args: Vec<BoxedExpression>,
    deferred: bool,
    current: Option<Value>,
}

impl FunctionExpr {
    /// Creates a function call node. Arity is checked by the compiler.
    #[must_use]
    pub fn new(function: ScalarFunction, args: Vec<BoxedExpression>) -> Self {
        FunctionExpr {
            function,
            deferred: args.iter().any(|a| a.contains_aggregate()),
            args,
            current: None,
        }
    }

    fn evaluate(&self) -> Result<Value, EvalError> {
        let values = self
            .args
            .iter()
            .map(|a| a.finalize())
            .collect::<Result<Vec<_>, _>>()?;
        self.function.apply(&values)
    }
}

impl Expression for FunctionExpr {
    fn identity(&self) -> String {
        format!("{}({})", self.function.name(), join_identities(&self.args))
    }

    fn key(&self) -> ExprKey {
        ExprKey::new(format!("{}({})", self.function.name(), join_keys(&self.args)))
    }

    fn update(&mut self, row: &Row) -> Result<(), EvalError> {
        for arg in &mut self.args {
            arg.update(row)?;
        }
        if !self.deferred {
            self.current = Some(self.evaluate()?);
        }
        Ok(())
    }

    fn finalize(&self) -> Result<Value, EvalError> {
        match &self.current {
            Some(value) => Ok(value.clone()),
            None => self.evaluate(),
        }
    }

    fn collect_columns(&self, out: &mut BTreeSet<String>) {
        for arg in &self.args {
            arg.collect_columns(out);
        }
    }

    fn contains_aggregate(&self) -> bool {
        self.deferred
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::{AggregateExpr, AggregateFunction, Alias, ColumnRef, Constant};

    fn row(x: i64) -> Row {
        [("x", Value::Int64(x))].into_iter().collect()
    }

    #[test]
    fn test_binary_uses_last_row() {
        let mut expr = BinaryExpr::new(
            Box::new(ColumnRef::new("x")),
            BinaryOp::Mul,
            Box::new(Constant::new(Value::Int64(10))),
        );
        assert_eq!(expr.identity(), "(x * 10)");
        expr.update(&row(1)).unwrap();
        expr.update(&row(4)).unwrap();
        assert_eq!(expr.finalize().unwrap(), Value::Int64(40));
    }

    #[test]
    fn test_binary_before_update_is_null() {
        let expr = BinaryExpr::new(
            Box::new(ColumnRef::new("x")),
            BinaryOp::Add,
            Box::new(Constant::new(Value::Int64(1))),
        );
        assert_eq!(expr.finalize().unwrap(), Value::Null);
    }

    #[test]
    fn test_binary_error_surfaces_on_update() {
        let mut expr = BinaryExpr::new(
            Box::new(ColumnRef::new("x")),
            BinaryOp::Div,
            Box::new(Constant::new(Value::Int64(0))),
        );
        assert_eq!(expr.update(&row(1)), Err(EvalError::DivisionByZero));
    }

    fn sum_x() -> BoxedExpression {
        Box::new(AggregateExpr::new(
            AggregateFunction::Sum,
            Some(Box::new(ColumnRef::new("x"))),
        ))
    }

    #[test]
    fn test_aggregate_operand_waits_for_final_value() {
        let mut expr = BinaryExpr::new(
            Box::new(Constant::new(Value::Int64(10))),
            BinaryOp::Div,
            sum_x(),
        );
        assert!(expr.contains_aggregate());
        // Running sum is 0 after the first row.
        expr.update(&row(0)).unwrap();
        expr.update(&row(5)).unwrap();
        assert_eq!(expr.finalize().unwrap(), Value::Int64(2));
    }

    #[test]
    fn test_mixed_operands_use_last_row_and_final_aggregate() {
        let mut expr = BinaryExpr::new(Box::new(ColumnRef::new("x")), BinaryOp::Add, sum_x());
        for x in [1, 2, 3] {
            expr.update(&row(x)).unwrap();
        }
        assert_eq!(expr.finalize().unwrap(), Value::Int64(9));
    }

    #[test]
    fn test_function_over_aggregate_is_deferred() {
        let mut expr = FunctionExpr::new(ScalarFunction::Abs, vec![sum_x()]);
        expr.update(&row(-4)).unwrap();
        expr.update(&row(1)).unwrap();
        assert_eq!(expr.finalize().unwrap(), Value::Int64(3));

        let mut neg = UnaryExpr::new(UnaryOp::Neg, sum_x());
        neg.update(&row(i64::MIN + 1)).unwrap();
        neg.update(&row(-1)).unwrap();
        assert!(matches!(neg.finalize(), Err(EvalError::Overflow(_))));
    }

    #[test]
    fn test_alias_changes_identity_not_key() {
        let inner = FunctionExpr::new(ScalarFunction::Abs, vec![Box::new(ColumnRef::new("x"))]);
        let aliased = Alias::new(Box::new(inner), "magnitude");
        assert_eq!(aliased.identity(), "magnitude");
        assert_eq!(aliased.key(), ExprKey::new("ABS(x)"));
    }

    #[test]
    fn test_nested_alias_key_is_structural() {
        let expr = UnaryExpr::new(
            UnaryOp::Neg,
            Box::new(Alias::new(Box::new(ColumnRef::new("x")), "y")),
        );
        assert_eq!(expr.identity(), "(-y)");
        assert_eq!(expr.key().as_str(), "(-x)");
    }

    #[test]
    fn test_function_collects_columns() {
        let expr = FunctionExpr::new(
            ScalarFunction::Coalesce,
            vec![
                Box::new(ColumnRef::new("b")),
                Box::new(ColumnRef::new("a")),
                Box::new(Constant::new(Value::Int64(0))),
            ],
        );
        let mut cols = BTreeSet::new();
        expr.collect_columns(&mut cols);
        assert_eq!(cols.into_iter().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(expr.identity(), "COALESCE(b, a, 0)");
    }
}
