//! Projection planning.
//!
//! The planner compiles a [`ProjectionPlan`] into the ordered list of
//! evaluation nodes consumed by the reducer and resolves the leaf columns
//! those nodes read.

pub mod logical_plan;

use std::collections::BTreeSet;

pub use logical_plan::{PlanExpr, ProjectionPlan};

use crate::error::{ReduceError, Result};
use crate::expression::{
    AggregateExpr, AggregateFunction, Alias, BinaryExpr, BoxedExpression, ColumnRef, Constant,
    Expression, FunctionExpr, ScalarFunction, UnaryExpr,
};

/// Compiles a projection plan into evaluation nodes, one per output column.
///
/// # Errors
///
/// Returns `Compile` for unknown functions, wrong argument counts, aggregates
/// nested inside aggregates, argument-less aggregates other than `COUNT(*)`
/// and empty aliases.
pub fn compile(plan: &ProjectionPlan) -> Result<Vec<BoxedExpression>> {
    plan.expressions.iter().map(compile_expr).collect()
}

fn compile_expr(expr: &PlanExpr) -> Result<BoxedExpression> {
    let compiled: BoxedExpression = match expr {
        PlanExpr::Literal(value) => Box::new(Constant::new(value.clone())),
        PlanExpr::Column(name) => Box::new(ColumnRef::new(name.clone())),
        PlanExpr::Binary { left, op, right } => Box::new(BinaryExpr::new(
            compile_expr(left)?,
            *op,
            compile_expr(right)?,
        )),
        PlanExpr::Unary { op, operand } => Box::new(UnaryExpr::new(*op, compile_expr(operand)?)),
        PlanExpr::Function { name, args } => {
            let function = ScalarFunction::from_name(name)
                .ok_or_else(|| ReduceError::Compile(format!("unknown function '{name}'")))?;
            if !function.accepts_arity(args.len()) {
                return Err(ReduceError::Compile(format!(
                    "{} does not take {} argument(s)",
                    function.name(),
                    args.len()
                )));
            }
            let args = args.iter().map(compile_expr).collect::<Result<Vec<_>>>()?;
            Box::new(FunctionExpr::new(function, args))
        }
        PlanExpr::Aggregate { function, arg } => match arg {
            Some(arg) if arg.contains_aggregate() => {
                return Err(ReduceError::Compile(format!(
                    "aggregate {} cannot contain another aggregate",
                    function.name()
                )));
            }
            Some(arg) => Box::new(AggregateExpr::new(*function, Some(compile_expr(arg)?))),
            None if *function == AggregateFunction::Count => Box::new(AggregateExpr::count_star()),
            None => {
                return Err(ReduceError::Compile(format!(
                    "{} requires an argument",
                    function.name()
                )));
            }
        },
        PlanExpr::Alias { expr, alias } => {
            if alias.is_empty() {
                return Err(ReduceError::Compile("empty alias".to_string()));
            }
            Box::new(Alias::new(compile_expr(expr)?, alias.clone()))
        }
    };
    Ok(compiled)
}

/// Returns every column name referenced anywhere in `expressions`.
#[must_use]
pub fn resolve_leaf_columns(expressions: &[BoxedExpression]) -> BTreeSet<String> {
    let mut fields = BTreeSet::new();
    for expr in expressions {
        expr.collect_columns(&mut fields);
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::BinaryOp;
    use crate::types::Value;

    #[test]
    fn test_compile_preserves_order_and_identity() {
        let plan = ProjectionPlan::new(vec![
            PlanExpr::column("a"),
            PlanExpr::count_star(),
            PlanExpr::binary(
                PlanExpr::aggregate(AggregateFunction::Sum, PlanExpr::column("x")),
                BinaryOp::Add,
                PlanExpr::literal(Value::Int64(1)),
            ),
            PlanExpr::function("upper", vec![PlanExpr::column("s")]).alias("loud"),
        ]);
        let exprs = compile(&plan).unwrap();
        let names: Vec<_> = exprs.iter().map(|e| e.identity()).collect();
        assert_eq!(names, vec!["a", "COUNT(*)", "(SUM(x) + 1)", "loud"]);
        assert_eq!(exprs[3].key().as_str(), "UPPER(s)");
    }

    #[test]
    fn test_compile_unknown_function() {
        let plan = ProjectionPlan::default().with(PlanExpr::function("nope", vec![]));
        let err = compile(&plan).err().unwrap();
        assert!(matches!(err, ReduceError::Compile(ref m) if m.contains("nope")));
    }

    #[test]
    fn test_compile_wrong_arity() {
        let plan = ProjectionPlan::default().with(PlanExpr::function(
            "ABS",
            vec![PlanExpr::column("a"), PlanExpr::column("b")],
        ));
        assert!(matches!(compile(&plan), Err(ReduceError::Compile(_))));
    }

    #[test]
    fn test_compile_rejects_nested_aggregate() {
        let plan = ProjectionPlan::default().with(PlanExpr::aggregate(
            AggregateFunction::Max,
            PlanExpr::aggregate(AggregateFunction::Sum, PlanExpr::column("x")),
        ));
        assert!(matches!(compile(&plan), Err(ReduceError::Compile(_))));
    }

    #[test]
    fn test_compile_rejects_argless_sum() {
        let plan = ProjectionPlan::default().with(PlanExpr::Aggregate {
            function: AggregateFunction::Sum,
            arg: None,
        });
        assert!(matches!(compile(&plan), Err(ReduceError::Compile(_))));
    }

    #[test]
    fn test_resolve_leaf_columns() {
        let plan = ProjectionPlan::new(vec![
            PlanExpr::column("b"),
            PlanExpr::count_star(),
            PlanExpr::binary(PlanExpr::column("a"), BinaryOp::Mul, PlanExpr::column("b")),
            PlanExpr::literal(Value::Int64(7)),
        ]);
        let exprs = compile(&plan).unwrap();
        let fields = resolve_leaf_columns(&exprs);
        assert_eq!(fields.into_iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_plan_compiles_to_nothing() {
        assert!(compile(&ProjectionPlan::default()).unwrap().is_empty());
    }
}
