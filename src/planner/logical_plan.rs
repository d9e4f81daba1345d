//! Logical projection plan definitions.

use serde::{Deserialize, Serialize};

use crate::expression::{AggregateFunction, BinaryOp, UnaryOp};
use crate::types::Value;

/// Logical expression tree (what to compute).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlanExpr {
    /// Literal value (constant).
    Literal(Value),

    /// Reference to an input column.
    Column(String),

    /// Binary operator.
    Binary {
        left: Box<PlanExpr>,
        op: BinaryOp,
        right: Box<PlanExpr>,
    },

    /// Unary operator.
    Unary { op: UnaryOp, operand: Box<PlanExpr> },

    /// Scalar function call, resolved by name at compile time.
    Function { name: String, args: Vec<PlanExpr> },

    /// Aggregation function call.
    Aggregate {
        function: AggregateFunction,
        arg: Option<Box<PlanExpr>>, // None for COUNT(*)
    },

    /// Output name for an expression.
    Alias { expr: Box<PlanExpr>, alias: String },
}

impl PlanExpr {
    /// Creates a literal expression.
    #[must_use]
    pub fn literal(value: Value) -> Self {
        PlanExpr::Literal(value)
    }

    /// Creates a column reference.
    #[must_use]
    pub fn column(name: impl Into<String>) -> Self {
        PlanExpr::Column(name.into())
    }

    /// Creates a binary expression.
    #[must_use]
    pub fn binary(left: PlanExpr, op: BinaryOp, right: PlanExpr) -> Self {
        PlanExpr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Creates a unary expression.
    #[must_use]
    pub fn unary(op: UnaryOp, operand: PlanExpr) -> Self {
        PlanExpr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    /// Creates a scalar function call.
    #[must_use]
    pub fn function(name: impl Into<String>, args: Vec<PlanExpr>) -> Self {
        PlanExpr::Function {
            name: name.into(),
            args,
        }
    }

    /// Creates an aggregate over `arg`.
    #[must_use]
    pub fn aggregate(function: AggregateFunction, arg: PlanExpr) -> Self {
        PlanExpr::Aggregate {
            function,
            arg: Some(Box::new(arg)),
        }
    }

    /// Creates a COUNT(*) expression.
    #[must_use]
    pub fn count_star() -> Self {
        PlanExpr::Aggregate {
            function: AggregateFunction::Count,
            arg: None,
        }
    }

    /// Names the output of this expression.
    #[must_use]
    pub fn alias(self, alias: impl Into<String>) -> Self {
        PlanExpr::Alias {
            expr: Box::new(self),
            alias: alias.into(),
        }
    }

    /// Returns true if the tree contains an aggregate.
    #[must_use]
    pub fn contains_aggregate(&self) -> bool {
        match self {
            PlanExpr::Literal(_) | PlanExpr::Column(_) => false,
            PlanExpr::Aggregate { .. } => true,
            PlanExpr::Binary { left, right, .. } => {
                left.contains_aggregate() || right.contains_aggregate()
            }
            PlanExpr::Unary { operand, .. } => operand.contains_aggregate(),
            PlanExpr::Function { args, .. } => args.iter().any(PlanExpr::contains_aggregate),
            PlanExpr::Alias { expr, .. } => expr.contains_aggregate(),
        }
    }
}

/// Ordered list of output expressions for one reduction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPlan {
    /// Output expressions in column order.
    pub expressions: Vec<PlanExpr>,
}

impl ProjectionPlan {
    /// Creates a plan from its output expressions.
    #[must_use]
    pub fn new(expressions: Vec<PlanExpr>) -> Self {
        ProjectionPlan { expressions }
    }

    /// Appends an output expression.
    #[must_use]
    pub fn with(mut self, expr: PlanExpr) -> Self {
        self.expressions.push(expr);
        self
    }

    /// Returns the number of output expressions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.expressions.len()
    }

    /// Returns true if the plan has no output expressions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }
}
