//! colfold - columnar projection and aggregation reducer.
//!
//! Given a materialized [`Batch`] and a [`ProjectionPlan`], [`reduce`]
//! produces a single-row batch in which every output column is either read
//! from an existing column at the last logical row or folded over all rows
//! by its own evaluation task.
//!
//! ```
//! use colfold::planner::{PlanExpr, ProjectionPlan};
//! use colfold::expression::AggregateFunction;
//! use colfold::{Batch, Column, DataType, Value};
//!
//! let batch = Batch::from_rows(
//!     vec![Column::new("x", DataType::Int64)],
//!     (1..=4).map(|i| vec![Value::Int64(i)]).collect(),
//! )?;
//! let plan = ProjectionPlan::new(vec![
//!     PlanExpr::count_star(),
//!     PlanExpr::aggregate(AggregateFunction::Sum, PlanExpr::column("x")),
//! ]);
//!
//! let out = colfold::reduce(&batch, &plan)?;
//! assert_eq!(out.rows(), vec![vec![Value::Int64(4), Value::Int64(10)]]);
//! # Ok::<(), colfold::ReduceError>(())
//! ```

pub mod error;
pub mod executor;
pub mod expression;
pub mod planner;
pub mod storage;
pub mod types;

pub use error::{EvalError, ReduceError, Result};
pub use executor::vectorized::{Batch, Column, RowCursor, RowSequence};
pub use executor::{Reducer, ReducerConfig};
pub use planner::{PlanExpr, ProjectionPlan};
pub use types::{DataType, Row, Value};

/// Reduces `batch` with `plan` on the global thread pool.
///
/// # Errors
///
/// Returns the compile error or the first reduction failure; no partial
/// output is produced.
pub fn reduce(batch: &Batch, plan: &ProjectionPlan) -> Result<Batch> {
    Reducer::with_default_config().reduce(batch, plan)
}
