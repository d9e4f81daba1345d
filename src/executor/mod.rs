//! Executor module for projection reduction.
//!
//! [`Reducer`] turns one input [`Batch`] and a projection into a single-row
//! output batch: pass-through columns are read at the last logical row and
//! every other expression is folded over all rows on its own task.

mod materialize;
pub mod reduce;
pub mod vectorized;

use std::collections::BTreeSet;

use tracing::{debug, instrument};

use crate::error::{ReduceError, Result};
use crate::expression::BoxedExpression;
use crate::planner::{self, ProjectionPlan};

use self::reduce::Slot;
use self::vectorized::Batch;

/// Configuration for the reducer.
#[derive(Debug, Clone, Default)]
pub struct ReducerConfig {
    /// Worker threads for a dedicated pool (None = global rayon pool).
    pub num_threads: Option<usize>,
    /// Stop sibling tasks at their next row once one task has failed.
    ///
    /// Off by default: the reported error is then always the earliest
    /// failing expression in plan order.
    pub cancel_on_error: bool,
}

impl ReducerConfig {
    /// Creates a new reducer configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of worker threads.
    #[must_use]
    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    /// Enables or disables cooperative cancellation.
    #[must_use]
    pub fn with_cancel_on_error(mut self, cancel_on_error: bool) -> Self {
        self.cancel_on_error = cancel_on_error;
        self
    }
}

/// Projection/aggregation reducer.
pub struct Reducer {
    /// Reducer configuration.
    config: ReducerConfig,
    /// Dedicated pool when `num_threads` is set.
    pool: Option<rayon::ThreadPool>,
}

impl Reducer {
    /// Creates a reducer with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `ThreadPool` if a dedicated pool was requested and could not
    /// be built.
    pub fn new(config: ReducerConfig) -> Result<Self> {
        let pool = match config.num_threads {
            Some(threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("colfold-reduce-{i}"))
                    .build()
                    .map_err(|e| ReduceError::ThreadPool(e.to_string()))?,
            ),
            None => None,
        };
        Ok(Self { config, pool })
    }

    /// Creates a reducer on the global rayon pool.
    #[must_use]
    pub fn with_default_config() -> Self {
        Self {
            config: ReducerConfig::default(),
            pool: None,
        }
    }

    /// Compiles `plan` and reduces `batch` with it.
    ///
    /// # Errors
    ///
    /// Returns the compile error, or the first failure of the reduction.
    #[instrument(name = "reduce::plan", level = "trace", skip_all, fields(exprs = plan.len()))]
    pub fn reduce(&self, batch: &Batch, plan: &ProjectionPlan) -> Result<Batch> {
        let mut exprs = planner::compile(plan)?;
        let fields = planner::resolve_leaf_columns(&exprs);
        self.reduce_expressions(batch, &mut exprs, &fields)
    }

    /// Reduces `batch` with already compiled expressions.
    ///
    /// `fields` is the set of columns every evaluation task projects; it is
    /// normally [`planner::resolve_leaf_columns`] of `exprs`.
    ///
    /// # Errors
    ///
    /// - `UnknownColumn` if `fields` names a column the batch lacks
    /// - `Eval` for the earliest expression, in list order, that failed
    /// - `ThreadPanic` if an evaluation task panicked
    /// - `RowArity` if the output row could not be assembled
    #[instrument(
        name = "reduce::expressions",
        level = "trace",
        skip_all,
        fields(rows = batch.num_rows(), exprs = exprs.len())
    )]
    pub fn reduce_expressions(
        &self,
        batch: &Batch,
        exprs: &mut [BoxedExpression],
        fields: &BTreeSet<String>,
    ) -> Result<Batch> {
        if batch.num_rows() == 0 {
            debug!("empty input, returning header only");
            return Ok(materialize::header_only(exprs));
        }

        let slots = reduce::partition(batch, exprs);
        let computed = slots.iter().filter(|s| **s == Slot::Computed).count();
        debug!(computed, pass_through = slots.len() - computed, "partitioned expressions");

        if computed > 0 {
            let fields: Vec<String> = fields.iter().cloned().collect();
            reduce::evaluate(
                batch,
                exprs,
                &slots,
                &fields,
                self.config.cancel_on_error,
                self.pool.as_ref(),
            )?;
        }

        materialize::materialize(batch, exprs, &slots)
    }
}

impl Default for Reducer {
    fn default() -> Self {
        Self::with_default_config()
    }
}
