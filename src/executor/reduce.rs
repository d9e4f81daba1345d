//! Parallel per-expression evaluation.
//!
//! ```text
//!            Batch (read-only)
//!     ┌──────────┼──────────┐
//!  cursor 0   cursor 1   cursor 2
//!     ▼          ▼          ▼
//!   expr 0     expr 2     expr 3      (expr 1 is pass-through)
//!     │          │          │
//!     └──────────┴──────────┘
//!          join barrier
//!               ▼
//!     first failure by position
//! ```

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{ReduceError, Result};
use crate::executor::vectorized::Batch;
use crate::expression::{BoxedExpression, Expression};
use crate::types::Row;

/// Where an output column's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Already materialized as the batch column at this position.
    PassThrough(usize),
    /// Must be folded over the batch rows.
    Computed,
}

/// Splits expressions into pass-through and computed slots.
///
/// An expression is pass-through when its structural key names an existing
/// column.
#[must_use]
pub fn partition(batch: &Batch, exprs: &[BoxedExpression]) -> Vec<Slot> {
    exprs
        .iter()
        .map(|expr| {
            batch
                .position(expr.key().as_str())
                .map_or(Slot::Computed, Slot::PassThrough)
        })
        .collect()
}

/// Collects failures from concurrent evaluation tasks.
#[derive(Debug, Default)]
pub struct TaskErrors {
    /// Failures indexed by expression position.
    errors_by_expr: Mutex<BTreeMap<usize, ReduceError>>,
}

impl TaskErrors {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the failure of the expression at `index`.
    ///
    /// Only the first failure per expression is kept.
    pub fn record(&self, index: usize, error: ReduceError) {
        self.errors_by_expr.lock().entry(index).or_insert(error);
    }

    /// Returns the number of failed expressions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors_by_expr.lock().len()
    }

    /// Returns true if no failure was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors_by_expr.lock().is_empty()
    }

    /// Removes and returns the failure with the lowest expression position.
    #[must_use]
    pub fn take_first(&self) -> Option<(usize, ReduceError)> {
        self.errors_by_expr.lock().pop_first()
    }
}

/// Shared state borrowed by every task of one reduction.
struct TaskContext<'a> {
    batch: &'a Batch,
    fields: &'a [String],
    errors: TaskErrors,
    cancelled: AtomicBool,
    cancel_on_error: bool,
}

/// Folds every computed expression over the batch, one task per expression,
/// and waits for all of them.
///
/// Runs on `pool` when given, otherwise on the global rayon pool.
///
/// # Errors
///
/// Returns the failure of the earliest expression, by position, that failed.
pub fn evaluate(
    batch: &Batch,
    exprs: &mut [BoxedExpression],
    slots: &[Slot],
    fields: &[String],
    cancel_on_error: bool,
    pool: Option<&rayon::ThreadPool>,
) -> Result<()> {
    let ctx = TaskContext {
        batch,
        fields,
        errors: TaskErrors::new(),
        cancelled: AtomicBool::new(false),
        cancel_on_error,
    };

    match pool {
        Some(pool) => pool.scope(|s| spawn_tasks(s, &ctx, exprs, slots)),
        None => rayon::scope(|s| spawn_tasks(s, &ctx, exprs, slots)),
    }

    match ctx.errors.take_first() {
        Some((index, error)) => {
            debug!(index, failed = ctx.errors.len() + 1, %error, "reduction failed");
            Err(error)
        }
        None => Ok(()),
    }
}

fn spawn_tasks<'scope>(
    s: &rayon::Scope<'scope>,
    ctx: &'scope TaskContext<'scope>,
    exprs: &'scope mut [BoxedExpression],
    slots: &[Slot],
) {
    for ((index, expr), slot) in exprs.iter_mut().enumerate().zip(slots) {
        if *slot != Slot::Computed {
            continue;
        }
        s.spawn(move |_| run_task(ctx, index, expr.as_mut()));
    }
}

fn run_task(ctx: &TaskContext<'_>, index: usize, expr: &mut dyn Expression) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| fold_rows(ctx, expr)));
    let error = match outcome {
        Ok(Ok(())) => return,
        Ok(Err(error)) => {
            debug!(index, expr = %expr.identity(), %error, "evaluation task failed");
            error
        }
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(ToString::to_string)
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            warn!(index, %message, "evaluation task panicked");
            ReduceError::ThreadPanic(message)
        }
    };
    if ctx.cancel_on_error {
        ctx.cancelled.store(true, Ordering::Relaxed);
    }
    ctx.errors.record(index, error);
}

/// Feeds every logical row of the batch, projected onto the field set, to
/// `expr`. Stops at the first failure or when a sibling cancelled the run.
fn fold_rows(ctx: &TaskContext<'_>, expr: &mut dyn Expression) -> Result<()> {
    let cursor = ctx.batch.cursor(ctx.fields)?;
    let names: Vec<String> = cursor.columns().iter().map(|c| c.name.clone()).collect();
    let mut row = Row::with_capacity(names.len());

    for tuple in cursor {
        if ctx.cancel_on_error && ctx.cancelled.load(Ordering::Relaxed) {
            return Ok(());
        }
        for (name, value) in names.iter().zip(tuple) {
            row.set(name.clone(), value);
        }
        expr.update(&row)?;
    }
    Ok(())
}
