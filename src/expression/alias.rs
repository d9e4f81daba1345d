use std::collections::BTreeSet;

use crate::error::EvalError;
use crate::types::{Row, Value};

use super::{BoxedExpression, ExprKey, Expression};

/// Renames an expression's output column without changing its key.
#[derive(Debug)]
pub struct Alias {
    inner: BoxedExpression,
    alias: String,
}

impl Alias {
    /// Wraps `inner` under the output name `alias`.
    #[must_use]
    pub fn new(inner: BoxedExpression, alias: impl Into<String>) -> Self {
        Alias {
            inner,
            alias: alias.into(),
        }
    }
}

impl Expression for Alias {
    fn identity(&self) -> String {
        self.alias.clone()
    }

    fn key(&self) -> ExprKey {
        self.inner.key()
    }

    fn update(&mut self, row: &Row) -> Result<(), EvalError> {
        self.inner.update(row)
    }

    fn finalize(&self) -> Result<Value, EvalError> {
        self.inner.finalize()
    }

    fn collect_columns(&self, out: &mut BTreeSet<String>) {
        self.inner.collect_columns(out);
    }

    fn contains_aggregate(&self) -> bool {
        self.inner.contains_aggregate()
    }
}
