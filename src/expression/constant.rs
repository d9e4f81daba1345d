use std::collections::BTreeSet;

use crate::error::EvalError;
use crate::types::{Row, Value};

use super::{ExprKey, Expression};

/// Literal value; ignores input rows.
#[derive(Debug, Clone)]
pub struct Constant {
    value: Value,
}

impl Constant {
    /// Creates a constant expression.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Constant { value }
    }
}

impl Expression for Constant {
    fn identity(&self) -> String {
        self.value.to_string()
    }

    fn key(&self) -> ExprKey {
        ExprKey::new(self.value.to_string())
    }

    fn update(&mut self, _row: &Row) -> Result<(), EvalError> {
        Ok(())
    }

    fn finalize(&self) -> Result<Value, EvalError> {
        Ok(self.value.clone())
    }

    fn collect_columns(&self, _out: &mut BTreeSet<String>) {}
}
