use std::collections::BTreeSet;

use crate::error::EvalError;
use crate::types::{Row, Value};

use super::{ExprKey, Expression};

/// Reference to an input column; yields the value of the last row seen.
#[derive(Debug, Clone)]
pub struct ColumnRef {
    name: String,
    current: Value,
}

impl ColumnRef {
    /// Creates a reference to the named column.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        ColumnRef {
            name: name.into(),
            current: Value::Null,
        }
    }

    /// Returns the referenced column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Expression for ColumnRef {
    fn identity(&self) -> String {
        self.name.clone()
    }

    fn key(&self) -> ExprKey {
        ExprKey::new(self.name.clone())
    }

    fn update(&mut self, row: &Row) -> Result<(), EvalError> {
        let value = row
            .get(&self.name)
            .ok_or_else(|| EvalError::MissingField(self.name.clone()))?;
        self.current = value.clone();
        Ok(())
    }

    fn finalize(&self) -> Result<Value, EvalError> {
        Ok(self.current.clone())
    }

    fn collect_columns(&self, out: &mut BTreeSet<String>) {
        out.insert(self.name.clone());
    }
}
