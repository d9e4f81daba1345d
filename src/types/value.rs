//! Value and `DataType` definitions.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Supported data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 32-bit floating point.
    Float32,
    /// 64-bit floating point.
    Float64,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    String,
    /// Date (stored as days since epoch).
    Date,
    /// Timestamp (stored as microseconds since epoch).
    Timestamp,
    /// Type of a value that is always NULL.
    Null,
}

impl DataType {
    /// Returns the SQL name of the data type.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Int64 => "INT64",
            DataType::Float32 => "FLOAT32",
            DataType::Float64 => "FLOAT64",
            DataType::Bool => "BOOL",
            DataType::String => "STRING",
            DataType::Date => "DATE",
            DataType::Timestamp => "TIMESTAMP",
            DataType::Null => "NULL",
        }
    }

    /// Infers the data type of a value from its runtime tag.
    ///
    /// Every value maps to exactly one data type.
    #[must_use]
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Int64(_) => DataType::Int64,
            Value::Float32(_) => DataType::Float32,
            Value::Float64(_) => DataType::Float64,
            Value::Bool(_) => DataType::Bool,
            Value::String(_) => DataType::String,
            Value::Date(_) => DataType::Date,
            Value::Timestamp(_) => DataType::Timestamp,
            Value::Null => DataType::Null,
        }
    }

    /// Fallible form of [`DataType::of`] used when materializing computed columns.
    ///
    /// # Errors
    ///
    /// Never fails for values produced inside this crate; the signature keeps
    /// `UnsupportedType` available to callers that extend the value model.
    pub fn try_from_value(value: &Value) -> Result<Self> {
        Ok(Self::of(value))
    }

    /// Returns whether this type is numeric.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::Int64 | DataType::Float32 | DataType::Float64
        )
    }

    /// Returns whether this type is orderable.
    #[must_use]
    pub fn is_orderable(&self) -> bool {
        matches!(
            self,
            DataType::Int64
                | DataType::Float32
                | DataType::Float64
                | DataType::String
                | DataType::Date
                | DataType::Timestamp
        )
    }

    /// Converts to an Arrow data type.
    #[must_use]
    pub fn to_arrow(&self) -> arrow::datatypes::DataType {
        match self {
            DataType::Int64 => arrow::datatypes::DataType::Int64,
            DataType::Float32 => arrow::datatypes::DataType::Float32,
            DataType::Float64 => arrow::datatypes::DataType::Float64,
            DataType::Bool => arrow::datatypes::DataType::Boolean,
            DataType::String => arrow::datatypes::DataType::Utf8,
            DataType::Date => arrow::datatypes::DataType::Date32,
            DataType::Timestamp => {
                arrow::datatypes::DataType::Timestamp(arrow::datatypes::TimeUnit::Microsecond, None)
            }
            DataType::Null => arrow::datatypes::DataType::Null,
        }
    }

    /// Converts from an Arrow data type.
    ///
    /// Returns None for unsupported Arrow types.
    #[must_use]
    pub fn from_arrow(arrow_type: &arrow::datatypes::DataType) -> Option<Self> {
        match arrow_type {
            arrow::datatypes::DataType::Int64 => Some(DataType::Int64),
            arrow::datatypes::DataType::Float32 => Some(DataType::Float32),
            arrow::datatypes::DataType::Float64 => Some(DataType::Float64),
            arrow::datatypes::DataType::Boolean => Some(DataType::Bool),
            arrow::datatypes::DataType::Utf8 => Some(DataType::String),
            arrow::datatypes::DataType::Date32 => Some(DataType::Date),
            arrow::datatypes::DataType::Timestamp(arrow::datatypes::TimeUnit::Microsecond, None) => {
                Some(DataType::Timestamp)
            }
            arrow::datatypes::DataType::Null => Some(DataType::Null),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runtime value container for data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// 64-bit signed integer value.
    Int64(i64),
    /// 32-bit floating point value.
    Float32(f32),
    /// 64-bit floating point value.
    Float64(f64),
    /// Boolean value.
    Bool(bool),
    /// String value.
    String(String),
    /// Date value (days since Unix epoch).
    Date(i32),
    /// Timestamp value (microseconds since Unix epoch).
    Timestamp(i64),
    /// Null value.
    Null,
}

// Manual Hash implementation because f32/f64 doesn't implement Hash
impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Int64(v) | Value::Timestamp(v) => v.hash(state),
            Value::Float32(v) => v.to_bits().hash(state),
            Value::Float64(v) => v.to_bits().hash(state),
            Value::Bool(v) => v.hash(state),
            Value::String(v) => v.hash(state),
            Value::Date(v) => v.hash(state),
            Value::Null => {}
        }
    }
}

// Manual Eq implementation because f64 doesn't implement Eq
impl Eq for Value {}

impl Value {
    /// Returns true if this value is null.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the data type of this value.
    #[must_use]
    pub fn data_type(&self) -> DataType {
        DataType::of(self)
    }

    /// Returns the SQL name of this value's type, for error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.data_type().name()
    }

    /// Compares two values using SQL null semantics.
    ///
    /// Returns None if either value is null or types don't match.
    #[must_use]
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int64(a), Value::Int64(b))
            | (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            (Value::Float32(a), Value::Float32(b)) => a.partial_cmp(b),
            (Value::Float64(a), Value::Float64(b)) => a.partial_cmp(b),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            // Null or type mismatch
            _ => None,
        }
    }
}

/// Renders the value as a SQL literal.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float32(v) => write!(f, "{v:?}"),
            Value::Float64(v) => write!(f, "{v:?}"),
            Value::Bool(true) => f.write_str("TRUE"),
            Value::Bool(false) => f.write_str("FALSE"),
            Value::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Value::Date(d) => write!(f, "DATE {d}"),
            Value::Timestamp(t) => write!(f, "TIMESTAMP {t}"),
            Value::Null => f.write_str("NULL"),
        }
    }
}

/// Column-name to value mapping for one input row.
#[derive(Debug, Clone, Default)]
pub struct Row {
    values: HashMap<String, Value>,
}

impl Row {
    /// Creates an empty row with room for `capacity` columns.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Row {
            values: HashMap::with_capacity(capacity),
        }
    }

    /// Sets a column value in the row.
    pub fn set(&mut self, column: String, value: Value) {
        self.values.insert(column, value);
    }

    /// Gets a value by column name.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    /// Returns the number of columns in the row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns true if the row contains the given column.
    #[must_use]
    pub fn contains_key(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }
}

impl<S: Into<String>> FromIterator<(S, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (S, Value)>>(iter: I) -> Self {
        Row {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_inference_is_total() {
        let values = [
            Value::Int64(1),
            Value::Float32(1.0),
            Value::Float64(1.0),
            Value::Bool(true),
            Value::String("a".into()),
            Value::Date(3),
            Value::Timestamp(4),
            Value::Null,
        ];
        for value in &values {
            let dt = DataType::try_from_value(value).unwrap();
            assert_eq!(dt, value.data_type());
        }
        assert_eq!(DataType::of(&Value::Null), DataType::Null);
    }

    #[test]
    fn test_arrow_mapping_roundtrip() {
        for dt in [
            DataType::Int64,
            DataType::Float32,
            DataType::Float64,
            DataType::Bool,
            DataType::String,
            DataType::Date,
            DataType::Timestamp,
            DataType::Null,
        ] {
            assert_eq!(DataType::from_arrow(&dt.to_arrow()), Some(dt));
        }
        assert_eq!(
            DataType::from_arrow(&arrow::datatypes::DataType::UInt8),
            None
        );
    }

    #[test]
    fn test_literal_display() {
        assert_eq!(Value::Int64(-3).to_string(), "-3");
        assert_eq!(Value::Float64(1.5).to_string(), "1.5");
        assert_eq!(Value::Float64(2.0).to_string(), "2.0");
        assert_eq!(Value::String("it's".into()).to_string(), "'it''s'");
        assert_eq!(Value::Bool(true).to_string(), "TRUE");
        assert_eq!(Value::Null.to_string(), "NULL");
    }

    #[test]
    fn test_compare_null_and_mismatch() {
        assert_eq!(
            Value::Int64(1).compare(&Value::Int64(2)),
            Some(Ordering::Less)
        );
        assert_eq!(Value::Int64(1).compare(&Value::Null), None);
        assert_eq!(Value::Int64(1).compare(&Value::String("1".into())), None);
    }

    #[test]
    fn test_row_from_iter() {
        let row: Row = [("a", Value::Int64(1)), ("b", Value::Null)]
            .into_iter()
            .collect();
        assert_eq!(row.len(), 2);
        assert_eq!(row.get("a"), Some(&Value::Int64(1)));
        assert!(row.contains_key("b"));
        assert!(!row.contains_key("c"));
    }
}
