//! Conversion between [`Batch`] and Arrow `RecordBatch`.

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, BooleanArray, Date32Array, Float32Array, Float64Array, Int64Array,
    NullArray, StringArray, TimestampMicrosecondArray,
};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;

use crate::error::{ReduceError, Result};
use crate::storage::ColumnStorage;
use crate::types::{DataType, Value};

use super::batch::{Batch, Column};

impl Batch {
    /// Imports an Arrow record batch.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedType` if a field has an Arrow type with no
    /// matching [`DataType`].
    pub fn from_record_batch(record: &RecordBatch) -> Result<Self> {
        let schema = record.schema();
        let mut columns = Vec::with_capacity(schema.fields().len());
        let mut values = Vec::with_capacity(schema.fields().len());

        for (field, array) in schema.fields().iter().zip(record.columns()) {
            let data_type = DataType::from_arrow(field.data_type()).ok_or_else(|| {
                ReduceError::UnsupportedType(format!(
                    "column '{}' has Arrow type {:?}",
                    field.name(),
                    field.data_type()
                ))
            })?;
            columns.push(Column::new(field.name().clone(), data_type));
            values.push(import_array(array, data_type)?);
        }

        Batch::from_columns(columns, values)
    }

    /// Exports the batch in logical row order as an Arrow record batch.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored value does not match its column type or
    /// Arrow rejects the assembled arrays.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let fields: Vec<Field> = self
            .columns()
            .iter()
            .map(|c| Field::new(c.name.clone(), c.data_type.to_arrow(), true))
            .collect();
        let schema = Arc::new(Schema::new(fields));

        let mut arrays = Vec::with_capacity(self.num_columns());
        for (index, column) in self.columns().iter().enumerate() {
            let logical: Vec<&Value> = (0..self.num_rows())
                .filter_map(|row| self.value(row, index))
                .collect();
            arrays.push(export_array(column, &logical)?);
        }

        Ok(RecordBatch::try_new(schema, arrays)?)
    }
}

fn downcast<'a, T: 'static>(array: &'a ArrayRef, data_type: DataType) -> Result<&'a T> {
    array.as_any().downcast_ref::<T>().ok_or_else(|| {
        ReduceError::InvalidBatch(format!("array does not hold {data_type} values"))
    })
}

fn import_array(array: &ArrayRef, data_type: DataType) -> Result<ColumnStorage> {
    let len = array.len();
    let storage = match data_type {
        DataType::Int64 => {
            let arr = downcast::<Int64Array>(array, data_type)?;
            (0..len)
                .map(|i| if arr.is_null(i) { Value::Null } else { Value::Int64(arr.value(i)) })
                .collect()
        }
        DataType::Float32 => {
            let arr = downcast::<Float32Array>(array, data_type)?;
            (0..len)
                .map(|i| if arr.is_null(i) { Value::Null } else { Value::Float32(arr.value(i)) })
                .collect()
        }
        DataType::Float64 => {
            let arr = downcast::<Float64Array>(array, data_type)?;
            (0..len)
                .map(|i| if arr.is_null(i) { Value::Null } else { Value::Float64(arr.value(i)) })
                .collect()
        }
        DataType::Bool => {
            let arr = downcast::<BooleanArray>(array, data_type)?;
            (0..len)
                .map(|i| if arr.is_null(i) { Value::Null } else { Value::Bool(arr.value(i)) })
                .collect()
        }
        DataType::String => {
            let arr = downcast::<StringArray>(array, data_type)?;
            (0..len)
                .map(|i| {
                    if arr.is_null(i) {
                        Value::Null
                    } else {
                        Value::String(arr.value(i).to_string())
                    }
                })
                .collect()
        }
        DataType::Date => {
            let arr = downcast::<Date32Array>(array, data_type)?;
            (0..len)
                .map(|i| if arr.is_null(i) { Value::Null } else { Value::Date(arr.value(i)) })
                .collect()
        }
        DataType::Timestamp => {
            let arr = downcast::<TimestampMicrosecondArray>(array, data_type)?;
            (0..len)
                .map(|i| {
                    if arr.is_null(i) {
                        Value::Null
                    } else {
                        Value::Timestamp(arr.value(i))
                    }
                })
                .collect()
        }
        DataType::Null => (0..len).map(|_| Value::Null).collect(),
    };
    Ok(storage)
}

fn mismatch(column: &Column, value: &Value) -> ReduceError {
    ReduceError::InvalidBatch(format!(
        "column '{}' of type {} holds a {} value",
        column.name,
        column.data_type,
        value.type_name()
    ))
}

macro_rules! collect_typed {
    ($column:expr, $values:expr, $variant:ident) => {
        $values
            .iter()
            .map(|v| match v {
                Value::$variant(x) => Ok(Some(x.clone())),
                Value::Null => Ok(None),
                other => Err(mismatch($column, other)),
            })
            .collect::<Result<Vec<_>>>()
    };
}

fn export_array(column: &Column, values: &[&Value]) -> Result<ArrayRef> {
    let array: ArrayRef = match column.data_type {
        DataType::Int64 => Arc::new(Int64Array::from(collect_typed!(column, values, Int64)?)),
        DataType::Float32 => {
            Arc::new(Float32Array::from(collect_typed!(column, values, Float32)?))
        }
        DataType::Float64 => {
            Arc::new(Float64Array::from(collect_typed!(column, values, Float64)?))
        }
        DataType::Bool => Arc::new(BooleanArray::from(collect_typed!(column, values, Bool)?)),
        DataType::String => Arc::new(StringArray::from(collect_typed!(column, values, String)?)),
        DataType::Date => Arc::new(Date32Array::from(collect_typed!(column, values, Date)?)),
        DataType::Timestamp => Arc::new(TimestampMicrosecondArray::from(collect_typed!(
            column, values, Timestamp
        )?)),
        DataType::Null => {
            if let Some(other) = values.iter().find(|v| !v.is_null()) {
                return Err(mismatch(column, other));
            }
            Arc::new(NullArray::new(values.len()))
        }
    };
    Ok(array)
}
