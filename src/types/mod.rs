//! Scalar value model.

pub mod value;

pub use value::{DataType, Row, Value};
