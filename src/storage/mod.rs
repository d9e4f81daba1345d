//! Storage module for columnar value arrays.

mod column;

pub use column::ColumnStorage;
