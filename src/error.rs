//! Error types for colfold reductions.

use thiserror::Error;

/// Result type alias using [`ReduceError`].
pub type Result<T> = std::result::Result<T, ReduceError>;

/// Error types for a reduction call.
///
/// Every variant aborts the whole reduction; nothing is retried.
#[derive(Debug, Error)]
pub enum ReduceError {
    /// The projection plan could not be compiled into expressions.
    #[error("Compile error: {0}")]
    Compile(String),

    /// A cursor was requested over a column the batch does not have.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// Expression evaluation failed during `update` or `finalize`.
    #[error("Evaluation error: {0}")]
    Eval(#[from] EvalError),

    /// No data type maps to the given runtime type.
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// A written row does not match the batch's column count.
    #[error("Row arity mismatch: expected {expected} values, got {actual}")]
    RowArity { expected: usize, actual: usize },

    /// A batch was built with inconsistent columns or row sequence.
    #[error("Invalid batch: {0}")]
    InvalidBatch(String),

    /// An evaluation task panicked.
    #[error("Worker thread panicked: {0}")]
    ThreadPanic(String),

    /// The dedicated evaluation thread pool could not be built.
    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    /// Arrow conversion failure.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

/// Errors raised by a single expression while folding rows.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Operand or input type does not fit the operation.
    #[error("Type error: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Checked integer arithmetic overflowed.
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),

    /// Integer division or modulo by zero.
    #[error("Division by zero")]
    DivisionByZero,

    /// A referenced column is absent from the row mapping.
    #[error("Missing field: {0}")]
    MissingField(String),
}

impl EvalError {
    /// Creates a type mismatch error.
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        EvalError::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}
