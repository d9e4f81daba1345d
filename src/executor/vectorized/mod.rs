//! Vectorized execution module.
//!
//! This module provides the columnar [`Batch`], its row-sequence index and
//! the [`RowCursor`] used to fold batches row by row, plus conversion to and
//! from Apache Arrow record batches.

pub mod batch;
pub mod cursor;
mod interchange;

pub use batch::{Batch, Column, RowSequence};
pub use cursor::RowCursor;
