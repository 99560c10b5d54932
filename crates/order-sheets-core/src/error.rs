//! Error types for order-sheets-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in order-sheets-core
#[derive(Debug, Error)]
pub enum Error {
    /// Column name is not one of the nine fixed columns
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// Row index out of bounds
    #[error("Row index {row} out of bounds (rows: {len})")]
    RowOutOfBounds { row: usize, len: usize },
}
