//! Storage gateway error types

use thiserror::Error;

use order_sheets_xlsx::XlsxError;

/// Result type for storage operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors that can occur while reading or writing the data file
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file could not be decoded or encoded
    #[error("Spreadsheet error: {0}")]
    Codec(#[from] XlsxError),
}
