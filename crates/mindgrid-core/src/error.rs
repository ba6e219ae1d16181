//! Error types for mindgrid-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mindgrid-core
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Invalid cell range format
    #[error("Invalid cell range: {0}")]
    InvalidRange(String),

    /// Row index out of bounds
    #[error("Row index {0} out of bounds (rows: {1})")]
    RowOutOfBounds(usize, usize),

    /// Column index out of bounds
    #[error("Column index {0} out of bounds (columns: {1})")]
    ColumnOutOfBounds(usize, usize),

    /// No column with this id
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// A column with this id already exists
    #[error("Column id already exists: {0}")]
    DuplicateColumn(String),

    /// Column does not accept edits
    #[error("Column is read-only: {0}")]
    ReadOnlyColumn(String),
}
