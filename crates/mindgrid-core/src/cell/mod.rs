//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellValue`] - The value stored on a row under a column id
//! - [`CellError`] - Error tokens produced by evaluation
//! - [`CellAddress`] - A cell's location (e.g., "A1")
//! - [`CellRange`] - A rectangle of cells (e.g., "A1:B10")

mod address;
mod value;

pub use address::{CellAddress, CellRange, CellRangeIterator};
pub use value::{format_number, parse_finite, CellError, CellValue};
