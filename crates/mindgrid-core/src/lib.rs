//! # mindgrid-core
//!
//! Core data structures behind the mindgrid table view.
//!
//! This crate provides the fundamental types used throughout mindgrid:
//! - [`CellValue`] - Values stored on row records (numbers, text, lists, absent)
//! - [`CellError`] - Error tokens produced by formula evaluation
//! - [`CellAddress`] and [`CellRange`] - A1-style addressing
//! - [`ColumnDef`], [`Row`], [`Dataset`] - The table itself
//!
//! ## Example
//!
//! ```rust
//! use mindgrid_core::{ColumnDef, ColumnKind, Dataset, Row, CellValue};
//!
//! let mut dataset = Dataset::new(vec![
//!     ColumnDef::new("task", ColumnKind::Text),
//!     ColumnDef::new("hours", ColumnKind::Number),
//! ])
//! .unwrap();
//!
//! dataset.push_row(Row::new().with("task", "Design").with("hours", 4.0));
//! dataset.set_value("B1", 6.0).unwrap();
//!
//! assert_eq!(dataset.value("B1").unwrap(), Some(&CellValue::Number(6.0)));
//! ```

pub mod cell;
pub mod column;
pub mod dataset;
pub mod error;
pub mod row;

// Re-exports for convenience
pub use cell::{format_number, parse_finite, CellAddress, CellError, CellRange, CellValue};
pub use column::{ColumnDef, ColumnKind};
pub use dataset::Dataset;
pub use error::{Error, Result};
pub use row::Row;
