//! # mindgrid
//!
//! Spreadsheet formula engine behind the mindgrid table view.
//!
//! A [`Dataset`] holds ordered rows keyed by column id; columns are lettered
//! by position, so `B3` is the second column of the third row. Cells whose
//! text starts with `=` are formulas: one function call (or a bare
//! reference) such as `=SUM(A1:A10)` or `=IF(B2>5,"High","Low")`.
//!
//! ## Features
//!
//! - A1 references and rectangular ranges
//! - Math, statistical, text, logical, date, information and lookup functions
//! - Error tokens (`#DIV/0!`, `#N/A`, ...) as ordinary values
//! - Display formatting per column kind
//! - A memoizing cache keyed by dataset version
//!
//! ## Example
//!
//! ```rust
//! use mindgrid::prelude::*;
//!
//! let mut dataset = Dataset::new(vec![
//!     ColumnDef::new("task", ColumnKind::Text),
//!     ColumnDef::new("hours", ColumnKind::Number),
//! ])
//! .unwrap();
//!
//! dataset.push_row(Row::new().with("task", "Design").with("hours", 4.0));
//! dataset.push_row(Row::new().with("task", "Build").with("hours", 6.0));
//! dataset.push_row(Row::new().with("task", "Total").with("hours", "=SUM(B1:B2)"));
//!
//! assert_eq!(evaluate(r#"=IF(B2>5,"High","Low")"#, &dataset), FormulaValue::String("High".into()));
//! assert_eq!(mindgrid::render_cell(&dataset, 2, 1), "10");
//! ```

pub mod cache;
pub mod format;
pub mod prelude;

pub use cache::{CacheStats, EvaluationCache};
pub use format::{format_value, render_cell, render_dataset, FormatOptions, Formatter};

// Re-export core types
pub use mindgrid_core::{
    format_number, parse_finite, CellAddress, CellError, CellRange, CellValue, ColumnDef,
    ColumnKind, Dataset, Error, Result, Row,
};

// Re-export formula types
pub use mindgrid_formula::{
    evaluate, evaluate_detailed, evaluate_with, parse_formula, BuiltinFunction, Evaluation,
    EvaluationContext, EvaluationOptions, FormulaError, FormulaExpr, FormulaResult, FormulaValue,
    FunctionRegistry, ParsedFormula,
};
