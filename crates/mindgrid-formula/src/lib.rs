//! # mindgrid-formula
//!
//! Formula parser and evaluator for mindgrid.
//!
//! This crate provides:
//! - A1 reference and range resolution against a [`Dataset`](mindgrid_core::Dataset)
//! - Formula parsing (text → [`ParsedFormula`])
//! - Formula evaluation (text → [`FormulaValue`])
//! - Built-in functions: math, statistical, text, logical, date, lookup
//!
//! Anything that is not a recognized formula evaluates to its own text, so
//! a cell never loses what the user typed.
//!
//! ## Example
//!
//! ```rust
//! use mindgrid_core::{ColumnDef, ColumnKind, Dataset, Row};
//! use mindgrid_formula::{evaluate, FormulaValue};
//!
//! let dataset = Dataset::new(vec![ColumnDef::new("score", ColumnKind::Number)])
//!     .unwrap()
//!     .with_rows(vec![
//!         Row::new().with("score", 3.0),
//!         Row::new().with("score", "n/a"),
//!         Row::new().with("score", 4.0),
//!     ]);
//!
//! assert_eq!(evaluate("=SUM(A1:A3)", &dataset), FormulaValue::Number(7.0));
//! assert_eq!(evaluate("=ROUND(AVERAGE(A1:A3),2)", &dataset), FormulaValue::Number(3.5));
//! ```

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod options;
pub mod parser;
pub mod reference;
pub mod value;

pub use ast::{ComparisonOperator, FormulaExpr, ParsedFormula};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{evaluate, evaluate_detailed, evaluate_with, Evaluation, EvaluationContext};
pub use functions::{BuiltinFunction, FunctionDef, FunctionRegistry};
pub use options::EvaluationOptions;
pub use parser::parse_formula;
pub use reference::{get_cell_value, parse_range, parse_reference, resolve_range, RangeResolution};
pub use value::{Argument, FormulaValue};
