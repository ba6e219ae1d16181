//! Prelude module - common imports for mindgrid users
//!
//! ```rust
//! use mindgrid::prelude::*;
//! ```

pub use crate::{
    // Cell types
    CellAddress,
    CellError,
    CellRange,
    CellValue,
    // Table types
    ColumnDef,
    ColumnKind,
    Dataset,
    Row,
    // Error types
    Error,
    Result,
    // Formula types
    evaluate,
    Evaluation,
    EvaluationContext,
    EvaluationOptions,
    FormulaValue,
    // Display
    EvaluationCache,
    FormatOptions,
    Formatter,
};
