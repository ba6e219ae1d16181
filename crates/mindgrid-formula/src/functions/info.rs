//! Information functions

use super::scalar_arg;
use crate::error::FormulaResult;
use crate::evaluator::EvaluationContext;
use crate::value::{Argument, FormulaValue};
use mindgrid_core::CellError;

fn first(args: &[Argument]) -> &FormulaValue {
    scalar_arg(args, 0).unwrap_or(&FormulaValue::Empty)
}

/// ISBLANK(value)
pub fn fn_isblank(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    Ok(FormulaValue::Boolean(matches!(first(args), FormulaValue::Empty)))
}

/// ISNUMBER(value)
pub fn fn_isnumber(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    Ok(FormulaValue::Boolean(matches!(first(args), FormulaValue::Number(_))))
}

/// ISTEXT(value) - error tokens written as text are errors, not text
pub fn fn_istext(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let value = first(args);
    Ok(FormulaValue::Boolean(
        matches!(value, FormulaValue::String(_)) && !value.is_error(),
    ))
}

/// ISERROR(value)
pub fn fn_iserror(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    Ok(FormulaValue::Boolean(first(args).is_error()))
}

/// ISNA(value)
pub fn fn_isna(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    Ok(FormulaValue::Boolean(
        first(args).get_error() == Some(CellError::Na),
    ))
}

/// NA() - the `#N/A` token
pub fn fn_na(_args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    Ok(FormulaValue::Error(CellError::Na))
}
