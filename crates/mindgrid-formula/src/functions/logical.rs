//! Logical functions
//!
//! These read their arguments flattened: a range argument contributes each
//! of its cells as a separate positional value.

use super::{flatten, try_cell};
use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::EvaluationContext;
use crate::value::{compare_values, Argument, FormulaValue};
use mindgrid_core::CellError;
use std::cmp::Ordering;

fn flat(args: &[Argument]) -> Vec<&FormulaValue> {
    flatten(args).collect()
}

/// IF(condition, value_if_true, [value_if_false])
///
/// A missing false branch yields FALSE.
pub fn fn_if(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let values = flat(args);
    let condition = values
        .first()
        .ok_or_else(|| FormulaError::Argument("IF requires a condition".into()))?;

    let branch = if condition.is_truthy() { 1 } else { 2 };
    Ok(values
        .get(branch)
        .map(|v| (*v).clone())
        .unwrap_or(FormulaValue::Boolean(false)))
}

/// AND(logical1, ...)
pub fn fn_and(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    Ok(FormulaValue::Boolean(flatten(args).all(FormulaValue::is_truthy)))
}

/// OR(logical1, ...)
pub fn fn_or(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    Ok(FormulaValue::Boolean(flatten(args).any(FormulaValue::is_truthy)))
}

/// NOT(logical)
pub fn fn_not(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let value = flatten(args).next().cloned().unwrap_or(FormulaValue::Empty);
    Ok(FormulaValue::Boolean(!value.is_truthy()))
}

/// XOR(logical1, ...) - true when an odd number of values are truthy
pub fn fn_xor(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let truthy = flatten(args).filter(|v| v.is_truthy()).count();
    Ok(FormulaValue::Boolean(truthy % 2 == 1))
}

/// IFS(condition1, value1, [condition2, value2], ...)
///
/// `#N/A` when no condition holds.
pub fn fn_ifs(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let values = flat(args);
    for pair in values.chunks(2) {
        if let [condition, value] = pair {
            if condition.is_truthy() {
                return Ok((*value).clone());
            }
        }
    }
    Ok(FormulaValue::Error(CellError::Na))
}

/// SWITCH(expression, value1, result1, [value2, result2], ..., [default])
///
/// `#N/A` when nothing matches and there is no default.
pub fn fn_switch(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let values = flat(args);
    let Some((expression, rest)) = values.split_first() else {
        return Ok(FormulaValue::Error(CellError::Na));
    };

    let mut pairs = rest.chunks_exact(2);
    for pair in pairs.by_ref() {
        if values_match(expression, pair[0]) {
            return Ok(pair[1].clone());
        }
    }

    Ok(match pairs.remainder() {
        [default] => (*default).clone(),
        _ => FormulaValue::Error(CellError::Na),
    })
}

/// CHOOSE(index, value1, [value2], ...)
pub fn fn_choose(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let values = flat(args);
    let Some((index, choices)) = values.split_first() else {
        return Ok(FormulaValue::Error(CellError::Value));
    };

    let index = try_cell!(match index {
        FormulaValue::Error(e) => Err(*e),
        v => v.as_number().ok_or(CellError::Value),
    })
    .trunc();

    if index < 1.0 || index > choices.len() as f64 {
        return Ok(FormulaValue::Error(CellError::Value));
    }
    Ok(choices[index as usize - 1].clone())
}

/// IFERROR(value, value_if_error) - catches any error token
pub fn fn_iferror(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let values = flat(args);
    let value = values.first().map(|v| (*v).clone()).unwrap_or(FormulaValue::Empty);
    if value.is_error() {
        return Ok(values.get(1).map(|v| (*v).clone()).unwrap_or(FormulaValue::Empty));
    }
    Ok(value)
}

/// IFNA(value, value_if_na) - catches only `#N/A`
pub fn fn_ifna(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let values = flat(args);
    let value = values.first().map(|v| (*v).clone()).unwrap_or(FormulaValue::Empty);
    if value.get_error() == Some(CellError::Na) {
        return Ok(values.get(1).map(|v| (*v).clone()).unwrap_or(FormulaValue::Empty));
    }
    Ok(value)
}

/// Equality used by SWITCH: case-insensitive text, numeric coercion
fn values_match(a: &FormulaValue, b: &FormulaValue) -> bool {
    match (a, b) {
        (FormulaValue::Error(x), FormulaValue::Error(y)) => x == y,
        (FormulaValue::Error(_), _) | (_, FormulaValue::Error(_)) => false,
        (FormulaValue::Boolean(_), FormulaValue::Boolean(_))
        | (FormulaValue::Number(_), FormulaValue::Number(_))
        | (FormulaValue::String(_), FormulaValue::String(_))
        | (FormulaValue::Empty, _)
        | (_, FormulaValue::Empty)
        | (FormulaValue::Number(_), FormulaValue::String(_))
        | (FormulaValue::String(_), FormulaValue::Number(_)) => {
            compare_values(a, b) == Ordering::Equal
        }
        _ => a == b,
    }
}
