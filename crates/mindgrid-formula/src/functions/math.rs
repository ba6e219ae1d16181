//! Math functions

use super::criteria::CriteriaMatcher;
use super::{collect_numbers, number_arg, scalar_arg, try_cell};
use crate::error::FormulaResult;
use crate::evaluator::EvaluationContext;
use crate::value::{Argument, FormulaValue};
use mindgrid_core::CellError;

/// SUM function
///
/// Adds every number in the arguments; everything else is skipped.
pub fn fn_sum(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    Ok(FormulaValue::Number(collect_numbers(args).iter().sum()))
}

/// PRODUCT function (0 when there are no numbers)
pub fn fn_product(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let numbers = collect_numbers(args);
    if numbers.is_empty() {
        return Ok(FormulaValue::Number(0.0));
    }
    Ok(FormulaValue::Number(numbers.iter().product()))
}

fn digits_arg(args: &[Argument]) -> Result<i32, CellError> {
    number_arg(args, 1, Some(0.0)).map(|d| d.trunc() as i32)
}

/// Apply an integer rounding mode at `num_digits` decimal places
///
/// Negative digits round to the left of the decimal point.
fn round_with(number: f64, num_digits: i32, mode: fn(f64) -> f64) -> f64 {
    if num_digits >= 0 {
        let multiplier = 10_f64.powi(num_digits);
        mode(number * multiplier) / multiplier
    } else {
        let divisor = 10_f64.powi(-num_digits);
        mode(number / divisor) * divisor
    }
}

/// ROUND(number, [num_digits])
///
/// Halves round away from zero: ROUND(2.5) = 3, ROUND(-2.5) = -3.
pub fn fn_round(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let number = try_cell!(number_arg(args, 0, None));
    let num_digits = try_cell!(digits_arg(args));
    Ok(FormulaValue::Number(round_with(number, num_digits, f64::round)))
}

/// ROUNDUP(number, [num_digits]) - rounds away from zero
pub fn fn_roundup(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let number = try_cell!(number_arg(args, 0, None));
    let num_digits = try_cell!(digits_arg(args));
    let away = |n: f64| if n >= 0.0 { n.ceil() } else { n.floor() };
    Ok(FormulaValue::Number(round_with(number, num_digits, away)))
}

/// ROUNDDOWN(number, [num_digits]) - rounds toward zero
pub fn fn_rounddown(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let number = try_cell!(number_arg(args, 0, None));
    let num_digits = try_cell!(digits_arg(args));
    Ok(FormulaValue::Number(round_with(number, num_digits, f64::trunc)))
}

/// ABS function
pub fn fn_abs(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let number = try_cell!(number_arg(args, 0, None));
    Ok(FormulaValue::Number(number.abs()))
}

/// INT(number) - rounds down to the nearest integer
pub fn fn_int(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let number = try_cell!(number_arg(args, 0, None));
    Ok(FormulaValue::Number(number.floor()))
}

/// MOD(number, divisor)
///
/// The result has the sign of the divisor: `number - divisor * floor(number / divisor)`.
pub fn fn_mod(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let number = try_cell!(number_arg(args, 0, None));
    let divisor = try_cell!(number_arg(args, 1, None));

    if divisor == 0.0 {
        return Ok(FormulaValue::Error(CellError::Div0));
    }

    Ok(FormulaValue::Number(
        number - divisor * (number / divisor).floor(),
    ))
}

/// POWER(number, power)
pub fn fn_power(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let base = try_cell!(number_arg(args, 0, None));
    let exponent = try_cell!(number_arg(args, 1, None));

    if base == 0.0 && exponent < 0.0 {
        return Ok(FormulaValue::Error(CellError::Div0));
    }

    let result = base.powf(exponent);
    if !result.is_finite() {
        return Ok(FormulaValue::Error(CellError::Num));
    }
    Ok(FormulaValue::Number(result))
}

/// SQRT(number)
pub fn fn_sqrt(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let number = try_cell!(number_arg(args, 0, None));
    if number < 0.0 {
        return Ok(FormulaValue::Error(CellError::Num));
    }
    Ok(FormulaValue::Number(number.sqrt()))
}

/// CEILING(number, [significance]) - rounds up to a multiple of significance
pub fn fn_ceiling(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let number = try_cell!(number_arg(args, 0, None));
    let significance = try_cell!(number_arg(args, 1, Some(1.0)));

    if significance == 0.0 {
        return Ok(FormulaValue::Number(0.0));
    }
    if number > 0.0 && significance < 0.0 {
        return Ok(FormulaValue::Error(CellError::Num));
    }

    Ok(FormulaValue::Number(
        (number / significance).ceil() * significance,
    ))
}

/// FLOOR(number, [significance]) - rounds down to a multiple of significance
pub fn fn_floor(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let number = try_cell!(number_arg(args, 0, None));
    let significance = try_cell!(number_arg(args, 1, Some(1.0)));

    if significance == 0.0 {
        return Ok(FormulaValue::Error(CellError::Div0));
    }
    if number > 0.0 && significance < 0.0 {
        return Ok(FormulaValue::Error(CellError::Num));
    }

    Ok(FormulaValue::Number(
        (number / significance).floor() * significance,
    ))
}

/// SUMIF(range, criteria, [sum_range])
///
/// Cells of `sum_range` are paired with `range` by position; without a
/// `sum_range` the matching cells themselves are added.
pub fn fn_sumif(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let range = &args[0];
    let matcher = CriteriaMatcher::new(scalar_arg(args, 1).unwrap_or(&FormulaValue::Empty));
    let sum_range = args.get(2).unwrap_or(range);

    let sum = range
        .values()
        .iter()
        .enumerate()
        .filter(|(_, v)| matcher.matches(v))
        .filter_map(|(i, _)| match sum_range.values().get(i) {
            Some(FormulaValue::Number(n)) => Some(*n),
            _ => None,
        })
        .sum();

    Ok(FormulaValue::Number(sum))
}
