//! Text functions

use super::{flatten, number_arg, text_arg, try_cell};
use crate::error::FormulaResult;
use crate::evaluator::EvaluationContext;
use crate::value::{Argument, FormulaValue};
use mindgrid_core::CellError;

/// Longest text REPT will build, in bytes
pub const MAX_TEXT_LEN: usize = 32_767;

/// Whole non-negative number as a count, saturating at `usize::MAX`
fn to_count(n: f64) -> usize {
    if n >= usize::MAX as f64 {
        usize::MAX
    } else {
        n.trunc().max(0.0) as usize
    }
}

/// Whole-number count argument; `#VALUE!` when negative
fn count_arg(args: &[Argument], index: usize, default: f64) -> Result<usize, CellError> {
    let n = number_arg(args, index, Some(default))?.trunc();
    if n < 0.0 {
        return Err(CellError::Value);
    }
    Ok(to_count(n))
}

/// UPPER(text)
pub fn fn_upper(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let text = try_cell!(text_arg(args, 0));
    Ok(FormulaValue::String(text.to_uppercase()))
}

/// LOWER(text)
pub fn fn_lower(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let text = try_cell!(text_arg(args, 0));
    Ok(FormulaValue::String(text.to_lowercase()))
}

/// LEN(text) - length in characters
pub fn fn_len(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let text = try_cell!(text_arg(args, 0));
    Ok(FormulaValue::Number(text.chars().count() as f64))
}

/// TRIM(text) - strips outer spaces and collapses inner runs to one
pub fn fn_trim(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let text = try_cell!(text_arg(args, 0));
    let trimmed = text
        .split(' ')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    Ok(FormulaValue::String(trimmed))
}

/// LEFT(text, [num_chars])
pub fn fn_left(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let text = try_cell!(text_arg(args, 0));
    let num_chars = try_cell!(count_arg(args, 1, 1.0));
    Ok(FormulaValue::String(text.chars().take(num_chars).collect()))
}

/// RIGHT(text, [num_chars])
pub fn fn_right(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let text = try_cell!(text_arg(args, 0));
    let num_chars = try_cell!(count_arg(args, 1, 1.0));
    let len = text.chars().count();
    Ok(FormulaValue::String(
        text.chars().skip(len.saturating_sub(num_chars)).collect(),
    ))
}

/// MID(text, start_num, num_chars) - `start_num` is 1-based
pub fn fn_mid(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let text = try_cell!(text_arg(args, 0));
    let start = try_cell!(number_arg(args, 1, None)).trunc();
    let num_chars = try_cell!(count_arg(args, 2, 0.0));

    if start < 1.0 {
        return Ok(FormulaValue::Error(CellError::Value));
    }

    Ok(FormulaValue::String(
        text.chars().skip(to_count(start) - 1).take(num_chars).collect(),
    ))
}

/// CONCAT / CONCATENATE - joins every value, ranges included
pub fn fn_concat(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let joined: String = flatten(args).map(FormulaValue::as_string).collect();
    Ok(FormulaValue::String(joined))
}

/// SUBSTITUTE(text, old_text, new_text, [instance_num])
pub fn fn_substitute(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let text = try_cell!(text_arg(args, 0));
    let old = try_cell!(text_arg(args, 1));
    let new = try_cell!(text_arg(args, 2));

    if old.is_empty() {
        return Ok(FormulaValue::String(text));
    }

    if args.len() < 4 {
        return Ok(FormulaValue::String(text.replace(&old, &new)));
    }

    let instance = try_cell!(number_arg(args, 3, None)).trunc();
    if instance < 1.0 {
        return Ok(FormulaValue::Error(CellError::Value));
    }

    let result = match text.match_indices(&old).nth(to_count(instance) - 1) {
        Some((pos, _)) => format!("{}{}{}", &text[..pos], new, &text[pos + old.len()..]),
        None => text,
    };
    Ok(FormulaValue::String(result))
}

/// 1-based character position of `needle` in `haystack`, from `start`
fn find_position(haystack: &str, needle: &str, start: usize) -> Option<usize> {
    let char_count = haystack.chars().count();
    if start < 1 || start > char_count + 1 {
        return None;
    }

    let byte_start = haystack
        .char_indices()
        .nth(start - 1)
        .map_or(haystack.len(), |(i, _)| i);
    let found = haystack[byte_start..].find(needle)?;

    Some(start + haystack[byte_start..byte_start + found].chars().count())
}

fn find_impl(args: &[Argument], case_sensitive: bool) -> FormulaResult<FormulaValue> {
    let mut needle = try_cell!(text_arg(args, 0));
    let mut haystack = try_cell!(text_arg(args, 1));
    let start = try_cell!(number_arg(args, 2, Some(1.0))).trunc();

    if !case_sensitive {
        needle = needle.to_lowercase();
        haystack = haystack.to_lowercase();
    }

    if start < 1.0 {
        return Ok(FormulaValue::Error(CellError::Value));
    }

    Ok(match find_position(&haystack, &needle, to_count(start)) {
        Some(pos) => FormulaValue::Number(pos as f64),
        None => FormulaValue::Error(CellError::Value),
    })
}

/// FIND(find_text, within_text, [start_num]) - case-sensitive
pub fn fn_find(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    find_impl(args, true)
}

/// SEARCH(find_text, within_text, [start_num]) - case-insensitive
pub fn fn_search(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    find_impl(args, false)
}

/// REPT(text, number_times) - `#VALUE!` past [`MAX_TEXT_LEN`]
pub fn fn_rept(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let text = try_cell!(text_arg(args, 0));
    let times = try_cell!(count_arg(args, 1, 0.0));

    if text.is_empty() {
        return Ok(FormulaValue::String(text));
    }
    match text.len().checked_mul(times) {
        Some(len) if len <= MAX_TEXT_LEN => Ok(FormulaValue::String(text.repeat(times))),
        _ => Ok(FormulaValue::Error(CellError::Value)),
    }
}

/// PROPER(text) - capitalizes the first letter of each word
pub fn fn_proper(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let text = try_cell!(text_arg(args, 0));

    let mut result = String::with_capacity(text.len());
    let mut word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if word_start {
                result.extend(c.to_uppercase());
            } else {
                result.extend(c.to_lowercase());
            }
            word_start = false;
        } else {
            result.push(c);
            word_start = !c.is_numeric();
        }
    }

    Ok(FormulaValue::String(result))
}
