//! Lookup functions

use super::{number_arg, scalar_arg, try_cell};
use crate::error::FormulaResult;
use crate::evaluator::EvaluationContext;
use crate::value::{compare_values, Argument, FormulaValue};
use mindgrid_core::CellError;
use std::cmp::Ordering;

fn values_equal(a: &FormulaValue, b: &FormulaValue) -> bool {
    match (a, b) {
        (FormulaValue::Number(x), FormulaValue::Number(y)) => x == y,
        (FormulaValue::Boolean(x), FormulaValue::Boolean(y)) => x == y,
        (FormulaValue::String(x), FormulaValue::String(y)) => x.to_lowercase() == y.to_lowercase(),
        (FormulaValue::Empty, FormulaValue::Empty) => true,
        _ => false,
    }
}

/// Position of `needle` among `keys`
///
/// Exact mode wants an equal key. Approximate mode expects ascending keys
/// and picks the last key not greater than `needle`, comparing only keys of
/// the same kind (number with number, text with text).
fn match_position<'a>(
    needle: &FormulaValue,
    keys: impl Iterator<Item = &'a FormulaValue>,
    approximate: bool,
) -> Option<usize> {
    let mut found = None;
    for (i, key) in keys.enumerate() {
        if !approximate {
            if values_equal(needle, key) {
                return Some(i);
            }
            continue;
        }

        let comparable = matches!(
            (needle, key),
            (FormulaValue::Number(_), FormulaValue::Number(_))
                | (FormulaValue::String(_), FormulaValue::String(_))
                | (FormulaValue::Boolean(_), FormulaValue::Boolean(_))
        );
        if !comparable {
            continue;
        }
        match compare_values(key, needle) {
            Ordering::Greater => break,
            _ => found = Some(i),
        }
    }
    found
}

/// Validated lookup arguments: value, 0-based result index, match mode
fn lookup_args(args: &[Argument]) -> Result<(FormulaValue, usize, bool), CellError> {
    let lookup_value = match scalar_arg(args, 0) {
        Some(FormulaValue::Error(e)) => return Err(*e),
        Some(v) => v.clone(),
        None => FormulaValue::Empty,
    };

    let index = number_arg(args, 2, None)?.trunc();
    if index < 1.0 {
        return Err(CellError::Value);
    }

    let approximate = match scalar_arg(args, 3) {
        None | Some(FormulaValue::Empty) => true,
        Some(FormulaValue::Error(e)) => return Err(*e),
        Some(v) => v.as_bool().unwrap_or_else(|| v.is_truthy()),
    };

    Ok((lookup_value, index as usize - 1, approximate))
}

/// VLOOKUP(lookup_value, table_array, col_index_num, [range_lookup])
///
/// Searches the first column of the table and returns the value in the
/// same row of column `col_index_num`. `range_lookup` defaults to TRUE
/// (approximate match on an ascending first column).
pub fn fn_vlookup(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let (lookup_value, col, approximate) = try_cell!(lookup_args(args));
    let table = &args[1];

    if table.is_empty() {
        return Ok(FormulaValue::Error(CellError::Na));
    }
    if col >= table.column_count() {
        return Ok(FormulaValue::Error(CellError::Ref));
    }

    let keys = table.rows().filter_map(|row| row.first());
    Ok(match match_position(&lookup_value, keys, approximate) {
        Some(row) => table.get(row, col).cloned().unwrap_or(FormulaValue::Empty),
        None => FormulaValue::Error(CellError::Na),
    })
}

/// HLOOKUP(lookup_value, table_array, row_index_num, [range_lookup])
///
/// Searches the first row of the table and returns the value in the same
/// column of row `row_index_num`.
pub fn fn_hlookup(args: &[Argument], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let (lookup_value, row, approximate) = try_cell!(lookup_args(args));
    let table = &args[1];

    if table.is_empty() {
        return Ok(FormulaValue::Error(CellError::Na));
    }
    if row >= table.row_count() {
        return Ok(FormulaValue::Error(CellError::Ref));
    }

    let keys = table.rows().next().unwrap_or(&[]).iter();
    Ok(match match_position(&lookup_value, keys, approximate) {
        Some(col) => table.get(row, col).cloned().unwrap_or(FormulaValue::Empty),
        None => FormulaValue::Error(CellError::Na),
    })
}

#[cfg(test)]
mod tests {
    use crate::evaluator::tests::eval;
    use crate::value::FormulaValue;
    use mindgrid_core::CellError;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> FormulaValue {
        FormulaValue::String(s.to_string())
    }

    #[test]
    fn test_vlookup_exact() {
        // B1:C4 = (10, apple) (20, pear) (30, apple) (40, plum)
        assert_eq!(eval("=VLOOKUP(20,B1:C4,2,FALSE)"), text("pear"));
        assert_eq!(eval("=VLOOKUP(25,B1:C4,2,FALSE)"), FormulaValue::Error(CellError::Na));
        assert_eq!(eval("=VLOOKUP(PEAR,C1:D4,1,0)"), text("pear"));
        assert_eq!(
            eval("=VLOOKUP(pear,C1:D4,2,FALSE)"),
            FormulaValue::Error(CellError::Div0)
        );
    }

    #[test]
    fn test_vlookup_approximate() {
        assert_eq!(eval("=VLOOKUP(25,B1:C4,2)"), text("pear"));
        assert_eq!(eval("=VLOOKUP(99,B1:C4,2,TRUE)"), text("plum"));
        assert_eq!(eval("=VLOOKUP(5,B1:C4,2)"), FormulaValue::Error(CellError::Na));
    }

    #[test]
    fn test_vlookup_index_errors() {
        assert_eq!(eval("=VLOOKUP(20,B1:C4,3,FALSE)"), FormulaValue::Error(CellError::Ref));
        assert_eq!(eval("=VLOOKUP(20,B1:C4,0,FALSE)"), FormulaValue::Error(CellError::Value));
        assert_eq!(eval("=VLOOKUP(20,A1:??,1,FALSE)"), FormulaValue::Error(CellError::Na));
    }

    #[test]
    fn test_hlookup() {
        // B1:D2 = (10, apple, 1) (20, pear, #DIV/0!)
        assert_eq!(eval("=HLOOKUP(apple,B1:D2,2,FALSE)"), text("pear"));
        assert_eq!(eval("=HLOOKUP(10,B1:D2,2,FALSE)"), FormulaValue::Number(20.0));
        assert_eq!(eval("=HLOOKUP(kiwi,B1:D2,2,FALSE)"), FormulaValue::Error(CellError::Na));
        assert_eq!(eval("=HLOOKUP(10,B1:D2,3,FALSE)"), FormulaValue::Error(CellError::Ref));
    }
}
