//! Formula parser
//!
//! A formula is `=` followed by exactly one function call or a bare cell
//! reference. Arguments are split at top-level commas and classified one by
//! one; nested calls are parsed recursively.

use crate::ast::{ComparisonOperator, FormulaExpr, ParsedFormula};
use crate::error::{FormulaError, FormulaResult};
use crate::functions::BuiltinFunction;
use crate::reference::{parse_range_endpoints, parse_reference};
use lazy_regex::{regex_captures, regex_is_match};
use mindgrid_core::parse_finite;

/// Parse a cell value as a formula
///
/// Calls and comparisons nested deeper than `max_depth` fail with
/// [`FormulaError::NestingTooDeep`]. A chain like `1=1=1` nests one level
/// per operator.
pub fn parse_formula(formula: &str, max_depth: usize) -> FormulaResult<ParsedFormula> {
    let Some(body) = formula.strip_prefix('=') else {
        return Ok(ParsedFormula::Literal);
    };

    Ok(match parse_body(body.trim(), 1, max_depth)? {
        Some(expr) => ParsedFormula::Expr(expr),
        None => ParsedFormula::Unrecognized,
    })
}

/// Parse the text after `=`: one known call, or a bare reference
fn parse_body(body: &str, depth: usize, max_depth: usize) -> FormulaResult<Option<FormulaExpr>> {
    if let Some((_, name, inner)) = regex_captures!(r"^([A-Za-z]+)\((.*)\)$", body) {
        let Some(function) = BuiltinFunction::from_name(name) else {
            return Ok(None);
        };
        if depth > max_depth {
            return Err(FormulaError::NestingTooDeep(max_depth));
        }
        let args = split_arguments(inner)
            .into_iter()
            .map(|arg| parse_argument(arg, depth, max_depth))
            .collect::<FormulaResult<Vec<_>>>()?;
        return Ok(Some(FormulaExpr::Function { function, args }));
    }

    Ok(parse_reference(body).map(FormulaExpr::CellRef))
}

/// Classify one argument of a call at `depth`
fn parse_argument(raw: &str, depth: usize, max_depth: usize) -> FormulaResult<FormulaExpr> {
    let arg = raw.trim();

    if arg.is_empty() {
        return Ok(FormulaExpr::Empty);
    }

    if let Some(text) = quoted_literal(arg) {
        return Ok(FormulaExpr::String(text));
    }

    if let Some((pos, len, op)) = find_comparison(arg) {
        let left = arg[..pos].trim();
        let right = arg[pos + len..].trim();
        if !left.is_empty() && !right.is_empty() {
            // each side sits one level below the comparison, like call arguments
            if depth + 1 > max_depth {
                return Err(FormulaError::NestingTooDeep(max_depth));
            }
            return Ok(FormulaExpr::Comparison {
                op,
                left: Box::new(parse_argument(left, depth + 1, max_depth)?),
                right: Box::new(parse_argument(right, depth + 1, max_depth)?),
            });
        }
    }

    if regex_is_match!(r"^[A-Za-z]+\(.*\)$", arg) {
        return Ok(match parse_body(arg, depth + 1, max_depth)? {
            Some(expr) => expr,
            None => FormulaExpr::Unrecognized(format!("={}", arg)),
        });
    }

    if arg.contains(':') {
        return Ok(match parse_range_endpoints(arg) {
            Some(range) => FormulaExpr::RangeRef(range),
            None => FormulaExpr::MalformedRange(arg.to_string()),
        });
    }

    if let Some(address) = parse_reference(arg) {
        return Ok(FormulaExpr::CellRef(address));
    }

    if arg.eq_ignore_ascii_case("TRUE") {
        return Ok(FormulaExpr::Boolean(true));
    }
    if arg.eq_ignore_ascii_case("FALSE") {
        return Ok(FormulaExpr::Boolean(false));
    }

    if let Some(n) = parse_finite(arg) {
        return Ok(FormulaExpr::Number(n));
    }

    Ok(FormulaExpr::String(arg.to_string()))
}

/// Split an argument list at commas outside parentheses and quotes
///
/// An empty (or all-whitespace) list has no arguments. The pieces are not
/// trimmed.
pub fn split_arguments(args: &str) -> Vec<&str> {
    if args.trim().is_empty() {
        return Vec::new();
    }

    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut in_quotes = false;
    let mut start = 0;

    for (i, c) in args.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '(' if !in_quotes => depth += 1,
            ')' if !in_quotes => depth -= 1,
            ',' if !in_quotes && depth == 0 => {
                parts.push(&args[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&args[start..]);

    parts
}

/// Text of a `"..."` literal, with `""` unescaped to `"`
///
/// `"a"="b"` is not a single literal.
fn quoted_literal(arg: &str) -> Option<String> {
    if arg.len() < 2 || !arg.starts_with('"') || !arg.ends_with('"') {
        return None;
    }
    let inner = &arg[1..arg.len() - 1];
    if inner.replace("\"\"", "").contains('"') {
        return None;
    }
    Some(inner.replace("\"\"", "\""))
}

/// First comparison operator outside parentheses and quotes
///
/// Returns its byte offset and length.
fn find_comparison(arg: &str) -> Option<(usize, usize, ComparisonOperator)> {
    let mut depth: i32 = 0;
    let mut in_quotes = false;

    for (i, c) in arg.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '(' if !in_quotes => depth += 1,
            ')' if !in_quotes => depth -= 1,
            '<' | '>' | '=' | '!' if !in_quotes && depth == 0 => {
                let rest = &arg[i..];
                let found = if rest.starts_with(">=") {
                    (2, ComparisonOperator::GreaterEqual)
                } else if rest.starts_with("<=") {
                    (2, ComparisonOperator::LessEqual)
                } else if rest.starts_with("<>") || rest.starts_with("!=") {
                    (2, ComparisonOperator::NotEqual)
                } else if c == '=' {
                    (1, ComparisonOperator::Equal)
                } else if c == '>' {
                    (1, ComparisonOperator::GreaterThan)
                } else if c == '<' {
                    (1, ComparisonOperator::LessThan)
                } else {
                    continue;
                };
                return Some((i, found.0, found.1));
            }
            _ => {}
        }
    }

    None
}
