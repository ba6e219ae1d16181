//! Criteria matching for SUMIF, COUNTIF and AVERAGEIF
//!
//! A criterion can be:
//! - A number: exact numeric match (e.g. 5)
//! - A comparison string: ">5", ">=10", "<100", "<=50", "<>0", "=5"
//! - Text, case-insensitive, with `*` and `?` wildcards; "<>text" negates
//! - Empty: matches blank cells

use crate::value::FormulaValue;
use mindgrid_core::parse_finite;

/// Criteria matcher for the conditional aggregates
#[derive(Debug)]
pub struct CriteriaMatcher {
    criteria_type: CriteriaType,
}

#[derive(Debug)]
enum CriteriaType {
    /// Exact number match
    Number(f64),
    /// Comparison with number (operator, value)
    Comparison(ComparisonOp, f64),
    /// Text match (lower-cased pattern, negated)
    Text(String, bool),
    /// Match blank values
    Empty,
    /// Matches nothing
    Never,
}

#[derive(Debug, Clone, Copy)]
enum ComparisonOp {
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
}

impl CriteriaMatcher {
    /// Create a new criteria matcher from a value
    pub fn new(criteria: &FormulaValue) -> Self {
        let criteria_type = match criteria {
            FormulaValue::Number(n) => CriteriaType::Number(*n),
            FormulaValue::Boolean(b) => CriteriaType::Number(if *b { 1.0 } else { 0.0 }),
            FormulaValue::String(s) => Self::parse_string_criteria(s),
            FormulaValue::List(items) => Self::parse_string_criteria(&items.join(",")),
            FormulaValue::Empty => CriteriaType::Empty,
            FormulaValue::Error(_) => CriteriaType::Never,
        };

        Self { criteria_type }
    }

    fn parse_string_criteria(s: &str) -> CriteriaType {
        let s = s.trim();

        if s.is_empty() {
            return CriteriaType::Empty;
        }

        if let Some(ct) = Self::try_parse_comparison(s) {
            return ct;
        }

        if let Some(n) = parse_finite(s) {
            return CriteriaType::Number(n);
        }

        CriteriaType::Text(s.to_lowercase(), false)
    }

    fn try_parse_comparison(s: &str) -> Option<CriteriaType> {
        // longer operators first
        let (op, rest) = if let Some(rest) = s.strip_prefix(">=") {
            (ComparisonOp::GreaterEqual, rest)
        } else if let Some(rest) = s.strip_prefix("<=") {
            (ComparisonOp::LessEqual, rest)
        } else if let Some(rest) = s.strip_prefix("<>") {
            (ComparisonOp::NotEqual, rest)
        } else if let Some(rest) = s.strip_prefix('>') {
            (ComparisonOp::GreaterThan, rest)
        } else if let Some(rest) = s.strip_prefix('<') {
            (ComparisonOp::LessThan, rest)
        } else if let Some(rest) = s.strip_prefix('=') {
            (ComparisonOp::Equal, rest)
        } else {
            return None;
        };

        let rest = rest.trim();
        if let Some(n) = parse_finite(rest) {
            return Some(CriteriaType::Comparison(op, n));
        }

        match op {
            ComparisonOp::Equal if rest.is_empty() => Some(CriteriaType::Empty),
            ComparisonOp::Equal => Some(CriteriaType::Text(rest.to_lowercase(), false)),
            ComparisonOp::NotEqual => Some(CriteriaType::Text(rest.to_lowercase(), true)),
            // ordering against text matches nothing
            _ => Some(CriteriaType::Never),
        }
    }

    /// Check if a value matches the criteria
    pub fn matches(&self, value: &FormulaValue) -> bool {
        match &self.criteria_type {
            CriteriaType::Number(criteria_num) => match value {
                FormulaValue::Number(n) => (n - criteria_num).abs() < 1e-10,
                _ => false,
            },

            CriteriaType::Comparison(op, criteria_num) => {
                let n = match value {
                    FormulaValue::Number(n) => *n,
                    _ => return matches!(op, ComparisonOp::NotEqual),
                };
                match op {
                    ComparisonOp::Equal => (n - criteria_num).abs() < 1e-10,
                    ComparisonOp::NotEqual => (n - criteria_num).abs() >= 1e-10,
                    ComparisonOp::LessThan => n < *criteria_num,
                    ComparisonOp::LessEqual => n <= *criteria_num,
                    ComparisonOp::GreaterThan => n > *criteria_num,
                    ComparisonOp::GreaterEqual => n >= *criteria_num,
                }
            }

            CriteriaType::Text(pattern, negated) => {
                let text = value.as_string().to_lowercase();
                wildcard_match(pattern, &text) != *negated
            }

            CriteriaType::Empty => value.is_blank(),

            CriteriaType::Never => false,
        }
    }
}

/// Match with wildcards: `*` = any characters, `?` = one character
fn wildcard_match(pattern: &str, text: &str) -> bool {
    if !pattern.contains('*') && !pattern.contains('?') {
        return pattern == text;
    }

    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let mut pi = 0;
    let mut ti = 0;
    let mut star_pi = None;
    let mut star_ti = 0;

    while ti < text.len() {
        if pi < pattern.len() && (pattern[pi] == '?' || pattern[pi] == text[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < pattern.len() && pattern[pi] == '*' {
            star_pi = Some(pi);
            star_ti = ti;
            pi += 1;
        } else if let Some(sp) = star_pi {
            // backtrack: let the last star swallow one more character
            pi = sp + 1;
            star_ti += 1;
            ti = star_ti;
        } else {
            return false;
        }
    }

    while pi < pattern.len() && pattern[pi] == '*' {
        pi += 1;
    }

    pi == pattern.len()
}
