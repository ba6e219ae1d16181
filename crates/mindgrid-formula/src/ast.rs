//! Formula syntax tree types

use crate::functions::BuiltinFunction;
use mindgrid_core::{CellAddress, CellRange};
use std::fmt;

/// Result of parsing a cell value as a formula
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedFormula {
    /// Does not start with `=`; displayed as-is
    Literal,
    /// A recognized function call or bare reference
    Expr(FormulaExpr),
    /// Starts with `=` but is not a single known call or a reference
    Unrecognized,
}

/// Formula expression tree
///
/// The grammar is one top-level function call (or a bare reference) whose
/// arguments may themselves be calls, references, ranges, comparisons or
/// literals. There is no infix arithmetic.
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaExpr {
    // === Literals ===
    /// Empty argument (`SUM(1,,2)`)
    Empty,
    /// Numeric literal
    Number(f64),
    /// Quoted or bare text
    String(String),
    /// TRUE / FALSE
    Boolean(bool),

    // === References ===
    /// Single cell reference
    CellRef(CellAddress),
    /// Range reference
    RangeRef(CellRange),
    /// Range text whose endpoints do not parse
    MalformedRange(String),

    // === Comparison ===
    Comparison {
        op: ComparisonOperator,
        left: Box<FormulaExpr>,
        right: Box<FormulaExpr>,
    },

    // === Function call ===
    Function {
        function: BuiltinFunction,
        args: Vec<FormulaExpr>,
    },

    /// Nested call text naming no known function; evaluates to itself
    Unrecognized(String),
}

impl ParsedFormula {
    /// Every function called anywhere in the formula, outermost first
    pub fn functions(&self) -> Vec<BuiltinFunction> {
        let mut out = Vec::new();
        if let ParsedFormula::Expr(expr) = self {
            expr.collect_functions(&mut out);
        }
        out
    }
}

impl FormulaExpr {
    fn collect_functions(&self, out: &mut Vec<BuiltinFunction>) {
        match self {
            FormulaExpr::Function { function, args } => {
                out.push(*function);
                for arg in args {
                    arg.collect_functions(out);
                }
            }
            FormulaExpr::Comparison { left, right, .. } => {
                left.collect_functions(out);
                right.collect_functions(out);
            }
            _ => {}
        }
    }
}

/// Comparison operators allowed inside an argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
}

impl ComparisonOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::Equal => "=",
            ComparisonOperator::NotEqual => "<>",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::LessEqual => "<=",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::GreaterEqual => ">=",
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_formula;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_functions_in_formula() {
        let parsed = parse_formula("=IF(TODAY()>A1,ROUND(SUM(B1:B3),1),0)", 64).unwrap();
        assert_eq!(
            parsed.functions(),
            vec![
                BuiltinFunction::If,
                BuiltinFunction::Today,
                BuiltinFunction::Round,
                BuiltinFunction::Sum,
            ]
        );
        assert!(ParsedFormula::Literal.functions().is_empty());
    }
}
