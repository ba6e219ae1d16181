//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Failures raised while parsing or evaluating a formula
///
/// None of these escape [`crate::evaluate`]: they are logged and reported
/// to callers as the `#ERROR!` token. [`crate::evaluate_detailed`] keeps them.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormulaError {
    /// Invalid argument
    #[error("Invalid argument: {0}")]
    Argument(String),

    /// Unknown function
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Wrong number of arguments
    #[error("Wrong number of arguments for {function}: expected {expected}, got {actual}")]
    ArgumentCount {
        function: String,
        expected: String,
        actual: usize,
    },

    /// Nested calls exceed the configured depth
    #[error("Formula nesting exceeds {0} levels")]
    NestingTooDeep(usize),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::evaluate_detailed;
    use crate::evaluator::tests::test_dataset;
    use crate::evaluator::Evaluation;
    use crate::options::EvaluationOptions;
    use pretty_assertions::assert_eq;

    fn failure(formula: &str, options: &EvaluationOptions) -> FormulaError {
        match evaluate_detailed(formula, &test_dataset(), options) {
            Evaluation::Failed(err) => err,
            other => panic!("expected a failure for {}, got {:?}", formula, other),
        }
    }

    #[test]
    fn test_failures_carry_their_variant() {
        let options = EvaluationOptions::default();
        assert_eq!(
            failure("=ROUND()", &options).to_string(),
            "Wrong number of arguments for ROUND: expected 1..=2, got 0"
        );
        assert!(matches!(failure("=IF(1)", &options), FormulaError::ArgumentCount { .. }));
        // both arguments are ranges with no cells in the dataset
        assert!(matches!(
            failure("=IF(A9:B9,A9:B9)", &options),
            FormulaError::Argument(_)
        ));

        let shallow = options.with_max_depth(1);
        assert_eq!(
            failure("=ABS(ABS(1))", &shallow),
            FormulaError::NestingTooDeep(1)
        );
        assert_eq!(
            FormulaError::NestingTooDeep(1).to_string(),
            "Formula nesting exceeds 1 levels"
        );
    }
}
