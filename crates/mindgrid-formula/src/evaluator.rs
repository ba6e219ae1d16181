//! Formula evaluator
//!
//! Evaluates parsed formulas against a dataset snapshot. Evaluation only
//! reads the dataset; the same (formula, dataset) pair always produces the
//! same value, apart from the clock read by TODAY and NOW.

use crate::ast::{ComparisonOperator, FormulaExpr, ParsedFormula};
use crate::error::{FormulaError, FormulaResult};
use crate::functions::{BuiltinFunction, FunctionRegistry};
use crate::options::EvaluationOptions;
use crate::parser::parse_formula;
use crate::reference::{cell_value, resolve_addresses};
use crate::value::{compare_values, Argument, FormulaValue};
use mindgrid_core::{CellAddress, CellError, Dataset};
use std::cmp::Ordering;
use tracing::{debug, trace, warn};

/// Evaluation context
///
/// Carries the dataset snapshot, the options and the function registry into
/// every function call. Functions that need to evaluate another formula do
/// it through [`EvaluationContext::evaluate`].
#[derive(Clone)]
pub struct EvaluationContext<'a> {
    dataset: &'a Dataset,
    options: EvaluationOptions,
    registry: &'static FunctionRegistry,
}

impl<'a> EvaluationContext<'a> {
    /// Create a context with default options
    pub fn new(dataset: &'a Dataset) -> Self {
        Self::with_options(dataset, EvaluationOptions::default())
    }

    /// Create a context with explicit options
    pub fn with_options(dataset: &'a Dataset, options: EvaluationOptions) -> Self {
        Self {
            dataset,
            options,
            registry: FunctionRegistry::global(),
        }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn options(&self) -> &EvaluationOptions {
        &self.options
    }

    pub fn registry(&self) -> &'static FunctionRegistry {
        self.registry
    }

    /// Read one cell of the snapshot
    pub fn get_cell_value(&self, address: CellAddress) -> Option<FormulaValue> {
        cell_value(address, self.dataset)
    }

    /// Evaluate a formula (or literal) in this context
    pub fn evaluate(&self, formula: &str) -> FormulaValue {
        self.evaluate_detailed(formula).into_value()
    }

    /// Evaluate a formula, keeping track of which path produced the value
    pub fn evaluate_detailed(&self, formula: &str) -> Evaluation {
        trace!(formula, "evaluating formula");

        let parsed = match parse_formula(formula, self.options.max_depth) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(formula, error = %err, "formula failed to parse");
                return Evaluation::Failed(err);
            }
        };

        match parsed {
            ParsedFormula::Literal => Evaluation::Literal(formula.to_string()),
            ParsedFormula::Unrecognized => {
                debug!(formula, "unrecognized formula left as text");
                Evaluation::Unrecognized(formula.to_string())
            }
            ParsedFormula::Expr(expr) => {
                let result = match &expr {
                    FormulaExpr::Function { function, args } => {
                        call_function(*function, args, self)
                    }
                    other => evaluate_expr(other, self).map(Argument::into_scalar),
                };
                match result {
                    Ok(value) => Evaluation::Computed(value.into_result()),
                    Err(err) => {
                        warn!(formula, error = %err, "formula evaluation failed");
                        Evaluation::Failed(err)
                    }
                }
            }
        }
    }
}

/// How a cell value was turned into its displayed value
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// Not a formula; returned unchanged
    Literal(String),
    /// A recognized formula and its result
    Computed(FormulaValue),
    /// Starts with `=` but is not a known call or a reference; returned unchanged
    Unrecognized(String),
    /// Parsing or a function failed unexpectedly
    Failed(FormulaError),
}

impl Evaluation {
    /// The value to display
    ///
    /// Literals and unrecognized formulas read as their own text; failures
    /// read as `#ERROR!`.
    pub fn into_value(self) -> FormulaValue {
        match self {
            Evaluation::Literal(text) | Evaluation::Unrecognized(text) => FormulaValue::String(text),
            Evaluation::Computed(value) => value,
            Evaluation::Failed(_) => FormulaValue::Error(CellError::Error),
        }
    }

    /// Whether the formula engine actually computed this value
    pub fn is_computed(&self) -> bool {
        matches!(self, Evaluation::Computed(_))
    }
}

/// Evaluate a cell value against a dataset with default options
///
/// # Example
///
/// ```
/// use mindgrid_core::{ColumnDef, ColumnKind, Dataset, Row};
/// use mindgrid_formula::{evaluate, FormulaValue};
///
/// let dataset = Dataset::new(vec![ColumnDef::new("hours", ColumnKind::Number)])
///     .unwrap()
///     .with_rows(vec![Row::new().with("hours", 3.0), Row::new().with("hours", 4.5)]);
///
/// assert_eq!(evaluate("=SUM(A1:A2)", &dataset), FormulaValue::Number(7.5));
/// assert_eq!(evaluate("=A1+A2", &dataset), FormulaValue::String("=A1+A2".into()));
/// ```
pub fn evaluate(formula: &str, dataset: &Dataset) -> FormulaValue {
    EvaluationContext::new(dataset).evaluate(formula)
}

/// Evaluate a cell value with explicit options
pub fn evaluate_with(formula: &str, dataset: &Dataset, options: &EvaluationOptions) -> FormulaValue {
    EvaluationContext::with_options(dataset, options.clone()).evaluate(formula)
}

/// Evaluate a cell value, reporting the path taken
pub fn evaluate_detailed(formula: &str, dataset: &Dataset, options: &EvaluationOptions) -> Evaluation {
    EvaluationContext::with_options(dataset, options.clone()).evaluate_detailed(formula)
}

/// Evaluate one expression node into a function argument
pub fn evaluate_expr(expr: &FormulaExpr, ctx: &EvaluationContext) -> FormulaResult<Argument> {
    let value = match expr {
        FormulaExpr::Empty => FormulaValue::Empty,
        FormulaExpr::Number(n) => FormulaValue::Number(*n),
        FormulaExpr::String(s) => FormulaValue::String(s.clone()),
        FormulaExpr::Boolean(b) => FormulaValue::Boolean(*b),
        FormulaExpr::Unrecognized(text) => FormulaValue::String(text.clone()),

        FormulaExpr::CellRef(address) => ctx.get_cell_value(*address).unwrap_or(FormulaValue::Empty),

        FormulaExpr::RangeRef(range) => {
            return Ok(resolve_addresses(range.start, range.end, ctx.dataset()).into_argument());
        }

        FormulaExpr::MalformedRange(text) => {
            debug!(range = %text, "malformed range resolves to no cells");
            return Ok(Argument::range(Vec::new(), 0));
        }

        FormulaExpr::Comparison { op, left, right } => {
            let left = evaluate_expr(left, ctx)?.into_scalar();
            let right = evaluate_expr(right, ctx)?.into_scalar();
            FormulaValue::Boolean(compare(*op, &left, &right))
        }

        // a nested call that fails reads as #ERROR! to its caller
        FormulaExpr::Function { function, args } => match call_function(*function, args, ctx) {
            Ok(value) => value,
            Err(err) => {
                warn!(function = %function, error = %err, "nested function failed");
                FormulaValue::Error(CellError::Error)
            }
        },
    };

    Ok(Argument::scalar(value))
}

fn compare(op: ComparisonOperator, left: &FormulaValue, right: &FormulaValue) -> bool {
    let ordering = compare_values(left, right);
    match op {
        ComparisonOperator::Equal => ordering == Ordering::Equal,
        ComparisonOperator::NotEqual => ordering != Ordering::Equal,
        ComparisonOperator::LessThan => ordering == Ordering::Less,
        ComparisonOperator::LessEqual => ordering != Ordering::Greater,
        ComparisonOperator::GreaterThan => ordering == Ordering::Greater,
        ComparisonOperator::GreaterEqual => ordering != Ordering::Less,
    }
}

fn call_function(
    function: BuiltinFunction,
    args: &[FormulaExpr],
    ctx: &EvaluationContext,
) -> FormulaResult<FormulaValue> {
    let def = ctx
        .registry()
        .get(function)
        .ok_or_else(|| FormulaError::UnknownFunction(function.name().to_string()))?;

    if def.is_missing_args(args.len()) {
        return Err(FormulaError::ArgumentCount {
            function: def.name().to_string(),
            expected: def.arity(),
            actual: args.len(),
        });
    }

    let used = def.used_args(args.len());
    if used < args.len() {
        debug!(
            function = %function,
            ignored = args.len() - used,
            "extra arguments ignored"
        );
    }

    let values = args[..used]
        .iter()
        .map(|arg| evaluate_expr(arg, ctx))
        .collect::<FormulaResult<Vec<_>>>()?;

    (def.implementation)(&values, ctx)
}
