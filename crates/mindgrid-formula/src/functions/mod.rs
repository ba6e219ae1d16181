//! Built-in functions

pub mod criteria;
pub mod date;
pub mod info;
pub mod logical;
pub mod lookup;
pub mod math;
pub mod statistical;
pub mod text;

use crate::error::FormulaResult;
use crate::evaluator::EvaluationContext;
use crate::value::{Argument, FormulaValue};
use ahash::AHashMap;
use mindgrid_core::CellError;
use once_cell::sync::Lazy;
use std::fmt;

/// Function implementation signature
///
/// Each argument is one evaluated argument of the call; a range argument
/// carries all of its cells. Returning `Err` aborts the whole formula with
/// `#ERROR!`; expected failures are returned as `Ok(FormulaValue::Error(_))`.
pub type FunctionImpl = fn(&[Argument], &EvaluationContext) -> FormulaResult<FormulaValue>;

macro_rules! builtin_functions {
    ($($variant:ident => $name:literal,)+) => {
        /// Every function name the evaluator knows
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum BuiltinFunction {
            $($variant,)+
        }

        impl BuiltinFunction {
            /// All built-in functions, in declaration order
            pub const ALL: &'static [BuiltinFunction] = &[$(BuiltinFunction::$variant,)+];

            /// Upper-case function name
            pub fn name(&self) -> &'static str {
                match self {
                    $(BuiltinFunction::$variant => $name,)+
                }
            }

            /// Look up a function by name, case-insensitively
            pub fn from_name(name: &str) -> Option<Self> {
                match name.to_ascii_uppercase().as_str() {
                    $($name => Some(BuiltinFunction::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

builtin_functions! {
    // math
    Sum => "SUM",
    Product => "PRODUCT",
    Round => "ROUND",
    RoundUp => "ROUNDUP",
    RoundDown => "ROUNDDOWN",
    Abs => "ABS",
    Int => "INT",
    Mod => "MOD",
    Power => "POWER",
    Sqrt => "SQRT",
    Ceiling => "CEILING",
    Floor => "FLOOR",
    SumIf => "SUMIF",
    // statistical
    Average => "AVERAGE",
    Count => "COUNT",
    CountA => "COUNTA",
    Min => "MIN",
    Max => "MAX",
    Median => "MEDIAN",
    Mode => "MODE",
    Stdev => "STDEV",
    Var => "VAR",
    Large => "LARGE",
    Small => "SMALL",
    Percentile => "PERCENTILE",
    CountIf => "COUNTIF",
    AverageIf => "AVERAGEIF",
    // text
    Upper => "UPPER",
    Lower => "LOWER",
    Len => "LEN",
    Trim => "TRIM",
    Left => "LEFT",
    Right => "RIGHT",
    Mid => "MID",
    Concat => "CONCAT",
    Concatenate => "CONCATENATE",
    Substitute => "SUBSTITUTE",
    Find => "FIND",
    Search => "SEARCH",
    Rept => "REPT",
    Proper => "PROPER",
    // logical
    If => "IF",
    And => "AND",
    Or => "OR",
    Not => "NOT",
    Xor => "XOR",
    Ifs => "IFS",
    Switch => "SWITCH",
    Choose => "CHOOSE",
    IfError => "IFERROR",
    IfNa => "IFNA",
    // info
    IsBlank => "ISBLANK",
    IsNumber => "ISNUMBER",
    IsText => "ISTEXT",
    IsError => "ISERROR",
    IsNa => "ISNA",
    Na => "NA",
    // date
    Today => "TODAY",
    Now => "NOW",
    Year => "YEAR",
    Month => "MONTH",
    Day => "DAY",
    Hour => "HOUR",
    Minute => "MINUTE",
    Second => "SECOND",
    Weekday => "WEEKDAY",
    DateDif => "DATEDIF",
    NetworkDays => "NETWORKDAYS",
    EDate => "EDATE",
    EoMonth => "EOMONTH",
    // lookup
    VLookup => "VLOOKUP",
    HLookup => "HLOOKUP",
}

impl fmt::Display for BuiltinFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Function definition
pub struct FunctionDef {
    pub function: BuiltinFunction,
    /// Minimum arguments
    pub min_args: usize,
    /// Maximum arguments (None = unlimited)
    pub max_args: Option<usize>,
    /// Implementation
    pub implementation: FunctionImpl,
    /// Result depends on the clock, not only on the formula and the data
    pub volatile: bool,
}

impl FunctionDef {
    pub fn name(&self) -> &'static str {
        self.function.name()
    }

    /// Whether a call with `count` arguments leaves a required one missing
    pub fn is_missing_args(&self, count: usize) -> bool {
        count < self.min_args
    }

    /// How many of `count` arguments the implementation sees
    ///
    /// Arguments past `max_args` are dropped.
    pub fn used_args(&self, count: usize) -> usize {
        self.max_args.map_or(count, |max| count.min(max))
    }

    /// Human-readable arity, e.g. `1..=2` or `1+`
    pub fn arity(&self) -> String {
        match self.max_args {
            Some(max) if max == self.min_args => max.to_string(),
            Some(max) => format!("{}..={}", self.min_args, max),
            None => format!("{}+", self.min_args),
        }
    }
}

/// Global function registry (lazily initialized)
static FUNCTION_REGISTRY: Lazy<FunctionRegistry> = Lazy::new(FunctionRegistry::new);

/// Function registry
pub struct FunctionRegistry {
    functions: AHashMap<BuiltinFunction, FunctionDef>,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionRegistry {
    /// Create a new registry with all built-in functions
    pub fn new() -> Self {
        let mut registry = Self {
            functions: AHashMap::new(),
        };

        registry.register_math_functions();
        registry.register_statistical_functions();
        registry.register_text_functions();
        registry.register_logical_functions();
        registry.register_info_functions();
        registry.register_date_functions();
        registry.register_lookup_functions();

        registry
    }

    /// The shared registry used by the evaluator
    pub fn global() -> &'static FunctionRegistry {
        &FUNCTION_REGISTRY
    }

    /// Definition of a built-in function
    pub fn get(&self, function: BuiltinFunction) -> Option<&FunctionDef> {
        self.functions.get(&function)
    }

    /// Look up a function by name, case-insensitively
    pub fn lookup(&self, name: &str) -> Option<&FunctionDef> {
        BuiltinFunction::from_name(name).and_then(|f| self.get(f))
    }

    /// Register a function, replacing any previous definition
    pub fn register(&mut self, def: FunctionDef) {
        self.functions.insert(def.function, def);
    }

    /// All definitions, sorted by name
    pub fn definitions(&self) -> Vec<&FunctionDef> {
        let mut defs: Vec<&FunctionDef> = self.functions.values().collect();
        defs.sort_by_key(|d| d.name());
        defs
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    fn add(
        &mut self,
        function: BuiltinFunction,
        min_args: usize,
        max_args: Option<usize>,
        implementation: FunctionImpl,
    ) {
        self.register(FunctionDef {
            function,
            min_args,
            max_args,
            implementation,
            volatile: false,
        });
    }

    fn register_math_functions(&mut self) {
        use BuiltinFunction as F;
        self.add(F::Sum, 0, None, math::fn_sum);
        self.add(F::Product, 0, None, math::fn_product);
        self.add(F::Round, 1, Some(2), math::fn_round);
        self.add(F::RoundUp, 1, Some(2), math::fn_roundup);
        self.add(F::RoundDown, 1, Some(2), math::fn_rounddown);
        self.add(F::Abs, 1, Some(1), math::fn_abs);
        self.add(F::Int, 1, Some(1), math::fn_int);
        self.add(F::Mod, 2, Some(2), math::fn_mod);
        self.add(F::Power, 2, Some(2), math::fn_power);
        self.add(F::Sqrt, 1, Some(1), math::fn_sqrt);
        self.add(F::Ceiling, 1, Some(2), math::fn_ceiling);
        self.add(F::Floor, 1, Some(2), math::fn_floor);
        self.add(F::SumIf, 2, Some(3), math::fn_sumif);
    }

    fn register_statistical_functions(&mut self) {
        use BuiltinFunction as F;
        self.add(F::Average, 0, None, statistical::fn_average);
        self.add(F::Count, 0, None, statistical::fn_count);
        self.add(F::CountA, 0, None, statistical::fn_counta);
        self.add(F::Min, 0, None, statistical::fn_min);
        self.add(F::Max, 0, None, statistical::fn_max);
        self.add(F::Median, 0, None, statistical::fn_median);
        self.add(F::Mode, 0, None, statistical::fn_mode);
        self.add(F::Stdev, 0, None, statistical::fn_stdev);
        self.add(F::Var, 0, None, statistical::fn_var);
        self.add(F::Large, 2, Some(2), statistical::fn_large);
        self.add(F::Small, 2, Some(2), statistical::fn_small);
        self.add(F::Percentile, 2, Some(2), statistical::fn_percentile);
        self.add(F::CountIf, 2, Some(2), statistical::fn_countif);
        self.add(F::AverageIf, 2, Some(3), statistical::fn_averageif);
    }

    fn register_text_functions(&mut self) {
        use BuiltinFunction as F;
        self.add(F::Upper, 1, Some(1), text::fn_upper);
        self.add(F::Lower, 1, Some(1), text::fn_lower);
        self.add(F::Len, 1, Some(1), text::fn_len);
        self.add(F::Trim, 1, Some(1), text::fn_trim);
        self.add(F::Left, 1, Some(2), text::fn_left);
        self.add(F::Right, 1, Some(2), text::fn_right);
        self.add(F::Mid, 3, Some(3), text::fn_mid);
        self.add(F::Concat, 0, None, text::fn_concat);
        self.add(F::Concatenate, 0, None, text::fn_concat);
        self.add(F::Substitute, 3, Some(4), text::fn_substitute);
        self.add(F::Find, 2, Some(3), text::fn_find);
        self.add(F::Search, 2, Some(3), text::fn_search);
        self.add(F::Rept, 2, Some(2), text::fn_rept);
        self.add(F::Proper, 1, Some(1), text::fn_proper);
    }

    fn register_logical_functions(&mut self) {
        use BuiltinFunction as F;
        self.add(F::If, 2, Some(3), logical::fn_if);
        self.add(F::And, 0, None, logical::fn_and);
        self.add(F::Or, 0, None, logical::fn_or);
        self.add(F::Not, 1, Some(1), logical::fn_not);
        self.add(F::Xor, 0, None, logical::fn_xor);
        self.add(F::Ifs, 2, None, logical::fn_ifs);
        self.add(F::Switch, 3, None, logical::fn_switch);
        self.add(F::Choose, 2, None, logical::fn_choose);
        self.add(F::IfError, 2, Some(2), logical::fn_iferror);
        self.add(F::IfNa, 2, Some(2), logical::fn_ifna);
    }

    fn register_info_functions(&mut self) {
        use BuiltinFunction as F;
        self.add(F::IsBlank, 1, Some(1), info::fn_isblank);
        self.add(F::IsNumber, 1, Some(1), info::fn_isnumber);
        self.add(F::IsText, 1, Some(1), info::fn_istext);
        self.add(F::IsError, 1, Some(1), info::fn_iserror);
        self.add(F::IsNa, 1, Some(1), info::fn_isna);
        self.add(F::Na, 0, Some(0), info::fn_na);
    }

    fn register_date_functions(&mut self) {
        use BuiltinFunction as F;

        // TODAY and NOW read the clock
        self.register(FunctionDef {
            function: F::Today,
            min_args: 0,
            max_args: Some(0),
            implementation: date::fn_today,
            volatile: true,
        });
        self.register(FunctionDef {
            function: F::Now,
            min_args: 0,
            max_args: Some(0),
            implementation: date::fn_now,
            volatile: true,
        });

        self.add(F::Year, 1, Some(1), date::fn_year);
        self.add(F::Month, 1, Some(1), date::fn_month);
        self.add(F::Day, 1, Some(1), date::fn_day);
        self.add(F::Hour, 1, Some(1), date::fn_hour);
        self.add(F::Minute, 1, Some(1), date::fn_minute);
        self.add(F::Second, 1, Some(1), date::fn_second);
        self.add(F::Weekday, 1, Some(2), date::fn_weekday);
        self.add(F::DateDif, 3, Some(3), date::fn_datedif);
        self.add(F::NetworkDays, 2, Some(3), date::fn_networkdays);
        self.add(F::EDate, 2, Some(2), date::fn_edate);
        self.add(F::EoMonth, 2, Some(2), date::fn_eomonth);
    }

    fn register_lookup_functions(&mut self) {
        use BuiltinFunction as F;
        self.add(F::VLookup, 3, Some(4), lookup::fn_vlookup);
        self.add(F::HLookup, 3, Some(4), lookup::fn_hlookup);
    }
}

/// Return the error token from the enclosing function on `Err`
macro_rules! try_cell {
    ($expr:expr) => {
        match $expr {
            Ok(value) => value,
            Err(e) => return Ok(FormulaValue::Error(e)),
        }
    };
}
pub(crate) use try_cell;

/// Every value of every argument, ranges flattened in order
pub(crate) fn flatten(args: &[Argument]) -> impl Iterator<Item = &FormulaValue> {
    args.iter().flat_map(|arg| arg.values().iter())
}

/// The numbers among the flattened arguments
///
/// Only actual numbers count; text, booleans, blanks and error tokens are
/// skipped.
pub(crate) fn collect_numbers(args: &[Argument]) -> Vec<f64> {
    flatten(args)
        .filter_map(|v| match v {
            FormulaValue::Number(n) => Some(*n),
            _ => None,
        })
        .collect()
}

/// First value of the argument at `index`
pub(crate) fn scalar_arg(args: &[Argument], index: usize) -> Option<&FormulaValue> {
    args.get(index).and_then(Argument::first)
}

/// Numeric reading of the argument at `index`
///
/// A missing argument takes `default`, or is `#VALUE!` without one. Error
/// tokens pass through.
pub(crate) fn number_arg(
    args: &[Argument],
    index: usize,
    default: Option<f64>,
) -> Result<f64, CellError> {
    match scalar_arg(args, index) {
        None => default.ok_or(CellError::Value),
        Some(FormulaValue::Error(e)) => Err(*e),
        Some(v) => v.as_number().ok_or(CellError::Value),
    }
}

/// Text reading of the argument at `index`
///
/// Missing arguments read as empty text. Error tokens pass through.
pub(crate) fn text_arg(args: &[Argument], index: usize) -> Result<String, CellError> {
    match scalar_arg(args, index) {
        None => Ok(String::new()),
        Some(FormulaValue::Error(e)) => Err(*e),
        Some(v) => Ok(v.as_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_every_function_registered() {
        let registry = FunctionRegistry::new();
        assert_eq!(registry.len(), BuiltinFunction::ALL.len());
        for function in BuiltinFunction::ALL {
            assert!(registry.get(*function).is_some(), "{} missing", function);
        }
    }

    #[test]
    fn test_name_round_trip() {
        for function in BuiltinFunction::ALL {
            assert_eq!(BuiltinFunction::from_name(function.name()), Some(*function));
            assert_eq!(
                BuiltinFunction::from_name(&function.name().to_lowercase()),
                Some(*function)
            );
        }
        assert_eq!(BuiltinFunction::from_name("FOO"), None);
    }

    #[test]
    fn test_lookup_case_insensitive() {
        let registry = FunctionRegistry::global();
        assert_eq!(registry.lookup("sum").map(|d| d.name()), Some("SUM"));
        assert_eq!(registry.lookup("VLookup").map(|d| d.name()), Some("VLOOKUP"));
        assert!(registry.lookup("nope").is_none());
    }

    #[test]
    fn test_arity() {
        let registry = FunctionRegistry::global();
        let round = registry.get(BuiltinFunction::Round).unwrap();
        assert!(round.is_missing_args(0));
        assert!(!round.is_missing_args(1));
        assert_eq!(round.used_args(2), 2);
        assert_eq!(round.used_args(3), 2);
        assert_eq!(round.arity(), "1..=2");

        let sum = registry.get(BuiltinFunction::Sum).unwrap();
        assert!(!sum.is_missing_args(0));
        assert_eq!(sum.used_args(300), 300);
        assert_eq!(sum.arity(), "0+");
        assert_eq!(registry.get(BuiltinFunction::Mid).unwrap().arity(), "3");
        assert_eq!(registry.get(BuiltinFunction::Today).unwrap().used_args(1), 0);
    }

    #[test]
    fn test_volatile_functions() {
        let registry = FunctionRegistry::global();
        let volatile: Vec<&str> = registry
            .definitions()
            .into_iter()
            .filter(|d| d.volatile)
            .map(|d| d.name())
            .collect();
        assert_eq!(volatile, vec!["NOW", "TODAY"]);
    }

    #[test]
    fn test_argument_helpers() {
        let args = vec![
            Argument::scalar(FormulaValue::String("2.5".into())),
            Argument::range(
                vec![FormulaValue::Number(1.0), FormulaValue::String("x".into())],
                2,
            ),
            Argument::scalar(FormulaValue::Error(CellError::Na)),
        ];
        assert_eq!(collect_numbers(&args), vec![1.0]);
        assert_eq!(flatten(&args).count(), 4);
        assert_eq!(number_arg(&args, 0, None), Ok(2.5));
        assert_eq!(number_arg(&args, 2, None), Err(CellError::Na));
        assert_eq!(number_arg(&args, 5, Some(0.0)), Ok(0.0));
        assert_eq!(number_arg(&args, 5, None), Err(CellError::Value));
        assert_eq!(text_arg(&args, 1), Ok("1".to_string()));
    }
}
