//! Memoized formula evaluation
//!
//! Evaluation is a pure function of the formula text and the dataset
//! snapshot, so a result can be reused for as long as the dataset version
//! does not change. Formulas calling a volatile function (TODAY, NOW) are
//! only cached when the clock is pinned in the options.
//!
//! # Example
//!
//! ```rust
//! use mindgrid::prelude::*;
//!
//! let mut dataset = Dataset::new(vec![ColumnDef::new("hours", ColumnKind::Number)]).unwrap();
//! dataset.push_row(Row::new().with("hours", 2.0));
//!
//! let mut cache = EvaluationCache::new();
//! let options = EvaluationOptions::default();
//! assert_eq!(cache.evaluate("=SUM(A1:A5)", &dataset, &options), FormulaValue::Number(2.0));
//! assert_eq!(cache.evaluate("=SUM(A1:A5)", &dataset, &options), FormulaValue::Number(2.0));
//! assert_eq!(cache.stats().hits, 1);
//!
//! dataset.push_row(Row::new().with("hours", 3.0));
//! assert_eq!(cache.evaluate("=SUM(A1:A5)", &dataset, &options), FormulaValue::Number(5.0));
//! ```

use ahash::AHashMap;
use mindgrid_core::Dataset;
use mindgrid_formula::{evaluate_with, parse_formula, EvaluationOptions, FunctionRegistry, FormulaValue};
use tracing::{debug, trace};

/// Counters from cache use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Evaluations answered from the cache
    pub hits: usize,
    /// Evaluations computed and stored
    pub misses: usize,
    /// Evaluations computed but not stored (volatile formulas)
    pub uncached: usize,
}

/// Cache of evaluation results for one dataset
///
/// Entries are keyed by formula text and dataset version. A cache must not
/// be shared between unrelated datasets, since their versions may collide,
/// and callers should pass the same options on every call.
#[derive(Debug, Default)]
pub struct EvaluationCache {
    entries: AHashMap<(String, u64), FormulaValue>,
    version: Option<u64>,
    stats: CacheStats,
}

impl EvaluationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate `formula`, reusing a stored result for this dataset version
    pub fn evaluate(
        &mut self,
        formula: &str,
        dataset: &Dataset,
        options: &EvaluationOptions,
    ) -> FormulaValue {
        let version = dataset.version();
        if self.version != Some(version) {
            if !self.entries.is_empty() {
                debug!(
                    from = ?self.version,
                    to = version,
                    dropped = self.entries.len(),
                    "dataset changed, clearing evaluation cache"
                );
            }
            self.entries.clear();
            self.version = Some(version);
        }

        let key = (formula.to_string(), version);
        if let Some(value) = self.entries.get(&key) {
            trace!(formula, "evaluation cache hit");
            self.stats.hits += 1;
            return value.clone();
        }

        let value = evaluate_with(formula, dataset, options);
        if options.now.is_none() && is_volatile(formula, options) {
            self.stats.uncached += 1;
        } else {
            self.stats.misses += 1;
            self.entries.insert(key, value.clone());
        }
        value
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every stored result
    pub fn clear(&mut self) {
        self.entries.clear();
        self.version = None;
    }
}

/// Whether the formula calls a function whose result depends on the clock
fn is_volatile(formula: &str, options: &EvaluationOptions) -> bool {
    let Ok(parsed) = parse_formula(formula, options.max_depth) else {
        return false;
    };
    let registry = FunctionRegistry::global();
    parsed
        .functions()
        .into_iter()
        .any(|f| registry.get(f).is_some_and(|def| def.volatile))
}
