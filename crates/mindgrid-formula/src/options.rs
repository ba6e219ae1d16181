//! Evaluation settings

use chrono::{Local, NaiveDateTime};

/// Default limit on nested function calls
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Settings for formula evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationOptions {
    /// Deepest allowed nesting of function calls
    ///
    /// Formulas nested deeper evaluate to `#ERROR!`.
    pub max_depth: usize,

    /// Clock used by TODAY and NOW (`None` reads the local system time)
    pub now: Option<NaiveDateTime>,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            now: None,
        }
    }
}

impl EvaluationOptions {
    /// Create options with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the nesting limit
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Pin the clock
    pub fn with_now(mut self, now: NaiveDateTime) -> Self {
        self.now = Some(now);
        self
    }

    /// Current time according to these options
    pub fn current_time(&self) -> NaiveDateTime {
        self.now.unwrap_or_else(|| Local::now().naive_local())
    }
}
