//! Cell value types

use std::fmt;

/// Value stored on a row record under a column id
///
/// Formulas are ordinary text values whose first character is `=`; they
/// are interpreted by the formula engine at render time and never stored
/// in evaluated form.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum CellValue {
    /// Absent value
    #[default]
    Null,

    /// Numeric value
    Number(f64),

    /// Text value, including formulas
    Text(String),

    /// Ordered list of strings (tags, relationships)
    List(Vec<String>),
}

impl CellValue {
    /// Create a new text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        CellValue::Text(s.into())
    }

    /// Check if the cell is absent
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Check if the cell holds a formula (text starting with `=`)
    pub fn is_formula(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.starts_with('='))
    }

    /// Get the formula text, if this cell holds one
    pub fn as_formula(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) if s.starts_with('=') => Some(s),
            _ => None,
        }
    }

    /// The string form of the value, as used for numeric coercion
    ///
    /// Lists join their items with `,`. Absent values have no string form.
    pub fn string_form(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::Number(n) => Some(format_number(*n)),
            CellValue::Text(s) => Some(s.clone()),
            CellValue::List(items) => Some(items.join(",")),
        }
    }

    /// Interpret the string form as a finite number
    ///
    /// Leading and trailing whitespace is ignored. `inf`, `NaN` and friends
    /// are not numbers here.
    pub fn as_finite_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => n.is_finite().then_some(*n),
            other => other.string_form().as_deref().and_then(parse_finite),
        }
    }
}

/// Parse a trimmed string as a finite `f64`
pub fn parse_finite(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Format a number without a trailing `.0` for integral values
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<Vec<String>> for CellValue {
    fn from(items: Vec<String>) -> Self {
        CellValue::List(items)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.string_form().as_deref().unwrap_or_default())
    }
}

/// Error tokens produced by formula evaluation
///
/// The display strings are a stable vocabulary shared with the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellError {
    /// #ERROR! - Evaluation failed unexpectedly
    Error,
    /// #VALUE! - Wrong type of argument, or text not found
    Value,
    /// #DIV/0! - Division by zero or too few samples
    Div0,
    /// #N/A - Value not available
    Na,
    /// #NUM! - Invalid numeric value
    Num,
    /// #REF! - Lookup index outside the table
    Ref,
}

impl CellError {
    /// Get the display string for this error
    pub fn as_str(&self) -> &'static str {
        match self {
            CellError::Error => "#ERROR!",
            CellError::Value => "#VALUE!",
            CellError::Div0 => "#DIV/0!",
            CellError::Na => "#N/A",
            CellError::Num => "#NUM!",
            CellError::Ref => "#REF!",
        }
    }

    /// Parse an error token
    pub fn from_token(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "#ERROR!" => Some(CellError::Error),
            "#VALUE!" => Some(CellError::Value),
            "#DIV/0!" => Some(CellError::Div0),
            "#N/A" => Some(CellError::Na),
            "#NUM!" => Some(CellError::Num),
            "#REF!" => Some(CellError::Ref),
            _ => None,
        }
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
