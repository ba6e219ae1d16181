//! Runtime values and function arguments

use mindgrid_core::{format_number, parse_finite, CellError, CellValue};
use std::cmp::Ordering;
use std::fmt;

/// Value types during formula evaluation
///
/// This is also the output of evaluation: a scalar or an error token. Ranges
/// only exist as [`Argument`]s on the way into a function.
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaValue {
    Number(f64),
    String(String),
    Boolean(bool),
    /// A list cell (tags, relationships) read through a reference
    ///
    /// Only seen by functions; a formula's own result is collapsed with
    /// [`FormulaValue::into_result`].
    List(Vec<String>),
    Error(CellError),
    Empty,
}

impl FormulaValue {
    /// Read a stored cell the way references see it
    ///
    /// Anything whose string form is a finite number becomes a number. Text
    /// equal to an error token becomes that error. Everything else passes
    /// through unchanged.
    pub fn from_cell(cell: &CellValue) -> Self {
        if let Some(n) = cell.as_finite_number() {
            return FormulaValue::Number(n);
        }
        match cell {
            CellValue::Null => FormulaValue::Empty,
            CellValue::Number(n) => FormulaValue::Number(*n),
            CellValue::Text(s) => match CellError::from_token(s) {
                Some(e) => FormulaValue::Error(e),
                None => FormulaValue::String(s.clone()),
            },
            CellValue::List(items) => FormulaValue::List(items.clone()),
        }
    }

    /// Convert to number, if possible
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FormulaValue::Number(n) => Some(*n),
            FormulaValue::Boolean(true) => Some(1.0),
            FormulaValue::Boolean(false) => Some(0.0),
            FormulaValue::String(s) => parse_finite(s),
            FormulaValue::Empty => Some(0.0),
            _ => None,
        }
    }

    /// Convert to boolean, if the value has a logical reading
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FormulaValue::Boolean(b) => Some(*b),
            FormulaValue::Number(n) => Some(*n != 0.0),
            FormulaValue::String(s) => {
                let upper = s.to_uppercase();
                if upper == "TRUE" {
                    Some(true)
                } else if upper == "FALSE" {
                    Some(false)
                } else {
                    None
                }
            }
            FormulaValue::Empty => Some(false),
            _ => None,
        }
    }

    /// Truthiness used by IF, AND, OR and friends
    ///
    /// Non-empty text is true (including "FALSE" typed as text), as are
    /// lists and error tokens. Zero, NaN, empty text and absent values are
    /// false.
    pub fn is_truthy(&self) -> bool {
        match self {
            FormulaValue::Boolean(b) => *b,
            FormulaValue::Number(n) => *n != 0.0 && !n.is_nan(),
            FormulaValue::String(s) => !s.is_empty(),
            FormulaValue::List(_) | FormulaValue::Error(_) => true,
            FormulaValue::Empty => false,
        }
    }

    /// Convert to string
    pub fn as_string(&self) -> String {
        match self {
            FormulaValue::Number(n) => format_number(*n),
            FormulaValue::String(s) => s.clone(),
            FormulaValue::Boolean(true) => "TRUE".to_string(),
            FormulaValue::Boolean(false) => "FALSE".to_string(),
            FormulaValue::List(items) => items.join(","),
            FormulaValue::Error(e) => e.to_string(),
            FormulaValue::Empty => String::new(),
        }
    }

    /// Check if this is an error
    ///
    /// Text spelling an error token counts, so a quoted `"#N/A"` reads the
    /// same as `#N/A` stored in a cell.
    pub fn is_error(&self) -> bool {
        self.get_error().is_some()
    }

    /// Get the error if this is one
    pub fn get_error(&self) -> Option<CellError> {
        match self {
            FormulaValue::Error(e) => Some(*e),
            FormulaValue::String(s) => CellError::from_token(s),
            _ => None,
        }
    }

    /// Collapse to the scalar shown for a whole formula
    ///
    /// A list cell reached through a reference becomes its comma-joined text.
    pub fn into_result(self) -> Self {
        match self {
            FormulaValue::List(items) => FormulaValue::String(items.join(",")),
            other => other,
        }
    }

    /// Whether COUNTA would count this value
    pub fn is_blank(&self) -> bool {
        match self {
            FormulaValue::Empty => true,
            FormulaValue::String(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for FormulaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl From<f64> for FormulaValue {
    fn from(n: f64) -> Self {
        FormulaValue::Number(n)
    }
}

impl From<bool> for FormulaValue {
    fn from(b: bool) -> Self {
        FormulaValue::Boolean(b)
    }
}

impl From<&str> for FormulaValue {
    fn from(s: &str) -> Self {
        FormulaValue::String(s.to_string())
    }
}

impl From<String> for FormulaValue {
    fn from(s: String) -> Self {
        FormulaValue::String(s)
    }
}

impl From<CellError> for FormulaValue {
    fn from(e: CellError) -> Self {
        FormulaValue::Error(e)
    }
}

/// Compare two values for ordering
///
/// Numbers compare numerically (text that reads as a number is coerced when
/// the other side is a number), text case-insensitively, and mixed types
/// order number < text < boolean. Empty acts as 0 against numbers and as ""
/// against text. Error tokens compare as their text.
pub fn compare_values(left: &FormulaValue, right: &FormulaValue) -> Ordering {
    use FormulaValue as V;

    let normalize = |v: &FormulaValue, other: &FormulaValue| -> FormulaValue {
        match (v, other) {
            (V::Empty, V::String(_)) => V::String(String::new()),
            (V::Empty, _) => V::Number(0.0),
            (V::Error(e), _) => V::String(e.to_string()),
            (V::List(items), _) => V::String(items.join(",")),
            (V::String(s), V::Number(_)) => match parse_finite(s) {
                Some(n) => V::Number(n),
                None => v.clone(),
            },
            _ => v.clone(),
        }
    };

    let l = normalize(left, right);
    let r = normalize(right, left);

    match (&l, &r) {
        (V::Number(a), V::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (V::String(a), V::String(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
        (V::Boolean(a), V::Boolean(b)) => a.cmp(b),
        (V::Number(_), _) => Ordering::Less,
        (_, V::Number(_)) => Ordering::Greater,
        (V::String(_), V::Boolean(_)) => Ordering::Less,
        (V::Boolean(_), V::String(_)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

/// One evaluated function argument
///
/// A scalar argument holds one value. A range argument holds its in-bounds
/// cells row-major together with its width, so lookups can recover the
/// table shape while everything else just flattens it.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    values: Vec<FormulaValue>,
    columns: usize,
    range: bool,
}

impl Argument {
    /// A single value
    pub fn scalar(value: FormulaValue) -> Self {
        Self {
            values: vec![value],
            columns: 1,
            range: false,
        }
    }

    /// A rectangle of values, `columns` wide
    pub fn range(values: Vec<FormulaValue>, columns: usize) -> Self {
        Self {
            values,
            columns,
            range: true,
        }
    }

    /// All values, row-major
    pub fn values(&self) -> &[FormulaValue] {
        &self.values
    }

    /// The first value, if any
    pub fn first(&self) -> Option<&FormulaValue> {
        self.values.first()
    }

    /// Whether this argument came from a range
    pub fn is_range(&self) -> bool {
        self.range
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Width of the rectangle (1 for scalars, 0 for an empty range)
    pub fn column_count(&self) -> usize {
        if self.values.is_empty() {
            0
        } else {
            self.columns
        }
    }

    /// Height of the rectangle
    pub fn row_count(&self) -> usize {
        match self.column_count() {
            0 => 0,
            w => self.values.len() / w,
        }
    }

    /// Iterate over the rows of the rectangle
    pub fn rows(&self) -> impl Iterator<Item = &[FormulaValue]> {
        self.values.chunks(self.columns.max(1))
    }

    /// Value at a 0-based (row, column) inside the rectangle
    pub fn get(&self, row: usize, col: usize) -> Option<&FormulaValue> {
        if col >= self.column_count() {
            return None;
        }
        self.values.get(row * self.columns + col)
    }

    /// Collapse to a single value: the first one, or empty
    pub fn into_scalar(self) -> FormulaValue {
        self.values.into_iter().next().unwrap_or(FormulaValue::Empty)
    }
}

impl From<FormulaValue> for Argument {
    fn from(value: FormulaValue) -> Self {
        Argument::scalar(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_cell_prefers_numbers() {
        assert_eq!(
            FormulaValue::from_cell(&CellValue::text("12")),
            FormulaValue::Number(12.0)
        );
        assert_eq!(
            FormulaValue::from_cell(&CellValue::text("x")),
            FormulaValue::String("x".into())
        );
        assert_eq!(
            FormulaValue::from_cell(&CellValue::text("#N/A")),
            FormulaValue::Error(CellError::Na)
        );
        assert_eq!(FormulaValue::from_cell(&CellValue::Null), FormulaValue::Empty);
        assert_eq!(
            FormulaValue::from_cell(&CellValue::List(vec!["a".into()])),
            FormulaValue::List(vec!["a".into()])
        );
        assert_eq!(
            FormulaValue::from_cell(&CellValue::text("=SUM(A1:A2)")),
            FormulaValue::String("=SUM(A1:A2)".into())
        );
    }

    #[test]
    fn test_error_token_text_is_error() {
        assert_eq!(
            FormulaValue::String("#DIV/0!".into()).get_error(),
            Some(CellError::Div0)
        );
        assert!(FormulaValue::String("#N/A".into()).is_error());
        assert!(!FormulaValue::String("#hashtag".into()).is_error());
        assert!(!FormulaValue::Number(0.0).is_error());
    }

    #[test]
    fn test_into_result_joins_lists() {
        assert_eq!(
            FormulaValue::List(vec!["a".into(), "b".into()]).into_result(),
            FormulaValue::String("a,b".into())
        );
        assert_eq!(FormulaValue::Number(1.0).into_result(), FormulaValue::Number(1.0));
    }

    #[test]
    fn test_truthiness() {
        assert!(FormulaValue::Number(2.0).is_truthy());
        assert!(!FormulaValue::Number(0.0).is_truthy());
        assert!(!FormulaValue::Number(f64::NAN).is_truthy());
        assert!(FormulaValue::String("no".into()).is_truthy());
        assert!(!FormulaValue::String(String::new()).is_truthy());
        assert!(!FormulaValue::Empty.is_truthy());
        assert!(FormulaValue::Error(CellError::Na).is_truthy());
    }

    #[test]
    fn test_compare_values() {
        use FormulaValue as V;
        assert_eq!(compare_values(&V::Number(10.0), &V::Number(5.0)), Ordering::Greater);
        assert_eq!(
            compare_values(&V::String("abc".into()), &V::String("ABC".into())),
            Ordering::Equal
        );
        assert_eq!(
            compare_values(&V::String("10".into()), &V::Number(9.0)),
            Ordering::Greater
        );
        assert_eq!(
            compare_values(&V::Number(1.0), &V::String("x".into())),
            Ordering::Less
        );
        assert_eq!(compare_values(&V::Empty, &V::Number(0.0)), Ordering::Equal);
        assert_eq!(
            compare_values(&V::Empty, &V::String(String::new())),
            Ordering::Equal
        );
        assert_eq!(
            compare_values(&V::Boolean(true), &V::Boolean(false)),
            Ordering::Greater
        );
    }

    #[test]
    fn test_argument_shape() {
        let arg = Argument::range((1..=6).map(|n| FormulaValue::Number(n as f64)).collect(), 3);
        assert_eq!(arg.row_count(), 2);
        assert_eq!(arg.column_count(), 3);
        assert_eq!(arg.get(1, 0), Some(&FormulaValue::Number(4.0)));
        assert_eq!(arg.get(0, 3), None);
        assert_eq!(arg.rows().count(), 2);

        let empty = Argument::range(Vec::new(), 0);
        assert_eq!(empty.row_count(), 0);
        assert_eq!(empty.rows().count(), 0);
        assert_eq!(empty.into_scalar(), FormulaValue::Empty);
    }
}
