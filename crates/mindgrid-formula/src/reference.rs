//! Cell and range resolution against a dataset

use crate::value::{Argument, FormulaValue};
use lazy_regex::regex_is_match;
use mindgrid_core::{CellAddress, CellRange, Dataset};
use tracing::debug;

/// Parse a bare `<letters><digits>` reference
///
/// Returns `None` for anything else, including absolute (`$A$1`) forms and
/// row 0. Column letters are case-insensitive.
pub fn parse_reference(reference: &str) -> Option<CellAddress> {
    if !regex_is_match!(r"^[A-Za-z]+[0-9]+$", reference) {
        return None;
    }
    CellAddress::parse(reference).ok()
}

/// Read one cell, with numeric-preferring coercion
///
/// `None` when the position lies outside the dataset.
pub fn cell_value(address: CellAddress, dataset: &Dataset) -> Option<FormulaValue> {
    dataset
        .value_at(address.row, address.col)
        .map(FormulaValue::from_cell)
}

/// Resolve a reference string and read the cell
///
/// `None` when the reference does not parse or points outside the dataset.
pub fn get_cell_value(reference: &str, dataset: &Dataset) -> Option<FormulaValue> {
    parse_reference(reference).and_then(|address| cell_value(address, dataset))
}

/// Outcome of resolving a range string
#[derive(Debug, Clone, PartialEq)]
pub enum RangeResolution {
    /// The in-bounds cells of the rectangle, row-major, `columns` wide
    Cells {
        values: Vec<FormulaValue>,
        columns: usize,
    },
    /// An endpoint did not parse as a reference
    Malformed,
}

impl RangeResolution {
    /// Convert into a function argument (malformed ranges become empty)
    pub fn into_argument(self) -> Argument {
        match self {
            RangeResolution::Cells { values, columns } => Argument::range(values, columns),
            RangeResolution::Malformed => Argument::range(Vec::new(), 0),
        }
    }

    /// The resolved values (malformed ranges yield none)
    pub fn into_values(self) -> Vec<FormulaValue> {
        match self {
            RangeResolution::Cells { values, .. } => values,
            RangeResolution::Malformed => Vec::new(),
        }
    }
}

/// Resolve a range string such as `A1:B3`
///
/// Input without `:` is a single reference and yields exactly one value
/// (empty when it does not resolve). Only the first two `:`-separated parts
/// are used.
pub fn resolve_range(range: &str, dataset: &Dataset) -> RangeResolution {
    if !range.contains(':') {
        let value = get_cell_value(range.trim(), dataset).unwrap_or(FormulaValue::Empty);
        return RangeResolution::Cells {
            values: vec![value],
            columns: 1,
        };
    }

    match parse_range_endpoints(range) {
        Some(range) => resolve_addresses(range.start, range.end, dataset),
        None => {
            debug!(range, "malformed range resolves to no cells");
            RangeResolution::Malformed
        }
    }
}

/// Parse the two endpoints of `start:end`
///
/// Only the first two `:`-separated parts are used; surrounding whitespace
/// is ignored.
pub fn parse_range_endpoints(range: &str) -> Option<CellRange> {
    let (start, rest) = range.split_once(':')?;
    let end = rest.split(':').next().unwrap_or_default();
    CellRange::parse(&format!("{}:{}", start.trim(), end.trim())).ok()
}

/// Resolve the rectangle spanned by two addresses
///
/// Cells outside the dataset are left out; `columns` counts the in-bounds
/// columns.
pub fn resolve_addresses(start: CellAddress, end: CellAddress, dataset: &Dataset) -> RangeResolution {
    let Some(visible) =
        CellRange::new(start, end).clip(dataset.row_count(), dataset.column_count())
    else {
        return RangeResolution::Cells {
            values: Vec::new(),
            columns: 0,
        };
    };

    let mut values = Vec::with_capacity(visible.row_count() * visible.col_count());
    values.extend(visible.cells().filter_map(|address| cell_value(address, dataset)));

    RangeResolution::Cells {
        values,
        columns: visible.col_count(),
    }
}

/// Expand a range string into its values
///
/// Malformed ranges expand to nothing.
pub fn parse_range(range: &str, dataset: &Dataset) -> Vec<FormulaValue> {
    resolve_range(range, dataset).into_values()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindgrid_core::{CellError, ColumnDef, ColumnKind, Row};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn dataset() -> Dataset {
        Dataset::new(vec![
            ColumnDef::new("a", ColumnKind::Number),
            ColumnDef::new("b", ColumnKind::Text),
            ColumnDef::new("c", ColumnKind::Tags),
        ])
        .unwrap()
        .with_rows(vec![
            Row::new().with("a", 3.0).with("b", "x"),
            Row::new().with("a", "x").with("b", " 12 ").with("c", vec!["red".to_string()]),
            Row::new().with("a", 4.0).with("b", "#DIV/0!"),
        ])
    }

    #[test]
    fn test_parse_reference() {
        assert_eq!(parse_reference("A1"), Some(CellAddress::new(0, 0)));
        assert_eq!(parse_reference("ab12"), Some(CellAddress::new(11, 27)));
        assert_eq!(parse_reference("$A$1"), None);
        assert_eq!(parse_reference("A"), None);
        assert_eq!(parse_reference("1A"), None);
        assert_eq!(parse_reference("A0"), None);
        assert_eq!(parse_reference(" A1"), None);
    }

    #[test]
    fn test_get_cell_value() {
        let ds = dataset();
        assert_eq!(get_cell_value("A1", &ds), Some(FormulaValue::Number(3.0)));
        assert_eq!(get_cell_value("B2", &ds), Some(FormulaValue::Number(12.0)));
        assert_eq!(get_cell_value("A2", &ds), Some(FormulaValue::String("x".into())));
        assert_eq!(
            get_cell_value("C2", &ds),
            Some(FormulaValue::List(vec!["red".into()]))
        );
        assert_eq!(get_cell_value("C1", &ds), Some(FormulaValue::Empty));
        assert_eq!(
            get_cell_value("B3", &ds),
            Some(FormulaValue::Error(CellError::Div0))
        );
        assert_eq!(get_cell_value("A4", &ds), None);
        assert_eq!(get_cell_value("D1", &ds), None);
        assert_eq!(get_cell_value("nope", &ds), None);
    }

    #[test]
    fn test_range_row_major() {
        let ds = dataset();
        assert_eq!(
            parse_range("A1:B2", &ds),
            vec![
                FormulaValue::Number(3.0),
                FormulaValue::String("x".into()),
                FormulaValue::String("x".into()),
                FormulaValue::Number(12.0),
            ]
        );
        // reversed corners cover the same rectangle
        assert_eq!(parse_range("B2:A1", &ds), parse_range("A1:B2", &ds));
    }

    #[test]
    fn test_range_skips_out_of_bounds() {
        let ds = dataset();
        match resolve_range("B3:E9", &ds) {
            RangeResolution::Cells { values, columns } => {
                assert_eq!(columns, 2);
                assert_eq!(
                    values,
                    vec![FormulaValue::Error(CellError::Div0), FormulaValue::Empty]
                );
            }
            RangeResolution::Malformed => panic!("expected cells"),
        }
    }

    #[test]
    fn test_single_cell_range() {
        let ds = dataset();
        assert_eq!(
            parse_range("A1:A1", &ds),
            vec![get_cell_value("A1", &ds).unwrap()]
        );
        assert_eq!(parse_range("A3", &ds), vec![FormulaValue::Number(4.0)]);
        assert_eq!(parse_range("Z99", &ds), vec![FormulaValue::Empty]);
    }

    #[test]
    fn test_malformed_range() {
        let ds = dataset();
        assert_eq!(resolve_range("A1:??", &ds), RangeResolution::Malformed);
        assert_eq!(resolve_range(":B2", &ds), RangeResolution::Malformed);
        assert!(parse_range("A1:$B$2", &ds).is_empty());
        assert_eq!(resolve_range("A1:", &ds), RangeResolution::Malformed);
    }

    #[test]
    fn test_extra_endpoints_ignored() {
        let ds = dataset();
        assert_eq!(parse_range("A1:A2:C3", &ds), parse_range("A1:A2", &ds));
        assert_eq!(parse_range(" A1 : a2 ", &ds), parse_range("A1:A2", &ds));
    }

    #[test]
    fn test_range_entirely_outside() {
        let ds = dataset();
        assert_eq!(
            resolve_range("D1:E2", &ds),
            RangeResolution::Cells {
                values: Vec::new(),
                columns: 0
            }
        );
        assert!(parse_range("A9:C12", &ds).is_empty());
    }

    proptest! {
        #[test]
        fn prop_reference_round_trip(row in 0usize..10_000, col in 0usize..5_000) {
            let address = CellAddress::new(row, col);
            prop_assert_eq!(parse_reference(&address.to_a1_string()), Some(address));
        }
    }
}
