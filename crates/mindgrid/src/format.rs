//! Display formatting
//!
//! Turns stored cell values into the strings the table view shows. Formula
//! cells are evaluated on the fly; everything else is shown per column kind.

use crate::cache::EvaluationCache;
use chrono::NaiveTime;
use mindgrid_core::{format_number, CellValue, ColumnKind, Dataset};
use mindgrid_formula::functions::date::parse_datetime;
use mindgrid_formula::{evaluate_with, EvaluationOptions, FormulaValue};

/// Options for display formatting
#[derive(Debug, Clone, PartialEq)]
pub struct FormatOptions {
    /// Fixed decimals for numbers in number columns (`None` = shortest form)
    pub decimal_places: Option<usize>,
    /// Separator between items of tag and relationship lists
    pub list_separator: String,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            decimal_places: None,
            list_separator: ", ".to_string(),
        }
    }
}

impl FormatOptions {
    pub fn with_decimal_places(mut self, places: usize) -> Self {
        self.decimal_places = Some(places);
        self
    }

    pub fn with_list_separator<S: Into<String>>(mut self, separator: S) -> Self {
        self.list_separator = separator.into();
        self
    }
}

/// Formatter for evaluated and literal cell values
#[derive(Debug, Clone, Default)]
pub struct Formatter {
    options: FormatOptions,
    evaluation: EvaluationOptions,
}

impl Formatter {
    pub fn new(options: FormatOptions) -> Self {
        Self {
            options,
            evaluation: EvaluationOptions::default(),
        }
    }

    /// Use these options when evaluating formula cells
    pub fn with_evaluation_options(mut self, evaluation: EvaluationOptions) -> Self {
        self.evaluation = evaluation;
        self
    }

    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    pub fn evaluation_options(&self) -> &EvaluationOptions {
        &self.evaluation
    }

    /// Format an evaluation result for a column of `kind`
    pub fn format_value(&self, value: &FormulaValue, kind: ColumnKind) -> String {
        match value {
            FormulaValue::Number(n) => self.format_number(*n, kind),
            FormulaValue::String(s) if kind == ColumnKind::Date => format_date(s),
            FormulaValue::List(items) => items.join(&self.options.list_separator),
            other => other.as_string(),
        }
    }

    /// Format a stored value that is not a formula
    pub fn format_literal(&self, value: &CellValue, kind: ColumnKind) -> String {
        match value {
            CellValue::Null => String::new(),
            CellValue::Number(n) => self.format_number(*n, kind),
            CellValue::Text(s) if kind == ColumnKind::Date => format_date(s),
            CellValue::Text(s) => s.clone(),
            CellValue::List(items) => items.join(&self.options.list_separator),
        }
    }

    /// Display string of one cell, evaluating it if it holds a formula
    ///
    /// Cells outside the dataset render as empty.
    pub fn render_cell(&self, dataset: &Dataset, row: usize, col: usize) -> String {
        self.render_with(dataset, row, col, |formula| {
            evaluate_with(formula, dataset, &self.evaluation)
        })
    }

    /// Like [`Formatter::render_cell`], reusing results held by `cache`
    pub fn render_cell_cached(
        &self,
        dataset: &Dataset,
        row: usize,
        col: usize,
        cache: &mut EvaluationCache,
    ) -> String {
        self.render_with(dataset, row, col, |formula| {
            cache.evaluate(formula, dataset, &self.evaluation)
        })
    }

    /// Display grid of the whole dataset, row-major
    pub fn render_dataset(&self, dataset: &Dataset) -> Vec<Vec<String>> {
        (0..dataset.row_count())
            .map(|row| {
                (0..dataset.column_count())
                    .map(|col| self.render_cell(dataset, row, col))
                    .collect()
            })
            .collect()
    }

    /// Display grid of the whole dataset, sharing evaluations through `cache`
    pub fn render_dataset_cached(
        &self,
        dataset: &Dataset,
        cache: &mut EvaluationCache,
    ) -> Vec<Vec<String>> {
        (0..dataset.row_count())
            .map(|row| {
                (0..dataset.column_count())
                    .map(|col| self.render_cell_cached(dataset, row, col, cache))
                    .collect()
            })
            .collect()
    }

    fn render_with(
        &self,
        dataset: &Dataset,
        row: usize,
        col: usize,
        mut evaluate: impl FnMut(&str) -> FormulaValue,
    ) -> String {
        let Some(column) = dataset.column(col) else {
            return String::new();
        };
        let Some(value) = dataset.value_at(row, col) else {
            return String::new();
        };

        match value.as_formula() {
            Some(formula) => self.format_value(&evaluate(formula), column.kind),
            None => self.format_literal(value, column.kind),
        }
    }

    fn format_number(&self, n: f64, kind: ColumnKind) -> String {
        match (kind, self.options.decimal_places) {
            (ColumnKind::Number, Some(places)) if n.is_finite() => format!("{:.*}", places, n),
            _ => format_number(n),
        }
    }
}

/// Dates show as `YYYY-MM-DD`, with `HH:MM` when a time of day is present
fn format_date(s: &str) -> String {
    match parse_datetime(s) {
        Some(dt) if dt.time() == NaiveTime::MIN => dt.format("%Y-%m-%d").to_string(),
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => s.to_string(),
    }
}

/// Format an evaluation result with default options
pub fn format_value(value: &FormulaValue, kind: ColumnKind, options: &FormatOptions) -> String {
    Formatter::new(options.clone()).format_value(value, kind)
}

/// Display string of one cell with default options
pub fn render_cell(dataset: &Dataset, row: usize, col: usize) -> String {
    Formatter::default().render_cell(dataset, row, col)
}

/// Display grid of a dataset with default options
pub fn render_dataset(dataset: &Dataset) -> Vec<Vec<String>> {
    Formatter::default().render_dataset(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindgrid_core::{CellError, ColumnDef, Row};
    use pretty_assertions::assert_eq;

    fn dataset() -> Dataset {
        Dataset::new(vec![
            ColumnDef::new("task", ColumnKind::Text),
            ColumnDef::new("hours", ColumnKind::Number),
            ColumnDef::new("due", ColumnKind::Date),
            ColumnDef::new("tags", ColumnKind::Tags),
        ])
        .unwrap()
        .with_rows(vec![
            Row::new()
                .with("task", "Design")
                .with("hours", 4.0)
                .with("due", "2024-03-01")
                .with("tags", vec!["ui".to_string(), "urgent".to_string()]),
            Row::new()
                .with("task", "Build")
                .with("hours", 2.5)
                .with("due", "2024-03-08T14:30:00"),
            Row::new()
                .with("task", "=UPPER(A1)")
                .with("hours", "=SUM(B1:B2)")
                .with("due", "=TODAY()"),
        ])
    }

    #[test]
    fn test_format_value_by_kind() {
        let options = FormatOptions::default();
        assert_eq!(format_value(&FormulaValue::Number(6.5), ColumnKind::Number, &options), "6.5");
        assert_eq!(format_value(&FormulaValue::Number(7.0), ColumnKind::Text, &options), "7");
        assert_eq!(format_value(&FormulaValue::Boolean(true), ColumnKind::Text, &options), "TRUE");
        assert_eq!(
            format_value(&FormulaValue::Error(CellError::Div0), ColumnKind::Number, &options),
            "#DIV/0!"
        );
        assert_eq!(
            format_value(
                &FormulaValue::List(vec!["a".into(), "b".into()]),
                ColumnKind::Tags,
                &options
            ),
            "a, b"
        );
        assert_eq!(format_value(&FormulaValue::Empty, ColumnKind::Date, &options), "");
    }

    #[test]
    fn test_decimal_places_only_for_number_columns() {
        let options = FormatOptions::default().with_decimal_places(2);
        assert_eq!(format_value(&FormulaValue::Number(6.5), ColumnKind::Number, &options), "6.50");
        assert_eq!(format_value(&FormulaValue::Number(6.5), ColumnKind::Text, &options), "6.5");
    }

    #[test]
    fn test_render_literals() {
        let ds = dataset();
        assert_eq!(render_cell(&ds, 0, 0), "Design");
        assert_eq!(render_cell(&ds, 0, 1), "4");
        assert_eq!(render_cell(&ds, 0, 2), "2024-03-01");
        assert_eq!(render_cell(&ds, 1, 2), "2024-03-08 14:30");
        assert_eq!(render_cell(&ds, 0, 3), "ui, urgent");
        assert_eq!(render_cell(&ds, 1, 3), "");
        assert_eq!(render_cell(&ds, 9, 0), "");
        assert_eq!(render_cell(&ds, 0, 9), "");
    }

    #[test]
    fn test_render_formulas() {
        let ds = dataset();
        let pinned = EvaluationOptions::default().with_now(
            chrono::NaiveDate::from_ymd_opt(2024, 3, 5)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        );
        let formatter = Formatter::new(FormatOptions::default().with_list_separator(" | "))
            .with_evaluation_options(pinned);

        assert_eq!(formatter.render_cell(&ds, 2, 0), "DESIGN");
        assert_eq!(formatter.render_cell(&ds, 2, 1), "6.5");
        assert_eq!(formatter.render_cell(&ds, 2, 2), "2024-03-05");
        assert_eq!(formatter.render_cell(&ds, 0, 3), "ui | urgent");
    }

    #[test]
    fn test_render_dataset_shape() {
        let ds = dataset();
        let grid = render_dataset(&ds);
        assert_eq!(grid.len(), 3);
        assert!(grid.iter().all(|row| row.len() == 4));
        assert_eq!(grid[2][1], "6.5");
    }
}
