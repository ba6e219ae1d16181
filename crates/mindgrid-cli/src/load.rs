//! Dataset loading and grid output

use anyhow::{bail, Context, Result};
use mindgrid::{CellValue, ColumnDef, ColumnKind, Dataset, Row};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

/// Separator between items of list cells in CSV input
pub const LIST_SEPARATOR: char = ';';

/// Options for reading CSV datasets
#[derive(Debug, Clone)]
pub struct CsvLoadOptions {
    /// Field delimiter (default: comma)
    pub delimiter: u8,
    /// Whether the first record names the columns
    ///
    /// Without a header, columns are named `a`, `b`, ... by position.
    pub has_header: bool,
}

impl Default for CsvLoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
        }
    }
}

/// Load a dataset, picking the format from the file extension
///
/// `.json` files hold `{"columns": [...], "rows": [...]}`; anything else is
/// read as CSV.
pub fn load_dataset(path: &Path, options: &CsvLoadOptions) -> Result<Dataset> {
    let file = File::open(path).with_context(|| format!("Failed to open '{}'", path.display()))?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    let dataset = match extension.as_deref() {
        Some("json") => read_json(file),
        _ => read_csv(file, options),
    }
    .with_context(|| format!("Failed to read dataset '{}'", path.display()))?;

    debug!(
        path = %path.display(),
        rows = dataset.row_count(),
        columns = dataset.column_count(),
        "dataset loaded"
    );
    Ok(dataset)
}

/// Read a JSON dataset
pub fn read_json<R: Read>(reader: R) -> Result<Dataset> {
    let parsed: Dataset = serde_json::from_reader(reader).context("Invalid dataset JSON")?;

    // rebuild to reject duplicate column ids
    let dataset = Dataset::new(parsed.columns().to_vec())?.with_rows(parsed.rows().to_vec());
    Ok(dataset)
}

/// Read a CSV dataset
///
/// A header field may carry a column kind after a colon (`hours:number`).
/// Empty fields are absent values, numeric fields are numbers, and fields
/// of list columns split on [`LIST_SEPARATOR`].
pub fn read_csv<R: Read>(reader: R, options: &CsvLoadOptions) -> Result<Dataset> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(options.has_header)
        .flexible(true)
        .from_reader(reader);

    let mut columns: Vec<ColumnDef> = Vec::new();
    if options.has_header {
        for field in csv_reader.headers().context("Failed to read CSV header")?.iter() {
            columns.push(parse_header(field)?);
        }
    }

    let mut rows = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read CSV record {}", index + 1))?;

        while columns.len() < record.len() {
            let id = mindgrid::CellAddress::column_to_letters(columns.len()).to_lowercase();
            columns.push(ColumnDef::new(id, ColumnKind::Text));
        }

        let mut row = Row::new();
        for (field, column) in record.iter().zip(&columns) {
            let value = parse_field(field, column.kind);
            if !value.is_null() {
                row.set(column.id.clone(), value);
            }
        }
        rows.push(row);
    }

    Ok(Dataset::new(columns)?.with_rows(rows))
}

fn parse_header(field: &str) -> Result<ColumnDef> {
    let field = field.trim();
    match field.rsplit_once(':') {
        Some((id, kind)) => {
            let Some(kind) = ColumnKind::from_name(kind) else {
                bail!("Unknown column type '{}' in header '{}'", kind, field);
            };
            Ok(ColumnDef::new(id.trim(), kind))
        }
        None => Ok(ColumnDef::new(field, ColumnKind::Text)),
    }
}

fn parse_field(field: &str, kind: ColumnKind) -> CellValue {
    if field.trim().is_empty() {
        return CellValue::Null;
    }
    if kind.is_list() {
        return CellValue::List(
            field
                .split(LIST_SEPARATOR)
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
        );
    }
    if kind == ColumnKind::Number {
        if let Some(n) = mindgrid::parse_finite(field) {
            return CellValue::Number(n);
        }
    }
    CellValue::Text(field.to_string())
}

/// Write a rendered grid as CSV, with column ids as the header
pub fn write_grid<W: Write>(
    writer: W,
    dataset: &Dataset,
    grid: &[Vec<String>],
    delimiter: u8,
) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    csv_writer
        .write_record(dataset.columns().iter().map(|c| c.id.as_str()))
        .context("Failed to write CSV header")?;
    for row in grid {
        csv_writer.write_record(row).context("Failed to write CSV record")?;
    }
    csv_writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}
