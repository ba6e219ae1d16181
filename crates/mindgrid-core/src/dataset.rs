//! Dataset type: the ordered rows and columns behind the table view

use crate::cell::{CellAddress, CellValue};
use crate::column::ColumnDef;
use crate::error::{Error, Result};
use crate::row::Row;

/// Ordered column definitions plus ordered row records
///
/// Row `i` is spreadsheet row `i + 1`; column `j` is lettered by its position.
/// Every mutation bumps [`Dataset::version`], so a version number identifies
/// one snapshot of the data.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dataset {
    columns: Vec<ColumnDef>,
    #[cfg_attr(feature = "serde", serde(default))]
    rows: Vec<Row>,
    #[cfg_attr(feature = "serde", serde(skip))]
    version: u64,
}

impl Dataset {
    /// Create an empty dataset with the given columns
    ///
    /// Fails if two columns share an id.
    pub fn new(columns: Vec<ColumnDef>) -> Result<Self> {
        let mut dataset = Self::default();
        for column in columns {
            dataset.add_column(column)?;
        }
        dataset.version = 0;
        Ok(dataset)
    }

    /// Replace the rows, builder-style
    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = rows;
        self.version += 1;
        self
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Monotonic mutation counter
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Column definition at a position
    pub fn column(&self, col: usize) -> Option<&ColumnDef> {
        self.columns.get(col)
    }

    /// Position of a column by id
    pub fn column_index(&self, id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id == id)
    }

    pub fn row(&self, row: usize) -> Option<&Row> {
        self.rows.get(row)
    }

    /// Raw value at a position
    ///
    /// `None` when the position is outside the dataset; absent keys inside
    /// the dataset read as [`CellValue::Null`].
    pub fn value_at(&self, row: usize, col: usize) -> Option<&CellValue> {
        let column = self.columns.get(col)?;
        let record = self.rows.get(row)?;
        Some(record.get(&column.id).unwrap_or(&CellValue::Null))
    }

    /// Raw value at an A1-style address
    pub fn value(&self, address: &str) -> Result<Option<&CellValue>> {
        let addr = CellAddress::parse(address)?;
        Ok(self.value_at(addr.row, addr.col))
    }

    /// Append a column; its letter is the next one after the current last
    pub fn add_column(&mut self, column: ColumnDef) -> Result<()> {
        if self.column_index(&column.id).is_some() {
            return Err(Error::DuplicateColumn(column.id));
        }
        self.columns.push(column);
        self.version += 1;
        Ok(())
    }

    /// Append a row record
    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
        self.version += 1;
    }

    /// Store a value at a position, ignoring the editable flag
    pub fn set_value_at<V: Into<CellValue>>(&mut self, row: usize, col: usize, value: V) -> Result<()> {
        let rows = self.rows.len();
        let columns = self.columns.len();
        let column = self
            .columns
            .get(col)
            .ok_or(Error::ColumnOutOfBounds(col, columns))?;
        let record = self
            .rows
            .get_mut(row)
            .ok_or(Error::RowOutOfBounds(row, rows))?;
        record.set(column.id.clone(), value);
        self.version += 1;
        Ok(())
    }

    /// Store a value at an A1-style address, ignoring the editable flag
    pub fn set_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_value_at(addr.row, addr.col, value)
    }

    /// A user edit: store a value under a column id, honoring the editable flag
    pub fn edit_cell<V: Into<CellValue>>(
        &mut self,
        row: usize,
        column_id: &str,
        value: V,
    ) -> Result<()> {
        let col = self
            .column_index(column_id)
            .ok_or_else(|| Error::ColumnNotFound(column_id.to_string()))?;
        if !self.columns[col].editable {
            return Err(Error::ReadOnlyColumn(column_id.to_string()));
        }
        self.set_value_at(row, col, value)
    }
}
