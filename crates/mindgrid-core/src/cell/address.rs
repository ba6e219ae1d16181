//! Cell address and range types

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A cell address (e.g., "A1", "AB12")
///
/// Columns are identified by their position in the column list, lettered with
/// bijective base-26 (A..Z, AA..AZ, BA..). Rows are the position in the row
/// list. Both indices are 0-based internally and 1-based in display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    /// Row index (0-based internally, 1-based in display)
    pub row: usize,
    /// Column index (0-based, A=0, B=1, ..., Z=25, AA=26)
    pub col: usize,
}

impl CellAddress {
    /// Create a new cell address
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Parse a cell address from A1-style notation
    ///
    /// The whole input must be letters followed by digits; surrounding
    /// whitespace and `$` markers are rejected.
    ///
    /// # Examples
    /// ```
    /// use mindgrid_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("A1").unwrap();
    /// assert_eq!(addr.row, 0);
    /// assert_eq!(addr.col, 0);
    ///
    /// let addr = CellAddress::parse("ab12").unwrap();
    /// assert_eq!(addr.row, 11);
    /// assert_eq!(addr.col, 27);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let digits_at = s
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(s.len());

        if digits_at == 0 {
            return Err(Error::InvalidAddress(format!(
                "no column letters in '{}'",
                s
            )));
        }

        let col = Self::letters_to_column(&s[..digits_at])?;

        let row_str = &s[digits_at..];
        if row_str.is_empty() {
            return Err(Error::InvalidAddress(format!("no row number in '{}'", s)));
        }
        if !row_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidAddress(format!(
                "invalid row number in '{}'",
                s
            )));
        }

        let row: usize = row_str
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("row number too large in '{}'", s)))?;

        // Rows are 1-based in A1 notation
        if row == 0 {
            return Err(Error::InvalidAddress(format!(
                "row number must be >= 1 in '{}'",
                s
            )));
        }

        Ok(Self { row: row - 1, col })
    }

    /// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
    pub fn column_to_letters(col: usize) -> String {
        let mut result = String::new();
        let mut n = col + 1;

        while n > 0 {
            n -= 1;
            let c = ((n % 26) as u8 + b'A') as char;
            result.insert(0, c);
            n /= 26;
        }

        result
    }

    /// Convert column letters to index (A = 0, Z = 25, AA = 26, etc.)
    pub fn letters_to_column(letters: &str) -> Result<usize> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress("empty column letters".into()));
        }

        let mut col: usize = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidAddress(format!(
                    "invalid column letter '{}'",
                    c
                )));
            }
            let digit = (c.to_ascii_uppercase() as usize) - ('A' as usize) + 1;
            col = col
                .checked_mul(26)
                .and_then(|v| v.checked_add(digit))
                .ok_or_else(|| Error::InvalidAddress(format!("column too large: {}", letters)))?;
        }

        Ok(col - 1)
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        format!("{}{}", Self::column_to_letters(self.col), self.row + 1)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A rectangular range between two cell addresses (e.g., "A1:C5")
///
/// `start` is always the top-left corner and `end` the bottom-right corner,
/// whatever order the endpoints were written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    pub start: CellAddress,
    pub end: CellAddress,
}

impl CellRange {
    /// Create a range from two corners in any order
    pub fn new(a: CellAddress, b: CellAddress) -> Self {
        Self {
            start: CellAddress::new(a.row.min(b.row), a.col.min(b.col)),
            end: CellAddress::new(a.row.max(b.row), a.col.max(b.col)),
        }
    }

    /// Parse an A1:B2-style range. A single address is a one-cell range.
    pub fn parse(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some((a, b)) => {
                let start = CellAddress::parse(a.trim())
                    .map_err(|e| Error::InvalidRange(format!("{}: {}", s, e)))?;
                let end = CellAddress::parse(b.trim())
                    .map_err(|e| Error::InvalidRange(format!("{}: {}", s, e)))?;
                Ok(Self::new(start, end))
            }
            None => {
                let addr = CellAddress::parse(s.trim())?;
                Ok(Self::new(addr, addr))
            }
        }
    }

    /// The part of this range inside a grid of `rows` by `cols` from A1
    ///
    /// `None` when nothing overlaps.
    pub fn clip(&self, rows: usize, cols: usize) -> Option<CellRange> {
        if self.start.row >= rows || self.start.col >= cols {
            return None;
        }
        Some(CellRange {
            start: self.start,
            end: CellAddress::new(self.end.row.min(rows - 1), self.end.col.min(cols - 1)),
        })
    }

    /// Number of rows spanned
    pub fn row_count(&self) -> usize {
        self.end.row - self.start.row + 1
    }

    /// Number of columns spanned
    pub fn col_count(&self) -> usize {
        self.end.col - self.start.col + 1
    }

    /// Iterate over all cell addresses in the range (row by row)
    pub fn cells(&self) -> CellRangeIterator {
        CellRangeIterator {
            range: *self,
            current_row: self.start.row,
            current_col: self.start.col,
        }
    }

    /// Format as A1:B10 string
    pub fn to_a1_string(&self) -> String {
        if self.start == self.end {
            self.start.to_a1_string()
        } else {
            format!("{}:{}", self.start.to_a1_string(), self.end.to_a1_string())
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Row-major iterator over cells in a range
pub struct CellRangeIterator {
    range: CellRange,
    current_row: usize,
    current_col: usize,
}

impl Iterator for CellRangeIterator {
    type Item = CellAddress;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_row > self.range.end.row {
            return None;
        }

        let addr = CellAddress::new(self.current_row, self.current_col);

        self.current_col += 1;
        if self.current_col > self.range.end.col {
            self.current_col = self.range.start.col;
            self.current_row += 1;
        }

        Some(addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_column_to_letters() {
        assert_eq!(CellAddress::column_to_letters(0), "A");
        assert_eq!(CellAddress::column_to_letters(1), "B");
        assert_eq!(CellAddress::column_to_letters(25), "Z");
        assert_eq!(CellAddress::column_to_letters(26), "AA");
        assert_eq!(CellAddress::column_to_letters(27), "AB");
        assert_eq!(CellAddress::column_to_letters(52), "BA");
        assert_eq!(CellAddress::column_to_letters(701), "ZZ");
        assert_eq!(CellAddress::column_to_letters(702), "AAA");
    }

    #[test]
    fn test_letters_to_column() {
        assert_eq!(CellAddress::letters_to_column("A").unwrap(), 0);
        assert_eq!(CellAddress::letters_to_column("Z").unwrap(), 25);
        assert_eq!(CellAddress::letters_to_column("AA").unwrap(), 26);
        assert_eq!(CellAddress::letters_to_column("AB").unwrap(), 27);
        assert_eq!(CellAddress::letters_to_column("BA").unwrap(), 52);
        assert_eq!(CellAddress::letters_to_column("ZZ").unwrap(), 701);

        // Case insensitive
        assert_eq!(CellAddress::letters_to_column("a").unwrap(), 0);
        assert_eq!(CellAddress::letters_to_column("aA").unwrap(), 26);

        assert!(CellAddress::letters_to_column("").is_err());
        assert!(CellAddress::letters_to_column("A1").is_err());
        assert!(CellAddress::letters_to_column(&"Z".repeat(40)).is_err());
    }

    #[test]
    fn test_cell_address_parse() {
        assert_eq!(CellAddress::parse("A1").unwrap(), CellAddress::new(0, 0));
        assert_eq!(CellAddress::parse("B3").unwrap(), CellAddress::new(2, 1));
        assert_eq!(CellAddress::parse("aa10").unwrap(), CellAddress::new(9, 26));
    }

    #[test]
    fn test_cell_address_parse_errors() {
        assert!(CellAddress::parse("").is_err());
        assert!(CellAddress::parse("A").is_err());
        assert!(CellAddress::parse("1").is_err());
        assert!(CellAddress::parse("A0").is_err());
        assert!(CellAddress::parse("$A$1").is_err());
        assert!(CellAddress::parse("A1B").is_err());
        assert!(CellAddress::parse(" A1").is_err());
        assert!(CellAddress::parse("A99999999999999999999999").is_err());
    }

    #[test]
    fn test_cell_address_display() {
        assert_eq!(CellAddress::new(0, 0).to_string(), "A1");
        assert_eq!(CellAddress::new(99, 2).to_string(), "C100");
        assert_eq!(CellAddress::new(4, 26).to_string(), "AA5");
    }

    #[test]
    fn test_range_normalizes_corners() {
        let range = CellRange::parse("C5:A1").unwrap();
        assert_eq!(range.start, CellAddress::new(0, 0));
        assert_eq!(range.end, CellAddress::new(4, 2));
        assert_eq!(range.row_count(), 5);
        assert_eq!(range.col_count(), 3);
        assert_eq!(range.to_string(), "A1:C5");
    }

    #[test]
    fn test_range_cells_row_major() {
        let range = CellRange::parse("A1:B2").unwrap();
        let cells: Vec<String> = range.cells().map(|a| a.to_string()).collect();
        assert_eq!(cells, vec!["A1", "B1", "A2", "B2"]);
    }

    #[test]
    fn test_range_clip() {
        let range = CellRange::parse("B2:E9").unwrap();
        let clipped = range.clip(4, 3).unwrap();
        assert_eq!(clipped.to_string(), "B2:C4");
        assert_eq!(clipped.cells().count(), clipped.row_count() * clipped.col_count());
        assert_eq!(range.clip(20, 20), Some(range));
        assert_eq!(range.clip(1, 3), None);
        assert_eq!(range.clip(4, 1), None);
        assert_eq!(range.clip(0, 0), None);
    }

    #[test]
    fn test_single_cell_range() {
        let range = CellRange::parse("B2").unwrap();
        assert_eq!(range.start, range.end);
        assert_eq!(range.to_string(), "B2");
        assert!(CellRange::parse("A1:").is_err());
    }

    proptest! {
        #[test]
        fn column_letters_round_trip(col in 0usize..100_000) {
            let letters = CellAddress::column_to_letters(col);
            prop_assert!(letters.chars().all(|c| c.is_ascii_uppercase()));
            prop_assert_eq!(CellAddress::letters_to_column(&letters).unwrap(), col);
        }

        #[test]
        fn address_round_trip(row in 0usize..1_000_000, col in 0usize..20_000) {
            let addr = CellAddress::new(row, col);
            prop_assert_eq!(CellAddress::parse(&addr.to_a1_string()).unwrap(), addr);
            prop_assert_eq!(
                CellAddress::parse(&addr.to_a1_string().to_lowercase()).unwrap(),
                addr
            );
        }
    }
}
