//! Column definitions

use std::fmt;

/// Kind of values a column holds
///
/// Only the formatter cares about the kind; formulas may live in any column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum ColumnKind {
    #[default]
    Text,
    Number,
    Date,
    Select,
    Tags,
    Relationship,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Text => "text",
            ColumnKind::Number => "number",
            ColumnKind::Date => "date",
            ColumnKind::Select => "select",
            ColumnKind::Tags => "tags",
            ColumnKind::Relationship => "relationship",
        }
    }

    /// Parse a kind name, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "text" => Some(ColumnKind::Text),
            "number" => Some(ColumnKind::Number),
            "date" => Some(ColumnKind::Date),
            "select" => Some(ColumnKind::Select),
            "tags" => Some(ColumnKind::Tags),
            "relationship" => Some(ColumnKind::Relationship),
            _ => None,
        }
    }

    /// Whether values of this kind are lists of strings
    pub fn is_list(&self) -> bool {
        matches!(self, ColumnKind::Tags | ColumnKind::Relationship)
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column metadata
///
/// The position of a definition in the dataset's column list, not its id,
/// decides its spreadsheet letter.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnDef {
    /// Key under which row records store this column's value
    pub id: String,
    /// Display label
    pub label: String,
    /// Value kind
    #[cfg_attr(feature = "serde", serde(rename = "type", default))]
    pub kind: ColumnKind,
    /// Whether users may edit cells in this column
    #[cfg_attr(feature = "serde", serde(default = "default_editable"))]
    pub editable: bool,
}

#[cfg(feature = "serde")]
fn default_editable() -> bool {
    true
}

impl ColumnDef {
    /// Create an editable column whose label equals its id
    pub fn new<S: Into<String>>(id: S, kind: ColumnKind) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            kind,
            editable: true,
        }
    }

    /// Set the display label
    pub fn with_label<S: Into<String>>(mut self, label: S) -> Self {
        self.label = label.into();
        self
    }

    /// Mark the column read-only
    pub fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }
}
