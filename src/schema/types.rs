// src/schema/types.rs

use serde::{Deserialize, Serialize};

/// Leading columns every normalized table carries, ahead of the schema fields.
pub const YEAR_COLUMN: &str = "Year";
pub const CATEGORY_COLUMN: &str = "Category";

/// How rows of one category are laid out.
///
/// `Fixed` comes from configuration for a known category; `Generic` is
/// synthesized from the widest row observed in the group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Schema {
    Fixed { label: String, fields: Vec<String> },
    Generic { label: String, width: usize },
}

impl Schema {
    /// Value written into the `Category` column.
    pub fn label(&self) -> &str {
        match self {
            Schema::Fixed { label, .. } | Schema::Generic { label, .. } => label,
        }
    }

    /// Number of data fields a row is projected onto.
    pub fn width(&self) -> usize {
        match self {
            Schema::Fixed { fields, .. } => fields.len(),
            Schema::Generic { width, .. } => *width,
        }
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self, Schema::Fixed { .. })
    }

    /// Data field names, without the leading year/category columns.
    pub fn fields(&self) -> Vec<String> {
        match self {
            Schema::Fixed { fields, .. } => fields.clone(),
            Schema::Generic { width, .. } => (1..=*width).map(|i| format!("Col{}", i)).collect(),
        }
    }

    /// Full header of the emitted table.
    pub fn columns(&self) -> Vec<String> {
        let mut cols = Vec::with_capacity(self.width() + 2);
        cols.push(YEAR_COLUMN.to_string());
        cols.push(CATEGORY_COLUMN.to_string());
        cols.extend(self.fields());
        cols
    }
}

/// Declared type of a column once the numeric normalizer has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }
}

/// A single named, typed column.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Eq, Hash)]
pub struct Column {
    pub name: String,
    pub ty: ColumnType,
}
