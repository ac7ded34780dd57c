use crate::schema::Schema;

/// One projected record: the year and category label it belongs to, then one
/// string per schema field. Missing trailing fields are `""`, never absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRow {
    pub year: String,
    pub category: String,
    pub values: Vec<String>,
}

impl NormalizedRow {
    /// Value for column `idx` of the full table header (year, category, fields…).
    pub fn cell(&self, idx: usize) -> &str {
        match idx {
            0 => &self.year,
            1 => &self.category,
            i => self.values.get(i - 2).map(String::as_str).unwrap_or(""),
        }
    }
}

/// All projected rows of one (year, category), still untyped.
#[derive(Debug)]
pub struct RawTable {
    /// Sanitized `<year>_<category>` name.
    pub name: String,
    pub schema: Schema,
    /// Column names, `Year` and `Category` first.
    pub headers: Vec<String>,
    /// One row per surviving raw record, in input order.
    pub rows: Vec<NormalizedRow>,
}

impl RawTable {
    /// Look up a field by column name in row `row`.
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.headers.iter().position(|h| h == column)?;
        self.rows.get(row).map(|r| r.cell(idx))
    }

    /// Every value of column `idx`, top to bottom.
    pub fn column_values(&self, idx: usize) -> Vec<&str> {
        self.rows.iter().map(|r| r.cell(idx)).collect()
    }
}
