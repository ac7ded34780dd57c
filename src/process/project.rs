use super::raw_table::{NormalizedRow, RawTable};
use super::utils::table_name;
use super::RawRecord;
use crate::schema::Schema;

/// Split a record's text on `delimiter` and lay the trimmed tokens onto the
/// schema's fields.
///
/// Short rows are padded with `""`. Tokens beyond the schema width are
/// dropped; that can only happen with a fixed schema, a generic one is always
/// as wide as its widest row.
pub fn project_row(record: &RawRecord, schema: &Schema, delimiter: &str) -> Vec<String> {
    let width = schema.width();
    let mut values: Vec<String> = record
        .text
        .split(delimiter)
        .map(|t| t.trim().to_string())
        .take(width)
        .collect();
    values.resize(width, String::new());
    values
}

/// Project every record of a category group into a [`RawTable`].
pub fn build_raw_table(
    year: &str,
    category: &str,
    schema: Schema,
    group: &[RawRecord],
    delimiter: &str,
) -> RawTable {
    let rows = group
        .iter()
        .map(|record| NormalizedRow {
            year: year.to_string(),
            category: schema.label().to_string(),
            values: project_row(record, &schema, delimiter),
        })
        .collect();

    RawTable {
        name: table_name(year, category),
        headers: schema.columns(),
        schema,
        rows,
    }
}
