use anyhow::Result;
use arrow::{
    array::{ArrayRef, Float64Array, Int64Array, StringArray},
    record_batch::RecordBatch,
};
use std::sync::Arc;
use tracing::debug;

use crate::process::raw_table::RawTable;
use crate::process::utils::{parse_integer, parse_real, strip_separators};
use crate::schema::{build_arrow_schema, Column, ColumnType};

/// Outcome of coercing one column.
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    Integer(Vec<i64>),
    Real(Vec<f64>),
    /// At least one value refused to parse; the original text is kept as-is.
    Text(Vec<String>),
}

impl Coerced {
    pub fn column_type(&self) -> ColumnType {
        match self {
            Coerced::Integer(_) => ColumnType::Integer,
            Coerced::Real(_) => ColumnType::Real,
            Coerced::Text(_) => ColumnType::Text,
        }
    }

    fn into_array(self) -> ArrayRef {
        match self {
            Coerced::Integer(v) => Arc::new(Int64Array::from(v)) as ArrayRef,
            Coerced::Real(v) => Arc::new(Float64Array::from(v)) as ArrayRef,
            Coerced::Text(v) => Arc::new(StringArray::from(v)) as ArrayRef,
        }
    }
}

/// Coerce a whole column, all or nothing.
///
/// Separators are stripped for the parse attempt. If every value parses as a
/// whole number the column becomes Integer, else if every value parses as a
/// real it becomes Real. A single failure leaves the column Text, including
/// the values that parsed on their own.
pub fn coerce_column(values: &[&str], separators: &[char]) -> Coerced {
    let stripped: Vec<String> = values
        .iter()
        .map(|v| strip_separators(v, separators))
        .collect();

    if let Some(ints) = stripped
        .iter()
        .map(|s| parse_integer(s))
        .collect::<Option<Vec<i64>>>()
    {
        return Coerced::Integer(ints);
    }
    if let Some(reals) = stripped
        .iter()
        .map(|s| parse_real(s))
        .collect::<Option<Vec<f64>>>()
    {
        return Coerced::Real(reals);
    }
    Coerced::Text(values.iter().map(|v| v.to_string()).collect())
}

/// Convert a projected table's string columns into their final types.
pub fn convert_to_final_types(table: &RawTable, separators: &[char]) -> Result<RecordBatch> {
    let mut columns = Vec::with_capacity(table.headers.len());
    let mut arrays = Vec::with_capacity(table.headers.len());
    debug!(
        table = %table.name,
        label = %table.schema.label(),
        fixed = table.schema.is_fixed(),
        rows = table.rows.len(),
        "converting"
    );

    for (idx, name) in table.headers.iter().enumerate() {
        let coerced = coerce_column(&table.column_values(idx), separators);
        let ty = coerced.column_type();
        debug!(table = %table.name, column = %name, ?ty, "coerced column");

        columns.push(Column {
            name: name.clone(),
            ty,
        });
        arrays.push(coerced.into_array());
    }

    RecordBatch::try_new(build_arrow_schema(&columns), arrays).map_err(Into::into)
}
