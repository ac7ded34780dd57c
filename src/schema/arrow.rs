// src/schema/arrow.rs

use arrow::datatypes::{DataType, Field as ArrowField, Schema as ArrowSchema};
use std::sync::Arc;

use super::types::{Column, ColumnType};

/// Map a normalized column type onto an Arrow DataType.
///
/// - Integer → Int64
/// - Real    → Float64
/// - Text    → Utf8
pub fn map_to_arrow_type(ty: ColumnType) -> DataType {
    match ty {
        ColumnType::Integer => DataType::Int64,
        ColumnType::Real => DataType::Float64,
        ColumnType::Text => DataType::Utf8,
    }
}

/// Inverse of [`map_to_arrow_type`] for batches read back from Parquet.
/// Integer widths collapse to Integer, floats to Real, anything else is Text.
pub fn column_type_of(dt: &DataType) -> ColumnType {
    match dt {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => ColumnType::Integer,
        DataType::Float16 | DataType::Float32 | DataType::Float64 => ColumnType::Real,
        _ => ColumnType::Text,
    }
}

/// Build an ArrowSchema (inside an Arc) from a slice of `Column`s.
/// Columns are never null: missing values are empty strings.
pub fn build_arrow_schema(cols: &[Column]) -> Arc<ArrowSchema> {
    let fields: Vec<ArrowField> = cols
        .iter()
        .map(|col| ArrowField::new(&col.name, map_to_arrow_type(col.ty), false))
        .collect();

    Arc::new(ArrowSchema::new(fields))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrow_types_round_trip_through_column_type() {
        for ty in [ColumnType::Integer, ColumnType::Real, ColumnType::Text] {
            assert_eq!(column_type_of(&map_to_arrow_type(ty)), ty);
        }
        assert_eq!(column_type_of(&DataType::Int32), ColumnType::Integer);
        assert_eq!(column_type_of(&DataType::LargeUtf8), ColumnType::Text);
    }
}
