pub mod arrow;
pub mod resolve;
pub mod types;

pub use arrow::{build_arrow_schema, column_type_of, map_to_arrow_type};
pub use resolve::SchemaResolver;
pub use types::{Column, ColumnType, Schema, CATEGORY_COLUMN, YEAR_COLUMN};
