use anyhow::{anyhow, Context, Result};
use arrow::array::{Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use glob::{glob, Pattern};
use rusqlite::{params_from_iter, types::Value, Connection};
use std::{fs, path::Path, time::Instant};
use tracing::{debug, error, info};

use crate::error::PipelineError;
use crate::process::{write::read_table, NormalizedTable};
use crate::report::{TableLoad, TableStatus};
use crate::schema::column_type_of;

pub mod query;

pub use query::{available_years, filter_table, list_tables, scan_table, table_columns, ColumnInfo};

/// Open the SQLite database on disk at `path`, creating the file and its
/// parent directory if they don't exist.
pub fn open_disk_db(path: &Path) -> Result<Connection, PipelineError> {
    let unavailable = |reason: String| PipelineError::StoreUnavailable {
        path: path.to_path_buf(),
        reason,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| unavailable(e.to_string()))?;
    }
    Connection::open(path).map_err(|e| unavailable(e.to_string()))
}

/// Open an in-memory database.
pub fn open_mem_db() -> Result<Connection> {
    Ok(Connection::open_in_memory()?)
}

/// Column names as they appear in the store: trimmed, spaces to `_`,
/// lower-cased (`Statistic` → `statistic`).
pub fn normalize_column_name(name: &str) -> String {
    name.trim().replace(' ', "_").to_lowercase()
}

/// Double-quote an SQL identifier.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Cell `row` of `array` as an SQLite value.
fn cell_value(array: &dyn Array, row: usize) -> Result<Value> {
    if array.is_null(row) {
        return Ok(Value::Null);
    }
    let any = array.as_any();
    match array.data_type() {
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| Value::Integer(a.value(row))),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| Value::Real(a.value(row))),
        DataType::Utf8 => any
            .downcast_ref::<StringArray>()
            .map(|a| Value::Text(a.value(row).to_string())),
        _ => None,
    }
    .ok_or_else(|| anyhow!("unsupported column type {:?}", array.data_type()))
}

/// Replace-load one table: drop any relation with the same name, recreate it
/// with the batch's columns and types, insert every row.
///
/// Runs in a single transaction. On error nothing is committed and whatever
/// relation existed under that name before is left untouched.
pub fn load_table(conn: &mut Connection, table: &NormalizedTable) -> Result<usize> {
    let batch: &RecordBatch = &table.batch;
    let ident = quote_ident(&table.name);

    let schema = batch.schema();
    let col_defs: Vec<String> = schema
        .fields()
        .iter()
        .map(|f| {
            format!(
                "{} {}",
                quote_ident(&normalize_column_name(f.name())),
                column_type_of(f.data_type()).sql_type()
            )
        })
        .collect();

    let tx = conn.transaction()?;
    tx.execute(&format!("DROP TABLE IF EXISTS {}", ident), [])?;
    tx.execute(
        &format!("CREATE TABLE {} ({})", ident, col_defs.join(", ")),
        [],
    )?;

    {
        let placeholders = vec!["?"; batch.num_columns()].join(", ");
        let mut stmt = tx.prepare(&format!("INSERT INTO {} VALUES ({})", ident, placeholders))?;
        for row in 0..batch.num_rows() {
            let values = batch
                .columns()
                .iter()
                .map(|col| cell_value(col.as_ref(), row))
                .collect::<Result<Vec<Value>>>()
                .with_context(|| format!("row {}", row))?;
            stmt.execute(params_from_iter(values))?;
        }
    }

    tx.commit()?;
    Ok(batch.num_rows())
}

/// Load each table in turn. A failing table is logged and recorded; the rest
/// still load.
pub fn load_tables(conn: &mut Connection, tables: &[NormalizedTable]) -> Vec<TableLoad> {
    tables
        .iter()
        .map(|table| {
            let start = Instant::now();
            let status = match load_table(conn, table) {
                Ok(rows) => {
                    info!(table = %table.name, rows, elapsed = ?start.elapsed(), "loaded");
                    TableStatus::Loaded { rows }
                }
                Err(e) => {
                    let reason = format!("{:#}", e);
                    let err = PipelineError::Load {
                        table: table.name.clone(),
                        reason: reason.clone(),
                    };
                    error!("{}", err);
                    TableStatus::Failed { reason }
                }
            };
            TableLoad {
                table: table.name.clone(),
                status,
            }
        })
        .collect()
}

/// Load every `*.parquet` artifact in `dir`, in file-name order.
/// Unreadable artifacts are recorded as failed loads.
pub fn load_artifacts(conn: &mut Connection, dir: &Path) -> Result<Vec<TableLoad>> {
    let pattern = format!("{}/*.parquet", Pattern::escape(&dir.to_string_lossy()));
    let mut paths: Vec<_> = glob(&pattern)
        .with_context(|| format!("bad artifact pattern {}", pattern))?
        .filter_map(Result::ok)
        .collect();
    paths.sort();
    debug!(dir = %dir.display(), count = paths.len(), "found artifacts");

    let mut loads = Vec::with_capacity(paths.len());
    for path in paths {
        match read_table(&path) {
            Ok(table) => loads.extend(load_tables(conn, std::slice::from_ref(&table))),
            Err(e) => {
                error!(path = %path.display(), "failed to read artifact: {:#}", e);
                loads.push(TableLoad {
                    table: path
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    status: TableStatus::Failed {
                        reason: format!("{:#}", e),
                    },
                });
            }
        }
    }
    Ok(loads)
}
