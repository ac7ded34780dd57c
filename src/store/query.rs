// src/store/query.rs

use anyhow::{bail, Result};
use rusqlite::{types::Value, Connection, Params};
use std::collections::BTreeSet;

use super::quote_ident;

/// A column as the store declares it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub decl_type: String,
}

/// Every table in the store, sorted by name.
pub fn list_tables(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")?;
    let names = stmt
        .query_map([], |r| r.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

/// Years with at least one table, taken from the leading digits of each name.
pub fn available_years(conn: &Connection) -> Result<BTreeSet<i64>> {
    Ok(list_tables(conn)?
        .iter()
        .filter_map(|t| t.split('_').next()?.parse::<i64>().ok())
        .collect())
}

/// Column names and declared types of `table`, in table order.
pub fn table_columns(conn: &Connection, table: &str) -> Result<Vec<ColumnInfo>> {
    let mut stmt = conn.prepare("SELECT name, type FROM pragma_table_info(?1) ORDER BY cid")?;
    let cols = stmt
        .query_map([table], |r| {
            Ok(ColumnInfo {
                name: r.get(0)?,
                decl_type: r.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    if cols.is_empty() {
        bail!("no such table `{}`", table);
    }
    Ok(cols)
}

fn collect_rows<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<Vec<Value>>> {
    let mut stmt = conn.prepare(sql)?;
    let width = stmt.column_count();
    let rows = stmt
        .query_map(params, |r| {
            (0..width)
                .map(|i| r.get::<_, Value>(i))
                .collect::<Result<Vec<_>, _>>()
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Full scan of `table` in insertion order.
pub fn scan_table(conn: &Connection, table: &str) -> Result<Vec<Vec<Value>>> {
    collect_rows(
        conn,
        &format!("SELECT * FROM {} ORDER BY rowid", quote_ident(table)),
        [],
    )
}

/// Rows of `table` where `column` equals `value`. The column must exist.
pub fn filter_table(
    conn: &Connection,
    table: &str,
    column: &str,
    value: &str,
) -> Result<Vec<Vec<Value>>> {
    if !table_columns(conn, table)?.iter().any(|c| c.name == column) {
        bail!("column `{}` does not exist in table `{}`", column, table);
    }
    collect_rows(
        conn,
        &format!(
            "SELECT * FROM {} WHERE {} = ?1 ORDER BY rowid",
            quote_ident(table),
            quote_ident(column)
        ),
        [value],
    )
}
