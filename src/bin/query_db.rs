use anyhow::{bail, Result};
use mlbstats::{logging, store, PipelineConfig};
use rusqlite::types::Value;
use std::env;

const PREVIEW_ROWS: usize = 20;

fn fmt_value(v: &Value) -> String {
    match v {
        Value::Null => "NULL".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(r) => r.to_string(),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

fn print_rows(rows: &[Vec<Value>]) {
    if rows.is_empty() {
        println!("No results found.");
        return;
    }
    for row in rows.iter().take(PREVIEW_ROWS) {
        let cells: Vec<String> = row.iter().map(fmt_value).collect();
        println!("  {}", cells.join(" | "));
    }
    println!("Total rows: {}", rows.len());
}

/// Usage:
///   query_db                           list years and tables
///   query_db <table>                   columns and first rows
///   query_db <table> <column> <value>  rows where column = value
fn main() -> Result<()> {
    logging::init("warn");

    let config = PipelineConfig::load()?;
    let conn = store::open_disk_db(&config.db_path)?;
    let args: Vec<String> = env::args().skip(1).collect();

    match args.as_slice() {
        [] => {
            let years = store::available_years(&conn)?;
            if let (Some(min), Some(max)) = (years.first(), years.last()) {
                println!("Available years: {}–{}", min, max);
            }
            for t in store::list_tables(&conn)? {
                println!("  {}", t);
            }
        }
        [table] => {
            println!("Columns of {}:", table);
            for c in store::table_columns(&conn, table)? {
                println!("  {:<20} {}", c.name, c.decl_type);
            }
            print_rows(&store::scan_table(&conn, table)?);
        }
        [table, column, value] => {
            print_rows(&store::filter_table(&conn, table, column, value)?);
        }
        _ => bail!("usage: query_db [<table> [<column> <value>]]"),
    }
    Ok(())
}
