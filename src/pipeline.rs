// src/pipeline.rs

use anyhow::{Context, Result};
use glob::{glob, Pattern};
use rusqlite::Connection;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};
use tracing::{error, info, warn};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::process::{
    self,
    write::{discard, write_table},
    NormalizedTable,
};
use crate::report::RunReport;
use crate::store;

pub const REPORT_FILE: &str = "run_report.json";

/// Raw files under `raw_dir`, sorted by path.
pub fn discover_raw_files(raw_dir: &Path) -> Result<Vec<PathBuf>> {
    if !raw_dir.is_dir() {
        return Err(PipelineError::InputUnavailable(raw_dir.to_path_buf()).into());
    }
    let pattern = format!("{}/*.csv", Pattern::escape(&raw_dir.to_string_lossy()));
    let mut paths: Vec<PathBuf> = glob(&pattern)
        .with_context(|| format!("bad raw file pattern {}", pattern))?
        .filter_map(|entry| match entry {
            Ok(p) => Some(p),
            Err(e) => {
                warn!("unreadable directory entry: {}", e);
                None
            }
        })
        .collect();
    paths.sort();
    Ok(paths)
}

/// Emit every table of one file. If any write fails, the artifacts already
/// written for this file are removed so the file is skipped rather than
/// half-emitted.
fn emit_tables(tables: &[NormalizedTable], out_dir: &Path) -> Result<()> {
    let mut written = Vec::with_capacity(tables.len());
    for table in tables {
        match write_table(table, out_dir) {
            Ok(path) => written.push(path),
            Err(e) => {
                for path in &written {
                    discard(path);
                }
                return Err(e);
            }
        }
    }
    Ok(())
}

/// One full batch run over an already open store.
///
/// Files go through read → group → resolve → project → normalize → emit →
/// load one at a time. A file that can't be read or emitted is skipped and
/// reported; a table the store rejects is reported and the next one loads.
pub fn run_with_store(config: &PipelineConfig, conn: &mut Connection) -> Result<RunReport> {
    let files = discover_raw_files(&config.raw_dir)?;
    fs::create_dir_all(&config.processed_dir).with_context(|| {
        format!(
            "creating processed directory {}",
            config.processed_dir.display()
        )
    })?;
    info!(count = files.len(), dir = %config.raw_dir.display(), "raw files found");

    let mut report = RunReport::start();
    for path in &files {
        let start = Instant::now();
        let tables = match process::process_file(path, config)
            .and_then(|tables| emit_tables(&tables, &config.processed_dir).map(|_| tables))
        {
            Ok(tables) => tables,
            Err(e) => {
                error!(path = %path.display(), "skipping file: {:#}", e);
                report.skipped(path, format!("{:#}", e));
                continue;
            }
        };

        let loads = store::load_tables(conn, &tables);
        info!(path = %path.display(), tables = loads.len(), elapsed = ?start.elapsed(), "file done");
        report.succeeded(path, loads);
    }
    report.finish();
    Ok(report)
}

/// Open the configured store, run, then log and persist the report.
pub fn run(config: &PipelineConfig) -> Result<RunReport> {
    // fail before touching the store if there's nothing to read
    if !config.raw_dir.is_dir() {
        return Err(PipelineError::InputUnavailable(config.raw_dir.clone()).into());
    }
    let mut conn = store::open_disk_db(&config.db_path)?;

    let report = run_with_store(config, &mut conn)?;
    report.log_summary();

    let report_path = config.processed_dir.join(REPORT_FILE);
    if let Err(e) = report.write_json(&report_path) {
        warn!(path = %report_path.display(), "could not write run report: {:#}", e);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{FileStatus, TableStatus};
    use crate::store::{list_tables, scan_table, table_columns};
    use rusqlite::types::Value;
    use std::io::Write;
    use tempfile::{tempdir, TempDir};

    fn write_raw(dir: &Path, name: &str, lines: &[&str]) -> Result<()> {
        let mut f = fs::File::create(dir.join(name))?;
        writeln!(f, "category,text")?;
        for l in lines {
            writeln!(f, "{}", l)?;
        }
        Ok(())
    }

    fn setup() -> Result<(TempDir, PipelineConfig)> {
        crate::logging::init_test_logging();
        let root = tempdir()?;
        let raw = root.path().join("raw");
        fs::create_dir_all(&raw)?;

        write_raw(
            &raw,
            "1907_American_League_pitching.csv",
            &[
                "table_2,Statistic | Player | Team | Value",
                "table_2,Wins | Smith | BOS | 27",
                "table_2,\"Strikeouts | Walsh | CHA | 1,206\"",
                "table_5,Statistic | Team | Value",
                "table_5,ERA | CHA | 2.22",
                "table_5,Shutouts | PHA | N/A",
                "table_8,Complete Games | Young | BOS | 33 | extra",
                "table_8,Saves | Plank",
            ],
        )?;
        write_raw(
            &raw,
            "1920_National_League_pitching.csv",
            &[
                "table_9,Statistic | Team",
                "table_2,Wins | Alexander | CHN | 27",
            ],
        )?;
        fs::write(raw.join("1921_broken.csv"), "kind,body\nx,y\n")?;

        let config = PipelineConfig {
            raw_dir: raw,
            processed_dir: root.path().join("processed"),
            db_path: root.path().join("db").join("mlb_history.db"),
            ..PipelineConfig::default()
        };
        Ok((root, config))
    }

    #[test]
    fn full_run_loads_typed_tables() -> Result<()> {
        let (_root, config) = setup()?;
        let report = run(&config)?;

        assert_eq!(report.succeeded_files().count(), 2);
        assert_eq!(report.skipped_files().count(), 1);
        assert!(report.tables().all(|t| t.is_loaded()));

        let conn = store::open_disk_db(&config.db_path)?;
        assert_eq!(
            list_tables(&conn)?,
            vec!["1907_table_2", "1907_table_5", "1907_table_8", "1920_table_2"]
        );

        // separators stripped, whole column numeric
        let cols = table_columns(&conn, "1907_table_2")?;
        assert_eq!(cols[5].name, "value");
        assert_eq!(cols[5].decl_type, "INTEGER");
        let rows = scan_table(&conn, "1907_table_2")?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][5], Value::Integer(1206));
        assert_eq!(rows[0][1], Value::Text("Individual Pitching Stats".into()));

        // one N/A keeps the whole value column text
        let cols = table_columns(&conn, "1907_table_5")?;
        assert_eq!(cols.len(), 5);
        assert_eq!(cols[4].decl_type, "TEXT");
        let rows = scan_table(&conn, "1907_table_5")?;
        assert_eq!(rows[0][4], Value::Text("2.22".into()));

        // generic width is the widest row, short rows padded
        let cols = table_columns(&conn, "1907_table_8")?;
        let names: Vec<&str> = cols.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["year", "category", "col1", "col2", "col3", "col4", "col5"]
        );
        let rows = scan_table(&conn, "1907_table_8")?;
        assert_eq!(rows[0][6], Value::Text("extra".into()));
        assert_eq!(rows[1][4], Value::Text("".into()));
        Ok(())
    }

    #[test]
    fn header_only_category_has_no_relation() -> Result<()> {
        let (_root, config) = setup()?;
        run(&config)?;
        let conn = store::open_disk_db(&config.db_path)?;
        assert!(!list_tables(&conn)?.contains(&"1920_table_9".to_string()));
        assert!(!config.processed_dir.join("1920_table_9.parquet").exists());
        Ok(())
    }

    #[test]
    fn rerun_is_identical() -> Result<()> {
        let (_root, config) = setup()?;
        run(&config)?;
        let artifact = config.processed_dir.join("1907_table_2.parquet");
        let first_bytes = fs::read(&artifact)?;
        let conn = store::open_disk_db(&config.db_path)?;
        let first_rows = scan_table(&conn, "1907_table_2")?;
        drop(conn);

        run(&config)?;
        assert_eq!(fs::read(&artifact)?, first_bytes);
        let conn = store::open_disk_db(&config.db_path)?;
        assert_eq!(scan_table(&conn, "1907_table_2")?, first_rows);
        assert_eq!(list_tables(&conn)?.len(), 4);
        Ok(())
    }

    #[test]
    fn malformed_file_is_reported_not_fatal() -> Result<()> {
        let (_root, config) = setup()?;
        let mut conn = store::open_mem_db()?;
        let report = run_with_store(&config, &mut conn)?;

        let skipped: Vec<_> = report.skipped_files().collect();
        assert_eq!(skipped.len(), 1);
        assert!(skipped[0].path.ends_with("1921_broken.csv"));
        assert!(matches!(&skipped[0].status, FileStatus::Skipped { reason } if reason.contains("category")));

        let loaded: usize = report
            .tables()
            .map(|t| match t.status {
                TableStatus::Loaded { rows } => rows,
                TableStatus::Failed { .. } => 0,
            })
            .sum();
        assert_eq!(loaded, 2 + 2 + 2 + 1);
        assert!(!config.processed_dir.join(REPORT_FILE).exists());
        Ok(())
    }

    #[test]
    fn failed_emit_removes_the_files_artifacts() -> Result<()> {
        crate::logging::init_test_logging();
        let root = tempdir()?;
        let raw = root.path().join("raw");
        fs::create_dir_all(&raw)?;
        write_raw(
            &raw,
            "1907_American_League_pitching.csv",
            &[
                "table_2,Wins | Smith | BOS | 27",
                "table_5,ERA | CHA | 2.22",
            ],
        )?;
        let config = PipelineConfig {
            raw_dir: raw,
            processed_dir: root.path().join("processed"),
            ..PipelineConfig::default()
        };
        // table_5 can't be renamed into place; table_2 is written first
        fs::create_dir_all(config.processed_dir.join("1907_table_5.parquet"))?;

        let mut conn = store::open_mem_db()?;
        let report = run_with_store(&config, &mut conn)?;

        assert_eq!(report.skipped_files().count(), 1);
        assert!(list_tables(&conn)?.is_empty());
        assert!(!config.processed_dir.join("1907_table_2.parquet").exists());
        assert!(!config.processed_dir.join("1907_table_5.tmp").exists());

        // nothing left behind for a later import to pick up
        fs::remove_dir(config.processed_dir.join("1907_table_5.parquet"))?;
        let imported = store::load_artifacts(&mut conn, &config.processed_dir)?;
        assert!(imported.is_empty());
        Ok(())
    }

    #[test]
    fn configured_category_gets_its_fields() -> Result<()> {
        crate::logging::init_test_logging();
        let root = tempdir()?;
        let raw = root.path().join("raw");
        fs::create_dir_all(&raw)?;
        write_raw(
            &raw,
            "1920_National_League_pitching.csv",
            &[
                "table_7,Statistic | Saves",
                "table_7,Johnson | 7",
                "table_7,Russell | 12 | extra",
            ],
        )?;
        let mut config: PipelineConfig = serde_yaml::from_str(
            "categories:\n  table_7:\n    label: Saves Leaders\n    fields: [Player, Saves]\n",
        )?;
        config.raw_dir = raw;
        config.processed_dir = root.path().join("processed");

        let mut conn = store::open_mem_db()?;
        let report = run_with_store(&config, &mut conn)?;
        assert!(report.tables().all(|t| t.is_loaded()));

        let cols = table_columns(&conn, "1920_table_7")?;
        let decl: Vec<(&str, &str)> = cols
            .iter()
            .map(|c| (c.name.as_str(), c.decl_type.as_str()))
            .collect();
        assert_eq!(
            decl,
            vec![
                ("year", "INTEGER"),
                ("category", "TEXT"),
                ("player", "TEXT"),
                ("saves", "INTEGER")
            ]
        );
        let rows = scan_table(&conn, "1920_table_7")?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][1], Value::Text("Saves Leaders".into()));
        assert_eq!(rows[1][3], Value::Integer(12));
        Ok(())
    }

    #[test]
    fn raw_dir_with_pattern_characters_is_matched_literally() -> Result<()> {
        let root = tempdir()?;
        let raw = root.path().join("raw [1907]");
        fs::create_dir_all(&raw)?;
        write_raw(&raw, "1907_AL_pitching.csv", &["table_2,Wins | Smith | BOS | 27"])?;
        fs::write(root.path().join("1908_AL_pitching.csv"), "category,text\n")?;

        let files = discover_raw_files(&raw)?;
        assert_eq!(files, vec![raw.join("1907_AL_pitching.csv")]);
        Ok(())
    }

    #[test]
    fn missing_input_dir_is_fatal() {
        let root = tempdir().expect("tempdir");
        let config = PipelineConfig {
            raw_dir: root.path().join("nowhere"),
            processed_dir: root.path().join("processed"),
            db_path: root.path().join("db.sqlite"),
            ..PipelineConfig::default()
        };
        let err = run(&config).unwrap_err();
        let pe = err.downcast_ref::<PipelineError>().expect("typed error");
        assert!(pe.is_fatal());
        assert!(!config.db_path.exists());
    }
}
