// src/process/mod.rs
use anyhow::{Context, Result};
use arrow::record_batch::RecordBatch;
use csv::ReaderBuilder;
use serde::Deserialize;

use std::{fs::File, io::Read, path::Path};
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::schema::SchemaResolver;

pub mod convert;
pub mod group;
pub mod project;
pub mod raw_table;
pub mod utils;
pub mod write;

pub use raw_table::{NormalizedRow, RawTable};

/// One scraped table row as the harvester writes it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawRecord {
    pub category: String,
    pub text: String,
}

/// A fully typed table ready to emit and load.
#[derive(Debug, Clone)]
pub struct NormalizedTable {
    pub name: String,
    pub batch: RecordBatch,
}

/// Year of a raw file: the file-name prefix before the first `_`
/// (`1907_American_League_pitching.csv` → `1907`).
pub fn year_from_path(path: &Path) -> Result<String, PipelineError> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| PipelineError::malformed(path, "file name is not valid UTF-8"))?;
    let year = stem.split('_').next().unwrap_or_default();
    if year.is_empty() || !year.chars().all(|c| c.is_ascii_digit()) {
        return Err(PipelineError::malformed(
            path,
            format!("cannot derive a year from `{}`", stem),
        ));
    }
    Ok(year.to_string())
}

/// Parse harvester CSV (`category`, `text` headers) from any reader.
pub fn read_raw_records<R: Read>(reader: R) -> Result<Vec<RawRecord>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers = rdr.headers().context("reading CSV header")?.clone();
    for required in ["category", "text"] {
        if !headers.iter().any(|h| h.trim() == required) {
            anyhow::bail!("missing `{}` column (found {:?})", required, headers);
        }
    }

    let mut records = Vec::new();
    for (idx, result) in rdr.deserialize::<RawRecord>().enumerate() {
        let record = result.with_context(|| format!("CSV parse error at record {}", idx))?;
        records.push(record);
    }
    Ok(records)
}

/// Raw Record Reader: load one year's file in order.
pub fn read_raw_file(path: &Path) -> Result<Vec<RawRecord>, PipelineError> {
    let file = File::open(path)
        .map_err(|e| PipelineError::malformed(path, format!("cannot open: {}", e)))?;
    read_raw_records(file).map_err(|e| PipelineError::malformed(path, format!("{:#}", e)))
}

/// Group, resolve, project and normalize one year's records.
///
/// Tables come back in category order, one per non-empty category.
pub fn normalize_records(
    year: &str,
    records: Vec<RawRecord>,
    config: &PipelineConfig,
) -> Result<Vec<NormalizedTable>> {
    let groups = group::group_by_category(records, &config.header_marker);
    let resolver = SchemaResolver::new(&config.categories, &config.delimiter);

    let mut tables = Vec::with_capacity(groups.len());
    for (category, rows) in &groups {
        let schema = resolver.resolve(category, rows)?;
        let raw = project::build_raw_table(year, category, schema, rows, &config.delimiter);
        let batch = convert::convert_to_final_types(&raw, &config.thousands_separators)
            .with_context(|| format!("normalizing {}", raw.name))?;
        debug!(table = %raw.name, rows = batch.num_rows(), cols = batch.num_columns(), "normalized");
        tables.push(NormalizedTable {
            name: raw.name,
            batch,
        });
    }
    Ok(tables)
}

/// Read one raw file and turn it into normalized tables.
#[tracing::instrument(level = "info", skip(config), fields(path = %path.display()))]
pub fn process_file(path: &Path, config: &PipelineConfig) -> Result<Vec<NormalizedTable>> {
    let year = year_from_path(path)?;
    let records = read_raw_file(path)?;
    info!(year = %year, records = records.len(), "read raw file");
    normalize_records(&year, records, config)
}
