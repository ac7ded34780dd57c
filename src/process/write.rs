// src/process/write.rs

use anyhow::{Context, Result};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::NormalizedTable;

pub const ARTIFACT_EXTENSION: &str = "parquet";

/// Path of the artifact for `name` inside `out_dir`.
pub fn artifact_path(out_dir: &Path, name: &str) -> PathBuf {
    out_dir.join(format!("{}.{}", name, ARTIFACT_EXTENSION))
}

/// Write `table` to `<out_dir>/<name>.parquet`.
///
/// The file is written under a temporary name and renamed into place, so a
/// reader never sees half a table and a later write of the same name replaces
/// the earlier one whole. On failure the temporary file is removed.
pub fn write_table(table: &NormalizedTable, out_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;

    let out_path = artifact_path(out_dir, &table.name);
    let temp_path = out_path.with_extension("tmp");

    let written = write_parquet(table, &temp_path).and_then(|_| {
        fs::rename(&temp_path, &out_path).with_context(|| {
            format!(
                "renaming {} -> {}",
                temp_path.display(),
                out_path.display()
            )
        })
    });
    if let Err(e) = written {
        discard(&temp_path);
        return Err(e);
    }

    debug!(table = %table.name, rows = table.batch.num_rows(), path = %out_path.display(), "wrote artifact");
    Ok(out_path)
}

fn write_parquet(table: &NormalizedTable, path: &Path) -> Result<()> {
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, table.batch.schema(), Some(props))
        .with_context(|| format!("opening parquet writer for {}", table.name))?;
    writer
        .write(&table.batch)
        .with_context(|| format!("writing {}", table.name))?;
    writer
        .close()
        .with_context(|| format!("closing {}", table.name))?;
    Ok(())
}

/// Best-effort removal of a file this module wrote.
pub fn discard(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "removed"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), "could not remove: {}", e),
    }
}

/// Read an artifact back. The table name is the file stem.
pub fn read_table(path: &Path) -> Result<NormalizedTable> {
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("artifact {} has no usable name", path.display()))?
        .to_string();

    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .with_context(|| format!("reading parquet metadata of {}", path.display()))?;
    let schema = builder.schema().clone();
    let reader = builder.build()?;

    let batches = reader
        .collect::<Result<Vec<RecordBatch>, _>>()
        .with_context(|| format!("decoding {}", path.display()))?;
    let batch = arrow::compute::concat_batches(&schema, &batches)?;

    Ok(NormalizedTable { name, batch })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{ArrayRef, Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn sample(name: &str, values: Vec<i64>) -> Result<NormalizedTable> {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Year", DataType::Int64, false),
            Field::new("Category", DataType::Utf8, false),
        ]));
        let n = values.len();
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(values)) as ArrayRef,
                Arc::new(StringArray::from(vec!["table_9"; n])) as ArrayRef,
            ],
        )?;
        Ok(NormalizedTable {
            name: name.into(),
            batch,
        })
    }

    #[test]
    fn artifact_reads_back_with_its_name() -> Result<()> {
        let dir = tempdir()?;
        let table = sample("1920_table_9", vec![1920, 1920])?;

        let path = write_table(&table, dir.path())?;
        assert_eq!(path, dir.path().join("1920_table_9.parquet"));
        assert!(!dir.path().join("1920_table_9.tmp").exists());

        let back = read_table(&path)?;
        assert_eq!(back.name, "1920_table_9");
        assert_eq!(back.batch.columns(), table.batch.columns());
        assert_eq!(back.batch.schema().field(0).data_type(), &DataType::Int64);
        Ok(())
    }

    #[test]
    fn same_input_gives_same_bytes() -> Result<()> {
        let dir = tempdir()?;
        let table = sample("1907_table_2", vec![1907])?;

        let path = write_table(&table, dir.path())?;
        let first = fs::read(&path)?;
        write_table(&table, dir.path())?;
        assert_eq!(fs::read(&path)?, first);
        Ok(())
    }

    #[test]
    fn failed_rename_leaves_no_temp_file() -> Result<()> {
        let dir = tempdir()?;
        // a directory squatting on the artifact name makes the rename fail
        fs::create_dir(dir.path().join("1907_table_5.parquet"))?;

        let err = write_table(&sample("1907_table_5", vec![1907])?, dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("renaming"));
        assert!(!dir.path().join("1907_table_5.tmp").exists());
        Ok(())
    }

    #[test]
    fn later_write_replaces_earlier() -> Result<()> {
        let dir = tempdir()?;
        write_table(&sample("1907_table_2", vec![1907, 1907, 1907])?, dir.path())?;
        let path = write_table(&sample("1907_table_2", vec![1907])?, dir.path())?;
        assert_eq!(read_table(&path)?.batch.num_rows(), 1);
        Ok(())
    }
}
