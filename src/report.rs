// src/report.rs

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{info, warn};

/// What happened to one table at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TableStatus {
    Loaded { rows: usize },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableLoad {
    pub table: String,
    #[serde(flatten)]
    pub status: TableStatus,
}

impl TableLoad {
    pub fn is_loaded(&self) -> bool {
        matches!(self.status, TableStatus::Loaded { .. })
    }
}

/// What happened to one raw file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    Succeeded { tables: Vec<TableLoad> },
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    #[serde(flatten)]
    pub status: FileStatus,
}

/// Summary of one pipeline run: which files went through and which were
/// skipped, and the load result of every table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub files: Vec<FileOutcome>,
}

impl RunReport {
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            files: Vec::new(),
        }
    }

    pub fn succeeded(&mut self, path: &Path, tables: Vec<TableLoad>) {
        self.files.push(FileOutcome {
            path: path.to_path_buf(),
            status: FileStatus::Succeeded { tables },
        });
    }

    pub fn skipped(&mut self, path: &Path, reason: impl Into<String>) {
        self.files.push(FileOutcome {
            path: path.to_path_buf(),
            status: FileStatus::Skipped {
                reason: reason.into(),
            },
        });
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn succeeded_files(&self) -> impl Iterator<Item = &FileOutcome> {
        self.files
            .iter()
            .filter(|f| matches!(f.status, FileStatus::Succeeded { .. }))
    }

    pub fn skipped_files(&self) -> impl Iterator<Item = &FileOutcome> {
        self.files
            .iter()
            .filter(|f| matches!(f.status, FileStatus::Skipped { .. }))
    }

    /// Every table load across all files, in run order.
    pub fn tables(&self) -> impl Iterator<Item = &TableLoad> {
        self.files
            .iter()
            .filter_map(|f| match &f.status {
                FileStatus::Succeeded { tables } => Some(tables),
                FileStatus::Skipped { .. } => None,
            })
            .flatten()
    }

    pub fn log_summary(&self) {
        let loaded = self.tables().filter(|t| t.is_loaded()).count();
        let failed = self.tables().count() - loaded;
        info!(
            files_ok = self.succeeded_files().count(),
            files_skipped = self.skipped_files().count(),
            tables_loaded = loaded,
            tables_failed = failed,
            "run finished"
        );
        for f in self.skipped_files() {
            if let FileStatus::Skipped { reason } = &f.status {
                warn!(path = %f.path.display(), %reason, "skipped file");
            }
        }
        for t in self.tables() {
            if let TableStatus::Failed { reason } = &t.status {
                warn!(table = %t.table, %reason, "table not loaded");
            }
        }
    }

    /// Write the report as pretty JSON with a trailing newline.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let mut f =
            fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(&mut f, self).context("serializing run report")?;
        f.write_all(b"\n")?;
        Ok(())
    }
}
