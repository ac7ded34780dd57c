use std::path::PathBuf;

use thiserror::Error;

/// Failure classes the pipeline distinguishes between.
///
/// Only `InputUnavailable` and `StoreUnavailable` abort a run; everything
/// else is recovered per file or per table and lands in the run report.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("malformed raw file {}: {reason}", .path.display())]
    MalformedRecord { path: PathBuf, reason: String },

    #[error("category `{0}` has no rows after header filtering")]
    EmptyGroup(String),

    #[error("failed to load table `{table}`: {reason}")]
    Load { table: String, reason: String },

    #[error("input directory {} is unavailable", .0.display())]
    InputUnavailable(PathBuf),

    #[error("store at {} is unavailable: {reason}", .path.display())]
    StoreUnavailable { path: PathBuf, reason: String },
}

impl PipelineError {
    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        PipelineError::MalformedRecord {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error should stop the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PipelineError::InputUnavailable(_) | PipelineError::StoreUnavailable { .. }
        )
    }
}
