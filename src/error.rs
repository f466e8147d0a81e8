//! Error taxonomy for a backup run.
//!
//! Each stage returns `Result<_, BackupError>`. Remote failures carry a
//! `StoreError` which decides whether an upload attempt may be retried.

use std::io;
use std::path::PathBuf;

use crate::cloud::store::StoreError;

/// Errors returned by the stages of a backup run.
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("SiYuan data directory not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("failed to create temporary workspace: {0}")]
    Workspace(#[source] io::Error),

    #[error("failed to copy {}: {source}", path.display())]
    Copy {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write archive {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("upload failed after {attempts} attempt(s): {source}")]
    Upload {
        attempts: u32,
        #[source]
        source: StoreError,
    },
}

impl BackupError {
    /// Short machine-friendly name of the error kind, used in run reports.
    pub fn kind(&self) -> &'static str {
        match self {
            BackupError::SourceNotFound { .. } => "source_not_found",
            BackupError::Workspace(_) => "workspace",
            BackupError::Copy { .. } => "copy",
            BackupError::Archive { .. } => "archive",
            BackupError::Configuration(_) => "configuration",
            BackupError::Upload { .. } => "upload",
        }
    }
}
