//! Staging and compressing the data directory.
//!
//! Every run gets its own [`Workspace`], a uniquely named temporary
//! directory. The source tree is copied into `data-<timestamp>` inside it and
//! that copy is zipped into `SiYuan-<timestamp>.zip` next to it.
//!
//! ```text
//! <temp>/siyuan_backup_XXXXXX/
//! ├── data-20240115-143052/      staged copy
//! └── SiYuan-20240115-143052.zip archive, root entry data-20240115-143052/
//! ```

/// Recursive staging copy
pub mod copy;

/// ZIP archive creation
pub mod compress;

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use log::{error, info, warn};
use tempfile::TempDir;

use crate::config::ArchiveConfig;
use crate::constants::{BYTES_PER_MIB, TIMESTAMP_FORMAT};
use crate::error::BackupError;

/// Format a capture timestamp as `YYYYMMDD-HHMMSS`.
pub fn capture_timestamp(at: &NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// A per-run temporary directory, removed by [`Workspace::cleanup`].
///
/// Dropping a workspace without calling `cleanup` still removes it, silently.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a new workspace under the configured temp root.
    pub fn create(config: &ArchiveConfig) -> Result<Self, BackupError> {
        let dir = tempfile::Builder::new()
            .prefix(&config.workspace_prefix)
            .tempdir_in(config.temp_root())
            .map_err(BackupError::Workspace)?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the workspace and everything in it. Failures are logged only.
    pub fn cleanup(self) {
        let path = self.dir.path().to_path_buf();
        if !path.exists() {
            info!("Temporary workspace already gone: {}", path.display());
            return;
        }

        info!("Removing temporary workspace: {}", path.display());
        match self.dir.close() {
            Ok(()) => info!("Temporary workspace removed"),
            Err(e) => warn!("Failed to remove temporary workspace {}: {}", path.display(), e),
        }
    }
}

/// The zip produced by one run, together with the workspace that holds it.
#[derive(Debug)]
pub struct BackupArchive {
    path: PathBuf,
    file_name: String,
    timestamp: String,
    size_bytes: u64,
    workspace: Workspace,
}

impl BackupArchive {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Capture timestamp embedded in the archive name
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn size_mib(&self) -> f64 {
        self.size_bytes as f64 / BYTES_PER_MIB
    }

    pub fn workspace_path(&self) -> &Path {
        self.workspace.path()
    }

    /// Remove the archive's workspace, staged copy included.
    pub fn cleanup(self) {
        self.workspace.cleanup();
    }
}

/// Builds a [`BackupArchive`] from a source directory.
#[derive(Debug, Clone, Default)]
pub struct Archiver {
    config: ArchiveConfig,
}

impl Archiver {
    pub fn new(config: ArchiveConfig) -> Self {
        Self { config }
    }

    /// Archive `source`, stamped with the current local time.
    pub fn create_archive(&self, source: &Path) -> Result<BackupArchive, BackupError> {
        self.create_archive_at(source, Local::now().naive_local())
    }

    /// Archive `source` with an explicit capture time.
    ///
    /// On failure the partially built workspace is removed before the error
    /// is returned.
    pub fn create_archive_at(
        &self,
        source: &Path,
        captured_at: NaiveDateTime,
    ) -> Result<BackupArchive, BackupError> {
        info!("Creating temporary backup workspace");
        let workspace = Workspace::create(&self.config).map_err(|e| {
            error!("Failed to create backup archive: {}", e);
            e
        })?;
        info!("Temporary workspace created: {}", workspace.path().display());

        let timestamp = capture_timestamp(&captured_at);
        match self.populate(&workspace, source, &timestamp) {
            Ok((path, size_bytes)) => {
                let file_name = self.config.archive_file_name(&timestamp);
                Ok(BackupArchive { path, file_name, timestamp, size_bytes, workspace })
            }
            Err(e) => {
                error!("Failed to create backup archive: {} ({:?})", e, e);
                workspace.cleanup();
                Err(e)
            }
        }
    }

    fn populate(
        &self,
        workspace: &Workspace,
        source: &Path,
        timestamp: &str,
    ) -> Result<(PathBuf, u64), BackupError> {
        let staged = workspace.path().join(self.config.staging_dir_name(timestamp));
        info!("Copying {} to {}", source.display(), staged.display());
        let stats = copy::copy_tree(source, &staged)?;
        info!(
            "Data copy finished: {} files, {} directories, {} bytes",
            stats.files, stats.directories, stats.bytes
        );

        let zip_path = workspace.path().join(self.config.archive_file_name(timestamp));
        info!("Creating archive: {}", zip_path.display());
        let size = compress::zip_directory(&staged, &zip_path)?;
        info!("Archive created, size: {:.2} MiB", size as f64 / BYTES_PER_MIB);

        Ok((zip_path, size))
    }
}
