use std::path::{Path, PathBuf};

use log::LevelFilter;

use crate::constants::{
    ARCHIVE_EXTENSION, ARCHIVE_PREFIX, COS_BUCKET, COS_KEY_PREFIX, COS_REGION,
    LOG_FILE_NAME, LOG_RETENTION_DAYS, MAX_UPLOAD_ATTEMPTS, MULTIPART_PART_SIZE,
    MULTIPART_THRESHOLD, SECRET_ID_VAR, SECRET_KEY_VAR, SOURCE_DATA_DIR, SOURCE_WORKSPACE_DIR,
    STAGING_DIR_PREFIX, WORKSPACE_PREFIX,
};

/// Immutable configuration of one backup run.
///
/// There is no configuration file and no command line: `BackupConfig::default()`
/// is what the binary runs with. Tests build their own values to point the
/// stages at temporary directories.
#[derive(Debug, Clone, Default)]
pub struct BackupConfig {
    pub source: SourceConfig,
    pub archive: ArchiveConfig,
    pub storage: StorageConfig,
    pub logging: LogConfig,
}

/// Where the SiYuan data directory lives.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Base directory replacing the user's home directory when set
    pub root: Option<PathBuf>,
    /// Path of the data directory relative to the base directory
    pub relative_path: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            root: None,
            relative_path: Path::new(SOURCE_WORKSPACE_DIR).join(SOURCE_DATA_DIR),
        }
    }
}

impl SourceConfig {
    /// Resolve the data directory against `root`, or `home` when no root is set.
    pub fn resolve(&self, home: Option<&Path>) -> Option<PathBuf> {
        self.root
            .as_deref()
            .or(home)
            .map(|base| base.join(&self.relative_path))
    }
}

/// Naming and placement of the temporary workspace and the archive.
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    /// Directory the workspace is created in, the system temp root when unset
    pub temp_root: Option<PathBuf>,
    pub workspace_prefix: String,
    pub staging_prefix: String,
    pub archive_prefix: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            temp_root: None,
            workspace_prefix: WORKSPACE_PREFIX.to_string(),
            staging_prefix: STAGING_DIR_PREFIX.to_string(),
            archive_prefix: ARCHIVE_PREFIX.to_string(),
        }
    }
}

impl ArchiveConfig {
    pub fn temp_root(&self) -> PathBuf {
        self.temp_root.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Name of the staged copy directory for a capture timestamp
    pub fn staging_dir_name(&self, timestamp: &str) -> String {
        format!("{}{}", self.staging_prefix, timestamp)
    }

    /// File name of the archive for a capture timestamp
    pub fn archive_file_name(&self, timestamp: &str) -> String {
        format!("{}{}.{}", self.archive_prefix, timestamp, ARCHIVE_EXTENSION)
    }
}

/// Remote bucket and upload behavior.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub region: String,
    pub bucket: String,
    /// S3-compatible endpoint, derived from the region when unset
    pub endpoint: Option<String>,
    pub key_prefix: String,
    pub secret_id_var: String,
    pub secret_key_var: String,
    pub max_attempts: u32,
    pub multipart_threshold: u64,
    pub part_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            region: COS_REGION.to_string(),
            bucket: COS_BUCKET.to_string(),
            endpoint: None,
            key_prefix: COS_KEY_PREFIX.to_string(),
            secret_id_var: SECRET_ID_VAR.to_string(),
            secret_key_var: SECRET_KEY_VAR.to_string(),
            max_attempts: MAX_UPLOAD_ATTEMPTS,
            multipart_threshold: MULTIPART_THRESHOLD,
            part_size: MULTIPART_PART_SIZE,
        }
    }
}

impl StorageConfig {
    pub fn endpoint(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| format!("https://cos.{}.myqcloud.com", self.region))
    }

    /// Object key for an archive file name
    pub fn object_key(&self, file_name: &str) -> String {
        format!("{}{}", self.key_prefix, file_name)
    }
}

/// Rotating log file settings.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log directory, the platform default when unset
    pub directory: Option<PathBuf>,
    pub file_name: String,
    pub retention_days: usize,
    pub level: LevelFilter,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            directory: None,
            file_name: LOG_FILE_NAME.to_string(),
            retention_days: LOG_RETENTION_DAYS,
            level: LevelFilter::Info,
        }
    }
}
