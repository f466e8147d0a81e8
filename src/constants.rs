//! Global constants for siyuan-backup.
//!
//! Every fixed value of a backup run lives here. `config::BackupConfig`
//! gathers them into the immutable configuration handed to each stage.

/// Application name, used for log directories and the log file name
pub const APP_NAME: &str = "siyuan_backup";

// Source data
/// Directory under the user's home holding the SiYuan workspace
pub const SOURCE_WORKSPACE_DIR: &str = "SiYuan";

/// Data directory inside the SiYuan workspace
pub const SOURCE_DATA_DIR: &str = "data";

// Archive naming
/// Prefix of the per-run temporary workspace directory
pub const WORKSPACE_PREFIX: &str = "siyuan_backup_";

/// Prefix of the staged copy directory (`data-<timestamp>`)
pub const STAGING_DIR_PREFIX: &str = "data-";

/// Prefix of the archive base name (`SiYuan-<timestamp>`)
pub const ARCHIVE_PREFIX: &str = "SiYuan-";

/// Archive file extension
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Capture timestamp format, second resolution
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Files larger than this are stored with ZIP64 extensions
pub const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

/// Extensions that are already compressed and only get the fastest deflate level
pub const COMPRESSED_EXTENSIONS: &[&str] = &[
    "zip", "gz", "xz", "bz2", "7z", "rar", "jpg", "jpeg", "png", "gif", "webp", "mp3", "mp4",
    "avi", "mov", "mpg", "mpeg", "pdf",
];

// Object storage
/// COS region of the backup bucket
pub const COS_REGION: &str = "ap-guangzhou";

/// Backup bucket name
pub const COS_BUCKET: &str = "siyuan-backup-1303239686";

/// Key prefix for every uploaded archive
pub const COS_KEY_PREFIX: &str = "siyuan_backup/";

/// Environment variable holding the COS secret id
pub const SECRET_ID_VAR: &str = "COS_SECRET_ID";

/// Environment variable holding the COS secret key
pub const SECRET_KEY_VAR: &str = "COS_SECRET_KEY";

/// Maximum upload attempts, retries are immediate
pub const MAX_UPLOAD_ATTEMPTS: u32 = 3;

/// Archives above this size go through multipart upload (50MB)
pub const MULTIPART_THRESHOLD: u64 = 50 * 1024 * 1024;

/// Multipart part size (8MB, S3 minimum is 5MB)
pub const MULTIPART_PART_SIZE: usize = 8 * 1024 * 1024;

/// S3 minimum part size for multipart uploads (5MB)
pub const S3_MIN_PART_SIZE: usize = 5 * 1024 * 1024;

// Logging
/// Base name of the rotating log file
pub const LOG_FILE_NAME: &str = "siyuan_backup.log";

/// Number of daily log files kept
pub const LOG_RETENTION_DAYS: usize = 30;

/// Bytes per MiB, for size reporting
pub const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;
