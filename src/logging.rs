//! Log file setup.
//!
//! All output goes to a daily rotating file, nothing is written to the
//! console. Records are queued to a background writer so logging never
//! blocks the backup. The returned [`LoggingContext`] owns that writer:
//! keep it alive for the whole run, dropping it flushes the queue.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, LevelFilter};
use simplelog::{ConfigBuilder, WriteLogger};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};

use crate::config::LogConfig;
use crate::constants::APP_NAME;
use crate::privileges;

/// Handle on the initialized logger.
pub struct LoggingContext {
    log_dir: PathBuf,
    _guard: WorkerGuard,
}

impl LoggingContext {
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

/// Initialize the process logger from `config`.
///
/// Must run before any backup stage. Fails when the log directory cannot be
/// created or a logger is already installed.
pub fn init(config: &LogConfig) -> Result<LoggingContext> {
    let log_dir = config.directory.clone().unwrap_or_else(default_log_dir);
    fs::create_dir_all(&log_dir)
        .context(format!("Failed to create log directory {}", log_dir.display()))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(config.file_name.as_str())
        .max_log_files(config.retention_days)
        .build(&log_dir)
        .context("Failed to create rolling log file")?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_thread_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Error)
        .build();

    WriteLogger::init(config.level, log_config, writer)
        .context("Failed to initialize logger")?;

    info!("Logging to {}", log_dir.display());
    Ok(LoggingContext { log_dir, _guard: guard })
}

/// Platform log directory for the current user.
pub fn default_log_dir() -> PathBuf {
    resolve_log_dir(dirs::home_dir().as_deref(), privileges::is_root())
}

/// Pick the log directory for a home directory and privilege level.
///
/// Windows uses the roaming application data directory. On POSIX, root logs
/// to the system log directory and everyone else to `~/.local/share`.
pub fn resolve_log_dir(home: Option<&Path>, is_root: bool) -> PathBuf {
    let home = home
        .map(Path::to_path_buf)
        .unwrap_or_else(std::env::temp_dir);

    if cfg!(windows) {
        let app_data = std::env::var_os("APPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join("AppData").join("Roaming"));
        app_data.join(APP_NAME).join("logs")
    } else if cfg!(unix) {
        if is_root {
            let system_logs = if Path::new("/var/log").exists() {
                "/var/log"
            } else {
                "/Library/Logs"
            };
            Path::new(system_logs).join(APP_NAME)
        } else {
            home.join(".local").join("share").join(APP_NAME).join("logs")
        }
    } else {
        home.join(format!(".{}", APP_NAME)).join("logs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_user_log_dir() {
        let dir = resolve_log_dir(Some(Path::new("/home/alice")), false);
        assert_eq!(dir, PathBuf::from("/home/alice/.local/share/siyuan_backup/logs"));
    }

    #[cfg(unix)]
    #[test]
    fn test_root_log_dir() {
        let dir = resolve_log_dir(Some(Path::new("/root")), true);
        assert!(
            dir == PathBuf::from("/var/log/siyuan_backup")
                || dir == PathBuf::from("/Library/Logs/siyuan_backup")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_missing_home_falls_back_to_temp() {
        let dir = resolve_log_dir(None, false);
        assert!(dir.starts_with(std::env::temp_dir()));
        assert!(dir.ends_with("siyuan_backup/logs"));
    }

    #[cfg(windows)]
    #[test]
    fn test_windows_log_dir_is_under_app_data() {
        let dir = resolve_log_dir(Some(Path::new("C:\\Users\\alice")), false);
        assert!(dir.ends_with("siyuan_backup\\logs"));
    }
}
