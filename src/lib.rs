//! # siyuan-backup
//!
//! Scheduled backup of the SiYuan note-taking application's data directory
//! to Tencent COS.
//!
//! ## Overview
//!
//! A run locates `~/SiYuan/data`, copies it into a fresh temporary workspace,
//! zips the copy into `SiYuan-<YYYYMMDD-HHMMSS>.zip`, uploads that archive to
//! `siyuan_backup/` in the backup bucket with up to three attempts, and always
//! removes the workspace afterwards. Outcome and diagnostics go to a rotating
//! log file only.
//!
//! ## Usage
//!
//! ```no_run
//! use siyuan_backup::backup;
//! use siyuan_backup::config::BackupConfig;
//! use siyuan_backup::logging;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = BackupConfig::default();
//! let _logging = logging::init(&config.logging)?;
//!
//! let report = backup::run(&config);
//! assert!(report.workspace.as_ref().map_or(true, |w| !w.exists()));
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`source`]: Locating the data directory
//! - [`archive`]: Workspace, staging copy and ZIP creation
//! - [`cloud`]: Object store trait, COS client, retrying uploader
//! - [`backup`]: Orchestration and run report
//! - [`config`]: Immutable run configuration and credentials
//! - [`logging`]: Rotating, non-blocking log file
//! - [`error`]: Error taxonomy
//! - [`constants`]: Application constants

/// Orchestration of a backup run
pub mod backup;

/// Workspace, staging copy and archive creation
pub mod archive;

/// Object storage upload
pub mod cloud;

/// Run configuration and credentials
pub mod config;

/// Application constants and configuration values
pub mod constants;

/// Error types
pub mod error;

/// Log file initialization
pub mod logging;

/// Privilege checks used to pick the log directory
pub mod privileges;

/// Locating the SiYuan data directory
pub mod source;

/// Test utilities and helpers
#[cfg(test)]
pub mod test_utils;
