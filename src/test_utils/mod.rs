//! Test utilities for siyuan-backup
//!
//! Fixtures shared by the unit test modules.

#![cfg(test)]

use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use crate::config::{ArchiveConfig, BackupConfig, SourceConfig};

/// Creates a temporary directory that is automatically cleaned up
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file structure in a temporary directory
pub fn create_test_file_structure() -> Result<TempDir> {
    let temp_dir = create_temp_dir()?;
    let base_path = temp_dir.path();

    // Create directory structure
    fs::create_dir_all(base_path.join("dir1/subdir1"))?;
    fs::create_dir_all(base_path.join("dir2"))?;

    // Create test files
    fs::write(base_path.join("file1.txt"), b"Test content 1")?;
    fs::write(base_path.join("file2.log"), b"Test log content")?;
    fs::write(base_path.join("dir1/file3.txt"), b"Test content 3")?;
    fs::write(base_path.join("dir1/subdir1/file4.txt"), b"Test content 4")?;
    fs::write(base_path.join("dir2/file5.log"), b"Another log file")?;

    Ok(temp_dir)
}

/// A fake home directory containing `SiYuan/data` with one note, and a
/// separate temp root for workspaces.
pub struct TestHome {
    pub home: TempDir,
    pub temp_root: TempDir,
}

impl TestHome {
    pub fn new() -> Result<Self> {
        let home = create_temp_dir()?;
        let data = home.path().join("SiYuan").join("data");
        fs::create_dir_all(data.join("20240115120000-abcdefg"))?;
        fs::write(data.join("20240115120000-abcdefg").join("note.md"), b"0123456789")?;
        Ok(Self { home, temp_root: create_temp_dir()? })
    }

    pub fn data_dir(&self) -> PathBuf {
        self.home.path().join("SiYuan").join("data")
    }

    /// Backup configuration reading from and writing into the test dirs
    pub fn config(&self) -> BackupConfig {
        BackupConfig {
            source: SourceConfig {
                root: Some(self.home.path().to_path_buf()),
                ..SourceConfig::default()
            },
            archive: ArchiveConfig {
                temp_root: Some(self.temp_root.path().to_path_buf()),
                ..ArchiveConfig::default()
            },
            ..BackupConfig::default()
        }
    }

    /// Number of entries left in the temp root
    pub fn workspace_count(&self) -> usize {
        fs::read_dir(self.temp_root.path()).map(|d| d.count()).unwrap_or(0)
    }
}
