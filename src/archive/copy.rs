use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

use crate::error::BackupError;

/// Counts of what a staging copy wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub files: u64,
    pub directories: u64,
    pub bytes: u64,
}

/// Recursively copy `source` into `dest`, which must not exist yet.
///
/// Symlinks are followed and their targets copied, so the staged tree only
/// holds regular files and directories. Empty directories are kept.
pub fn copy_tree(source: &Path, dest: &Path) -> Result<CopyStats, BackupError> {
    let mut stats = CopyStats::default();

    for entry in WalkDir::new(source).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| source.to_path_buf());
            BackupError::Copy { path, source: io::Error::from(e) }
        })?;

        let rel_path = entry.path().strip_prefix(source).map_err(|_| BackupError::Copy {
            path: entry.path().to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "entry outside source tree"),
        })?;
        let target = dest.join(rel_path);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| copy_error(&target, e))?;
            stats.directories += 1;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| copy_error(parent, e))?;
            }
            let copied = fs::copy(entry.path(), &target).map_err(|e| copy_error(entry.path(), e))?;
            debug!("Staged {} ({} bytes)", rel_path.display(), copied);
            stats.files += 1;
            stats.bytes += copied;
        }
    }

    Ok(stats)
}

fn copy_error(path: &Path, source: io::Error) -> BackupError {
    BackupError::Copy { path: PathBuf::from(path), source }
}
