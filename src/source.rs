//! Locating the SiYuan data directory.

use std::path::PathBuf;

use log::{error, info};

use crate::config::SourceConfig;
use crate::error::BackupError;

/// Resolve the data directory to back up and check that it exists.
///
/// A missing directory is not transient, so there is no retry.
pub fn locate(config: &SourceConfig) -> Result<PathBuf, BackupError> {
    let home = dirs::home_dir();
    let source_dir = match config.resolve(home.as_deref()) {
        Some(path) => path,
        None => {
            error!("Cannot determine home directory for {}", config.relative_path.display());
            return Err(BackupError::SourceNotFound {
                path: config.relative_path.clone(),
            });
        }
    };

    info!("SiYuan data directory: {}", source_dir.display());
    if !source_dir.is_dir() {
        error!("SiYuan data directory does not exist: {}", source_dir.display());
        return Err(BackupError::SourceNotFound { path: source_dir });
    }

    Ok(source_dir)
}
