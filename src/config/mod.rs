// Re-export all items from the submodules
mod backup_config;
mod env_vars;

// Re-export backup config
pub use backup_config::{
    ArchiveConfig,
    BackupConfig,
    LogConfig,
    SourceConfig,
    StorageConfig,
};

// Re-export credential lookup
pub use env_vars::{
    Credentials,
    read_required_var,
};
