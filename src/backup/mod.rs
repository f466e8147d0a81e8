//! Running one backup end to end.
//!
//! ```text
//! START ──▶ ARCHIVING ──▶ UPLOADING ──▶ DONE
//!               │              │
//!               └──────────────┴──▶ FAILED
//! ```
//!
//! Every stage error ends up here, is logged, and becomes a failed
//! [`BackupReport`]. Nothing is re-raised. Once an archive exists its
//! workspace is removed whatever the upload outcome.

/// Run summary
pub mod report;

use std::time::Instant;

use log::{debug, error, info};
use tokio::runtime::Runtime;

use crate::archive::{Archiver, BackupArchive};
use crate::cloud::cos::CosConnector;
use crate::cloud::store::StoreConnector;
use crate::cloud::uploader::Uploader;
use crate::config::BackupConfig;
use crate::error::BackupError;
use crate::source;

pub use report::{BackupOutcome, BackupReport, BackupStage};

/// Run a backup against COS with credentials from the environment.
///
/// Builds its own tokio runtime; a runtime failure is reported like any
/// other failed run.
pub fn run(config: &BackupConfig) -> BackupReport {
    match Runtime::new() {
        Ok(runtime) => runtime.block_on(run_backup(config, &CosConnector)),
        Err(e) => {
            error!("===== SiYuan backup failed: cannot start async runtime: {} =====", e);
            let mut report = BackupReport::default();
            report.error = Some(format!("cannot start async runtime: {}", e));
            report
        }
    }
}

/// Run one backup: locate, archive, upload, clean up.
pub async fn run_backup(config: &BackupConfig, connector: &dyn StoreConnector) -> BackupReport {
    let started = Instant::now();
    info!("===== SiYuan backup started =====");

    let mut report = BackupReport::default();
    let mut archive: Option<BackupArchive> = None;
    let result = execute(config, connector, &mut archive, &mut report).await;

    match &result {
        Ok(()) => info!("===== SiYuan backup succeeded ====="),
        Err(e) => error!("===== SiYuan backup failed: {} =====", e),
    }

    if let Some(archive) = archive.take() {
        archive.cleanup();
    }

    report.finish(&result, started.elapsed());
    info!("Backup report: {}", report.to_json());
    report
}

async fn execute(
    config: &BackupConfig,
    connector: &dyn StoreConnector,
    slot: &mut Option<BackupArchive>,
    report: &mut BackupReport,
) -> Result<(), BackupError> {
    report.enter(BackupStage::Archiving);
    debug!("Entering stage {}", report.stage);
    let source_dir = source::locate(&config.source)?;
    let archiver = Archiver::new(config.archive.clone());
    let archive = slot.insert(archiver.create_archive(&source_dir)?);
    report.record_archive(archive);

    report.enter(BackupStage::Uploading);
    debug!("Entering stage {}", report.stage);
    let store = connector.connect(&config.storage)?;
    let uploader = Uploader::new(config.storage.clone());
    let receipt = uploader.upload(store.as_ref(), archive.path()).await?;
    report.record_upload(&receipt);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::store::{MockObjectStore, ObjectStore, StoreError};
    use crate::config::{Credentials, StorageConfig};
    use crate::test_utils::TestHome;
    use std::cell::Cell;
    use std::sync::Arc;

    /// Hands out a prepared store, counting connections
    struct MockConnector {
        store: Arc<dyn ObjectStore>,
        connects: Cell<u32>,
    }

    impl MockConnector {
        fn new(store: MockObjectStore) -> Self {
            Self { store: Arc::new(store), connects: Cell::new(0) }
        }
    }

    impl StoreConnector for MockConnector {
        fn connect(&self, _config: &StorageConfig) -> Result<Arc<dyn ObjectStore>, BackupError> {
            self.connects.set(self.connects.get() + 1);
            Ok(Arc::clone(&self.store))
        }
    }

    /// Reads credentials from an empty environment
    struct NoCredentials;

    impl StoreConnector for NoCredentials {
        fn connect(&self, config: &StorageConfig) -> Result<Arc<dyn ObjectStore>, BackupError> {
            Credentials::from_lookup(config, |_| None)?;
            panic!("connector must fail before building a client");
        }
    }

    #[tokio::test]
    async fn test_successful_run_cleans_workspace() {
        let home = TestHome::new().unwrap();
        let mut store = MockObjectStore::new();
        store.expect_put_file().times(1).returning(|_, key, path| {
            assert!(key.starts_with("siyuan_backup/SiYuan-"));
            assert!(path.exists(), "archive must exist during upload");
            Ok(())
        });
        let connector = MockConnector::new(store);

        let report = run_backup(&home.config(), &connector).await;

        assert!(report.succeeded(), "report: {:?}", report);
        assert_eq!(report.stage, BackupStage::Done);
        assert_eq!(report.upload_attempts, 1);
        assert_eq!(connector.connects.get(), 1);
        assert!(!report.workspace.unwrap().exists());
        assert_eq!(home.workspace_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_failure_still_cleans_workspace() {
        let home = TestHome::new().unwrap();
        let mut store = MockObjectStore::new();
        store
            .expect_put_file()
            .times(3)
            .returning(|_, _, _| Err(StoreError::Service("InternalError".to_string())));
        let connector = MockConnector::new(store);

        let report = run_backup(&home.config(), &connector).await;

        assert!(!report.succeeded());
        assert_eq!(report.stage, BackupStage::Uploading);
        assert_eq!(report.upload_attempts, 3);
        assert_eq!(report.error_kind, Some("upload"));
        assert_eq!(home.workspace_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_source_creates_nothing() {
        let home = TestHome::new().unwrap();
        std::fs::remove_dir_all(home.data_dir()).unwrap();
        let connector = MockConnector::new(MockObjectStore::new());

        let report = run_backup(&home.config(), &connector).await;

        assert!(!report.succeeded());
        assert_eq!(report.stage, BackupStage::Archiving);
        assert_eq!(report.error_kind, Some("source_not_found"));
        assert!(report.archive_name.is_none());
        assert_eq!(connector.connects.get(), 0);
        assert_eq!(home.workspace_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_credentials_after_archive() {
        let home = TestHome::new().unwrap();

        let report = run_backup(&home.config(), &NoCredentials).await;

        assert!(!report.succeeded());
        assert_eq!(report.error_kind, Some("configuration"));
        assert_eq!(report.upload_attempts, 0);
        // The archive was built before the credential check
        assert!(report.archive_name.unwrap().starts_with("SiYuan-"));
        assert_eq!(home.workspace_count(), 0);
    }
}
