use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::archive::BackupArchive;
use crate::cloud::uploader::UploadReceipt;
use crate::error::BackupError;

/// Stage a run was in when it finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupStage {
    Start,
    Archiving,
    Uploading,
    Done,
}

impl fmt::Display for BackupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackupStage::Start => "start",
            BackupStage::Archiving => "archiving",
            BackupStage::Uploading => "uploading",
            BackupStage::Done => "done",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupOutcome {
    Succeeded,
    Failed,
}

/// Summary of one backup run, logged as a single JSON line at the end.
///
/// ```json
/// {
///   "outcome": "succeeded",
///   "stage": "done",
///   "archive_name": "SiYuan-20240115-143052.zip",
///   "archive_size_bytes": 1048576,
///   "object_key": "siyuan_backup/SiYuan-20240115-143052.zip",
///   "upload_attempts": 1,
///   "workspace": "/tmp/siyuan_backup_a1b2c3",
///   "duration_ms": 5230,
///   "error_kind": null,
///   "error": null
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct BackupReport {
    pub outcome: BackupOutcome,
    /// Last stage entered; for a failed run, the stage that failed
    pub stage: BackupStage,
    pub archive_name: Option<String>,
    pub archive_size_bytes: Option<u64>,
    pub object_key: Option<String>,
    pub upload_attempts: u32,
    pub workspace: Option<PathBuf>,
    pub duration_ms: u64,
    pub error_kind: Option<&'static str>,
    pub error: Option<String>,
}

impl Default for BackupReport {
    fn default() -> Self {
        Self {
            outcome: BackupOutcome::Failed,
            stage: BackupStage::Start,
            archive_name: None,
            archive_size_bytes: None,
            object_key: None,
            upload_attempts: 0,
            workspace: None,
            duration_ms: 0,
            error_kind: None,
            error: None,
        }
    }
}

impl BackupReport {
    pub fn succeeded(&self) -> bool {
        self.outcome == BackupOutcome::Succeeded
    }

    pub(crate) fn enter(&mut self, stage: BackupStage) {
        self.stage = stage;
    }

    pub(crate) fn record_archive(&mut self, archive: &BackupArchive) {
        self.archive_name = Some(archive.file_name().to_string());
        self.archive_size_bytes = Some(archive.size_bytes());
        self.workspace = Some(archive.workspace_path().to_path_buf());
    }

    pub(crate) fn record_upload(&mut self, receipt: &UploadReceipt) {
        self.object_key = Some(receipt.key.clone());
        self.upload_attempts = receipt.attempts;
    }

    pub(crate) fn finish(&mut self, result: &Result<(), BackupError>, elapsed: Duration) {
        self.duration_ms = elapsed.as_millis() as u64;
        match result {
            Ok(()) => {
                self.outcome = BackupOutcome::Succeeded;
                self.stage = BackupStage::Done;
            }
            Err(e) => {
                self.outcome = BackupOutcome::Failed;
                self.error_kind = Some(e.kind());
                self.error = Some(e.to_string());
                if let BackupError::Upload { attempts, .. } = e {
                    self.upload_attempts = *attempts;
                }
            }
        }
    }

    /// Single-line JSON rendering for the log.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::store::StoreError;

    #[test]
    fn test_default_report_is_failed_at_start() {
        let report = BackupReport::default();
        assert!(!report.succeeded());
        assert_eq!(report.stage, BackupStage::Start);
    }

    #[test]
    fn test_finish_success() {
        let mut report = BackupReport::default();
        report.enter(BackupStage::Uploading);
        report.record_upload(&UploadReceipt {
            bucket: "b".to_string(),
            key: "siyuan_backup/SiYuan-20240115-143052.zip".to_string(),
            attempts: 2,
        });
        report.finish(&Ok(()), Duration::from_millis(1500));

        assert!(report.succeeded());
        assert_eq!(report.stage, BackupStage::Done);
        assert_eq!(report.upload_attempts, 2);
        assert_eq!(report.duration_ms, 1500);
    }

    #[test]
    fn test_finish_upload_failure_keeps_stage() {
        let mut report = BackupReport::default();
        report.enter(BackupStage::Uploading);
        let err = BackupError::Upload {
            attempts: 3,
            source: StoreError::Client("timeout".to_string()),
        };
        report.finish(&Err(err), Duration::from_secs(1));

        assert!(!report.succeeded());
        assert_eq!(report.stage, BackupStage::Uploading);
        assert_eq!(report.upload_attempts, 3);
        assert_eq!(report.error_kind, Some("upload"));
    }

    #[test]
    fn test_json_fields() {
        let mut report = BackupReport::default();
        report.enter(BackupStage::Archiving);
        report.finish(
            &Err(BackupError::SourceNotFound { path: PathBuf::from("/home/u/SiYuan/data") }),
            Duration::from_millis(3),
        );

        let value: serde_json::Value = serde_json::from_str(&report.to_json()).unwrap();
        assert_eq!(value["outcome"], "failed");
        assert_eq!(value["stage"], "archiving");
        assert_eq!(value["error_kind"], "source_not_found");
        assert!(value["archive_name"].is_null());
    }
}
