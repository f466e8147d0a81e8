use std::path::Path;

use log::{error, info, warn};

use crate::cloud::retry::{retry_bounded, RetryError};
use crate::cloud::store::{ObjectStore, StoreError};
use crate::config::StorageConfig;
use crate::error::BackupError;

/// Where an archive ended up and how many attempts it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub bucket: String,
    pub key: String,
    pub attempts: u32,
}

/// Uploads archives to the configured bucket with bounded retries.
#[derive(Debug, Clone, Default)]
pub struct Uploader {
    config: StorageConfig,
}

impl Uploader {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Upload `archive` to `<key_prefix><file name>`.
    ///
    /// Transient failures are retried immediately up to `max_attempts` in
    /// total. Any other failure ends the upload on the attempt it occurs.
    pub async fn upload(
        &self,
        store: &dyn ObjectStore,
        archive: &Path,
    ) -> Result<UploadReceipt, BackupError> {
        let file_name = match archive.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => {
                error!("Archive path has no file name: {}", archive.display());
                return Err(BackupError::Configuration(format!(
                    "archive path has no file name: {}",
                    archive.display()
                )));
            }
        };

        let bucket = self.config.bucket.as_str();
        let key = self.config.object_key(&file_name);
        let max_attempts = self.config.max_attempts;
        info!("Uploading {} to cos://{}/{}", file_name, bucket, key);

        let key_ref = key.as_str();
        let result = retry_bounded(max_attempts, StoreError::is_transient, |attempt| async move {
            match store.put_file(bucket, key_ref, archive).await {
                Ok(()) => {
                    info!("Upload succeeded (attempt {})", attempt);
                    Ok(())
                }
                Err(e) => {
                    if e.is_transient() {
                        warn!("Upload attempt {}/{} failed: {}", attempt, max_attempts, e);
                    }
                    Err(e)
                }
            }
        })
        .await;

        match result {
            Ok(((), attempts)) => Ok(UploadReceipt {
                bucket: bucket.to_string(),
                key,
                attempts,
            }),
            Err(RetryError { attempts, error: e }) => {
                if e.is_transient() {
                    error!("Reached maximum of {} upload attempts, giving up: {}", attempts, e);
                } else {
                    error!("Upload failed on attempt {} with non-retryable error: {} ({:?})", attempts, e, e);
                }
                Err(BackupError::Upload { attempts, source: e })
            }
        }
    }
}
