use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use rusoto_core::{ByteStream, HttpClient, Region};
use rusoto_credential::StaticProvider;
use rusoto_s3::{
    AbortMultipartUploadRequest, CompleteMultipartUploadRequest, CompletedMultipartUpload,
    CompletedPart, CreateMultipartUploadRequest, PutObjectRequest, S3Client, UploadPartRequest, S3,
};
use tokio::fs::File as AsyncFile;
use tokio::io::AsyncReadExt;

use crate::cloud::store::{ObjectStore, StoreConnector, StoreError};
use crate::config::{Credentials, StorageConfig};
use crate::constants::S3_MIN_PART_SIZE;
use crate::error::BackupError;

/// Tencent COS through its S3-compatible API.
pub struct CosStore {
    client: S3Client,
    region: Region,
    multipart_threshold: u64,
    part_size: usize,
}

impl CosStore {
    /// Build a client for `config` signed with `credentials`.
    pub fn new(config: &StorageConfig, credentials: Credentials) -> Result<Self, BackupError> {
        let region = Region::Custom {
            name: config.region.clone(),
            endpoint: config.endpoint(),
        };

        let http_client = HttpClient::new().map_err(|e| {
            BackupError::Configuration(format!("failed to create HTTP client: {}", e))
        })?;
        let provider = StaticProvider::new_minimal(credentials.secret_id, credentials.secret_key);

        Ok(Self {
            client: S3Client::new_with(http_client, provider, region.clone()),
            region,
            multipart_threshold: config.multipart_threshold,
            part_size: config.part_size.max(S3_MIN_PART_SIZE),
        })
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    /// Upload a small file using PutObject
    async fn put_small(&self, bucket: &str, key: &str, path: &Path) -> Result<(), StoreError> {
        let contents = tokio::fs::read(path)
            .await
            .map_err(|e| StoreError::local_file(path, e))?;

        let request = PutObjectRequest {
            bucket: bucket.to_string(),
            key: key.to_string(),
            content_length: Some(contents.len() as i64),
            body: Some(ByteStream::from(contents)),
            ..Default::default()
        };

        self.client.put_object(request).await?;
        Ok(())
    }

    /// Upload a large file part by part, aborting the upload on any failure
    async fn put_multipart(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        file_size: u64,
    ) -> Result<(), StoreError> {
        let created = self
            .client
            .create_multipart_upload(CreateMultipartUploadRequest {
                bucket: bucket.to_string(),
                key: key.to_string(),
                ..Default::default()
            })
            .await?;
        let upload_id = created
            .upload_id
            .ok_or_else(|| StoreError::Request("no upload id returned".to_string()))?;
        debug!("Started multipart upload {} for {}", upload_id, key);

        match self.upload_parts(bucket, key, &upload_id, path, file_size).await {
            Ok(parts) => {
                self.client
                    .complete_multipart_upload(CompleteMultipartUploadRequest {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                        upload_id,
                        multipart_upload: Some(CompletedMultipartUpload { parts: Some(parts) }),
                        ..Default::default()
                    })
                    .await?;
                Ok(())
            }
            Err(e) => {
                let aborted = self
                    .client
                    .abort_multipart_upload(AbortMultipartUploadRequest {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                        upload_id: upload_id.clone(),
                        ..Default::default()
                    })
                    .await;
                if let Err(abort_err) = aborted {
                    warn!("Failed to abort multipart upload {}: {}", upload_id, abort_err);
                }
                Err(e)
            }
        }
    }

    async fn upload_parts(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        path: &Path,
        file_size: u64,
    ) -> Result<Vec<CompletedPart>, StoreError> {
        let mut file = AsyncFile::open(path)
            .await
            .map_err(|e| StoreError::local_file(path, e))?;

        let num_parts = part_count(file_size, self.part_size);
        let mut parts = Vec::with_capacity(num_parts as usize);
        let mut remaining = file_size;

        for part_number in 1..=num_parts {
            let part_len = remaining.min(self.part_size as u64) as usize;
            let mut buffer = vec![0u8; part_len];
            file.read_exact(&mut buffer)
                .await
                .map_err(|e| StoreError::local_file(path, e))?;
            remaining -= part_len as u64;

            let output = self
                .client
                .upload_part(UploadPartRequest {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                    upload_id: upload_id.to_string(),
                    part_number: part_number as i64,
                    content_length: Some(part_len as i64),
                    body: Some(ByteStream::from(buffer)),
                    ..Default::default()
                })
                .await?;
            let e_tag = output
                .e_tag
                .ok_or_else(|| StoreError::Request(format!("no ETag for part {}", part_number)))?;

            debug!("Uploaded part {}/{} of {}", part_number, num_parts, key);
            parts.push(CompletedPart {
                e_tag: Some(e_tag),
                part_number: Some(part_number as i64),
            });
        }

        Ok(parts)
    }
}

#[async_trait]
impl ObjectStore for CosStore {
    async fn put_file(&self, bucket: &str, key: &str, path: &Path) -> Result<(), StoreError> {
        let file_size = tokio::fs::metadata(path)
            .await
            .map_err(|e| StoreError::local_file(path, e))?
            .len();

        if file_size > self.multipart_threshold {
            self.put_multipart(bucket, key, path, file_size).await
        } else {
            self.put_small(bucket, key, path).await
        }
    }
}

/// Number of parts needed for `file_size` bytes, at least one.
pub fn part_count(file_size: u64, part_size: usize) -> u64 {
    let part_size = part_size.max(1) as u64;
    ((file_size + part_size - 1) / part_size).max(1)
}

/// Connects to COS with credentials from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct CosConnector;

impl StoreConnector for CosConnector {
    fn connect(&self, config: &StorageConfig) -> Result<Arc<dyn ObjectStore>, BackupError> {
        let credentials = Credentials::from_env(config)?;
        Ok(Arc::new(CosStore::new(config, credentials)?))
    }
}
