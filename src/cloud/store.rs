use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use rusoto_core::RusotoError;

use crate::config::StorageConfig;
use crate::error::BackupError;

/// Failure of a single object upload.
///
/// `Client` and `Service` are the transient kinds worth another attempt;
/// everything else fails the upload immediately.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The request never got a response (DNS, TLS, connection reset, timeout)
    #[error("client error: {0}")]
    Client(String),

    /// The service answered with an error
    #[error("service error: {0}")]
    Service(String),

    /// Credentials could not be loaded or signed with
    #[error("credentials error: {0}")]
    Credentials(String),

    /// The request was rejected locally or the response could not be parsed
    #[error("request error: {0}")]
    Request(String),

    /// The archive could not be read
    #[error("cannot read {path}: {source}")]
    LocalFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Client(_) | StoreError::Service(_))
    }

    pub fn local_file(path: &Path, source: std::io::Error) -> Self {
        StoreError::LocalFile { path: path.display().to_string(), source }
    }
}

impl<E: std::error::Error + 'static> From<RusotoError<E>> for StoreError {
    fn from(err: RusotoError<E>) -> Self {
        match err {
            RusotoError::HttpDispatch(e) => StoreError::Client(e.to_string()),
            RusotoError::Service(e) => StoreError::Service(e.to_string()),
            RusotoError::Unknown(response) => StoreError::Service(format!(
                "HTTP {}: {}",
                response.status,
                response.body_as_str()
            )),
            RusotoError::Credentials(e) => StoreError::Credentials(e.to_string()),
            RusotoError::Validation(message) => StoreError::Request(message),
            RusotoError::ParseError(message) => StoreError::Request(message),
            RusotoError::Blocking => StoreError::Client("blocking operation failed".to_string()),
            #[allow(unreachable_patterns)]
            _ => StoreError::Request("unrecognized client error".to_string()),
        }
    }
}

/// Destination for backup archives.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload the file at `path` to `bucket` under `key`.
    async fn put_file(&self, bucket: &str, key: &str, path: &Path) -> Result<(), StoreError>;
}

/// Builds an [`ObjectStore`] for a run.
///
/// Connecting happens after the archive exists, so missing credentials never
/// prevent the archive from being built, and no client is constructed
/// without them.
pub trait StoreConnector {
    fn connect(&self, config: &StorageConfig) -> Result<Arc<dyn ObjectStore>, BackupError>;
}
