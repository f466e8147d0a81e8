//! Uploading archives to object storage.
//!
//! The remote side sits behind the [`store::ObjectStore`] trait. The real
//! implementation, [`cos::CosStore`], talks to Tencent COS through its
//! S3-compatible API with `rusoto_s3`. [`uploader::Uploader`] drives an
//! `ObjectStore` through the bounded retry loop in [`retry`].
//!
//! ```text
//! ┌──────────┐   put_file    ┌───────────────┐   S3 API   ┌────────────┐
//! │ Uploader │──────────────▶│ ObjectStore   │───────────▶│ COS bucket │
//! │ (retry)  │   ≤ 3 tries   │ (CosStore)    │            └────────────┘
//! └──────────┘               └───────────────┘
//! ```
//!
//! Only client errors (no response) and service errors are retried, and
//! retries are immediate.

/// Tencent COS client
pub mod cos;

/// Bounded retry combinator
pub mod retry;

/// Object store trait and error classification
pub mod store;

/// Upload with retries
pub mod uploader;
