//! Storage module for equipment files
//!
//! Provides the `ObjectStorage` seam used by the attachment and training video
//! services, and its MinIO/S3-compatible implementation.

mod minio_client;

use async_trait::async_trait;

use crate::core::error::{AppError, Result};

pub use minio_client::MinIOClient;

/// Outcome of making sure a container exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketProvision {
    Created,
    AlreadyExists,
    /// Creation failed for another reason; the container is assumed to exist
    Assumed,
}

/// Upload rules enforced by a storage container itself
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketRules {
    /// Maximum object size in bytes
    pub max_object_size: Option<usize>,
    /// Required MIME type prefix (e.g. `video/`)
    pub content_type_prefix: Option<String>,
}

impl BucketRules {
    /// Rules for the training video container: video content only, bounded size
    pub fn video_only(max_object_size: usize) -> Self {
        Self {
            max_object_size: Some(max_object_size),
            content_type_prefix: Some("video/".to_string()),
        }
    }

    pub fn check(&self, bucket: &str, content_type: &str, size: usize) -> Result<()> {
        if let Some(prefix) = &self.content_type_prefix {
            if !content_type.starts_with(prefix.as_str()) {
                return Err(AppError::Storage(format!(
                    "Bucket '{}' only accepts '{}*' content, got '{}'",
                    bucket, prefix, content_type
                )));
            }
        }
        if let Some(max) = self.max_object_size {
            if size > max {
                return Err(AppError::Storage(format!(
                    "Object of {} bytes exceeds the {} byte limit of bucket '{}'",
                    size, max, bucket
                )));
            }
        }
        Ok(())
    }
}

/// One object-storage container with publicly resolvable object URLs
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    fn bucket_name(&self) -> String;

    /// Create the container if it is missing
    async fn ensure_bucket(&self) -> Result<BucketProvision>;

    /// Upload an object, overwriting any object with the same key
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<String>;

    async fn delete(&self, key: &str) -> Result<()>;

    async fn exists(&self, key: &str) -> Result<bool>;

    fn public_url(&self, key: &str) -> String;

    /// Recover the object key from a URL produced by `public_url`
    fn extract_key_from_url(&self, url: &str) -> Option<String>;
}

/// Percent-encode each segment of an object key for use in a URL
pub fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Reverse of `encode_key`
pub fn decode_key(encoded: &str) -> Option<String> {
    urlencoding::decode(encoded).ok().map(|s| s.into_owned())
}
