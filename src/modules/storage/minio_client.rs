//! MinIO/S3-compatible storage client
//!
//! One client per container. Objects are served through public URLs, so every
//! container gets an anonymous read policy when it is provisioned.
//!
//! Uses rust-s3 crate for lightweight S3 operations.

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::{Client, Url};
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{Bucket, BucketConfiguration, Region};
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use super::{decode_key, encode_key, BucketProvision, BucketRules, ObjectStorage};
use crate::core::config::StorageConfig;
use crate::core::error::{AppError, Result};

type HmacSha256 = Hmac<Sha256>;

/// MinIO/S3-compatible storage client bound to a single bucket
pub struct MinIOClient {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    rules: BucketRules,
    endpoint: String,
    public_endpoint: String,
    /// Access key for AWS Signature v4 signing
    access_key: String,
    /// Secret key for AWS Signature v4 signing
    secret_key: String,
    /// Region name for AWS Signature v4 signing
    region_name: String,
    /// HTTP client for bucket policy operations
    http_client: Client,
}

impl MinIOClient {
    /// Create a client for `bucket_name`. The bucket is not touched until
    /// `ensure_bucket` is called.
    pub fn new(config: &StorageConfig, bucket_name: &str, rules: BucketRules) -> Result<Self> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Internal(format!("Failed to create storage credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(bucket_name, region.clone(), credentials.clone())
            .map_err(|e| AppError::Internal(format!("Failed to create storage bucket: {}", e)))?;

        // Use path-style URLs for MinIO (http://endpoint/bucket instead of http://bucket.endpoint)
        bucket.set_path_style();

        let http_client = Client::builder()
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            bucket,
            region,
            credentials,
            rules,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            public_endpoint: config.public_endpoint.trim_end_matches('/').to_string(),
            access_key: config.access_key.clone(),
            secret_key: config.secret_key.clone(),
            region_name: config.region.clone(),
            http_client,
        })
    }

    async fn create_bucket(&self) -> Result<()> {
        let bucket_config = BucketConfiguration::default();

        let response = Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            bucket_config,
        )
        .await
        .map_err(|e| {
            AppError::Storage(format!(
                "Failed to create bucket '{}': {}",
                self.bucket.name(),
                e
            ))
        })?;

        if !response.success() {
            return Err(AppError::Storage(format!(
                "Failed to create bucket '{}': HTTP {} {}",
                self.bucket.name(),
                response.response_code,
                response.response_text
            )));
        }

        Ok(())
    }

    /// Turn a non-2xx status into a storage error
    fn require_success(status: u16, action: &str, key: &str) -> Result<()> {
        if (200..300).contains(&status) {
            Ok(())
        } else {
            Err(AppError::Storage(format!(
                "Failed to {} file '{}': HTTP {}",
                action, key, status
            )))
        }
    }

    /// Allow anonymous reads on every object in the bucket
    async fn set_public_read_policy(&self) {
        let bucket_name = self.bucket.name();

        let policy = json!({
            "Version": "2012-10-17",
            "Statement": [
                {
                    "Effect": "Allow",
                    "Principal": {"AWS": "*"},
                    "Action": ["s3:GetObject"],
                    "Resource": [format!("arn:aws:s3:::{bucket_name}/*")]
                }
            ]
        });

        match self
            .put_bucket_policy_with_sigv4(&bucket_name, &policy.to_string())
            .await
        {
            Ok(_) => info!("Set public read policy for {}/*", bucket_name),
            Err(e) => warn!(
                "Failed to set bucket policy for '{}': {}. \
                You may need to set the policy manually using: \
                mc anonymous set download minio/{}",
                bucket_name, e, bucket_name
            ),
        }
    }

    /// Put bucket policy using AWS Signature v4
    async fn put_bucket_policy_with_sigv4(&self, bucket_name: &str, policy: &str) -> Result<()> {
        let now = Utc::now();
        let date_stamp = now.format("%Y%m%d").to_string();
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();

        let endpoint_url = Url::parse(&self.endpoint)
            .map_err(|e| AppError::Internal(format!("Invalid endpoint URL: {}", e)))?;
        let host = endpoint_url
            .host_str()
            .ok_or_else(|| AppError::Internal("Endpoint URL has no host".to_string()))?;
        let host_header = match endpoint_url.port() {
            Some(p) => format!("{}:{}", host, p),
            None => host.to_string(),
        };

        let url = format!("{}/{}?policy", self.endpoint, bucket_name);

        let payload_hash = hex::encode(Sha256::digest(policy.as_bytes()));

        let canonical_uri = format!("/{}", bucket_name);
        let canonical_querystring = "policy=";
        let canonical_headers = format!(
            "host:{}\nx-amz-content-sha256:{}\nx-amz-date:{}\n",
            host_header, payload_hash, amz_date
        );
        let signed_headers = "host;x-amz-content-sha256;x-amz-date";

        let canonical_request = format!(
            "PUT\n{}\n{}\n{}\n{}\n{}",
            canonical_uri, canonical_querystring, canonical_headers, signed_headers, payload_hash
        );

        let algorithm = "AWS4-HMAC-SHA256";
        let credential_scope = format!("{}/{}/s3/aws4_request", date_stamp, self.region_name);
        let canonical_request_hash = hex::encode(Sha256::digest(canonical_request.as_bytes()));
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            algorithm, amz_date, credential_scope, canonical_request_hash
        );

        let signature = self.calculate_signature(&date_stamp, &string_to_sign)?;

        let authorization_header = format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            algorithm, self.access_key, credential_scope, signed_headers, signature
        );

        let response = self
            .http_client
            .put(&url)
            .header("Host", &host_header)
            .header("x-amz-date", &amz_date)
            .header("x-amz-content-sha256", &payload_hash)
            .header("Authorization", &authorization_header)
            .header("Content-Type", "application/json")
            .body(policy.to_string())
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to send policy request: {}", e)))?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(AppError::Storage(format!(
                "Failed to set bucket policy: {} - {}",
                status, body
            )))
        }
    }

    fn calculate_signature(&self, date_stamp: &str, string_to_sign: &str) -> Result<String> {
        let k_date = Self::hmac_sha256(
            format!("AWS4{}", self.secret_key).as_bytes(),
            date_stamp.as_bytes(),
        )?;
        let k_region = Self::hmac_sha256(&k_date, self.region_name.as_bytes())?;
        let k_service = Self::hmac_sha256(&k_region, b"s3")?;
        let k_signing = Self::hmac_sha256(&k_service, b"aws4_request")?;

        let signature = Self::hmac_sha256(&k_signing, string_to_sign.as_bytes())?;
        Ok(hex::encode(signature))
    }

    fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        let mut mac = HmacSha256::new_from_slice(key)
            .map_err(|e| AppError::Internal(format!("HMAC key error: {}", e)))?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    fn url_prefixes(&self) -> [String; 2] {
        let name = self.bucket.name();
        [
            format!("{}/{}/", self.public_endpoint, name),
            format!("{}/{}/", self.endpoint, name),
        ]
    }
}

#[async_trait]
impl ObjectStorage for MinIOClient {
    fn bucket_name(&self) -> String {
        self.bucket.name()
    }

    async fn ensure_bucket(&self) -> Result<BucketProvision> {
        // MinIO reports an error for existing buckets, which is fine
        let provision = match self.create_bucket().await {
            Ok(_) => {
                info!("Bucket '{}' created successfully", self.bucket.name());
                BucketProvision::Created
            }
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                    || error_str.contains("already own it")
                {
                    debug!("Bucket '{}' already exists", self.bucket.name());
                    BucketProvision::AlreadyExists
                } else {
                    warn!(
                        "Could not create bucket '{}': {}. Assuming it exists.",
                        self.bucket.name(),
                        e
                    );
                    BucketProvision::Assumed
                }
            }
        };

        self.set_public_read_policy().await;
        Ok(provision)
    }

    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<String> {
        self.rules
            .check(&self.bucket.name(), content_type, data.len())?;

        // S3 PUT replaces an existing object with the same key
        let response = self
            .bucket
            .put_object_with_content_type(key, &data, content_type)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload file '{}': {}", key, e)))?;
        Self::require_success(response.status_code(), "upload", key)?;

        debug!("Uploaded file '{}' to bucket '{}'", key, self.bucket.name());
        Ok(key.to_string())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let response = self
            .bucket
            .delete_object(key)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to delete file '{}': {}", key, e)))?;
        Self::require_success(response.status_code(), "delete", key)?;

        debug!(
            "Deleted file '{}' from bucket '{}'",
            key,
            self.bucket.name()
        );
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        match self.bucket.head_object(key).await {
            Ok((_, 404)) | Err(S3Error::HttpFailWithBody(404, _)) => Ok(false),
            Ok((_, status)) => Self::require_success(status, "check", key).map(|_| true),
            Err(e) => {
                if e.to_string().contains("NoSuchKey") {
                    Ok(false)
                } else {
                    Err(AppError::Storage(format!(
                        "Failed to check if file '{}' exists: {}",
                        key, e
                    )))
                }
            }
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.public_endpoint,
            self.bucket.name(),
            encode_key(key)
        )
    }

    fn extract_key_from_url(&self, url: &str) -> Option<String> {
        self.url_prefixes()
            .iter()
            .find_map(|prefix| url.strip_prefix(prefix.as_str()))
            .and_then(decode_key)
    }
}
