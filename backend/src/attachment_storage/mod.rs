//! S3-based attachment uploads
//!
//! The service never moves file bytes. It hands out a presigned `PutObject` URL for a
//! freshly generated key and records where the object will be publicly reachable.
mod error;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::{presigning::PresigningConfig, Client as S3Client};
use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

pub use error::{BucketError, BucketResult};

/// Presigned URL with expiration information
#[derive(Debug, Clone)]
pub struct PresignedUrl {
    /// The presigned URL for PUT operations
    pub url: String,
    /// UTC timestamp when the URL expires
    pub expires_at: DateTime<Utc>,
}

/// Upload slot requested for one todo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentUploadRequest {
    /// Owner of the todo
    pub user_id: String,
    /// Todo receiving the attachment
    pub todo_id: String,
    /// Object key the upload is written to
    pub key: String,
}

impl AttachmentUploadRequest {
    /// Creates a request with a fresh random object key
    #[must_use]
    pub fn new(user_id: &str, todo_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            todo_id: todo_id.to_string(),
            key: Uuid::new_v4().to_string(),
        }
    }
}

/// Result of an upload authorization
#[derive(Debug, Clone)]
pub struct UploadAuthorization {
    /// Signed URL the client uploads to; handed out once and never stored
    pub upload_url: String,
    /// Public URL of the object, persisted on the todo
    pub attachment_url: String,
    /// When `upload_url` stops working
    pub expires_at: DateTime<Utc>,
}

/// Issues time-limited write authorizations for attachment uploads
#[async_trait]
pub trait UploadUrlSigner: Send + Sync {
    /// Authorizes a single upload to `request.key`
    async fn authorize_upload(
        &self,
        request: &AttachmentUploadRequest,
    ) -> BucketResult<UploadAuthorization>;
}

/// Attachment storage client for S3 operations
pub struct AttachmentStorage {
    s3_client: Arc<S3Client>,
    bucket_name: String,
    signed_url_expiration_secs: u64,
}

impl AttachmentStorage {
    /// Creates a new attachment storage client
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    /// * `bucket_name` - S3 bucket name for attachments
    /// * `signed_url_expiration_secs` - Lifetime of presigned upload URLs in seconds
    #[must_use]
    pub const fn new(
        s3_client: Arc<S3Client>,
        bucket_name: String,
        signed_url_expiration_secs: u64,
    ) -> Self {
        Self {
            s3_client,
            bucket_name,
            signed_url_expiration_secs,
        }
    }

    /// Public URL of an object in the attachment bucket
    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        format!("https://{}.s3.amazonaws.com/{key}", self.bucket_name)
    }

    /// Generates a presigned URL for PUT operations
    ///
    /// # Errors
    ///
    /// Returns `BucketError::ConfigError` if presigning config creation fails
    /// Returns `BucketError::S3Error` if presigned URL generation fails
    pub async fn generate_presigned_put_url(&self, key: &str) -> BucketResult<PresignedUrl> {
        let presigned_config =
            PresigningConfig::expires_in(Duration::from_secs(self.signed_url_expiration_secs))
                .map_err(|e| {
                    BucketError::ConfigError(format!("Failed to create presigning config: {e}"))
                })?;

        let presigned_url = self
            .s3_client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .presigned(presigned_config)
            .await
            .map_err(|e| BucketError::S3Error(format!("Failed to generate presigned URL: {e}")))?;

        let expires_at: DateTime<Utc> =
            Utc::now() + Duration::from_secs(self.signed_url_expiration_secs);

        Ok(PresignedUrl {
            url: presigned_url.uri().to_string(),
            expires_at,
        })
    }
}

#[async_trait]
impl UploadUrlSigner for AttachmentStorage {
    async fn authorize_upload(
        &self,
        request: &AttachmentUploadRequest,
    ) -> BucketResult<UploadAuthorization> {
        let presigned_url = self.generate_presigned_put_url(&request.key).await?;

        debug!(
            user_id = %request.user_id,
            todo_id = %request.todo_id,
            attachment_id = %request.key,
            expires_at = %presigned_url.expires_at,
            "Generated presigned upload URL"
        );

        Ok(UploadAuthorization {
            upload_url: presigned_url.url,
            attachment_url: self.public_url(&request.key),
            expires_at: presigned_url.expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};

    fn offline_storage(expiration_secs: u64) -> AttachmentStorage {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::new("test", "test", None, None, "test"))
            .build();

        AttachmentStorage::new(
            Arc::new(S3Client::from_conf(config)),
            "test-bucket".to_string(),
            expiration_secs,
        )
    }

    #[test]
    fn test_public_url_shape() {
        let storage = offline_storage(300);
        assert_eq!(
            storage.public_url("abc"),
            "https://test-bucket.s3.amazonaws.com/abc"
        );
    }

    #[test]
    fn test_upload_request_generates_unique_keys() {
        let first = AttachmentUploadRequest::new("u1", "t1");
        let second = AttachmentUploadRequest::new("u1", "t1");

        assert_eq!(first.key.len(), 36);
        assert_ne!(first.key, second.key);
    }

    #[tokio::test]
    async fn test_authorize_upload_signs_put_for_key() {
        let storage = offline_storage(120);
        let request = AttachmentUploadRequest::new("u1", "t1");
        let before = Utc::now();

        let authorization = storage.authorize_upload(&request).await.unwrap();

        assert!(authorization.upload_url.contains(&request.key));
        assert!(authorization.upload_url.contains("X-Amz-Signature="));
        assert!(authorization.upload_url.contains("X-Amz-Expires=120"));
        assert_eq!(
            authorization.attachment_url,
            format!("https://test-bucket.s3.amazonaws.com/{}", request.key)
        );
        assert!(authorization.expires_at >= before + Duration::from_secs(120));
    }
}
