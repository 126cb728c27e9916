use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::{
    config::Credentials, error::DisplayErrorContext, presigning::PresigningConfig,
    primitives::ByteStream, Client,
};
use tracing::info;

use crate::config::S3Config;
use crate::storage::{compress_file, destination_key, validate_key, ObjectStore, StorageError};

/// S3-compatible bucket (AWS in production, MinIO locally).
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Constructs an S3 client configured for MinIO (endpoint set) or AWS.
    pub async fn connect(config: &S3Config) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "hirebase-static",
        );

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials);
        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        // MinIO only serves path-style URLs.
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.endpoint.is_some())
            .build();

        S3ObjectStore {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn upload(
        &self,
        local_path: &Path,
        original_name: &str,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let key = destination_key(original_name);
        let body = compress_file(local_path).await?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .content_encoding("gzip")
            .send()
            .await
            .map_err(|e| StorageError::Upload(DisplayErrorContext(&e).to_string()))?;

        info!("Uploaded '{original_name}' to s3://{}/{key}", self.bucket);
        Ok(key)
    }

    async fn signed_url(&self, key: &str, ttl: Duration) -> Result<String, StorageError> {
        validate_key(key)?;

        if let Err(e) = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            if e.as_service_error().is_some_and(|se| se.is_not_found()) {
                return Err(StorageError::NotFound(key.to_string()));
            }
            return Err(StorageError::Signing(DisplayErrorContext(&e).to_string()));
        }

        let presigning =
            PresigningConfig::expires_in(ttl).map_err(|e| StorageError::Signing(e.to_string()))?;
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::Signing(DisplayErrorContext(&e).to_string()))?;

        Ok(request.uri().to_string())
    }
}
