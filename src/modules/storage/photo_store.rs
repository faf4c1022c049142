//! MinIO/S3-compatible store for report photos.
//!
//! Photos are public objects; the store returns a direct public URL plus the
//! storage path, which the report keeps for later deletion.

use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::config::StorageConfig;
use crate::core::error::{AppError, Result};

/// A photo object persisted to the store
#[derive(Debug, Clone)]
pub struct StoredPhoto {
    pub public_url: String,
    pub storage_path: String,
}

pub struct PhotoStore {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    public_endpoint: String,
    photo_prefix: String,
}

impl PhotoStore {
    /// Create a new photo store from configuration, creating the bucket if
    /// it does not exist yet.
    pub async fn new(config: StorageConfig) -> Result<Self> {
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

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| AppError::Internal(format!("Failed to open bucket: {}", e)))?;

        // Path-style URLs for MinIO (http://endpoint/bucket instead of http://bucket.endpoint)
        bucket.set_path_style();

        let store = Self {
            bucket,
            region,
            credentials,
            public_endpoint: config.public_endpoint.trim_end_matches('/').to_string(),
            photo_prefix: config.photo_prefix,
        };

        store.ensure_bucket_exists().await?;
        info!(
            "Photo store initialized for bucket '{}'",
            store.bucket.name()
        );

        Ok(store)
    }

    /// Ensure the bucket exists, create if not
    async fn ensure_bucket_exists(&self) -> Result<()> {
        let bucket_config = BucketConfiguration::default();

        match Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            bucket_config,
        )
        .await
        {
            Ok(_) => {
                info!("Bucket '{}' created", self.bucket.name());
                Ok(())
            }
            Err(e) => {
                let error_str = e.to_string();
                // Bucket already exists - this is fine
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                    || error_str.contains("already own it")
                {
                    debug!("Bucket '{}' already exists", self.bucket.name());
                    Ok(())
                } else {
                    warn!(
                        "Could not create bucket '{}': {}. Assuming it exists.",
                        self.bucket.name(),
                        e
                    );
                    Ok(())
                }
            }
        }
    }

    /// Object key for one report photo: `photos/{report_id}/{position}.{ext}`
    pub fn photo_key(&self, report_id: Uuid, position: usize, content_type: &str) -> String {
        let ext = match content_type {
            "image/png" => "png",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "jpg",
        };
        format!("{}/{}/{}.{}", self.photo_prefix, report_id, position, ext)
    }

    /// Upload a photo and return its public URL and storage path.
    /// Upload failures surface as `Storage` (503): the object store is an
    /// upstream collaborator, not part of this service.
    pub async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredPhoto> {
        self.bucket
            .put_object_with_content_type(key, &data, content_type)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload photo '{}': {}", key, e)))?;

        debug!("Uploaded photo '{}' to bucket '{}'", key, self.bucket.name());
        Ok(StoredPhoto {
            public_url: self.public_url(key),
            storage_path: key.to_string(),
        })
    }

    /// Delete an object. Used for best-effort cleanup when the enclosing
    /// database transaction fails after an upload succeeded.
    pub async fn delete(&self, key: &str) -> Result<()> {
        self.bucket
            .delete_object(key)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to delete photo '{}': {}", key, e)))?;

        debug!("Deleted photo '{}'", key);
        Ok(())
    }

    /// Direct URL for a public object
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_endpoint, self.bucket.name(), key)
    }
}
