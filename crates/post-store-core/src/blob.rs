//! Image blob storage over S3-compatible object stores.
//!
//! Wraps the external object store behind upload/replace/delete keyed by
//! object name. Post records reference objects by URL; the object name is
//! recovered from a URL by taking the last path segment.

use std::sync::Arc;

use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::{ObjectStore, PutPayload};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// Blob store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobStoreConfig {
    /// Bucket holding the image objects
    pub bucket: String,
    /// AWS region (e.g., "us-east-1")
    #[serde(default)]
    pub region: Option<String>,
    /// Custom endpoint URL (for S3-compatible services like MinIO)
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Access key ID
    #[serde(default)]
    pub access_key_id: Option<String>,
    /// Secret access key
    #[serde(default)]
    pub secret_access_key: Option<String>,
    /// Allow HTTP (insecure) connections
    #[serde(default)]
    pub allow_http: bool,
    /// Base URL to advertise in stored image URLs, if it differs from the
    /// endpoint (e.g., a public MinIO address behind a proxy)
    #[serde(default)]
    pub public_url: Option<String>,
}

/// Blob store for post images.
pub struct BlobStore {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    base_url: String,
}

impl BlobStore {
    /// Create a blob store against S3 or an S3-compatible service.
    pub fn new(config: &BlobStoreConfig) -> Result<Self> {
        let mut builder = AmazonS3Builder::new().with_bucket_name(&config.bucket);

        if let Some(region) = &config.region {
            builder = builder.with_region(region);
        }

        if let Some(endpoint) = &config.endpoint {
            builder = builder.with_endpoint(endpoint);
            builder = builder.with_virtual_hosted_style_request(false);
        }

        if let Some(access_key) = &config.access_key_id {
            builder = builder.with_access_key_id(access_key);
        }

        if let Some(secret_key) = &config.secret_access_key {
            builder = builder.with_secret_access_key(secret_key);
        }

        if config.allow_http {
            builder = builder.with_allow_http(true);
        }

        let store = builder
            .build()
            .map_err(|e| Error::BlobStore(format!("Failed to create S3 client: {}", e)))?;

        let base_url = match (&config.public_url, &config.endpoint) {
            (Some(public), _) => public.trim_end_matches('/').to_string(),
            (None, Some(endpoint)) => {
                format!("{}/{}", endpoint.trim_end_matches('/'), config.bucket)
            }
            (None, None) => {
                let region = config.region.as_deref().unwrap_or("us-east-1");
                format!("https://{}.s3.{}.amazonaws.com", config.bucket, region)
            }
        };

        Ok(Self {
            store: Arc::new(store),
            bucket: config.bucket.clone(),
            base_url,
        })
    }

    /// Create an in-memory blob store, for testing.
    pub fn in_memory(bucket: impl Into<String>) -> Self {
        let bucket = bucket.into();
        let base_url = format!("memory://{}", bucket);
        Self {
            store: Arc::new(InMemory::new()),
            bucket,
            base_url,
        }
    }

    /// The bucket this store writes to.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn url_for(&self, object_name: &str) -> String {
        format!("{}/{}", self.base_url, object_name)
    }

    /// Upload a new image object, returning its URL.
    pub async fn upload(&self, object_name: &str, data: Bytes) -> Result<String> {
        let path = Path::from(object_name);
        debug!("Blob PUT: {}/{}", self.bucket, path);

        self.store
            .put(&path, PutPayload::from_bytes(data))
            .await
            .map_err(|e| Error::BlobStore(format!("Upload of {} failed: {}", object_name, e)))?;

        Ok(self.url_for(object_name))
    }

    /// Replace an existing object's bytes in place, returning its URL.
    ///
    /// Destructive overwrite under the same object name; the returned URL
    /// equals the one the object was first uploaded under.
    pub async fn replace(&self, object_name: &str, data: Bytes) -> Result<String> {
        let path = Path::from(object_name);
        debug!("Blob PUT (replace): {}/{}", self.bucket, path);

        self.store
            .put(&path, PutPayload::from_bytes(data))
            .await
            .map_err(|e| Error::BlobStore(format!("Replace of {} failed: {}", object_name, e)))?;

        Ok(self.url_for(object_name))
    }

    /// Delete an image object. Fails if the object does not exist.
    pub async fn delete(&self, object_name: &str) -> Result<()> {
        let path = Path::from(object_name);
        debug!("Blob DELETE: {}/{}", self.bucket, path);

        self.store.delete(&path).await.map_err(|e| match e {
            object_store::Error::NotFound { .. } => {
                Error::BlobStore(format!("Object not found: {}", object_name))
            }
            _ => Error::BlobStore(format!("Delete of {} failed: {}", object_name, e)),
        })?;

        Ok(())
    }

    /// Fetch an object's bytes. Fails if the object does not exist.
    pub async fn retrieve(&self, object_name: &str) -> Result<Bytes> {
        let path = Path::from(object_name);

        let result = self.store.get(&path).await.map_err(|e| match e {
            object_store::Error::NotFound { .. } => {
                Error::BlobStore(format!("Object not found: {}", object_name))
            }
            _ => Error::BlobStore(format!("Get of {} failed: {}", object_name, e)),
        })?;

        result
            .bytes()
            .await
            .map_err(|e| Error::BlobStore(format!("Failed to read object bytes: {}", e)))
    }
}

/// Derive the blob object name from a stored image URL.
///
/// The object name is the substring after the last `/`.
#[must_use]
pub fn object_name_from_url(image_url: &str) -> &str {
    image_url.rsplit('/').next().unwrap_or(image_url)
}
