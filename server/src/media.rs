//! Photo storage collaborator.
//!
//! Uploads are handed to a [`PhotoStore`] as raw bytes. The store owns
//! naming and URLs; handlers only pass its answers through.

use async_trait::async_trait;
use axum::body::Bytes;
use dashmap::DashMap;
use serde::Serialize;

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoUpload {
    /// Provider-side id used for deletion
    pub public_id: String,
    pub url: String,
}

/// Media provider errors.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Photo upload failed: {0}")]
    ProviderUploadFailed(String),
}

/// An object store for photos.
#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Store `data` under a provider-chosen id.
    ///
    /// Returns `None` for an empty upload.
    async fn store(&self, data: Bytes, name: &str) -> Result<Option<PhotoUpload>, MediaError>;

    /// Delete a stored photo. Returns `Some("ok")` when the provider confirms.
    async fn delete(&self, public_id: &str) -> Result<Option<String>, MediaError>;
}

/// Largest photo [`MemoryPhotoStore`] accepts.
pub const MAX_PHOTO_BYTES: usize = 10 * 1024 * 1024;

/// In-process [`PhotoStore`].
#[derive(Debug)]
pub struct MemoryPhotoStore {
    base_url: String,
    photos: DashMap<String, Bytes>,
}

impl MemoryPhotoStore {
    /// Create a store whose URLs start with `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            photos: DashMap::new(),
        }
    }

    /// Number of stored photos.
    pub fn len(&self) -> usize {
        self.photos.len()
    }
}

#[async_trait]
impl PhotoStore for MemoryPhotoStore {
    async fn store(&self, data: Bytes, name: &str) -> Result<Option<PhotoUpload>, MediaError> {
        if data.is_empty() {
            return Ok(None);
        }
        if data.len() > MAX_PHOTO_BYTES {
            return Err(MediaError::ProviderUploadFailed(format!(
                "{} is {} bytes, limit is {}",
                name,
                data.len(),
                MAX_PHOTO_BYTES
            )));
        }

        let public_id = uuid::Uuid::new_v4().to_string();
        let url = format!("{}/{}/{}", self.base_url, public_id, name);
        self.photos.insert(public_id.clone(), data);

        tracing::debug!(public_id = %public_id, name, stored = self.len(), "stored photo");
        Ok(Some(PhotoUpload { public_id, url }))
    }

    async fn delete(&self, public_id: &str) -> Result<Option<String>, MediaError> {
        Ok(self
            .photos
            .remove(public_id)
            .map(|_| "ok".to_string()))
    }
}
