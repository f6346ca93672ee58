//! Image file storage collaborator.
//!
//! The catalog stores only an opaque reference (the generated filename);
//! bytes live on disk under the configured media directory and are served
//! back by `tower_http::services::ServeDir` mounted at `/media`. The read
//! path resolves a reference to a fetchable URL with [`resolve_url`].

use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

/// Errors from the image store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem failure.
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    /// The uploaded payload is not an accepted image type.
    #[error("unsupported image content type: {0}")]
    UnsupportedType(String),
}

/// An uploaded image payload, as extracted from a multipart request.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    /// Declared content type (e.g. `image/png`).
    pub content_type: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

/// Stores uploaded product images under a local directory.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    /// Create a store rooted at `root`. Call [`ImageStore::init`] before use.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory files are written to, for mounting a `ServeDir`.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ensure the media directory exists.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created.
    pub async fn init(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Persist an uploaded image and return its opaque reference.
    ///
    /// The reference is a fresh UUID filename; uploads never overwrite
    /// each other and the original filename is discarded.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::UnsupportedType` for non-image payloads and
    /// `StorageError::Io` if the write fails.
    pub async fn save(&self, payload: &ImagePayload) -> Result<String, StorageError> {
        let ext = extension_for(&payload.content_type)
            .ok_or_else(|| StorageError::UnsupportedType(payload.content_type.clone()))?;

        let reference = format!("{}.{ext}", Uuid::new_v4());
        tokio::fs::write(self.root.join(&reference), &payload.bytes).await?;

        Ok(reference)
    }
}

/// Resolve a stored reference to the externally fetchable URL.
///
/// References that already look absolute (seeded or client-supplied URLs)
/// are passed through untouched.
#[must_use]
pub fn resolve_url(base_url: &str, image_ref: &str) -> String {
    if image_ref.starts_with("http://") || image_ref.starts_with("https://") {
        return image_ref.to_owned();
    }
    format!("{}/media/{image_ref}", base_url.trim_end_matches('/'))
}

/// File extension for an accepted image content type.
fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/png" => Some("png"),
        "image/jpeg" => Some("jpg"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}
