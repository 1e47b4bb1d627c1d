//! Core types for blob storage

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur while talking to a blob storage backend
///
/// The handler layer treats every variant the same way: the request fails with
/// a 500 and the error's display text becomes the response message.
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O error from a filesystem-backed store
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The object store client failed: transport, authorization or a
    /// non-success response from the service
    #[error("Storage request failed: {0}")]
    ObjectStore(#[from] object_store::Error),

    /// Invalid object key
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Generic storage error
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A stored object as reported by [`BlobGateway::list`](super::BlobGateway::list)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectDescriptor {
    /// Key of the object within its container
    pub key: String,
}

impl ObjectDescriptor {
    /// Creates a descriptor for `key`
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl fmt::Display for ObjectDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// An image received from a client, before validation and storage
///
/// The content type is whatever the client declared for the multipart part;
/// it may be absent.
///
/// # Examples
///
/// ```rust
/// use refill_gallery::storage::UploadedImage;
///
/// let image = UploadedImage::new("cat.png", Some("image/png"), vec![0x89, 0x50, 0x4E, 0x47]);
/// assert_eq!(image.size(), 4);
/// assert_eq!(image.extension(), Some("png"));
/// ```
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Filename declared by the client
    pub filename: String,

    /// MIME content type declared by the client
    pub content_type: Option<String>,

    /// Raw payload
    pub data: bytes::Bytes,
}

impl UploadedImage {
    /// Creates a new uploaded image
    #[must_use]
    pub fn new(
        filename: impl Into<String>,
        content_type: Option<&str>,
        data: impl Into<bytes::Bytes>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.map(str::to_string),
            data: data.into(),
        }
    }

    /// Returns the payload size in bytes
    #[must_use]
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Extracts the file extension from the filename
    ///
    /// Returns `None` if the filename has no `.`
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        self.filename.rsplit_once('.').map(|(_, ext)| ext)
    }
}
