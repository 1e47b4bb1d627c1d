//! Blob gateway trait definition

use super::types::{ObjectDescriptor, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;

/// Abstraction over the object store that holds uploaded images
///
/// Handlers depend only on this trait, so the Azure backend, the local
/// directory backend, and test fakes are interchangeable. One instance is
/// built at startup and shared through [`AppState`](crate::state::AppState).
///
/// # Implementation Requirements
///
/// - `put` overwrites an existing object with the same key, and a successful
///   `put` is visible to the next `list`.
/// - `list` enumerates the whole container in one call; backends that page
///   their listings must follow every page before returning.
/// - `public_url` never performs I/O.
///
/// # Examples
///
/// ```rust
/// use refill_gallery::storage::{BlobGateway, MemoryBlobGateway};
///
/// # async fn example() -> anyhow::Result<()> {
/// let gateway = MemoryBlobGateway::new("https://example.blob.core.windows.net/refill-images");
///
/// gateway.put("20240101T000000-cat.png", vec![1, 2, 3].into(), "image/png").await?;
///
/// let keys = gateway.list().await?;
/// assert_eq!(keys.len(), 1);
/// assert_eq!(
///     gateway.public_url(&keys[0].key),
///     "https://example.blob.core.windows.net/refill-images/20240101T000000-cat.png"
/// );
/// # Ok(())
/// # }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobGateway: Send + Sync {
    /// Stores `data` under `key` with the given content type
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable, rejects the
    /// credentials, or fails to persist the object.
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<()>;

    /// Lists every object in the container
    ///
    /// # Errors
    ///
    /// Returns an error if any page of the listing cannot be fetched.
    async fn list(&self) -> StorageResult<Vec<ObjectDescriptor>>;

    /// Returns the externally visible URL for `key`
    fn public_url(&self, key: &str) -> String;
}

/// Joins a container base URL and a key with exactly one `/`
pub(crate) fn join_url(base: &str, key: &str) -> String {
    format!("{}/{key}", base.trim_end_matches('/'))
}
