//! Local filesystem blob gateway

use super::traits::{join_url, BlobGateway};
use super::types::{ObjectDescriptor, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Sidecar record holding what the filesystem can't
#[derive(Debug, Serialize, Deserialize)]
struct Sidecar {
    content_type: String,
}

/// Blob gateway that stores objects as files in one directory
///
/// Intended for local development. Each object is written to
/// `<dir>/<key>`, with its content type kept in a hidden sidecar file
/// `<dir>/.<key>.json` that listings skip.
///
/// # Directory Structure
///
/// ```text
/// ./uploads/
/// ├── 20240101T000000-cat.png
/// ├── .20240101T000000-cat.png.json
/// ├── 20240102T093000-dog.jpg
/// └── .20240102T093000-dog.jpg.json
/// ```
///
/// # Examples
///
/// ```rust,no_run
/// use refill_gallery::storage::{BlobGateway, LocalBlobGateway};
/// use std::path::PathBuf;
///
/// # async fn example() -> anyhow::Result<()> {
/// let gateway = LocalBlobGateway::new(PathBuf::from("./uploads"), "/uploads")?;
///
/// gateway.put("20240101T000000-cat.png", vec![1, 2, 3].into(), "image/png").await?;
///
/// // Served by the router's static file route
/// assert_eq!(gateway.public_url("20240101T000000-cat.png"), "/uploads/20240101T000000-cat.png");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LocalBlobGateway {
    /// Directory holding the objects
    base_path: PathBuf,

    /// URL prefix the directory is served under
    public_base: String,
}

impl LocalBlobGateway {
    /// Creates a gateway rooted at `base_path`
    ///
    /// The directory is created lazily on first write.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Other` if `base_path` exists and is not a
    /// directory.
    pub fn new(base_path: PathBuf, public_base: impl Into<String>) -> StorageResult<Self> {
        // Synchronous check is fine during startup
        if base_path.exists() && !base_path.is_dir() {
            return Err(StorageError::Other(format!(
                "{} is not a directory",
                base_path.display()
            )));
        }

        Ok(Self {
            base_path,
            public_base: public_base.into(),
        })
    }

    /// Directory objects are written to
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Reads back the content type recorded for `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the sidecar is missing or unreadable.
    pub async fn content_type(&self, key: &str) -> StorageResult<String> {
        let raw = fs::read_to_string(self.sidecar_path(key)).await?;
        let sidecar: Sidecar = serde_json::from_str(&raw)
            .map_err(|e| StorageError::Other(format!("Failed to parse metadata: {e}")))?;
        Ok(sidecar.content_type)
    }

    fn object_path(&self, key: &str) -> PathBuf {
        self.base_path.join(key)
    }

    fn sidecar_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!(".{key}.json"))
    }
}

/// Keys become file names, so anything that could escape the directory or
/// hide from listings is refused.
fn check_key(key: &str) -> StorageResult<()> {
    if key.is_empty()
        || key.starts_with('.')
        || key.contains(['/', '\\', '\0'])
    {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[async_trait]
impl BlobGateway for LocalBlobGateway {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<()> {
        check_key(key)?;
        fs::create_dir_all(&self.base_path).await?;

        let mut f = fs::File::create(self.object_path(key)).await?;
        f.write_all(&data).await?;
        f.flush().await?;

        let sidecar = serde_json::to_string(&Sidecar {
            content_type: content_type.to_string(),
        })
        .map_err(|e| StorageError::Other(format!("Failed to serialize metadata: {e}")))?;
        fs::write(self.sidecar_path(key), sidecar).await?;

        Ok(())
    }

    async fn list(&self) -> StorageResult<Vec<ObjectDescriptor>> {
        if !self.base_path.exists() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&self.base_path).await?;
        let mut objects = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            // Skip sidecars and anything else hidden
            if let Some(name) = entry.file_name().to_str() {
                if !name.starts_with('.') {
                    objects.push(ObjectDescriptor::new(name));
                }
            }
        }

        Ok(objects)
    }

    fn public_url(&self, key: &str) -> String {
        join_url(&self.public_base, key)
    }
}
