//! Configuration management for refill-gallery
//!
//! Configuration is loaded from multiple sources with clear precedence:
//!
//! 1. Legacy environment variables (highest priority):
//!    `AZURE_STORAGE_CONNECTION_STRING`, `STORAGE_ACCOUNT_URL`, `IMAGES_CONTAINER`
//! 2. Environment variables with the `REFILL_` prefix, `__` for nesting
//!    (e.g. `REFILL_SERVER__MAX_UPLOAD_BYTES=5242880`)
//! 3. A TOML file (`./config.toml` by default)
//! 4. Hardcoded defaults (fallback)
//!
//! # Example Configuration
//!
//! ```toml
//! # config.toml
//! [server]
//! bind = "0.0.0.0:5000"
//! max_upload_bytes = 10485760
//!
//! [storage]
//! backend = "azure"
//! container = "refill-images"
//! # Public URLs default to the connection string's blob endpoint
//! # account_url = "https://images.example.com"
//! ```
//!
//! # Usage
//!
//! ```rust
//! use refill_gallery::config::GalleryConfig;
//!
//! let config = GalleryConfig::default();
//! assert_eq!(config.storage.container, "refill-images");
//! assert_eq!(config.server.max_upload_bytes, 10 * 1024 * 1024);
//! ```

use crate::error::GalleryError;
use crate::storage::{
    AzureBlobGateway, BlobGateway, ConnectionString, LocalBlobGateway, MemoryBlobGateway,
};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default container name
pub const DEFAULT_CONTAINER: &str = "refill-images";

/// Default request body limit (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Socket address to listen on
    pub bind: String,

    /// Largest request body accepted on the upload route, in bytes
    pub max_upload_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:5000".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Which [`BlobGateway`](crate::storage::BlobGateway) to build at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Azure Blob Storage
    #[default]
    Azure,
    /// Directory on the local filesystem
    Local,
    /// Process memory
    Memory,
}

/// Object storage settings
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Backend selection
    pub backend: StorageBackend,

    /// Azure Storage connection string (required for the Azure backend)
    pub connection_string: Option<String>,

    /// Public base URL of the storage account
    ///
    /// Unset means the blob endpoint of the connection string.
    pub account_url: Option<String>,

    /// Container holding the images
    pub container: String,

    /// Directory used by the local backend
    pub local_dir: PathBuf,

    /// URL prefix the local directory is served under
    pub local_public_url: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Azure,
            connection_string: None,
            account_url: None,
            container: DEFAULT_CONTAINER.to_string(),
            local_dir: PathBuf::from("./uploads"),
            local_public_url: "/uploads".to_string(),
        }
    }
}

impl fmt::Debug for StorageSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageSettings")
            .field("backend", &self.backend)
            .field(
                "connection_string",
                &self.connection_string.as_ref().map(|_| "<redacted>"),
            )
            .field("account_url", &self.account_url)
            .field("container", &self.container)
            .field("local_dir", &self.local_dir)
            .field("local_public_url", &self.local_public_url)
            .finish()
    }
}

impl StorageSettings {
    /// Public base URL of the container: account URL + "/" + container
    ///
    /// `default_account_url` stands in when `account_url` is unset.
    #[must_use]
    pub fn container_url(&self, default_account_url: &str) -> String {
        let account_url = self.account_url.as_deref().unwrap_or(default_account_url);
        format!("{}/{}", account_url.trim_end_matches('/'), self.container)
    }
}

/// Complete refill-gallery configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GalleryConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerSettings,

    /// Object storage settings
    #[serde(default)]
    pub storage: StorageSettings,
}

impl GalleryConfig {
    /// Loads configuration from `./config.toml` (if present) and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if a source contains values of the wrong type.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from("./config.toml")
    }

    /// Loads configuration from a specific TOML file and the environment
    ///
    /// A missing file is skipped, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if a source contains values of the wrong type.
    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config = Self::figment(path.as_ref()).extract()?;
        Ok(config)
    }

    /// Builds the layered provider used by [`load_from`](Self::load_from)
    #[must_use]
    pub fn figment(path: &Path) -> Figment {
        Figment::new()
            // 4. Defaults (lowest priority)
            .merge(Serialized::defaults(Self::default()))
            // 3. Config file
            .merge(Toml::file(path))
            // 2. Prefixed environment, double underscore for nesting
            .merge(Env::prefixed("REFILL_").split("__"))
            // 1. Environment names the service has always honored
            .merge(legacy_env())
    }

    /// Checks settings that can't be expressed in the types
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::Config` if the Azure backend has no connection
    /// string, the container is empty, or the upload limit is zero.
    pub fn validate(&self) -> Result<(), GalleryError> {
        if self.storage.backend == StorageBackend::Azure
            && self
                .storage
                .connection_string
                .as_deref()
                .is_none_or(|s| s.trim().is_empty())
        {
            return Err(GalleryError::Config(
                "AZURE_STORAGE_CONNECTION_STRING is required for the azure backend".to_string(),
            ));
        }

        if self.storage.container.trim().is_empty() {
            return Err(GalleryError::Config("container name must not be empty".to_string()));
        }

        if self.server.max_upload_bytes == 0 {
            return Err(GalleryError::Config(
                "max_upload_bytes must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Builds the storage gateway selected by `storage.backend`
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::Config` if the settings are invalid or the
    /// connection string cannot be parsed, and `GalleryError::Storage` if
    /// the backend cannot be constructed.
    pub fn build_gateway(&self) -> Result<Arc<dyn BlobGateway>, GalleryError> {
        self.validate()?;
        let storage = &self.storage;

        let gateway: Arc<dyn BlobGateway> = match storage.backend {
            StorageBackend::Azure => {
                let connection = storage
                    .connection_string
                    .as_deref()
                    .unwrap_or_default()
                    .parse::<ConnectionString>()
                    .map_err(|e| GalleryError::Config(e.to_string()))?;
                let account_url = storage
                    .account_url
                    .as_deref()
                    .unwrap_or(&connection.blob_endpoint);
                Arc::new(AzureBlobGateway::new(
                    &connection,
                    &storage.container,
                    account_url,
                )?)
            }
            StorageBackend::Local => Arc::new(LocalBlobGateway::new(
                storage.local_dir.clone(),
                storage.local_public_url.clone(),
            )?),
            StorageBackend::Memory => Arc::new(MemoryBlobGateway::new(storage.container_url(""))),
        };

        tracing::info!(
            backend = ?storage.backend,
            container = %storage.container,
            "Storage gateway ready"
        );

        Ok(gateway)
    }
}

fn legacy_env() -> Env {
    Env::raw()
        .only(&[
            "AZURE_STORAGE_CONNECTION_STRING",
            "STORAGE_ACCOUNT_URL",
            "IMAGES_CONTAINER",
        ])
        .map(|key| {
            let key = key.as_str();
            if key.eq_ignore_ascii_case("AZURE_STORAGE_CONNECTION_STRING") {
                "storage.connection_string".into()
            } else if key.eq_ignore_ascii_case("STORAGE_ACCOUNT_URL") {
                "storage.account_url".into()
            } else {
                "storage.container".into()
            }
        })
}
