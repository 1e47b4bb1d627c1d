//! Blob storage abstraction, upload validation and key naming
//!
//! Handlers only see the [`BlobGateway`] trait. Three backends implement it:
//! - [`AzureBlobGateway`]: Azure Blob Storage through `object_store` (production)
//! - [`LocalBlobGateway`]: a directory on the local filesystem (development)
//! - [`MemoryBlobGateway`]: process memory (tests and demos)
//!
//! Before anything reaches a gateway, [`validation::validate`] checks the
//! declared filename and content type, and [`naming::make_key`] turns the
//! filename into a timestamped, sanitized key.
//!
//! # Examples
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use refill_gallery::storage::{naming, validation, BlobGateway, MemoryBlobGateway};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let gateway = MemoryBlobGateway::new("https://acct.blob.core.windows.net/refill-images");
//!
//! validation::validate("cat.png", Some("image/png"))?;
//! let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let key = naming::make_key("cat.png", now);
//!
//! gateway.put(&key, vec![0x89, 0x50].into(), "image/png").await?;
//! assert_eq!(
//!     gateway.public_url(&key),
//!     "https://acct.blob.core.windows.net/refill-images/20240101T000000-cat.png"
//! );
//! # Ok(())
//! # }
//! ```

pub mod azure;
mod local;
mod memory;
pub mod naming;
mod traits;
mod types;
pub mod validation;

pub use azure::{AzureBlobGateway, ConnectionString, ConnectionStringError, Credential};
pub use local::LocalBlobGateway;
pub use memory::{MemoryBlobGateway, MemoryObject};
pub use naming::{Clock, FixedClock, SystemClock};
#[cfg(test)]
pub use traits::MockBlobGateway;
pub use traits::BlobGateway;
pub use types::{ObjectDescriptor, StorageError, StorageResult, UploadedImage};
pub use validation::RejectionReason;
