//! refill-gallery: image upload and gallery service
//!
//! Accepts image uploads over HTTP, stores them in Azure Blob Storage under
//! timestamped keys, and lists everything stored as public URLs.
//!
//! # Endpoints
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | `GET` | `/` | [`handlers::pages::index`] |
//! | `POST` | `/api/v1/upload` | [`handlers::api::upload`] |
//! | `GET` | `/api/v1/gallery` | [`handlers::api::gallery`] |
//! | `GET` | `/api/v1/health` | [`handlers::api::health`] |
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use refill_gallery::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = GalleryConfig::load()?;
//!     let gateway = config.build_gateway()?;
//!     let state = AppState::from_parts(gateway, std::sync::Arc::new(SystemClock), config);
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
//!     axum::serve(listener, refill_gallery::router(state)).await?;
//!     Ok(())
//! }
//! ```

#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod observability;
pub mod state;
pub mod storage;
pub mod template;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use config::StorageBackend;
use state::AppState;
use tower_http::{services::ServeDir, trace::TraceLayer};

/// Builds the application router
///
/// The upload route carries a body limit of `server.max_upload_bytes`.
/// With the local backend, the storage directory is also served at
/// `storage.local_public_url` when that is a path.
pub fn router(state: AppState) -> Router {
    let config = state.config();
    let limit = config.server.max_upload_bytes;

    let mut router = Router::new()
        .route("/", get(handlers::pages::index))
        .route(
            "/api/v1/upload",
            post(handlers::api::upload).layer(DefaultBodyLimit::max(limit)),
        )
        .route("/api/v1/gallery", get(handlers::api::gallery))
        .route("/api/v1/health", get(handlers::api::health));

    let storage = &config.storage;
    if storage.backend == StorageBackend::Local {
        let mount = storage.local_public_url.trim_end_matches('/');
        if mount.starts_with('/') && mount.len() > 1 {
            router = router.nest_service(mount, ServeDir::new(&storage.local_dir));
        } else {
            tracing::warn!(
                local_public_url = %storage.local_public_url,
                "Local public URL is not a path; uploads are not served by this process"
            );
        }
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

pub mod prelude {
    //! Convenience re-exports for common types and traits
    //!
    //! # Examples
    //!
    //! ```rust
    //! use refill_gallery::prelude::*;
    //! ```

    // Configuration
    pub use crate::config::{GalleryConfig, ServerSettings, StorageBackend, StorageSettings};

    // Error types
    pub use crate::error::{ErrorBody, GalleryError};

    // Extractors
    pub use crate::extractors::{ImageUpload, UploadLimit};

    // Handler bodies
    pub use crate::handlers::api::{GalleryResponse, UploadResponse};

    // Application state
    pub use crate::state::AppState;

    // Storage
    pub use crate::storage::{
        AzureBlobGateway, BlobGateway, Clock, FixedClock, LocalBlobGateway, MemoryBlobGateway,
        ObjectDescriptor, RejectionReason, StorageError, StorageResult, SystemClock,
        UploadedImage,
    };

    // Templates
    pub use crate::template::{IndexTemplate, RenderHtml};

    // Re-export key dependencies
    pub use askama;
    pub use axum;
}
