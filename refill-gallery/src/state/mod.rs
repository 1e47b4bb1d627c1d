//! Application state
//!
//! The gateway, clock and configuration are built once at startup and shared
//! by every handler through [`AppState`]. Nothing in the service is global.

use crate::config::GalleryConfig;
use crate::extractors::UploadLimit;
use crate::storage::{BlobGateway, Clock, SystemClock};
use axum::extract::FromRef;
use std::fmt;
use std::sync::Arc;

/// Shared state for refill-gallery handlers
///
/// # Example
///
/// ```rust
/// use refill_gallery::{config::GalleryConfig, state::AppState, storage::MemoryBlobGateway};
///
/// let gateway = MemoryBlobGateway::new("https://acct.blob.core.windows.net/refill-images");
/// let state = AppState::new(gateway, GalleryConfig::default());
///
/// let app: axum::Router = refill_gallery::router(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    gateway: Arc<dyn BlobGateway>,
    clock: Arc<dyn Clock>,
    config: Arc<GalleryConfig>,
}

impl AppState {
    /// Creates state around a gateway, using the system clock
    pub fn new(gateway: impl BlobGateway + 'static, config: GalleryConfig) -> Self {
        Self::from_parts(Arc::new(gateway), Arc::new(SystemClock), config)
    }

    /// Creates state from already shared parts
    #[must_use]
    pub fn from_parts(
        gateway: Arc<dyn BlobGateway>,
        clock: Arc<dyn Clock>,
        config: GalleryConfig,
    ) -> Self {
        Self {
            gateway,
            clock,
            config: Arc::new(config),
        }
    }

    /// Replaces the clock used for naming keys
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Storage gateway
    #[must_use]
    pub fn gateway(&self) -> &dyn BlobGateway {
        self.gateway.as_ref()
    }

    /// Time source for key naming
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Loaded configuration
    #[must_use]
    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl FromRef<AppState> for UploadLimit {
    fn from_ref(state: &AppState) -> Self {
        Self(state.config.server.max_upload_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FixedClock, MemoryBlobGateway};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_upload_limit_from_config() {
        let mut config = GalleryConfig::default();
        config.server.max_upload_bytes = 4096;
        let state = AppState::new(MemoryBlobGateway::new("http://localhost"), config);

        assert_eq!(UploadLimit::from_ref(&state), UploadLimit(4096));
    }

    #[test]
    fn test_with_clock() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let state = AppState::new(MemoryBlobGateway::new("http://localhost"), GalleryConfig::default())
            .with_clock(FixedClock(instant));

        assert_eq!(state.clock().now(), instant);
    }

    #[test]
    fn test_clones_share_gateway() {
        let state = AppState::new(MemoryBlobGateway::new("http://localhost/c"), GalleryConfig::default());
        let clone = state.clone();

        assert_eq!(clone.gateway().public_url("a.png"), "http://localhost/c/a.png");
        assert!(std::ptr::addr_eq(state.gateway(), clone.gateway()));
    }
}
