//! Error types and error handling
//!
//! [`GalleryError`] is the one error type handlers return. Its
//! [`IntoResponse`] impl is the only place an error becomes a wire response:
//! every failure is rendered as `{"ok": false, "error": "<message>"}`.
//!
//! | Variant | Status |
//! |---|---|
//! | `MissingFile`, `Rejected`, `PayloadTooLarge`, `MalformedUpload` | 400 |
//! | `Storage`, `Internal`, `Config` | 500 |

use crate::storage::{RejectionReason, StorageError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Service error type
#[derive(Debug, Error)]
pub enum GalleryError {
    /// The request had no `file` part
    #[error("No file provided")]
    MissingFile,

    /// The validator refused the upload
    #[error(transparent)]
    Rejected(#[from] RejectionReason),

    /// The body exceeded the configured upload limit
    #[error("File exceeds the maximum upload size of {limit} bytes")]
    PayloadTooLarge {
        /// Configured limit in bytes
        limit: usize,
    },

    /// The multipart body could not be read
    #[error("Malformed upload: {0}")]
    MalformedUpload(String),

    /// The storage backend failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Anything else that went wrong while serving a request
    #[error("{0}")]
    Internal(String),
}

impl GalleryError {
    /// HTTP status the error maps to
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingFile
            | Self::Rejected(_)
            | Self::PayloadTooLarge { .. }
            | Self::MalformedUpload(_) => StatusCode::BAD_REQUEST,
            Self::Storage(_) | Self::Config(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns true for errors caused by the client's input
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// JSON body of a failed API call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Always `false`
    pub ok: bool,
    /// Human-readable message
    pub error: String,
}

impl ErrorBody {
    /// Creates a failure body carrying `error`
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
        }
    }
}

impl IntoResponse for GalleryError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(error = %message, "Request failed");
        } else {
            tracing::debug!(error = %message, "Request rejected");
        }

        (status, Json(ErrorBody::new(message))).into_response()
    }
}
