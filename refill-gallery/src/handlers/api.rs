//! JSON API handlers
//!
//! Upload and gallery answer with `{"ok": true, ...}` on success. Failures
//! are returned as [`GalleryError`], which renders `{"ok": false, "error": ...}`.

use crate::error::GalleryError;
use crate::extractors::ImageUpload;
use crate::state::AppState;
use crate::storage::{naming, validation, RejectionReason};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

/// Body of a successful upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Always `true`
    pub ok: bool,
    /// Public URL of the stored image
    pub url: String,
}

/// Body of a successful gallery listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryResponse {
    /// Always `true`
    pub ok: bool,
    /// Public URLs of every stored image, newest first
    pub gallery: Vec<String>,
}

/// `POST /api/v1/upload`
///
/// Validates the declared filename and content type, stores the bytes under
/// a timestamped key and returns the public URL. Key collisions within the
/// same second overwrite the earlier object.
///
/// # Errors
///
/// - `Rejected` if validation fails (400)
/// - `Storage` if the gateway write fails (500)
pub async fn upload(
    State(state): State<AppState>,
    ImageUpload(image): ImageUpload,
) -> Result<Json<UploadResponse>, GalleryError> {
    validation::validate(&image.filename, image.content_type.as_deref())?;
    let content_type = image
        .content_type
        .as_deref()
        .ok_or(RejectionReason::NotAnImage)?;

    let key = naming::make_key(&image.filename, state.clock().now());
    let size = image.size();

    if let Err(e) = state
        .gateway()
        .put(&key, image.data, content_type)
        .await
    {
        tracing::error!(key = %key, error = %e, "Upload error");
        return Err(e.into());
    }

    let url = state.gateway().public_url(&key);
    tracing::info!(key = %key, size, "Uploaded successfully");

    Ok(Json(UploadResponse { ok: true, url }))
}

/// `GET /api/v1/gallery`
///
/// Lists every stored object and returns their public URLs sorted in
/// descending lexicographic order. Keys start with a timestamp, so this is
/// newest first.
///
/// # Errors
///
/// Returns `Storage` if the gateway listing fails (500).
pub async fn gallery(State(state): State<AppState>) -> Result<Json<GalleryResponse>, GalleryError> {
    let objects = state.gateway().list().await.inspect_err(|e| {
        tracing::error!(error = %e, "Gallery error");
    })?;

    let gateway = state.gateway();
    let mut gallery: Vec<String> = objects
        .iter()
        .map(|object| gateway.public_url(&object.key))
        .collect();
    gallery.sort_unstable_by(|a, b| b.cmp(a));

    tracing::debug!(count = gallery.len(), "Gallery listed");

    Ok(Json(GalleryResponse { ok: true, gallery }))
}

/// `GET /api/v1/health`: always `200 OK`, touches nothing else
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
