//! Image upload extractor for multipart form data
//!
//! [`ImageUpload`] pulls the part named `file` out of a multipart body,
//! keeping its declared filename and content type as sent by the client.
//! Nothing here validates the file; that is left to
//! [`validation::validate`](crate::storage::validation::validate).
//!
//! # Examples
//!
//! ```rust,no_run
//! use refill_gallery::extractors::ImageUpload;
//! use axum::response::IntoResponse;
//!
//! async fn handler(ImageUpload(image): ImageUpload) -> impl IntoResponse {
//!     format!("Received: {} ({} bytes)", image.filename, image.size())
//! }
//! ```

use crate::error::GalleryError;
use crate::storage::UploadedImage;
use axum::{
    extract::{
        multipart::{Field, MultipartError},
        FromRef, FromRequest, Multipart, Request,
    },
    http::StatusCode,
};
use bytes::BytesMut;

/// Name of the multipart part carrying the image
pub const UPLOAD_FIELD: &str = "file";

/// Largest upload accepted, in bytes
///
/// Resolved from the router state so the extractor and the route's
/// `DefaultBodyLimit` agree on one number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimit(pub usize);

/// Extractor for a single image upload
///
/// Rejections are [`GalleryError`]s, so they render as the usual
/// `{"ok": false, "error": ...}` body:
/// - body is not multipart, or has no `file` part: `MissingFile`
/// - body or part exceeds the [`UploadLimit`]: `PayloadTooLarge`
/// - the multipart stream is broken: `MalformedUpload`
#[derive(Debug)]
pub struct ImageUpload(pub UploadedImage);

impl<S> FromRequest<S> for ImageUpload
where
    S: Send + Sync,
    UploadLimit: FromRef<S>,
{
    type Rejection = GalleryError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let UploadLimit(limit) = UploadLimit::from_ref(state);

        let mut multipart = Multipart::from_request(req, state).await.map_err(|e| {
            tracing::debug!(error = %e, "Upload body is not multipart");
            GalleryError::MissingFile
        })?;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| field_error(&e, limit))?
        {
            if field.name() != Some(UPLOAD_FIELD) {
                continue;
            }

            // A part without a filename is a plain form value, not a file
            let Some(filename) = field.file_name().map(str::to_owned) else {
                continue;
            };
            let content_type = field.content_type().map(str::to_owned);
            let data = read_field_data(field, limit).await?;

            return Ok(Self(UploadedImage::new(
                filename,
                content_type.as_deref(),
                data,
            )));
        }

        Err(GalleryError::MissingFile)
    }
}

/// Reads a part into memory, refusing to grow past `limit`
async fn read_field_data(mut field: Field<'_>, limit: usize) -> Result<bytes::Bytes, GalleryError> {
    let mut data = BytesMut::new();

    while let Some(chunk) = field.chunk().await.map_err(|e| field_error(&e, limit))? {
        if data.len() + chunk.len() > limit {
            return Err(GalleryError::PayloadTooLarge { limit });
        }
        data.extend_from_slice(&chunk);
    }

    Ok(data.freeze())
}

fn field_error(err: &MultipartError, limit: usize) -> GalleryError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        GalleryError::PayloadTooLarge { limit }
    } else {
        GalleryError::MalformedUpload(err.body_text())
    }
}
