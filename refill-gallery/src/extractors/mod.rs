//! Axum extractors for refill-gallery
//!
//! Provides the multipart upload extractor used by the upload handler.

mod file_upload;

pub use file_upload::{ImageUpload, UploadLimit, UPLOAD_FIELD};
