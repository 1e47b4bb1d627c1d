//! Upload validation
//!
//! Decides whether an upload is acceptable from the metadata the client
//! supplies: the declared filename and the declared content type.
//!
//! # Trust boundary
//!
//! File bytes are never inspected. A client that lies about both the
//! extension and the content type gets its payload stored. Callers that need
//! magic-number checks must add them on top of [`validate`].
//!
//! # Examples
//!
//! ```rust
//! use refill_gallery::storage::validation::{validate, RejectionReason};
//!
//! assert!(validate("cat.PNG", Some("image/png")).is_ok());
//! assert_eq!(validate("", Some("image/png")), Err(RejectionReason::NoFile));
//! assert_eq!(
//!     validate("photo.exe", Some("application/octet-stream")),
//!     Err(RejectionReason::UnsupportedExtension)
//! );
//! assert_eq!(validate("cat.png", None), Err(RejectionReason::NotAnImage));
//! ```

use thiserror::Error;

/// Extensions accepted for upload, compared case-insensitively
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp", "tiff"];

/// Prefix every accepted content type must start with
pub const IMAGE_CONTENT_TYPE_PREFIX: &str = "image/";

/// Why an upload was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectionReason {
    /// The file part carried an empty filename
    #[error("No file selected")]
    NoFile,

    /// The filename has no extension, or one outside [`ALLOWED_EXTENSIONS`]
    #[error("Invalid file type: only image files allowed.")]
    UnsupportedExtension,

    /// The declared content type is absent or not `image/*`
    #[error("File must be an image")]
    NotAnImage,
}

/// Validates an upload's declared filename and content type
///
/// Checks run in order: empty filename, extension, content type. The first
/// failing check determines the reason.
///
/// # Errors
///
/// Returns the [`RejectionReason`] of the first failing check.
pub fn validate(filename: &str, declared_content_type: Option<&str>) -> Result<(), RejectionReason> {
    if filename.is_empty() {
        return Err(RejectionReason::NoFile);
    }

    if !has_allowed_extension(filename) {
        return Err(RejectionReason::UnsupportedExtension);
    }

    match declared_content_type {
        Some(content_type) if content_type.starts_with(IMAGE_CONTENT_TYPE_PREFIX) => Ok(()),
        _ => Err(RejectionReason::NotAnImage),
    }
}

/// Returns true if the substring after the last `.` is an allowed extension
#[must_use]
pub fn has_allowed_extension(filename: &str) -> bool {
    filename.rsplit_once('.').is_some_and(|(_, ext)| {
        ALLOWED_EXTENSIONS
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext))
    })
}
