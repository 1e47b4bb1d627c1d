//! Askama templates
//!
//! Pages are rendered to a `String` and wrapped in [`Html`]; a render failure
//! is logged and answered with a plain 500.
//!
//! # Examples
//!
//! ```rust
//! use refill_gallery::template::{IndexTemplate, RenderHtml};
//!
//! let page = IndexTemplate::new(10 * 1024 * 1024);
//! let response = page.render_html();
//! assert_eq!(response.status(), axum::http::StatusCode::OK);
//! ```

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

/// Path of the upload endpoint, as called from the page
pub const UPLOAD_PATH: &str = "/api/v1/upload";

/// Path of the gallery endpoint, as called from the page
pub const GALLERY_PATH: &str = "/api/v1/gallery";

/// Extension trait turning any template into an HTML response
pub trait RenderHtml: Template {
    /// Render as an HTML response
    ///
    /// Returns `StatusCode::INTERNAL_SERVER_ERROR` if rendering fails.
    fn render_html(&self) -> Response {
        match self.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => {
                tracing::error!("Template rendering error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Template rendering failed",
                )
                    .into_response()
            }
        }
    }
}

impl<T: Template> RenderHtml for T {}

/// Upload form and gallery page served at `/`
#[derive(Debug, Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    /// Upload endpoint the form posts to
    pub upload_path: &'static str,
    /// Gallery endpoint the page loads images from
    pub gallery_path: &'static str,
    /// Upload limit shown to the user, in whole megabytes
    pub max_upload_mb: usize,
    /// File extensions offered by the file picker
    pub accept: String,
}

impl IndexTemplate {
    /// Builds the page for a given upload limit in bytes
    #[must_use]
    pub fn new(max_upload_bytes: usize) -> Self {
        let accept = crate::storage::validation::ALLOWED_EXTENSIONS
            .iter()
            .map(|ext| format!(".{ext}"))
            .collect::<Vec<_>>()
            .join(",");

        Self {
            upload_path: UPLOAD_PATH,
            gallery_path: GALLERY_PATH,
            max_upload_mb: max_upload_bytes.div_ceil(1024 * 1024),
            accept,
        }
    }
}
