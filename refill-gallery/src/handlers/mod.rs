//! HTTP handlers
//!
//! - [`api`]: the JSON upload and gallery endpoints and the health check
//! - [`pages`]: the HTML index page

pub mod api;
pub mod pages;
