//! HTML pages

use crate::state::AppState;
use crate::template::{IndexTemplate, RenderHtml};
use axum::{extract::State, response::Response};

/// `GET /`: the upload form and gallery page
pub async fn index(State(state): State<AppState>) -> Response {
    IndexTemplate::new(state.config().server.max_upload_bytes).render_html()
}
