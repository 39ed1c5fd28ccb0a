// Server related imports
use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};

// General imports
use bytes::Bytes;

// Library imports
use crate::handlers::json_error::{ErrorToResponse, JsonError};
use crate::server::server_state::ServerState;

/// Static serving of uploaded PDFs.
///
/// Unlike the JSON endpoints these responses carry a wildcard CORS header
/// so the frontend can embed them directly.
#[axum::debug_handler]
pub async fn serve_uploaded_pdf(
    State(state): State<ServerState>,
    Path(file_name): Path<String>,
) -> impl IntoResponse {
    // The route only matches a single path segment, but reject dot-dot
    // names outright rather than touching the filesystem with them
    if file_name.contains("..") || file_name.contains(['/', '\\']) {
        return JsonError::new("Not found".to_string()).to_response(StatusCode::NOT_FOUND);
    }

    match tokio::fs::read(state.upload_dir.join(&file_name)).await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, "application/pdf"),
                (header::CONTENT_DISPOSITION, "inline"),
                (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            ],
            Bytes::from(bytes),
        )
            .into_response(),
        Err(e) => {
            tracing::debug!("Uploaded file {file_name} not readable: {e}");
            JsonError::new("Not found".to_string()).to_response(StatusCode::NOT_FOUND)
        }
    }
}
