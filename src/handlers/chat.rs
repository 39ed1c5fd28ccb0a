// Server related imports
use axum::{
    extract::{Json, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

// General imports
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Library imports
use crate::handlers::json_error::{ErrorToResponse, JsonError, serde_json_error_response};
use crate::llm::ChatMessage;
use crate::server::server_state::ServerState;

/// Hard cap on the document text embedded in the prompt; anything past
/// this is cut, not summarized
const CONTEXT_CHAR_LIMIT: usize = 10_000;

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub file_id: String,
    pub message: String,
    /// Full transcript of prior turns; the server keeps no conversation state
    #[serde(default)]
    pub chat_history: Vec<ChatMessage>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ChatResponse {
    pub success: bool,
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

/// Document-grounded chat endpoint
///
/// One best-effort call to the generative model per request; any upstream
/// failure aborts the request with a 500.
#[axum::debug_handler]
pub async fn chat_with_document(
    State(state): State<ServerState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> impl IntoResponse {
    // Extract and process the payload
    match payload {
        Ok(payload) => {
            tracing::debug!("Running chat against document {}", payload.file_id.as_str());
            let Some(document) = state.documents.get(&payload.file_id) else {
                return JsonError::new("Document not found".to_string())
                    .to_response(StatusCode::NOT_FOUND);
            };

            let prompt = build_prompt(
                &document.name,
                &document.text,
                &payload.chat_history,
                &payload.message,
            );

            match state.llm.generate(&prompt).await {
                Ok(response) => Json(ChatResponse {
                    success: true,
                    response,
                    timestamp: Utc::now(),
                })
                .into_response(),
                Err(e) => {
                    tracing::error!("Chat request against {} failed: {e}", payload.file_id);
                    JsonError::new("Failed to process chat request".to_string())
                        .to_response(StatusCode::INTERNAL_SERVER_ERROR)
                }
            }
        }
        Err(JsonRejection::MissingJsonContentType(_err)) => {
            // Request didn't have `Content-Type: application/json`
            // header
            JsonError::new("Missing `Content-Type: application/json` header".to_string())
                .to_response(StatusCode::BAD_REQUEST)
        }
        Err(JsonRejection::JsonDataError(err)) => {
            // Couldn't deserialize the body into the target type
            let (e_code, e_str) = serde_json_error_response(err);
            JsonError::new(e_str).to_response(e_code)
        }
        Err(JsonRejection::JsonSyntaxError(err)) => {
            // Syntax error in the body
            let (e_code, e_str) = serde_json_error_response(err);
            JsonError::new(e_str).to_response(e_code)
        }
        Err(JsonRejection::BytesRejection(_err)) => {
            // Failed to extract the request body
            JsonError::new("Failed to buffer request body".to_string())
                .to_response(StatusCode::INTERNAL_SERVER_ERROR)
        }
        Err(_err) => {
            // `JsonRejection` is marked `#[non_exhaustive]` so match must
            // include a catch-all case.
            JsonError::new("Unknown error".to_string())
                .to_response(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Assemble the single prompt submitted to the model: instruction, a
/// truncated prefix of the document text, the history as `role: content`
/// lines in caller order, then the new question.
pub fn build_prompt(
    document_name: &str,
    document_text: &str,
    history: &[ChatMessage],
    message: &str,
) -> String {
    let context: String = document_text.chars().take(CONTEXT_CHAR_LIMIT).collect();

    let mut prompt = format!(
        "You are analyzing a PDF document titled \"{document_name}\".\nDocument content:\n{context}\n\nChat history:\n"
    );
    for turn in history {
        prompt.push_str(&format!("{}: {}\n", turn.role, turn.content));
    }
    prompt.push_str(&format!("\nUser question: {message}\n"));
    prompt
}
