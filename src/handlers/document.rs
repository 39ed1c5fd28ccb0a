// Server related imports
use axum::{
    extract::{Json, Multipart, Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

// General imports
use base64::{Engine as _, prelude::BASE64_STANDARD};
use bytes::Bytes;
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};

// Library imports
use crate::handlers::json_error::{ErrorToResponse, JsonError, serde_json_error_response};
use crate::pdf;
use crate::server::server_state::{DocumentRecord, ServerState};

/// Matches returned per search, matching the original API cap
const MAX_MATCHES: usize = 10;
/// Characters of context kept on each side of a match
const SNIPPET_RADIUS: usize = 100;

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub file_id: String,
    pub file_name: String,
    pub pages: usize,
    pub base64: String,
}

/// PDF upload endpoint
///
/// Reads the `pdf` multipart field, writes the raw bytes under the upload
/// directory, extracts text and page count, and registers the record. A
/// failed parse removes the on-disk file and registers nothing.
#[axum::debug_handler]
pub async fn upload_pdf(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    // Pull out the "pdf" field, ignoring any others
    let mut file: Option<(String, Bytes)> = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() == Some("pdf") {
                    let file_name = field.file_name().unwrap_or("document.pdf").to_string();
                    match field.bytes().await {
                        Ok(bytes) => {
                            file = Some((file_name, bytes));
                            break;
                        }
                        Err(e) => {
                            tracing::error!("Failed to read the uploaded file: {e}");
                            return JsonError::new("Failed to read the uploaded file".to_string())
                                .to_response(StatusCode::BAD_REQUEST);
                        }
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Malformed multipart request: {e}");
                return JsonError::new("Malformed multipart request".to_string())
                    .to_response(StatusCode::BAD_REQUEST);
            }
        }
    }
    let Some((file_name, bytes)) = file else {
        return JsonError::new("No file uploaded".to_string()).to_response(StatusCode::BAD_REQUEST);
    };

    // Keep only the final path component of the client-supplied name
    let file_name = file_name
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or("document.pdf")
        .to_string();

    // Timestamp plus a random suffix keeps concurrent uploads from colliding
    let file_id = format!(
        "{}-{}-{}",
        Utc::now().timestamp_millis(),
        rand::thread_rng().gen_range(0..1_000_000_000u32),
        file_name
    );
    tracing::debug!("Processing upload {file_id} ({} bytes)", bytes.len());

    let stored_path = state.upload_dir.join(&file_id);
    if let Err(e) = tokio::fs::write(&stored_path, &bytes).await {
        tracing::error!("Failed to write {}: {e}", stored_path.display());
        return JsonError::new("Failed to process PDF".to_string())
            .to_response(StatusCode::INTERNAL_SERVER_ERROR);
    }

    // Parsing is CPU-bound and pdf-extract can panic on malformed input;
    // spawn_blocking keeps the panic contained as a join error
    let parse_bytes = bytes.clone();
    let extracted = match tokio::task::spawn_blocking(move || pdf::extract(&parse_bytes)).await {
        Ok(Ok(extracted)) => extracted,
        Ok(Err(e)) => {
            tracing::error!("Failed to parse PDF {file_id}: {e}");
            let _ = tokio::fs::remove_file(&stored_path).await;
            return JsonError::new("Failed to process PDF".to_string())
                .to_response(StatusCode::INTERNAL_SERVER_ERROR);
        }
        Err(e) => {
            tracing::error!("PDF parsing task failed for {file_id}: {e}");
            let _ = tokio::fs::remove_file(&stored_path).await;
            return JsonError::new("Failed to process PDF".to_string())
                .to_response(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let base64 = BASE64_STANDARD.encode(&bytes);
    state.documents.put(DocumentRecord {
        id: file_id.clone(),
        name: file_name.clone(),
        base64: base64.clone(),
        text: extracted.text,
        pages: extracted.pages,
        uploaded_at: Utc::now(),
    });

    Json(UploadResponse {
        success: true,
        file_id,
        file_name,
        pages: extracted.pages,
        base64,
    })
    .into_response()
}

/// Document retrieval endpoint; returns the full stored record
#[axum::debug_handler]
pub async fn get_document(
    State(state): State<ServerState>,
    Path(file_id): Path<String>,
) -> impl IntoResponse {
    match state.documents.get(&file_id) {
        Some(document) => Json(document).into_response(),
        None => {
            tracing::debug!("Document {file_id} not found");
            JsonError::new("Document not found".to_string()).to_response(StatusCode::NOT_FOUND)
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub file_id: String,
    pub query: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchMatch {
    pub snippet: String,
    pub position: usize,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SearchResponse {
    pub success: bool,
    pub matches: Vec<SearchMatch>,
}

/// Substring search endpoint
#[axum::debug_handler]
pub async fn search_document(
    State(state): State<ServerState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> impl IntoResponse {
    // Extract and process the payload
    match payload {
        Ok(payload) => {
            tracing::debug!(
                "Searching document {} for {:?}",
                payload.file_id.as_str(),
                payload.query.as_str()
            );
            match state.documents.get(&payload.file_id) {
                Some(document) => Json(SearchResponse {
                    success: true,
                    matches: find_matches(&document.text, &payload.query),
                })
                .into_response(),
                None => JsonError::new("Document not found".to_string())
                    .to_response(StatusCode::NOT_FOUND),
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

/// Case-insensitive, non-overlapping left-to-right substring search.
///
/// Works over characters rather than bytes so positions are character
/// offsets and snippets cannot split a multi-byte code point. The cursor
/// advances past each match's end, so a query overlapping itself is only
/// counted once per consumed region.
pub fn find_matches(text: &str, query: &str) -> Vec<SearchMatch> {
    if query.is_empty() {
        return Vec::new();
    }

    let lowered = |c: char| c.to_lowercase().next().unwrap_or(c);
    let chars: Vec<char> = text.chars().collect();
    let haystack: Vec<char> = chars.iter().map(|c| lowered(*c)).collect();
    let needle: Vec<char> = query.chars().map(lowered).collect();

    let mut matches = Vec::new();
    let mut index = 0;
    while index + needle.len() <= haystack.len() {
        if haystack[index..index + needle.len()] == needle[..] {
            let start = index.saturating_sub(SNIPPET_RADIUS);
            let end = (index + needle.len() + SNIPPET_RADIUS).min(chars.len());
            matches.push(SearchMatch {
                snippet: chars[start..end].iter().collect(),
                position: index,
            });
            index += needle.len();
            if matches.len() >= MAX_MATCHES {
                break;
            }
        } else {
            index += 1;
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(text: &str, query: &str) -> Vec<usize> {
        find_matches(text, query)
            .into_iter()
            .map(|m| m.position)
            .collect()
    }

    #[test]
    fn test_find_matches_case_insensitive() {
        let matches = find_matches("The Quick brown fox. the quick end.", "THE QUICK");
        assert_eq!(
            matches.iter().map(|m| m.position).collect::<Vec<_>>(),
            [0, 21]
        );
    }

    #[test]
    fn test_find_matches_non_overlapping() {
        // "aa" in "aaaa" must consume the matched region: 0 and 2, never 1
        assert_eq!(positions("aaaa", "aa"), [0, 2]);
        assert_eq!(positions("aaaaa", "aa"), [0, 2]);
    }

    #[test]
    fn test_find_matches_caps_at_ten() {
        let text = "word ".repeat(50);
        assert_eq!(find_matches(&text, "word").len(), 10);
    }

    #[test]
    fn test_find_matches_empty_query_and_text() {
        assert!(find_matches("some text", "").is_empty());
        assert!(find_matches("", "query").is_empty());
        assert!(find_matches("some text", "absent").is_empty());
    }

    #[test]
    fn test_find_matches_snippet_window() {
        let text = format!("{}needle{}", "a".repeat(300), "b".repeat(300));
        let matches = find_matches(&text, "needle");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].position, 300);
        // 100 chars either side of the 6-char match
        assert_eq!(matches[0].snippet.chars().count(), 206);
        assert!(matches[0].snippet.contains("needle"));
    }

    #[test]
    fn test_find_matches_snippet_clamped_at_bounds() {
        let matches = find_matches("needle in a short text", "needle");
        assert_eq!(matches[0].position, 0);
        assert_eq!(matches[0].snippet, "needle in a short text");
    }

    #[test]
    fn test_find_matches_multibyte_text() {
        let matches = find_matches("héllo wörld héllo", "HÉLLO");
        assert_eq!(
            matches.iter().map(|m| m.position).collect::<Vec<_>>(),
            [0, 12]
        );
        assert_eq!(matches[0].snippet, "héllo wörld héllo");
    }
}
