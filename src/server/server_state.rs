// General imports
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

// Library imports
use crate::llm::gemini::{GeminiClient, GeminiConfig};
use crate::server::server_config::ServerConfig;

/// One uploaded document with its extracted text.
///
/// The record is registered once after upload processing completes and
/// lives until process exit; there is no deletion path.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    /// Store key, generated at upload time and immutable afterwards
    pub id: String,
    /// Original filename, not unique
    pub name: String,
    /// Raw PDF bytes, standard base64
    pub base64: String,
    /// Full extracted text
    pub text: String,
    pub pages: usize,
    pub uploaded_at: DateTime<Utc>,
}

/// In-memory registry of uploaded documents keyed by their id.
///
/// No eviction and no capacity bound; memory grows with uploads for the
/// life of the process.
#[derive(Clone, Default)]
pub struct DocumentStore {
    documents: Arc<RwLock<HashMap<String, DocumentRecord>>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self {
            documents: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a record, overwriting any record with the same id
    pub fn put(&self, record: DocumentRecord) {
        self.documents.write().insert(record.id.clone(), record);
    }

    pub fn get(&self, id: &str) -> Option<DocumentRecord> {
        self.documents.read().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }
}

#[derive(Clone)]
pub struct ServerState {
    /// Uploaded documents, shared across handlers
    pub documents: DocumentStore,
    /// Directory holding the raw uploaded files
    pub upload_dir: PathBuf,
    /// Client for the external generative model
    pub llm: GeminiClient,
}

impl ServerState {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            documents: DocumentStore::new(),
            upload_dir: PathBuf::from(&config.upload_dir),
            llm: GeminiClient::new(GeminiConfig {
                api_key: config.gemini_api_key.clone(),
                model: config.gemini_model.clone(),
                base_url: config.gemini_base_url.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, text: &str) -> DocumentRecord {
        DocumentRecord {
            id: id.to_string(),
            name: "report.pdf".to_string(),
            base64: String::new(),
            text: text.to_string(),
            pages: 1,
            uploaded_at: Utc::now(),
        }
    }

    #[test]
    fn test_document_store_put_get() {
        let store = DocumentStore::new();
        assert!(store.is_empty());
        assert!(store.get("missing").is_none());

        store.put(record("1700000000000-42-report.pdf", "hello"));
        let found = store.get("1700000000000-42-report.pdf").unwrap();
        assert_eq!(found.name, "report.pdf");
        assert_eq!(found.text, "hello");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_document_store_put_overwrites() {
        let store = DocumentStore::new();
        store.put(record("same-id", "first"));
        store.put(record("same-id", "second"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("same-id").unwrap().text, "second");
    }

    #[test]
    fn test_document_store_instances_are_isolated() {
        let a = DocumentStore::new();
        let b = DocumentStore::new();
        a.put(record("only-in-a", ""));
        assert!(b.get("only-in-a").is_none());
    }

    #[test]
    fn test_document_record_wire_field_names() {
        let serialized = serde_json::to_value(record("id-1", "body")).unwrap();
        assert!(serialized.get("uploadedAt").is_some());
        assert!(serialized.get("base64").is_some());
        assert_eq!(serialized["pages"], 1);
    }
}
