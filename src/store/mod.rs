//! Document store consumed by the favorites repository: single-document
//! reads, appends with generated ids, and keyed writes for seeding.

mod firestore;
mod memory;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Store rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid document id: {0}")]
    InvalidId(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Raw error object sent to callers on endpoints that pass failures through.
    pub fn to_json(&self) -> Value {
        let code = match self {
            StoreError::Request(_) | StoreError::Io(_) => json!("unavailable"),
            StoreError::Rejected { status, .. } => json!(status),
            StoreError::InvalidId(_) | StoreError::InvalidDocument(_) => json!("invalid-argument"),
        };
        json!({
            "name": "StoreError",
            "code": code,
            "message": self.to_string(),
        })
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read one document. `Ok(None)` when it does not exist.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    /// Append a document under a generated id and return that id.
    async fn add(&self, collection: &str, document: Value) -> Result<String, StoreError>;

    /// Create or replace the document at `id`.
    async fn set(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError>;
}
