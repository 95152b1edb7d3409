use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use tracing::{debug, info};
use uuid::Uuid;

use super::{DocumentStore, StoreError};

/// In-process store keyed by (collection, document id).
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: DashMap<(String, String), Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `{collection: {id: document}}` from a JSON file.
    pub fn from_seed_file(path: &str) -> Result<Self, StoreError> {
        let content = fs::read_to_string(path)?;
        let seed: HashMap<String, HashMap<String, Value>> = serde_json::from_str(&content)
            .map_err(|e| StoreError::InvalidDocument(format!("seed file {}: {}", path, e)))?;

        let store = Self::new();
        for (collection, docs) in seed {
            for (id, doc) in docs {
                store.documents.insert((collection.clone(), id), doc);
            }
        }
        info!("Seeded memory store with {} documents from {}", store.len(), path);
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// 20 alphanumeric characters, the same shape as Firestore auto ids.
fn generate_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(20);
    id
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let key = (collection.to_string(), id.to_string());
        Ok(self.documents.get(&key).map(|e| e.value().clone()))
    }

    async fn add(&self, collection: &str, document: Value) -> Result<String, StoreError> {
        if !document.is_object() {
            return Err(StoreError::InvalidDocument("document must be an object".to_string()));
        }
        let id = generate_id();
        self.documents.insert((collection.to_string(), id.clone()), document);
        debug!("Added document {}/{}", collection, id);
        Ok(id)
    }

    async fn set(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError> {
        if !document.is_object() {
            return Err(StoreError::InvalidDocument("document must be an object".to_string()));
        }
        self.documents.insert((collection.to_string(), id.to_string()), document);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[tokio::test]
    async fn get_missing_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("favorite", "nobody").await.unwrap(), None);
    }

    #[tokio::test]
    async fn add_generates_distinct_ids() {
        let store = MemoryStore::new();
        let a = store.add("favorite", json!({"n": 1})).await.unwrap();
        let b = store.add("favorite", json!({"n": 1})).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(a.len(), 20);
        assert_eq!(store.get("favorite", &a).await.unwrap(), Some(json!({"n": 1})));
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn collections_are_separate() {
        let store = MemoryStore::new();
        store.set("favorite", "u1", json!({"a": 1})).await.unwrap();
        assert_eq!(store.get("other", "u1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn rejects_non_object_documents() {
        let store = MemoryStore::new();
        assert!(store.add("favorite", json!([1, 2])).await.is_err());
    }

    #[tokio::test]
    async fn loads_seed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"favorite": {{"u1": {{"places": ["a"]}}}}}}"#).unwrap();
        let store = MemoryStore::from_seed_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(
            store.get("favorite", "u1").await.unwrap(),
            Some(json!({"places": ["a"]}))
        );
    }
}
