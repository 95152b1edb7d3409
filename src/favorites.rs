use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::store::{DocumentStore, StoreError};

/// Client-supplied part of a favorite. Any `user_id` in the body is not
/// part of this type and is dropped on deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FavoriteInput {
    #[serde(default)]
    pub favorite_place_id: Option<String>,
    #[serde(default)]
    pub place_name: Option<String>,
    #[serde(default)]
    pub favorite_description: Option<String>,
}

/// A stored favorite. `user_id` always comes from the verified caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteEntry {
    pub favorite_place_id: Option<String>,
    pub place_name: Option<String>,
    pub favorite_description: Option<String>,
    pub user_id: String,
}

impl FavoriteEntry {
    pub fn new(input: FavoriteInput, user_id: &str) -> Self {
        Self {
            favorite_place_id: input.favorite_place_id,
            place_name: input.place_name,
            favorite_description: input.favorite_description,
            user_id: user_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FavoritesLookup {
    Found(Value),
    NotFound,
}

pub struct FavoritesRepository {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl FavoritesRepository {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    /// Read the per-user favorites record. Callers authenticate first.
    pub async fn get_favorites(&self, user_id: &str) -> Result<FavoritesLookup, StoreError> {
        match self.store.get(&self.collection, user_id).await? {
            Some(record) => {
                debug!(user_id, "Favorites record found");
                Ok(FavoritesLookup::Found(record))
            }
            None => {
                debug!(user_id, "No favorites record");
                Ok(FavoritesLookup::NotFound)
            }
        }
    }

    /// Append one favorite owned by `user_id` and return its generated id.
    pub async fn post_favorite(&self, user_id: &str, input: FavoriteInput) -> Result<String, StoreError> {
        let entry = FavoriteEntry::new(input, user_id);
        let document = serde_json::to_value(&entry)
            .map_err(|e| StoreError::InvalidDocument(e.to_string()))?;
        let id = self.store.add(&self.collection, document).await?;
        info!(user_id, id = %id, "Saved favorite");
        Ok(id)
    }
}
