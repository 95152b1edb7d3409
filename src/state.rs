use std::sync::Arc;

use reqwest::Client;
use tracing::info;

use crate::auth::{JwtVerifier, TokenVerifier};
use crate::config::{non_empty, Config, StoreBackend};
use crate::favorites::FavoritesRepository;
use crate::handlers::{GetFavoritesHandler, PlacesHandler, PostFavoriteHandler, TranslateHandler};
use crate::store::{DocumentStore, FirestoreStore, MemoryStore};
use crate::upstream::{PlacesClient, TranslationClient};

/// Process-wide state, built once at startup and shared by every request.
/// Nothing in here is mutated after construction.
#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<dyn TokenVerifier>,
    pub translate: Arc<TranslateHandler>,
    pub places: Arc<PlacesHandler>,
    pub get_favorites: Arc<GetFavoritesHandler>,
    pub post_favorite: Arc<PostFavoriteHandler>,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let client = Client::new();
        let store: Arc<dyn DocumentStore> = match config.store.backend {
            StoreBackend::Memory => match &config.store.seed_path {
                Some(path) => Arc::new(MemoryStore::from_seed_file(path)?),
                None => Arc::new(MemoryStore::new()),
            },
            StoreBackend::Firestore => {
                if non_empty(&Some(config.store.firestore.project_id.clone())).is_none() {
                    anyhow::bail!("store.firestore.project_id is required for the firestore backend");
                }
                Arc::new(FirestoreStore::new(client.clone(), &config.store.firestore))
            }
        };
        info!("Using {:?} document store", config.store.backend);

        let verifier: Arc<dyn TokenVerifier> = Arc::new(JwtVerifier::new(&config.auth)?);
        Ok(Self::with_parts(config, client, store, verifier))
    }

    /// Assemble state from already-built collaborators.
    pub fn with_parts(
        config: Config,
        client: Client,
        store: Arc<dyn DocumentStore>,
        verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        let translation_client = TranslationClient::new(client.clone(), Arc::new(config.translate.clone()));
        let places_client = PlacesClient::new(client, Arc::new(config.places.clone()));
        let repository = Arc::new(FavoritesRepository::new(store, config.favorites.collection.clone()));

        Self {
            translate: Arc::new(TranslateHandler::new(
                translation_client,
                config.translate.error_detail,
            )),
            places: Arc::new(PlacesHandler::new(places_client)),
            get_favorites: Arc::new(GetFavoritesHandler::new(repository.clone())),
            post_favorite: Arc::new(PostFavoriteHandler::new(
                repository,
                config.favorites.error_detail,
            )),
            verifier,
        }
    }
}
