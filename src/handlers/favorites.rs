use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use serde_json::json;
use tracing::{error, warn};

use super::{failure_reply, Handler, HandlerRequest, Reply};
use crate::auth::Identity;
use crate::config::ErrorDetail;
use crate::favorites::{FavoriteInput, FavoritesLookup, FavoritesRepository};

/// Callable-style read of the caller's favorites record. Every outcome except
/// a store failure is a 200 payload; auth and not-found are reported in-band.
pub struct GetFavoritesHandler {
    repository: Arc<FavoritesRepository>,
}

impl GetFavoritesHandler {
    pub fn new(repository: Arc<FavoritesRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl Handler for GetFavoritesHandler {
    async fn handle(&self, request: HandlerRequest) -> Reply {
        let Identity::Authenticated(user_id) = request.auth.identity() else {
            return Reply::ok(json!({ "message": "Authentication Required!", "code": 401 }));
        };

        match self.repository.get_favorites(&user_id).await {
            Ok(FavoritesLookup::Found(record)) => Reply::ok(record),
            Ok(FavoritesLookup::NotFound) => {
                Reply::ok(json!({ "message": "No favorites found", "code": 404 }))
            }
            Err(e) => {
                error!(error = %e, "Failed to read favorites");
                Reply::json(StatusCode::INTERNAL_SERVER_ERROR, e.to_json())
            }
        }
    }
}

/// HTTP-style append of one favorite for the caller.
pub struct PostFavoriteHandler {
    repository: Arc<FavoritesRepository>,
    error_detail: ErrorDetail,
}

impl PostFavoriteHandler {
    pub fn new(repository: Arc<FavoritesRepository>, error_detail: ErrorDetail) -> Self {
        Self {
            repository,
            error_detail,
        }
    }
}

#[async_trait]
impl Handler for PostFavoriteHandler {
    async fn handle(&self, request: HandlerRequest) -> Reply {
        if request.method != Method::POST {
            return Reply::text(StatusCode::BAD_REQUEST, "Please send a POST request");
        }

        let Identity::Authenticated(user_id) = request.auth.identity() else {
            return Reply::text(StatusCode::UNAUTHORIZED, "Authentication required");
        };

        let input: FavoriteInput = match request.body_as() {
            Ok(input) => input,
            Err(e) => {
                warn!(error = %e, "Rejecting favorite body");
                return Reply::error(StatusCode::BAD_REQUEST, "Invalid request body");
            }
        };

        match self.repository.post_favorite(&user_id, input).await {
            Ok(id) => Reply::ok(json!({ "success": true, "id": id })),
            Err(e) => {
                error!(error = %e, "Failed to save favorite");
                failure_reply(self.error_detail, "Failed to save favorite", e.to_json())
            }
        }
    }
}
