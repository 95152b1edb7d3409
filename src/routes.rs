use axum::{
    extract::{Request, State},
    middleware,
    response::Response,
    routing::{any, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::adapters::{callable, http};
use crate::auth::attach_auth;
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/api/health", get(health_check))

        // Upstream proxies
        .route("/translateContent", post(translate_content))
        .route("/getPlaces", get(get_places))

        // Favorites
        .route("/getFavorites", any(get_favorites))
        .route(
            "/postFavorite",
            any(post_favorite).layer(middleware::from_fn_with_state(
                state.verifier.clone(),
                attach_auth,
            )),
        )
        .layer(crate::cors::layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn translate_content(State(state): State<AppState>, request: Request) -> Response {
    http::serve(state.translate.as_ref(), request).await
}

async fn get_places(State(state): State<AppState>, request: Request) -> Response {
    http::serve(state.places.as_ref(), request).await
}

async fn get_favorites(State(state): State<AppState>, request: Request) -> Response {
    callable::serve(state.get_favorites.as_ref(), state.verifier.as_ref(), request).await
}

async fn post_favorite(State(state): State<AppState>, request: Request) -> Response {
    http::serve(state.post_favorite.as_ref(), request).await
}
