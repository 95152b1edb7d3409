//! The four endpoints as transport-agnostic handlers. Adapters in
//! [`crate::adapters`] translate HTTP and callable invocations into a
//! [`HandlerRequest`] and a [`Reply`] back into a response.

mod favorites;
mod places;
mod translate;

pub use favorites::{GetFavoritesHandler, PostFavoriteHandler};
pub use places::PlacesHandler;
pub use translate::TranslateHandler;

use std::collections::HashMap;

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::auth::AuthContext;
use crate::config::ErrorDetail;

#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, request: HandlerRequest) -> Reply;
}

#[derive(Debug, Clone)]
pub struct HandlerRequest {
    pub method: Method,
    pub query: HashMap<String, String>,
    pub body: Option<Value>,
    pub auth: AuthContext,
}

impl HandlerRequest {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            query: HashMap::new(),
            body: None,
            auth: AuthContext::unauthenticated(),
        }
    }

    pub fn with_query(mut self, query: HashMap<String, String>) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: Option<Value>) -> Self {
        self.body = body;
        self
    }

    pub fn with_auth(mut self, auth: AuthContext) -> Self {
        self.auth = auth;
        self
    }

    /// Deserialize the body, treating a missing body as all-default fields.
    pub fn body_as<T: DeserializeOwned + Default>(&self) -> Result<T, serde_json::Error> {
        match &self.body {
            None | Some(Value::Null) => Ok(T::default()),
            Some(body) => T::deserialize(body),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReplyBody {
    Json(Value),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: StatusCode,
    pub body: ReplyBody,
}

impl Reply {
    pub fn json(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body: ReplyBody::Json(body),
        }
    }

    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: ReplyBody::Text(body.into()),
        }
    }

    pub fn ok(body: Value) -> Self {
        Self::json(StatusCode::OK, body)
    }

    pub fn error(status: StatusCode, message: &str) -> Self {
        Self::json(status, json!({ "error": message }))
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// 500 reply for a transport or store failure, shaped by the endpoint's policy.
pub(crate) fn failure_reply(detail: ErrorDetail, generic_message: &str, raw: Value) -> Reply {
    match detail {
        ErrorDetail::Suppressed => Reply::error(StatusCode::INTERNAL_SERVER_ERROR, generic_message),
        ErrorDetail::Passthrough => Reply::json(StatusCode::INTERNAL_SERVER_ERROR, raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::favorites::FavoriteInput;

    #[test]
    fn missing_body_deserializes_to_defaults() {
        let request = HandlerRequest::new(Method::POST);
        let input: FavoriteInput = request.body_as().unwrap();
        assert!(input.place_name.is_none());
    }

    #[test]
    fn mistyped_body_is_an_error() {
        let request = HandlerRequest::new(Method::POST).with_body(Some(json!({"place_name": 5})));
        assert!(request.body_as::<FavoriteInput>().is_err());
    }

    #[test]
    fn failure_policy_controls_detail() {
        let raw = json!({"message": "connect ECONNREFUSED"});
        assert_eq!(
            failure_reply(ErrorDetail::Suppressed, "Translation failed", raw.clone()),
            Reply::json(StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "Translation failed"}))
        );
        assert_eq!(
            failure_reply(ErrorDetail::Passthrough, "Translation failed", raw.clone()),
            Reply::json(StatusCode::INTERNAL_SERVER_ERROR, raw)
        );
    }
}
