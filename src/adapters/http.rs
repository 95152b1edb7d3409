use std::collections::HashMap;

use axum::{
    body::to_bytes,
    extract::{Query, Request},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::warn;

use crate::auth::AuthContext;
use crate::handlers::{Handler, HandlerRequest, Reply, ReplyBody};

pub const MAX_BODY_BYTES: usize = 1024 * 1024;

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self.body {
            ReplyBody::Json(body) => (self.status, Json(body)).into_response(),
            ReplyBody::Text(text) => (
                self.status,
                [(CONTENT_TYPE, "text/html; charset=utf-8")],
                text,
            )
                .into_response(),
        }
    }
}

/// Read an optional JSON body. Empty bodies are `None`.
pub(crate) async fn read_json_body(request: Request) -> Result<Option<Value>, Reply> {
    let bytes = to_bytes(request.into_body(), MAX_BODY_BYTES).await.map_err(|e| {
        warn!(error = %e, "Failed to read request body");
        Reply::error(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
    })?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(&bytes).map(Some).map_err(|e| {
        warn!(error = %e, "Malformed JSON body");
        Reply::error(StatusCode::BAD_REQUEST, "Malformed JSON body")
    })
}

/// Run an HTTP request through `handler`. Identity comes from whatever the
/// auth layer attached to the request.
pub async fn serve(handler: &dyn Handler, request: Request) -> Response {
    let method = request.method().clone();
    let query = Query::<HashMap<String, String>>::try_from_uri(request.uri())
        .map(|Query(q)| q)
        .unwrap_or_default();
    let auth = AuthContext::from_extensions(request.extensions());

    let body = match read_json_body(request).await {
        Ok(body) => body,
        Err(reply) => return reply.into_response(),
    };

    let handler_request = HandlerRequest::new(method)
        .with_query(query)
        .with_body(body)
        .with_auth(auth);

    handler.handle(handler_request).await.into_response()
}
