//! Callable-function wire protocol: `POST {"data": ...}` in, `{"result": ...}`
//! or `{"error": {"status", "message"}}` out.

use axum::{
    extract::Request,
    http::{header::CONTENT_TYPE, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::{error, warn};

use super::http::read_json_body;
use crate::auth::{bearer_token, AuthContext, CallableContext, TokenVerifier};
use crate::handlers::{Handler, HandlerRequest, ReplyBody};

fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({ "error": { "status": code, "message": message } })),
    )
        .into_response()
}

fn bad_request() -> Response {
    error_response(StatusCode::BAD_REQUEST, "INVALID_ARGUMENT", "Bad Request")
}

/// Run a callable invocation through `handler`. The transport verifies the
/// caller: a missing token yields a context without auth, a bad one is
/// rejected here and never reaches the handler.
pub async fn serve(handler: &dyn Handler, verifier: &dyn TokenVerifier, request: Request) -> Response {
    if request.method() != Method::POST {
        warn!(method = %request.method(), "Callable invoked with wrong method");
        return bad_request();
    }

    let is_json = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false);
    if !is_json {
        warn!("Callable invoked without a JSON content type");
        return bad_request();
    }

    let auth = match bearer_token(request.headers()) {
        Ok(None) => None,
        Ok(Some(token)) => match verifier.verify(token) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Callable token rejected");
                return error_response(StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", "Unauthenticated");
            }
        },
        Err(e) => {
            warn!(error = %e, "Callable Authorization header rejected");
            return error_response(StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", "Unauthenticated");
        }
    };

    let data = match read_json_body(request).await {
        Ok(Some(Value::Object(mut envelope))) => match envelope.remove("data") {
            Some(data) => data,
            None => return bad_request(),
        },
        Ok(_) => return bad_request(),
        Err(reply) => return reply.into_response(),
    };

    let context = CallableContext { auth };
    let handler_request = HandlerRequest::new(Method::POST)
        .with_body(Some(data))
        .with_auth(AuthContext::from_callable(&context));

    let reply = handler.handle(handler_request).await;
    if !reply.is_success() {
        error!(status = %reply.status, "Callable handler failed");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", "INTERNAL");
    }

    let result = match reply.body {
        ReplyBody::Json(body) => body,
        ReplyBody::Text(text) => Value::String(text),
    };
    Json(json!({ "result": result })).into_response()
}
