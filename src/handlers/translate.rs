use async_trait::async_trait;
use axum::http::StatusCode;
use serde_json::json;
use tracing::warn;

use super::{failure_reply, Handler, HandlerRequest, Reply};
use crate::config::ErrorDetail;
use crate::upstream::{TranslationClient, TranslationRequest, UpstreamOutcome};

pub struct TranslateHandler {
    client: TranslationClient,
    error_detail: ErrorDetail,
}

impl TranslateHandler {
    pub fn new(client: TranslationClient, error_detail: ErrorDetail) -> Self {
        Self {
            client,
            error_detail,
        }
    }
}

#[async_trait]
impl Handler for TranslateHandler {
    async fn handle(&self, request: HandlerRequest) -> Reply {
        // Non-object bodies carry no fields; the provider judges the empty request.
        let translation: TranslationRequest = request.body_as().unwrap_or_else(|e| {
            warn!(error = %e, "Translation body is not an object");
            TranslationRequest::default()
        });

        match self.client.translate(&translation).await {
            UpstreamOutcome::Success(result) => Reply::ok(json!(result)),
            UpstreamOutcome::ProviderError(_) => {
                Reply::error(StatusCode::BAD_REQUEST, "Invalid response from the API")
            }
            UpstreamOutcome::TransportFailure(e) => {
                failure_reply(self.error_detail, "Translation failed", e.to_json())
            }
        }
    }
}
