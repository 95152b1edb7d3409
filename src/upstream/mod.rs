//! Outbound calls to the translation and geo-search providers.
//!
//! Each call is classified into one of three outcomes: a usable payload,
//! an error the provider reported in a completed exchange, or a failure of
//! the exchange itself.

mod places;
mod translate;

pub use places::{PlaceQuery, PlacesClient};
pub use translate::{TranslationClient, TranslationRequest, TranslationResult};

use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug)]
pub enum UpstreamOutcome<T> {
    Success(T),
    /// The provider answered but declared a logical failure. Carries the
    /// provider payload.
    ProviderError(Value),
    TransportFailure(UpstreamError),
}

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("No API key configured for {0}")]
    MissingCredential(&'static str),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Request failed with status code {status}")]
    Status { status: u16, body: Value },

    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl UpstreamError {
    /// Raw error object sent to callers on endpoints that pass failures through.
    pub fn to_json(&self) -> Value {
        match self {
            UpstreamError::MissingCredential(_) => json!({
                "name": "ConfigurationError",
                "message": self.to_string(),
            }),
            UpstreamError::Request(e) => {
                let mut body = json!({
                    "name": "RequestError",
                    "message": e.to_string(),
                });
                if e.is_timeout() {
                    body["code"] = json!("ETIMEDOUT");
                }
                if let Some(status) = e.status() {
                    body["status"] = json!(status.as_u16());
                }
                body
            }
            UpstreamError::Status { status, body } => json!({
                "name": "RequestError",
                "message": self.to_string(),
                "status": status,
                "data": body,
            }),
            UpstreamError::Decode(_) => json!({
                "name": "DecodeError",
                "message": self.to_string(),
            }),
        }
    }
}

/// Read the body of a completed exchange as JSON, turning non-2xx statuses
/// into transport failures.
pub(crate) async fn read_json(response: reqwest::Response) -> Result<Value, UpstreamError> {
    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
        return Err(UpstreamError::Status {
            status: status.as_u16(),
            body,
        });
    }
    serde_json::from_str(&text).map_err(|e| UpstreamError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_serializes_status_and_data() {
        let err = UpstreamError::Status {
            status: 403,
            body: json!({"error_message": "denied"}),
        };
        let body = err.to_json();
        assert_eq!(body["status"], 403);
        assert_eq!(body["data"]["error_message"], "denied");
        assert_eq!(body["message"], "Request failed with status code 403");
    }
}
