use std::sync::Arc;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, warn};

use super::{read_json, UpstreamError, UpstreamOutcome};
use crate::config::{non_empty, TranslateConfig};

/// Caller-supplied fields are taken as-is; non-string values are sent in
/// their JSON text form and `null` or absent ones are left out.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranslationRequest {
    #[serde(default)]
    pub text: Option<Value>,
    #[serde(default, rename = "target")]
    pub target_language: Option<Value>,
}

impl TranslationRequest {
    pub fn text(&self) -> Option<String> {
        stringify(&self.text)
    }

    pub fn target_language(&self) -> Option<String> {
        stringify(&self.target_language)
    }
}

fn stringify(value: &Option<Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    pub translated_text: String,
}

/// Client for the Google Translate v2 API.
#[derive(Debug, Clone)]
pub struct TranslationClient {
    client: Client,
    config: Arc<TranslateConfig>,
}

impl TranslationClient {
    pub fn new(client: Client, config: Arc<TranslateConfig>) -> Self {
        Self { client, config }
    }

    pub async fn translate(&self, request: &TranslationRequest) -> UpstreamOutcome<TranslationResult> {
        let Some(api_key) = non_empty(&self.config.api_key) else {
            error!("Translation API key is not configured");
            return UpstreamOutcome::TransportFailure(UpstreamError::MissingCredential("translation"));
        };

        let text = request.text();
        let target_language = request.target_language();
        debug!(
            target_language = ?target_language,
            chars = text.as_ref().map_or(0, String::len),
            "Sending translation request"
        );

        let mut params = vec![("key", api_key), ("source", self.config.source_language.as_str())];
        if let Some(target_language) = &target_language {
            params.push(("target", target_language.as_str()));
        }
        if let Some(text) = &text {
            params.push(("q", text.as_str()));
        }

        let sent = self
            .client
            .post(&self.config.endpoint)
            .query(&params)
            .send()
            .await;

        let body = match sent {
            Ok(response) => read_json(response).await,
            Err(e) => Err(e.into()),
        };

        match body {
            Ok(body) => classify(body),
            Err(e) => {
                error!(error = %e, "Translation request failed");
                UpstreamOutcome::TransportFailure(e)
            }
        }
    }
}

fn classify(body: Value) -> UpstreamOutcome<TranslationResult> {
    let Some(translations) = body.pointer("/data/translations").and_then(Value::as_array) else {
        warn!("Translation response has no data.translations");
        return UpstreamOutcome::ProviderError(body);
    };

    match translations
        .first()
        .and_then(|t| t.get("translatedText"))
        .and_then(Value::as_str)
    {
        Some(text) => UpstreamOutcome::Success(TranslationResult {
            translated_text: text.to_string(),
        }),
        None => {
            error!("Translation response has no translatedText in its first entry");
            UpstreamOutcome::TransportFailure(UpstreamError::Decode(
                "translations[0].translatedText missing".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_translation_wins() {
        let outcome = classify(json!({
            "data": {"translations": [
                {"translatedText": "こんにちは"},
                {"translatedText": "ignored"}
            ]}
        }));
        match outcome {
            UpstreamOutcome::Success(result) => assert_eq!(result.translated_text, "こんにちは"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn missing_translations_is_provider_error() {
        assert!(matches!(
            classify(json!({"data": {}})),
            UpstreamOutcome::ProviderError(_)
        ));
        assert!(matches!(
            classify(json!({"data": {"translations": "nope"}})),
            UpstreamOutcome::ProviderError(_)
        ));
    }

    #[test]
    fn empty_translations_is_transport_failure() {
        assert!(matches!(
            classify(json!({"data": {"translations": []}})),
            UpstreamOutcome::TransportFailure(UpstreamError::Decode(_))
        ));
    }

    #[test]
    fn request_reads_target_field() {
        let request: TranslationRequest =
            serde_json::from_value(json!({"text": "hello", "target": "ja"})).unwrap();
        assert_eq!(request.target_language().as_deref(), Some("ja"));
        assert_eq!(request.text().as_deref(), Some("hello"));
    }

    #[test]
    fn non_string_fields_are_stringified() {
        let request: TranslationRequest =
            serde_json::from_value(json!({"text": 42, "target": null})).unwrap();
        assert_eq!(request.text().as_deref(), Some("42"));
        assert_eq!(request.target_language(), None);

        let request: TranslationRequest =
            serde_json::from_value(json!({"text": {"a": [1, true]}})).unwrap();
        assert_eq!(request.text().as_deref(), Some(r#"{"a":[1,true]}"#));
    }

    #[test]
    fn result_serializes_as_translated_text() {
        let result = TranslationResult {
            translated_text: "hola".to_string(),
        };
        assert_eq!(serde_json::to_value(&result).unwrap(), json!({"translatedText": "hola"}));
    }
}
