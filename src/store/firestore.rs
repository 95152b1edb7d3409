use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde_json::{json, Map, Value};
use tracing::{debug, error};

use super::{DocumentStore, StoreError};
use crate::config::{non_empty, FirestoreConfig};

/// Firestore REST v1 backend.
#[derive(Debug, Clone)]
pub struct FirestoreStore {
    client: Client,
    documents_url: String,
    access_token: Option<String>,
}

impl FirestoreStore {
    pub fn new(client: Client, config: &FirestoreConfig) -> Self {
        let documents_url = format!(
            "{}/projects/{}/databases/{}/documents",
            config.base_url.trim_end_matches('/'),
            config.project_id,
            config.database
        );
        Self {
            client,
            documents_url,
            access_token: non_empty(&config.access_token).map(str::to_string),
        }
    }

    /// `documents/{collection}[/{id}]`, each segment percent-encoded.
    fn document_url(&self, collection: &str, id: Option<&str>) -> Result<Url, StoreError> {
        check_segment(collection)?;
        let mut url = Url::parse(&self.documents_url)
            .map_err(|e| StoreError::InvalidId(format!("{}: {}", self.documents_url, e)))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StoreError::InvalidId(self.documents_url.clone()))?;
            segments.push(collection);
            if let Some(id) = id {
                check_segment(id)?;
                segments.push(id);
            }
        }
        Ok(url)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

/// Firestore ids are single path segments and may not be `.` or `..`.
fn check_segment(segment: &str) -> Result<(), StoreError> {
    if segment.is_empty() || segment == "." || segment == ".." || segment.contains('/') {
        return Err(StoreError::InvalidId(segment.to_string()));
    }
    Ok(())
}

async fn rejected(response: reqwest::Response) -> StoreError {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|v| v.pointer("/error/message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or(text);
    error!(status, message = %message, "Firestore rejected request");
    StoreError::Rejected { status, message }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let url = self.document_url(collection, Some(id))?;
        let response = self.authorize(self.client.get(url)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(rejected(response).await);
        }

        let document: Value = response.json().await?;
        let fields = document.get("fields").cloned().unwrap_or_else(|| json!({}));
        Ok(Some(decode_fields(&fields)?))
    }

    async fn add(&self, collection: &str, document: Value) -> Result<String, StoreError> {
        let url = self.document_url(collection, None)?;
        let body = json!({ "fields": encode_fields(&document)? });
        let response = self.authorize(self.client.post(url)).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(rejected(response).await);
        }

        let created: Value = response.json().await?;
        let id = created
            .get("name")
            .and_then(Value::as_str)
            .and_then(|name| name.rsplit('/').next())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| StoreError::InvalidDocument("created document has no name".to_string()))?
            .to_string();
        debug!("Created Firestore document {}/{}", collection, id);
        Ok(id)
    }

    async fn set(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError> {
        let url = self.document_url(collection, Some(id))?;
        let body = json!({ "fields": encode_fields(&document)? });
        let response = self.authorize(self.client.patch(url)).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(rejected(response).await);
        }
        Ok(())
    }
}

/// JSON object to a Firestore `fields` map.
pub(crate) fn encode_fields(document: &Value) -> Result<Value, StoreError> {
    let object = document
        .as_object()
        .ok_or_else(|| StoreError::InvalidDocument("document must be an object".to_string()))?;
    let fields: Map<String, Value> = object
        .iter()
        .map(|(k, v)| (k.clone(), encode_value(v)))
        .collect();
    Ok(Value::Object(fields))
}

fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            // 64-bit integers travel as strings
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({
            "mapValue": {
                "fields": map
                    .iter()
                    .map(|(k, v)| (k.clone(), encode_value(v)))
                    .collect::<Map<String, Value>>()
            }
        }),
    }
}

/// Firestore `fields` map back to a plain JSON object.
pub(crate) fn decode_fields(fields: &Value) -> Result<Value, StoreError> {
    let object = fields
        .as_object()
        .ok_or_else(|| StoreError::InvalidDocument("fields must be an object".to_string()))?;
    let mut decoded = Map::new();
    for (k, v) in object {
        decoded.insert(k.clone(), decode_value(v)?);
    }
    Ok(Value::Object(decoded))
}

fn decode_value(value: &Value) -> Result<Value, StoreError> {
    let object = value
        .as_object()
        .ok_or_else(|| StoreError::InvalidDocument(format!("not a typed value: {}", value)))?;
    let (kind, inner) = object
        .iter()
        .next()
        .ok_or_else(|| StoreError::InvalidDocument("empty typed value".to_string()))?;

    Ok(match kind.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" | "doubleValue" => inner.clone(),
        "integerValue" => match inner {
            Value::String(s) => s
                .parse::<i64>()
                .map(Value::from)
                .map_err(|e| StoreError::InvalidDocument(format!("integerValue {}: {}", s, e)))?,
            other => other.clone(),
        },
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner.clone(),
        "geoPointValue" => inner.clone(),
        "arrayValue" => {
            let values = inner.get("values").and_then(Value::as_array);
            let items = values
                .map(|vs| vs.iter().map(decode_value).collect::<Result<Vec<_>, _>>())
                .transpose()?
                .unwrap_or_default();
            Value::Array(items)
        }
        "mapValue" => match inner.get("fields") {
            Some(fields) => decode_fields(fields)?,
            None => json!({}),
        },
        other => {
            return Err(StoreError::InvalidDocument(format!("unsupported value type {}", other)))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_scalars_with_firestore_tags() {
        let fields = encode_fields(&json!({
            "name": "Tokyo Tower",
            "visits": 3,
            "rating": 4.5,
            "open": true,
            "note": null
        }))
        .unwrap();
        assert_eq!(fields["name"], json!({"stringValue": "Tokyo Tower"}));
        assert_eq!(fields["visits"], json!({"integerValue": "3"}));
        assert_eq!(fields["rating"], json!({"doubleValue": 4.5}));
        assert_eq!(fields["open"], json!({"booleanValue": true}));
        assert_eq!(fields["note"], json!({"nullValue": null}));
    }

    #[test]
    fn decodes_nested_documents() {
        let fields = json!({
            "places": {"arrayValue": {"values": [
                {"mapValue": {"fields": {
                    "id": {"stringValue": "p1"},
                    "count": {"integerValue": "7"}
                }}}
            ]}},
            "empty": {"arrayValue": {}},
            "updated": {"timestampValue": "2024-01-01T00:00:00Z"}
        });
        assert_eq!(
            decode_fields(&fields).unwrap(),
            json!({
                "places": [{"id": "p1", "count": 7}],
                "empty": [],
                "updated": "2024-01-01T00:00:00Z"
            })
        );
    }

    #[test]
    fn ids_must_be_single_segments() {
        assert!(check_segment("alice").is_ok());
        assert!(check_segment("bob#mallory").is_ok());
        for bad in ["", ".", "..", "mallory/../bob", "a/b"] {
            assert!(matches!(check_segment(bad), Err(StoreError::InvalidId(_))), "{:?}", bad);
        }
    }

    #[test]
    fn document_url_percent_encodes_ids() {
        let store = FirestoreStore::new(
            Client::new(),
            &FirestoreConfig {
                base_url: "http://localhost:8080".to_string(),
                project_id: "demo".to_string(),
                ..FirestoreConfig::default()
            },
        );
        let url = store.document_url("favorite", Some("bob?x=1#y")).unwrap();
        assert_eq!(
            url.path(),
            "/projects/demo/databases/(default)/documents/favorite/bob%3Fx=1%23y"
        );
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn rejects_non_object_documents() {
        assert!(encode_fields(&json!("scalar")).is_err());
        assert!(decode_fields(&json!({"x": {"mysteryValue": 1}})).is_err());
    }
}
