use places_bff::config::FirestoreConfig;
use places_bff::store::{DocumentStore, FirestoreStore, StoreError};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DOCUMENTS: &str = "/projects/demo/databases/(default)/documents";

fn store(server: &MockServer, access_token: Option<&str>) -> FirestoreStore {
    let config = FirestoreConfig {
        base_url: server.uri(),
        project_id: "demo".to_string(),
        access_token: access_token.map(str::to_string),
        ..FirestoreConfig::default()
    };
    FirestoreStore::new(reqwest::Client::new(), &config)
}

#[tokio::test]
async fn missing_document_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/favorite/nobody", DOCUMENTS)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": 404, "message": "Document not found", "status": "NOT_FOUND" }
        })))
        .mount(&server)
        .await;

    let found = store(&server, None).get("favorite", "nobody").await.unwrap();
    assert_eq!(found, None);
}

#[tokio::test]
async fn existing_document_is_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/favorite/alice", DOCUMENTS)))
        .and(header("authorization", "Bearer svc-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/demo/databases/(default)/documents/favorite/alice",
            "fields": {
                "places": { "arrayValue": { "values": [
                    { "stringValue": "p1" },
                    { "stringValue": "p2" }
                ]}},
                "count": { "integerValue": "2" }
            }
        })))
        .mount(&server)
        .await;

    let found = store(&server, Some("svc-token"))
        .get("favorite", "alice")
        .await
        .unwrap();
    assert_eq!(found, Some(json!({ "places": ["p1", "p2"], "count": 2 })));
}

#[tokio::test]
async fn add_posts_typed_fields_and_returns_generated_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/favorite", DOCUMENTS)))
        .and(body_json(json!({
            "fields": {
                "place_name": { "stringValue": "Tokyo Tower" },
                "user_id": { "stringValue": "alice" }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/demo/databases/(default)/documents/favorite/AbCdEfGhIjKlMnOpQrSt",
            "fields": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let id = store(&server, None)
        .add("favorite", json!({ "place_name": "Tokyo Tower", "user_id": "alice" }))
        .await
        .unwrap();
    assert_eq!(id, "AbCdEfGhIjKlMnOpQrSt");
}

#[tokio::test]
async fn rejected_write_surfaces_status_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/favorite", DOCUMENTS)))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "code": 403, "message": "Missing or insufficient permissions.", "status": "PERMISSION_DENIED" }
        })))
        .mount(&server)
        .await;

    let err = store(&server, None)
        .add("favorite", json!({ "user_id": "alice" }))
        .await
        .unwrap_err();
    match &err {
        StoreError::Rejected { status, message } => {
            assert_eq!(*status, 403);
            assert_eq!(message, "Missing or insufficient permissions.");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(err.to_json()["code"], 403);
}

#[tokio::test]
async fn crafted_ids_cannot_reach_another_users_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/favorite/bob", DOCUMENTS)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "fields": { "secret": { "stringValue": "bob-only" } }
        })))
        .mount(&server)
        .await;

    let store = store(&server, None);
    assert_eq!(
        store.get("favorite", "bob").await.unwrap(),
        Some(json!({ "secret": "bob-only" }))
    );

    let err = store.get("favorite", "mallory/../bob").await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidId(_)));

    for uid in ["bob#mallory", "bob?x=1", "bob%2F"] {
        let found = store.get("favorite", uid).await.unwrap();
        assert_eq!(found, None, "uid {:?} resolved to a document", uid);
    }
}
