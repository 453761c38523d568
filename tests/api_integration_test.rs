use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tower::util::ServiceExt; // for oneshot

use trellis::adapters::memory_records::InMemoryRecordStore;
use trellis::compiler::{ViewCatalog, ViewDefinition, View};
use trellis::renderer::Renderer;
use trellis::AppState;

const PEOPLE_VIEW: &str = r#"
name: person_form
relations:
  contacts: { cardinality: many, resource: /contacts }
elements:
  - node: form
    name: person
    elements:
      - node: field
        name: first_name
        label: First name
      - node: field
        name: email
        kind: INPUT_EMAIL
        rules:
          - effect: DISABLE
            conditions:
              - { field: status, operator: EQ, values: [locked] }
      - node: relationship_picker
        name: contacts
        columns:
          - { name: name }
"#;

async fn setup() -> (Router, InMemoryRecordStore) {
    let definition: ViewDefinition = serde_yaml::from_str(PEOPLE_VIEW).unwrap();
    let mut catalog = ViewCatalog::new();
    catalog.insert(definition.name(), definition.compile().unwrap());

    let store = InMemoryRecordStore::new();
    let mut ann = Map::new();
    ann.insert("name".to_string(), json!("Ann Lee"));
    let mut bob = Map::new();
    bob.insert("name".to_string(), json!("Bob Stone"));
    store.seed("/contacts", vec![ann, bob]).await;

    let state = AppState {
        catalog: Arc::new(catalog),
        renderer: Arc::new(Renderer::with_defaults()),
        records: Arc::new(store.clone()),
        per_page: 10,
    };
    (trellis::create_app(state), store)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_endpoints() {
    let (app, _) = setup().await;

    for uri in ["/health", "/health/ready", "/health/live"] {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
    }

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let body = body_json(app.oneshot(request).await.unwrap()).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["views"], 1);
}

#[tokio::test]
async fn test_list_and_get_views() {
    let (app, _) = setup().await;

    let request = Request::builder().uri("/api/views").body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"][0]["name"], "person_form");

    let request = Request::builder()
        .uri("/api/views/person_form")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["type"], "VIEW");
    assert_eq!(body["data"]["elements"][0]["type"], "FORM");
    assert_eq!(body["data"]["elements"][0]["elements"][2]["resource"], "/contacts");

    let request = Request::builder()
        .uri("/api/views/unknown")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_render_view_applies_rules() {
    let (app, _) = setup().await;

    let request = Request::builder()
        .uri("/api/views/person_form/render")
        .method("POST")
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({
                "data": {"status": "locked", "email": "ann@example.com"},
                "form": {"first_name": "Ann"}
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let html = body["data"]["html"].as_str().unwrap();

    assert!(html.starts_with("<main"));
    assert!(html.contains("value=\"Ann\""));
    assert!(html.contains("disabled id=\"email\""));
    assert!(html.contains("data-resource=\"/contacts\""));
}

#[tokio::test]
async fn test_list_records_paginates_and_searches() {
    let (app, _) = setup().await;

    let request = Request::builder()
        .uri("/api/records/contacts?page=1&per_page=1")
        .body(Body::empty())
        .unwrap();
    let body = body_json(app.clone().oneshot(request).await.unwrap()).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["pagination"]["total_pages"], 2);

    let request = Request::builder()
        .uri("/api/records/contacts?q=bob")
        .body(Body::empty())
        .unwrap();
    let body = body_json(app.oneshot(request).await.unwrap()).await;
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["data"]["name"], "Bob Stone");
}

#[tokio::test]
async fn test_create_record() {
    let (app, store) = setup().await;

    let request = Request::builder()
        .uri("/api/records/contacts")
        .method("POST")
        .header("Content-Type", "application/json")
        .body(Body::from(json!({"data": {"name": "Cid"}}).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["id"], 3);
    assert_eq!(body["data"]["name"], "Cid");
    assert_eq!(store.len("/contacts").await, 3);
    assert_eq!(store.create_calls(), 1);
}
